//! Selection of due items and study list statistics.
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use super::{ContentType, StudyItem};

/// Returns the items due at `now`, oldest due date first.
///
/// Ties on the due date are broken by id so the output is identical for
/// identical input, whatever order the items arrived in.
pub fn select_due(items: &[StudyItem], now: DateTime<Utc>) -> Vec<StudyItem> {
    let mut due: Vec<StudyItem> = items
        .iter()
        .filter(|item| item.next_review_date <= now)
        .cloned()
        .collect();
    due.sort_by(|a, b| {
        a.next_review_date
            .cmp(&b.next_review_date)
            .then_with(|| a.id.cmp(&b.id))
    });
    due
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyStats {
    pub total_items: usize,
    pub due_items: usize,
    pub never_reviewed: usize,
    pub by_content_type: BTreeMap<ContentType, usize>,
}

pub fn summarize(items: &[StudyItem], now: DateTime<Utc>) -> StudyStats {
    let mut stats = StudyStats {
        total_items: items.len(),
        ..Default::default()
    };
    for item in items {
        if item.is_due(now) {
            stats.due_items += 1;
        }
        if item.last_reviewed_at.is_none() {
            stats.never_reviewed += 1;
        }
        *stats.by_content_type.entry(item.content_type).or_default() += 1;
    }
    stats
}
