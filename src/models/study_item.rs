//! A study item is one piece of content on a learner's study list, together
//! with its spaced repetition state.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::StudyError;

/// Kind of content a study item tracks
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Flashcard,
    BookSection,
    LegalArticle,
}

impl ContentType {
    pub const ALL: [ContentType; 3] = [
        ContentType::Flashcard,
        ContentType::BookSection,
        ContentType::LegalArticle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Flashcard => "flashcard",
            ContentType::BookSection => "book_section",
            ContentType::LegalArticle => "legal_article",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = StudyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flashcard" => Ok(ContentType::Flashcard),
            "book_section" => Ok(ContentType::BookSection),
            "legal_article" => Ok(ContentType::LegalArticle),
            other => Err(StudyError::InvalidArgument(format!(
                "unknown content type {other:?}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyItem {
    pub id: Uuid,
    pub owner_id: String,
    pub content_id: String,
    pub content_type: ContentType,
    pub interval_days: u32,
    pub consecutive_correct: u32,
    pub next_review_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl StudyItem {
    /// A freshly added item: one-day interval, no streak, due right away.
    pub fn new(
        owner_id: impl Into<String>,
        content_id: impl Into<String>,
        content_type: ContentType,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            content_id: content_id.into(),
            content_type,
            interval_days: 1,
            consecutive_correct: 0,
            next_review_date: now,
            last_reviewed_at: None,
            created_at: now,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.next_review_date
    }

    /// Checks the invariants a stored or imported item must hold.
    pub fn validate(&self) -> Result<(), StudyError> {
        if self.interval_days < 1 {
            return Err(StudyError::MalformedRow(format!(
                "item {} has interval_days {}",
                self.id, self.interval_days
            )));
        }
        if self.owner_id.is_empty() || self.content_id.is_empty() {
            return Err(StudyError::MalformedRow(format!(
                "item {} has an empty owner or content id",
                self.id
            )));
        }
        Ok(())
    }
}

/// The fields a review writes back to the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewUpdate {
    pub id: Uuid,
    pub interval_days: u32,
    pub consecutive_correct: u32,
    pub next_review_date: DateTime<Utc>,
    pub last_reviewed_at: DateTime<Utc>,
}

impl ReviewUpdate {
    pub fn apply_to(&self, item: &mut StudyItem) {
        item.interval_days = self.interval_days;
        item.consecutive_correct = self.consecutive_correct;
        item.next_review_date = self.next_review_date;
        item.last_reviewed_at = Some(self.last_reviewed_at);
    }
}
