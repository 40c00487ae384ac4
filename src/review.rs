//! Study list operations over a [`StudyStore`].
//!
//! Every function takes the owner and the clock reading explicitly. Each
//! review submission is one read-modify-write against the store; submitting
//! the same review twice advances the schedule twice.
//!
//! Clock readings are cut to whole milliseconds, the precision stores keep, so
//! what these functions return matches what a later read gives back.

use chrono::{DateTime, SubsecRound, Utc};
use log::{debug, info};
use uuid::Uuid;

use crate::database::StudyStore;
use crate::error::{Result, StudyError};
use crate::models::{
    ContentType, ReviewUpdate, SchedulerPolicy, StudyItem, compute_next_review,
    compute_next_review_date, select_due,
};

/// Adds content to the owner's study list. Returns the existing item when the
/// content is already tracked.
pub fn add_to_study_list<S: StudyStore + ?Sized>(
    store: &S,
    owner_id: &str,
    content_id: &str,
    content_type: ContentType,
    now: DateTime<Utc>,
) -> Result<StudyItem> {
    if owner_id.trim().is_empty() || content_id.trim().is_empty() {
        return Err(StudyError::InvalidArgument(
            "owner and content id must not be empty".to_string(),
        ));
    }
    let now = now.trunc_subsecs(3);
    let item = store.add_item(&StudyItem::new(owner_id, content_id, content_type, now))?;
    info!("{content_type} {content_id} on study list of {owner_id} as {}", item.id);
    Ok(item)
}

pub fn remove_from_study_list<S: StudyStore + ?Sized>(
    store: &S,
    owner_id: &str,
    item_id: Uuid,
) -> Result<()> {
    if !store.remove_item(owner_id, item_id)? {
        return Err(StudyError::NotFound { id: item_id });
    }
    info!("Removed {item_id} from study list of {owner_id}");
    Ok(())
}

/// Adds imported items to the owner's study list under fresh ids, keeping
/// their review state. Content the owner already tracks is left untouched.
/// Returns how many items were newly added.
pub fn import_items<S: StudyStore + ?Sized>(
    store: &S,
    owner_id: &str,
    items: Vec<StudyItem>,
) -> Result<usize> {
    if owner_id.trim().is_empty() {
        return Err(StudyError::InvalidArgument(
            "owner id must not be empty".to_string(),
        ));
    }

    let mut added = 0;
    for mut item in items {
        item.id = Uuid::new_v4();
        item.owner_id = owner_id.to_string();
        if store.add_item(&item)?.id == item.id {
            added += 1;
        }
    }
    info!("Imported {added} items into study list of {owner_id}");
    Ok(added)
}

/// Items of the owner that are due at `now`, oldest first.
pub fn due_items<S: StudyStore + ?Sized>(
    store: &S,
    owner_id: &str,
    content_type: Option<ContentType>,
    now: DateTime<Utc>,
) -> Result<Vec<StudyItem>> {
    let items = store.list_items(owner_id, content_type)?;
    let due = select_due(&items, now);
    debug!("{} of {} items due for {owner_id}", due.len(), items.len());
    Ok(due)
}

/// Records one review of an item and returns the fields written back.
pub fn submit_review<S: StudyStore + ?Sized>(
    store: &S,
    policy: &SchedulerPolicy,
    owner_id: &str,
    item_id: Uuid,
    knowledge_level: u8,
    now: DateTime<Utc>,
) -> Result<ReviewUpdate> {
    let now = now.trunc_subsecs(3);
    let item = store
        .get_item(owner_id, item_id)?
        .ok_or(StudyError::NotFound { id: item_id })?;

    let schedule = compute_next_review(
        policy,
        knowledge_level,
        item.interval_days,
        item.consecutive_correct,
    )?;

    let update = ReviewUpdate {
        id: item.id,
        interval_days: schedule.next_interval_days,
        consecutive_correct: schedule.new_consecutive_correct,
        next_review_date: compute_next_review_date(schedule.next_interval_days, now),
        last_reviewed_at: now,
    };
    store.update_schedule(&update)?;

    debug!(
        "Reviewed {item_id} at level {knowledge_level}: interval {} -> {}, streak {}",
        item.interval_days, update.interval_days, update.consecutive_correct
    );
    Ok(update)
}
