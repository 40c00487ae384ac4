//! In-process study item store.
//!
//! Holds items in a map behind a `RefCell`; single-threaded like the rest of
//! the crate. Useful for tests and for callers that keep their own persistence.

use std::cell::RefCell;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::StudyStore;
use crate::error::{Result, StudyError};
use crate::models::{ContentType, ReviewUpdate, StudyItem};

#[derive(Default)]
pub struct MemoryStudyStore {
    items: RefCell<BTreeMap<Uuid, StudyItem>>,
}

impl MemoryStudyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl StudyStore for MemoryStudyStore {
    fn add_item(&self, item: &StudyItem) -> Result<StudyItem> {
        item.validate()?;
        let mut items = self.items.borrow_mut();

        let existing = items.values().find(|stored| {
            stored.owner_id == item.owner_id
                && stored.content_id == item.content_id
                && stored.content_type == item.content_type
        });
        if let Some(stored) = existing {
            return Ok(stored.clone());
        }
        if items.contains_key(&item.id) {
            return Err(StudyError::IdConflict { id: item.id });
        }

        items.insert(item.id, item.clone());
        Ok(item.clone())
    }

    fn get_item(&self, owner_id: &str, id: Uuid) -> Result<Option<StudyItem>> {
        Ok(self
            .items
            .borrow()
            .get(&id)
            .filter(|item| item.owner_id == owner_id)
            .cloned())
    }

    fn list_items(
        &self,
        owner_id: &str,
        content_type: Option<ContentType>,
    ) -> Result<Vec<StudyItem>> {
        let mut items: Vec<StudyItem> = self
            .items
            .borrow()
            .values()
            .filter(|item| item.owner_id == owner_id)
            .filter(|item| content_type.is_none_or(|wanted| item.content_type == wanted))
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            a.next_review_date
                .cmp(&b.next_review_date)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(items)
    }

    fn update_schedule(&self, update: &ReviewUpdate) -> Result<()> {
        let mut items = self.items.borrow_mut();
        let item = items
            .get_mut(&update.id)
            .ok_or(StudyError::NotFound { id: update.id })?;
        update.apply_to(item);
        Ok(())
    }

    fn remove_item(&self, owner_id: &str, id: Uuid) -> Result<bool> {
        let mut items = self.items.borrow_mut();
        match items.get(&id) {
            Some(item) if item.owner_id == owner_id => {
                items.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeDelta, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 2, 8, 15, 0).unwrap()
    }

    #[test]
    fn test_add_is_unique_per_content() {
        let store = MemoryStudyStore::new();
        let first = StudyItem::new("alice", "card-1", ContentType::Flashcard, now());
        store.add_item(&first).unwrap();

        let stored = store
            .add_item(&StudyItem::new("alice", "card-1", ContentType::Flashcard, now()))
            .unwrap();

        assert_eq!(stored.id, first.id);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_add_with_id_of_other_owner_is_rejected() {
        let store = MemoryStudyStore::new();
        let item = StudyItem::new("alice", "card-1", ContentType::Flashcard, now());
        store.add_item(&item).unwrap();

        let mut foreign = item.clone();
        foreign.owner_id = "bob".to_string();
        let result = store.add_item(&foreign);
        assert!(matches!(result, Err(StudyError::IdConflict { id }) if id == item.id));

        let mut other_content = item.clone();
        other_content.content_id = "card-2".to_string();
        assert!(matches!(
            store.add_item(&other_content),
            Err(StudyError::IdConflict { .. })
        ));

        assert_eq!(store.get_item("alice", item.id).unwrap(), Some(item.clone()));
        assert_eq!(store.get_item("bob", item.id).unwrap(), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_list_filters_and_orders() {
        let store = MemoryStudyStore::new();
        let mut late = StudyItem::new("alice", "art-1", ContentType::LegalArticle, now());
        late.next_review_date = now() + TimeDelta::days(2);
        let early = StudyItem::new("alice", "card-1", ContentType::Flashcard, now());
        store.add_item(&late).unwrap();
        store.add_item(&early).unwrap();
        store
            .add_item(&StudyItem::new("bob", "card-1", ContentType::Flashcard, now()))
            .unwrap();

        assert_eq!(store.list_items("alice", None).unwrap(), vec![early, late.clone()]);
        assert_eq!(
            store
                .list_items("alice", Some(ContentType::LegalArticle))
                .unwrap(),
            vec![late]
        );
    }

    #[test]
    fn test_update_and_remove() {
        let store = MemoryStudyStore::new();
        let item = StudyItem::new("alice", "card-1", ContentType::Flashcard, now());
        store.add_item(&item).unwrap();

        let update = ReviewUpdate {
            id: item.id,
            interval_days: 2,
            consecutive_correct: 1,
            next_review_date: now() + TimeDelta::days(2),
            last_reviewed_at: now(),
        };
        store.update_schedule(&update).unwrap();
        let stored = store.get_item("alice", item.id).unwrap().unwrap();
        assert_eq!(stored.interval_days, 2);
        assert_eq!(stored.last_reviewed_at, Some(now()));

        assert!(!store.remove_item("bob", item.id).unwrap());
        assert!(store.remove_item("alice", item.id).unwrap());
        assert!(store.is_empty());
        assert!(matches!(
            store.update_schedule(&update),
            Err(StudyError::NotFound { .. })
        ));
    }
}
