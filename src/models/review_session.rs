//! Review session over a learner's due items.
//! Walks the items in rounds; items graded below the pass threshold come back
//! in the next round until every item of a round has been passed.

use chrono::{DateTime, Utc};
use log::debug;

use super::{ContentType, ReviewUpdate, SchedulerPolicy, StudyItem};
use crate::database::StudyStore;
use crate::error::{Result, StudyError};
use crate::review::{due_items, submit_review};

/// An item inside a session and whether it was passed this round.
#[derive(Clone, Debug)]
pub struct SessionItem {
    pub item: StudyItem,
    pub passed: bool,
    pub last_level: Option<u8>,
}

pub struct ReviewSession {
    pub owner_id: String,
    pub items: Vec<SessionItem>,
    pub current_round: Vec<usize>,
    pub current_index: usize,
    pub show_answer: bool,
    pub round_number: usize,
}

impl ReviewSession {
    pub fn new(owner_id: impl Into<String>, items: Vec<StudyItem>) -> Self {
        let items: Vec<SessionItem> = items
            .into_iter()
            .map(|item| SessionItem {
                item,
                passed: false,
                last_level: None,
            })
            .collect();
        let current_round = (0..items.len()).collect();

        Self {
            owner_id: owner_id.into(),
            items,
            current_round,
            current_index: 0,
            show_answer: false,
            round_number: 1,
        }
    }

    /// Starts a session with everything the owner has due at `now`.
    pub fn from_due<S: StudyStore + ?Sized>(
        store: &S,
        owner_id: &str,
        content_type: Option<ContentType>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let due = due_items(store, owner_id, content_type, now)?;
        Ok(Self::new(owner_id, due))
    }

    pub fn current_item(&self) -> Option<&StudyItem> {
        self.current_round
            .get(self.current_index)
            .and_then(|&idx| self.items.get(idx))
            .map(|entry| &entry.item)
    }

    pub fn toggle_answer(&mut self) {
        self.show_answer = !self.show_answer;
    }

    pub fn next_item(&mut self) {
        if self.current_index + 1 < self.current_round.len() {
            self.current_index += 1;
            self.show_answer = false;
        } else {
            self.start_next_round();
        }
    }

    /// Starts a new round with the items not passed in this one.
    /// With nothing left to repeat the session is complete.
    fn start_next_round(&mut self) {
        let failed: Vec<usize> = self
            .current_round
            .iter()
            .copied()
            .filter(|&idx| self.items.get(idx).is_some_and(|entry| !entry.passed))
            .collect();

        if failed.is_empty() {
            return;
        }

        self.current_round = failed;
        self.current_index = 0;
        self.show_answer = false;
        self.round_number += 1;
        debug!(
            "Round {} for {}: {} items to retry",
            self.round_number,
            self.owner_id,
            self.current_round.len()
        );
    }

    /// Grades the current item, persisting the review through the store.
    pub fn grade_current<S: StudyStore + ?Sized>(
        &mut self,
        store: &S,
        policy: &SchedulerPolicy,
        knowledge_level: u8,
        now: DateTime<Utc>,
    ) -> Result<ReviewUpdate> {
        let idx = *self
            .current_round
            .get(self.current_index)
            .ok_or_else(|| StudyError::InvalidArgument("session has no current item".to_string()))?;
        let entry = self
            .items
            .get_mut(idx)
            .ok_or_else(|| StudyError::InvalidArgument("session has no current item".to_string()))?;

        let update = submit_review(
            store,
            policy,
            &self.owner_id,
            entry.item.id,
            knowledge_level,
            now,
        )?;

        update.apply_to(&mut entry.item);
        entry.passed = policy.is_pass(knowledge_level);
        entry.last_level = Some(knowledge_level);
        Ok(update)
    }

    pub fn learned_count(&self) -> usize {
        self.current_round
            .iter()
            .filter(|&&idx| self.items.get(idx).is_some_and(|entry| entry.passed))
            .count()
    }

    pub fn total_count(&self) -> usize {
        self.current_round.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.total_count() - self.learned_count()
    }

    pub fn is_completed(&self) -> bool {
        self.learned_count() == self.total_count()
    }

    pub fn phase_message(&self) -> String {
        if self.round_number == 1 {
            format!("Round {}: {} items", self.round_number, self.total_count())
        } else {
            format!(
                "Round {} (Retry): {} items to retry",
                self.round_number,
                self.total_count()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStudyStore;
    use crate::review::add_to_study_list;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, 1, 7, 30, 0).unwrap()
    }

    fn session_with(store: &MemoryStudyStore, contents: &[&str]) -> ReviewSession {
        for content in contents {
            add_to_study_list(store, "alice", content, ContentType::Flashcard, now()).unwrap();
        }
        ReviewSession::from_due(store, "alice", None, now()).unwrap()
    }

    #[test]
    fn test_all_passed_in_first_round() {
        let store = MemoryStudyStore::new();
        let policy = SchedulerPolicy::default();
        let mut session = session_with(&store, &["a", "b"]);

        assert_eq!(session.phase_message(), "Round 1: 2 items");
        for _ in 0..2 {
            session.grade_current(&store, &policy, 4, now()).unwrap();
            session.next_item();
        }

        assert!(session.is_completed());
        assert_eq!(session.round_number, 1);
        assert_eq!(session.remaining_count(), 0);
    }

    #[test]
    fn test_failed_item_repeats() {
        let store = MemoryStudyStore::new();
        let policy = SchedulerPolicy::default();
        let mut session = session_with(&store, &["a", "b"]);

        let failed_id = session.current_item().unwrap().id;
        session.grade_current(&store, &policy, 1, now()).unwrap();
        session.next_item();
        session.grade_current(&store, &policy, 5, now()).unwrap();
        session.next_item();

        assert!(!session.is_completed());
        assert_eq!(session.round_number, 2);
        assert_eq!(session.total_count(), 1);
        assert_eq!(session.current_item().unwrap().id, failed_id);
        assert_eq!(session.phase_message(), "Round 2 (Retry): 1 items to retry");

        session.grade_current(&store, &policy, 3, now()).unwrap();
        session.next_item();
        assert!(session.is_completed());

        let stored = store.get_item("alice", failed_id).unwrap().unwrap();
        assert_eq!(stored.consecutive_correct, 1);
        assert_eq!(stored.interval_days, 2);
    }

    #[test]
    fn test_toggle_answer_resets_on_next() {
        let store = MemoryStudyStore::new();
        let mut session = session_with(&store, &["a", "b"]);

        session.toggle_answer();
        assert!(session.show_answer);
        session.next_item();
        assert!(!session.show_answer);
    }

    #[test]
    fn test_empty_session() {
        let store = MemoryStudyStore::new();
        let mut session = session_with(&store, &[]);

        assert!(session.is_completed());
        assert!(session.current_item().is_none());
        session.next_item();
        assert!(matches!(
            session.grade_current(&store, &SchedulerPolicy::default(), 4, now()),
            Err(StudyError::InvalidArgument(_))
        ));
    }
}
