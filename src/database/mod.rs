//! Store boundary for study items.
//!
//! The scheduler never talks to storage directly; review submission reads and
//! writes through [`StudyStore`]. Store failures are propagated as they are,
//! without retries.

pub mod db;
pub mod memory;

pub use db::SqliteStudyStore;
pub use memory::MemoryStudyStore;

use uuid::Uuid;

use crate::error::Result;
use crate::models::{ContentType, ReviewUpdate, StudyItem};

pub trait StudyStore {
    /// Inserts the item, or returns the stored one if the owner already
    /// tracks the same content. Fails with `IdConflict` when the id already
    /// belongs to another owner or content; the stored row is left as it is.
    fn add_item(&self, item: &StudyItem) -> Result<StudyItem>;

    fn get_item(&self, owner_id: &str, id: Uuid) -> Result<Option<StudyItem>>;

    /// All items of an owner, ordered by due date then id.
    fn list_items(&self, owner_id: &str, content_type: Option<ContentType>)
    -> Result<Vec<StudyItem>>;

    /// Writes the review fields of one item. Fails with `NotFound` when no
    /// row has that id.
    fn update_schedule(&self, update: &ReviewUpdate) -> Result<()>;

    /// Returns whether a row was removed.
    fn remove_item(&self, owner_id: &str, id: Uuid) -> Result<bool>;
}
