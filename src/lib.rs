pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod models;
pub mod review;

pub use config::StudyConfig;
pub use database::{MemoryStudyStore, SqliteStudyStore, StudyStore};
pub use error::{Result, StudyError};
pub use models::{ContentType, ReviewSession, ReviewUpdate, SchedulerPolicy, StudyItem};
