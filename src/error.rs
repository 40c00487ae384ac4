//! Error type shared by the scheduler, the stores and the export code.

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StudyError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Study item not found: {id}")]
    NotFound { id: Uuid },

    #[error("Study item id {id} is already used by other content")]
    IdConflict { id: Uuid },

    #[error("Malformed study item: {0}")]
    MalformedRow(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StudyError>;
