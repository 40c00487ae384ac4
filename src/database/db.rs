//! SQLite-backed study item store
//!
//! Creates the schema on open, maps rows through a plain row type and
//! validates them before handing out [`StudyItem`]s. Timestamps are stored as
//! UTC milliseconds.

use chrono::{DateTime, Utc};
use log::{debug, info};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use uuid::Uuid;

use super::StudyStore;
use crate::error::{Result, StudyError};
use crate::models::{ContentType, ReviewUpdate, StudyItem};

const ITEM_COLUMNS: &str = "id, owner_id, content_id, content_type, interval_days, \
     consecutive_correct, next_review_date, last_reviewed_at, created_at";

pub struct SqliteStudyStore {
    conn: Connection,
}

impl SqliteStudyStore {
    /// Opens (or creates) the database file and makes sure the schema exists
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        info!("Opened study database at {}", path.display());
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS study_items (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                content_id TEXT NOT NULL,
                content_type TEXT NOT NULL,
                interval_days INTEGER NOT NULL DEFAULT 1,
                consecutive_correct INTEGER NOT NULL DEFAULT 0,
                next_review_date INTEGER NOT NULL,
                last_reviewed_at INTEGER,
                created_at INTEGER NOT NULL,
                UNIQUE(owner_id, content_id, content_type)
            )",
            (),
        )?;

        // Read path filters by owner and orders by due date
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_study_items_owner_due
             ON study_items (owner_id, next_review_date)",
            (),
        )?;

        Ok(Self { conn })
    }

    fn find_by_content(
        &self,
        owner_id: &str,
        content_id: &str,
        content_type: ContentType,
    ) -> Result<Option<StudyItem>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {ITEM_COLUMNS} FROM study_items
                     WHERE owner_id = ?1 AND content_id = ?2 AND content_type = ?3"
                ),
                params![owner_id, content_id, content_type.as_str()],
                StudyItemRow::from_row,
            )
            .optional()?;
        row.map(StudyItem::try_from).transpose()
    }
}

impl StudyStore for SqliteStudyStore {
    fn add_item(&self, item: &StudyItem) -> Result<StudyItem> {
        item.validate()?;

        // Insert item (or ignore if the owner already tracks this content)
        let inserted = self.conn.execute(
            &format!(
                "INSERT OR IGNORE INTO study_items ({ITEM_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
            ),
            params![
                item.id.to_string(),
                item.owner_id,
                item.content_id,
                item.content_type.as_str(),
                i64::from(item.interval_days),
                i64::from(item.consecutive_correct),
                item.next_review_date.timestamp_millis(),
                item.last_reviewed_at.map(|at| at.timestamp_millis()),
                item.created_at.timestamp_millis(),
            ],
        )?;

        if inserted == 0 {
            debug!(
                "{} {} already on study list of {}",
                item.content_type, item.content_id, item.owner_id
            );
        }

        // Nothing stored for the triple means the insert was skipped on the id
        self.find_by_content(&item.owner_id, &item.content_id, item.content_type)?
            .ok_or(StudyError::IdConflict { id: item.id })
    }

    fn get_item(&self, owner_id: &str, id: Uuid) -> Result<Option<StudyItem>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {ITEM_COLUMNS} FROM study_items WHERE owner_id = ?1 AND id = ?2"),
                params![owner_id, id.to_string()],
                StudyItemRow::from_row,
            )
            .optional()?;

        row.map(StudyItem::try_from).transpose()
    }

    fn list_items(
        &self,
        owner_id: &str,
        content_type: Option<ContentType>,
    ) -> Result<Vec<StudyItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM study_items
             WHERE owner_id = ?1 AND (?2 IS NULL OR content_type = ?2)
             ORDER BY next_review_date ASC, id ASC"
        ))?;

        let rows = stmt
            .query_map(
                params![owner_id, content_type.map(|c| c.as_str())],
                StudyItemRow::from_row,
            )?
            .collect::<rusqlite::Result<Vec<StudyItemRow>>>()?;

        rows.into_iter().map(StudyItem::try_from).collect()
    }

    fn update_schedule(&self, update: &ReviewUpdate) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE study_items
             SET interval_days = ?1, consecutive_correct = ?2,
                 next_review_date = ?3, last_reviewed_at = ?4
             WHERE id = ?5",
            params![
                i64::from(update.interval_days),
                i64::from(update.consecutive_correct),
                update.next_review_date.timestamp_millis(),
                update.last_reviewed_at.timestamp_millis(),
                update.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(StudyError::NotFound { id: update.id });
        }
        Ok(())
    }

    fn remove_item(&self, owner_id: &str, id: Uuid) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM study_items WHERE owner_id = ?1 AND id = ?2",
            params![owner_id, id.to_string()],
        )?;
        Ok(removed > 0)
    }
}

/// A row as SQLite returns it, before validation
struct StudyItemRow {
    id: String,
    owner_id: String,
    content_id: String,
    content_type: String,
    interval_days: i64,
    consecutive_correct: i64,
    next_review_date: i64,
    last_reviewed_at: Option<i64>,
    created_at: i64,
}

impl StudyItemRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            content_id: row.get(2)?,
            content_type: row.get(3)?,
            interval_days: row.get(4)?,
            consecutive_correct: row.get(5)?,
            next_review_date: row.get(6)?,
            last_reviewed_at: row.get(7)?,
            created_at: row.get(8)?,
        })
    }
}

impl TryFrom<StudyItemRow> for StudyItem {
    type Error = StudyError;

    fn try_from(row: StudyItemRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| StudyError::MalformedRow(format!("bad id {:?}: {e}", row.id)))?;
        let content_type = row
            .content_type
            .parse::<ContentType>()
            .map_err(|e| StudyError::MalformedRow(format!("item {id}: {e}")))?;
        let interval_days = u32::try_from(row.interval_days)
            .ok()
            .filter(|days| *days >= 1)
            .ok_or_else(|| {
                StudyError::MalformedRow(format!(
                    "item {id}: interval_days {}",
                    row.interval_days
                ))
            })?;
        let consecutive_correct = u32::try_from(row.consecutive_correct).map_err(|_| {
            StudyError::MalformedRow(format!(
                "item {id}: consecutive_correct {}",
                row.consecutive_correct
            ))
        })?;

        let item = StudyItem {
            id,
            owner_id: row.owner_id,
            content_id: row.content_id,
            content_type,
            interval_days,
            consecutive_correct,
            next_review_date: from_millis(id, "next_review_date", row.next_review_date)?,
            last_reviewed_at: row
                .last_reviewed_at
                .map(|ms| from_millis(id, "last_reviewed_at", ms))
                .transpose()?,
            created_at: from_millis(id, "created_at", row.created_at)?,
        };
        item.validate()?;
        Ok(item)
    }
}

fn from_millis(id: Uuid, field: &str, millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| StudyError::MalformedRow(format!("item {id}: {field} {millis}")))
}
