//! JSON import/export of a study list.
//! Saves a learner's study items to a JSON file and loads them back, checking
//! every imported item before it is returned.

use log::info;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::Result;
use crate::models::StudyItem;

/// Exports study items to a JSON file at the specified path.
pub fn export_json_to_path(items: &[StudyItem], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json_string = serde_json::to_string_pretty(items)?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;
    info!("Exported {} study items to '{}'", items.len(), path.display());
    Ok(())
}

/// Imports study items from a JSON file.
/// Fails if the file is missing, is not valid JSON, or holds an item that
/// breaks the study item invariants.
pub fn import_json(path: impl AsRef<Path>) -> Result<Vec<StudyItem>> {
    let path = path.as_ref();
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let items: Vec<StudyItem> = serde_json::from_str(&contents)?;
    for item in &items {
        item.validate()?;
    }

    info!("Imported {} study items from '{}'", items.len(), path.display());
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StudyError;
    use crate::models::ContentType;
    use chrono::{TimeZone, Utc};
    use std::fs;
    use tempfile::TempDir;

    fn create_test_items() -> Vec<StudyItem> {
        let now = Utc.with_ymd_and_hms(2026, 2, 14, 10, 0, 0).unwrap();
        let mut reviewed = StudyItem::new("alice", "art-186", ContentType::LegalArticle, now);
        reviewed.last_reviewed_at = Some(now);
        reviewed.interval_days = 6;
        reviewed.consecutive_correct = 2;
        vec![
            StudyItem::new("alice", "card-1", ContentType::Flashcard, now),
            reviewed,
        ]
    }

    #[test]
    fn test_export_and_import() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("study.json");
        let items = create_test_items();

        export_json_to_path(&items, &path).unwrap();
        assert!(fs::metadata(&path).is_ok(), "File should exist");

        let imported = import_json(&path).unwrap();
        assert_eq!(imported, items);
    }

    #[test]
    fn test_import_written_by_hand() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("hand.json");
        let json_content = r#"[
  {
    "id": "6f0c1f4e-8f1a-4d55-9a43-0d2d8f6a1b2c",
    "ownerId": "bob",
    "contentId": "sec-3",
    "contentType": "book_section",
    "intervalDays": 4,
    "consecutiveCorrect": 1,
    "nextReviewDate": "2026-02-18T10:00:00Z",
    "lastReviewedAt": "2026-02-14T10:00:00Z",
    "createdAt": "2026-02-01T08:00:00Z"
  }
]"#;
        fs::write(&path, json_content).unwrap();

        let items = import_json(&path).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content_type, ContentType::BookSection);
        assert_eq!(items[0].interval_days, 4);
        assert!(items[0].last_reviewed_at.is_some());
    }

    #[test]
    fn test_import_nonexistent_file() {
        let result = import_json("nonexistent_file_xyz123.json");
        assert!(matches!(result, Err(StudyError::Io(_))));
    }

    #[test]
    fn test_import_invalid_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("invalid.json");
        fs::write(&path, "{ this is not valid json }").unwrap();

        let result = import_json(&path);
        assert!(matches!(result, Err(StudyError::Json(_))));
    }

    #[test]
    fn test_import_rejects_zero_interval() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("zero.json");
        let mut items = create_test_items();
        items[0].interval_days = 0;
        fs::write(&path, serde_json::to_string(&items).unwrap()).unwrap();

        let result = import_json(&path);
        assert!(matches!(result, Err(StudyError::MalformedRow(_))));
    }
}
