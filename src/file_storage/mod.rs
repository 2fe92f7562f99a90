//! Interview record persistence
//!
//! Completed interviews are appended as one JSON line each to a durable
//! record file. Append-only: the serving path never reads the file back,
//! never updates and never deletes. An exclusive lock guards concurrent
//! appends from parallel sessions.

use crate::models::InterviewRecord;
use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

const RECORDS_FILE: &str = "interview_records.jsonl";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to prepare records directory: {0}")]
    Prepare(String),

    #[error("failed to append record: {0}")]
    Append(String),
}

/// Where completed interviews get written
pub trait RecordSink: Send + Sync {
    fn append(&self, record: &InterviewRecord) -> Result<(), StorageError>;
}

/// Default records directory: `~/.o2c-discovery`
pub fn default_records_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".o2c-discovery")
}

/// File-backed append-only sink
pub struct FileRecordSink {
    records_dir: PathBuf,
}

impl FileRecordSink {
    pub fn new(records_dir: impl Into<PathBuf>) -> Self {
        Self {
            records_dir: records_dir.into(),
        }
    }

    pub fn records_path(&self) -> PathBuf {
        self.records_dir.join(RECORDS_FILE)
    }
}

impl RecordSink for FileRecordSink {
    fn append(&self, record: &InterviewRecord) -> Result<(), StorageError> {
        fs::create_dir_all(&self.records_dir).map_err(|e| StorageError::Prepare(e.to_string()))?;

        let line =
            serde_json::to_string(record).map_err(|e| StorageError::Append(e.to_string()))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.records_path())
            .map_err(|e| StorageError::Append(e.to_string()))?;

        file.lock_exclusive()
            .map_err(|e| StorageError::Append(e.to_string()))?;
        let result = writeln!(file, "{}", line).map_err(|e| StorageError::Append(e.to_string()));
        let _ = fs2::FileExt::unlock(&file);
        result?;

        log::info!(
            "[Saved] interview record with {} attributes",
            record.attribute_count
        );
        Ok(())
    }
}

/// Read every record back. Inspection/tests only; the serving path is
/// write-only.
pub fn list_records(records_dir: &Path) -> Result<Vec<InterviewRecord>, StorageError> {
    let path = records_dir.join(RECORDS_FILE);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(&path).map_err(|e| StorageError::Append(e.to_string()))?;
    Ok(content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| serde_json::from_str(l).ok())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CollectedData;
    use chrono::Utc;
    use tempfile::TempDir;

    fn sample_record() -> InterviewRecord {
        let mut data = CollectedData::new();
        data.record("order_origin_channels", "EDI 850 and B2B portal");
        InterviewRecord {
            timestamp: Utc::now(),
            attribute_count: data.len(),
            data,
        }
    }

    #[test]
    fn test_append_creates_file_and_appends_lines() {
        let temp_dir = TempDir::new().unwrap();
        let sink = FileRecordSink::new(temp_dir.path());

        sink.append(&sample_record()).unwrap();
        sink.append(&sample_record()).unwrap();

        let records = list_records(temp_dir.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].attribute_count, 1);
        assert_eq!(
            records[0].data.get("order_origin_channels"),
            Some("EDI 850 and B2B portal")
        );
    }

    #[test]
    fn test_record_shape_is_camel_case() {
        let line = serde_json::to_string(&sample_record()).unwrap();
        assert!(line.contains("\"timestamp\""));
        assert!(line.contains("\"attributeCount\""));
        assert!(line.contains("\"data\""));
    }

    #[test]
    fn test_list_records_on_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        assert!(list_records(temp_dir.path()).unwrap().is_empty());
    }
}
