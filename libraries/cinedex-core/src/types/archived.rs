/// Archived (deleted) record types
use crate::error::Result;
use crate::types::{CatalogRecord, RecordId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Snapshot of a record taken when it was explicitly deleted
///
/// Archive rows are append-only and never mutated after insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedRecord {
    /// Row id in the archive store (a record id may be archived more than once)
    pub archive_id: i64,
    pub id: RecordId,
    pub title: String,
    pub media_path: PathBuf,
    pub file_size_bytes: u64,
    pub duration_seconds: u64,
    /// The full record as JSON at the moment of removal
    pub snapshot: serde_json::Value,
    /// When the record was archived (unix seconds)
    pub archived_at: i64,
}

/// Input for appending to the archive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateArchivedRecord {
    pub id: RecordId,
    pub title: String,
    pub media_path: PathBuf,
    pub file_size_bytes: u64,
    pub duration_seconds: u64,
    pub snapshot: serde_json::Value,
}

impl CreateArchivedRecord {
    /// Snapshot `record` as it is right now
    pub fn from_record(record: &CatalogRecord) -> Result<Self> {
        Ok(Self {
            id: record.id.clone(),
            title: record.title.clone(),
            media_path: record.media_path.clone(),
            file_size_bytes: record.file_size_bytes,
            duration_seconds: record.duration_seconds,
            snapshot: serde_json::to_value(record)?,
        })
    }
}
