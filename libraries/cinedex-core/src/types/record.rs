/// Catalog record domain types
use crate::types::RecordId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Prefix of the `extras` keys that hold the field-edit audit log
pub const AUDIT_KEY_PREFIX: &str = "update_";

/// One known media file in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Content-derived identifier
    pub id: RecordId,

    /// Filename stem of the media file
    pub title: String,

    /// Absolute, resolved path of the media file
    pub media_path: PathBuf,

    /// Absolute, resolved path of the generated preview image
    pub thumbnail_path: PathBuf,

    /// Container duration in whole seconds
    pub duration_seconds: u64,

    /// File size in bytes
    pub file_size_bytes: u64,

    /// Modification time at extraction (unix seconds)
    pub modified_time_unix: f64,

    /// Probe-derived attributes plus the append-only edit audit log
    #[serde(default)]
    pub extras: Map<String, Value>,
}

impl CatalogRecord {
    /// Filename stem of the media path, used to dedupe discovery
    pub fn stem(&self) -> Option<String> {
        file_stem(&self.media_path)
    }

    /// Whether the backing media file is still on disk
    pub fn media_exists(&self) -> bool {
        self.media_path.exists()
    }

    /// Apply an edit, appending the previous values to the audit log
    ///
    /// Returns `false` (and leaves the record untouched) when the update
    /// changes nothing.
    pub fn apply_update(&mut self, update: &RecordUpdate, at: DateTime<Utc>) -> bool {
        let mut previous = Map::new();

        if let Some(title) = update.title.as_ref() {
            previous.insert("prev_title".to_string(), Value::String(self.title.clone()));
            self.title.clone_from(title);
        }

        if previous.is_empty() {
            return false;
        }

        let base = format!(
            "{}{}.{:06}",
            AUDIT_KEY_PREFIX,
            at.timestamp(),
            at.timestamp_subsec_micros()
        );
        let mut key = base.clone();
        let mut n = 1;
        while self.extras.contains_key(&key) {
            key = format!("{base}_{n}");
            n += 1;
        }

        self.extras.insert(key, Value::Object(previous));
        true
    }

    /// Audit log entries, oldest first
    pub fn audit_entries(&self) -> Vec<(&String, &Value)> {
        let mut entries: Vec<_> = self
            .extras
            .iter()
            .filter(|(key, _)| key.starts_with(AUDIT_KEY_PREFIX))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

/// Editable fields of a catalog record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordUpdate {
    pub title: Option<String>,
}

impl RecordUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
    }
}

/// Outward-facing projection of a record
///
/// Never exposes the audit log; probe extras only when asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordView {
    pub id: RecordId,
    pub title: String,
    pub duration: u64,
    pub filesize: u64,
    pub modified_time: f64,
    pub extras: Map<String, Value>,
}

impl RecordView {
    pub fn from_record(record: &CatalogRecord, include_extras: bool) -> Self {
        let extras = if include_extras {
            record
                .extras
                .iter()
                .filter(|(key, _)| !key.starts_with(AUDIT_KEY_PREFIX))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        } else {
            Map::new()
        };

        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            duration: record.duration_seconds,
            filesize: record.file_size_bytes,
            modified_time: record.modified_time_unix,
            extras,
        }
    }
}

/// Format seconds as `MM:SS` (`120.0` -> `02:00`)
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}

pub(crate) fn file_stem(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}
