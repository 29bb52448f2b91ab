//! Catalog differ
//!
//! Decides which persisted records are stale and which file stems are
//! already covered, before discovery runs.

use crate::types::{LibrarySettings, ReloadMode};
use cinedex_core::types::CatalogRecord;
use std::collections::HashSet;

/// Result of diffing the catalog against the filesystem
#[derive(Debug, Default)]
pub struct CatalogDiff {
    /// Records to purge
    pub stale: Vec<CatalogRecord>,

    /// Stems of records that stay; discovery skips files with these stems
    pub seen_stems: HashSet<String>,
}

/// A record stays valid while its file exists, has an allowed extension and
/// is either under a library root or a symlink
///
/// Touches the filesystem; call from a blocking context.
pub fn is_record_valid(record: &CatalogRecord, settings: &LibrarySettings) -> bool {
    let path = &record.media_path;

    if !path.exists() {
        return false;
    }

    if !settings.extensions.allows(path) {
        return false;
    }

    settings.contains(path) || path.is_symlink()
}

/// Split `records` into stale ones and the stems that are still known
pub fn diff_catalog(
    records: Vec<CatalogRecord>,
    mode: ReloadMode,
    settings: &LibrarySettings,
) -> CatalogDiff {
    let mut diff = CatalogDiff::default();

    for record in records {
        match mode {
            ReloadMode::Hard => diff.stale.push(record),
            ReloadMode::Partial => {
                if is_record_valid(&record, settings) {
                    if let Some(stem) = record.stem() {
                        diff.seen_stems.insert(stem);
                    }
                } else {
                    tracing::debug!(
                        "Record {} is stale ({})",
                        record.id,
                        record.media_path.display()
                    );
                    diff.stale.push(record);
                }
            }
        }
    }

    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinedex_core::types::RecordId;
    use std::fs;
    use std::path::{Path, PathBuf};

    fn record_at(path: &Path) -> CatalogRecord {
        CatalogRecord {
            id: RecordId::new(path.to_string_lossy()),
            title: path.file_stem().unwrap().to_string_lossy().to_string(),
            media_path: path.to_path_buf(),
            thumbnail_path: PathBuf::from("/thumbs/x.png"),
            duration_seconds: 1,
            file_size_bytes: 1,
            modified_time_unix: 0.0,
            extras: Default::default(),
        }
    }

    fn settings(root: &Path) -> LibrarySettings {
        LibrarySettings::new(vec![root.to_path_buf()], [".mp4"])
    }

    #[test]
    fn test_partial_keeps_valid_records() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::write(root.join("keep.mp4"), b"").unwrap();

        let diff = diff_catalog(
            vec![record_at(&root.join("keep.mp4"))],
            ReloadMode::Partial,
            &settings(&root),
        );

        assert!(diff.stale.is_empty());
        assert!(diff.seen_stems.contains("keep"));
    }

    #[test]
    fn test_partial_marks_invalid_records_stale() {
        let dir = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::write(root.join("clip.avi"), b"").unwrap();
        fs::write(outside.path().join("moved.mp4"), b"").unwrap();

        let records = vec![
            record_at(&root.join("deleted.mp4")),
            record_at(&root.join("clip.avi")),
            record_at(&outside.path().canonicalize().unwrap().join("moved.mp4")),
        ];

        let diff = diff_catalog(records, ReloadMode::Partial, &settings(&root));

        assert_eq!(diff.stale.len(), 3);
        assert!(diff.seen_stems.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_outside_roots_stays_valid() {
        let dir = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let links = elsewhere.path().canonicalize().unwrap();
        fs::write(root.join("target.mp4"), b"").unwrap();
        std::os::unix::fs::symlink(root.join("target.mp4"), links.join("link.mp4")).unwrap();

        let record = record_at(&links.join("link.mp4"));

        assert!(is_record_valid(&record, &settings(&root)));
    }

    #[test]
    fn test_hard_marks_everything_stale() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::write(root.join("keep.mp4"), b"").unwrap();

        let diff = diff_catalog(
            vec![record_at(&root.join("keep.mp4"))],
            ReloadMode::Hard,
            &settings(&root),
        );

        assert_eq!(diff.stale.len(), 1);
        assert!(diff.seen_stems.is_empty());
    }
}
