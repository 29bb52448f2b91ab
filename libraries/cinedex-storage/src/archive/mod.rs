//! Archive of explicitly deleted records
//!
//! Lives in its own database, independent of the live catalog. Rows are only
//! ever appended.

use crate::Result;
use cinedex_core::types::{ArchivedRecord, CreateArchivedRecord, RecordId};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::path::PathBuf;

const SELECT_COLUMNS: &str = "SELECT archive_id, id, title, media_path, file_size_bytes,
        duration_seconds, snapshot, archived_at
     FROM archived_records";

/// Append a snapshot to the archive
pub async fn append(pool: &SqlitePool, entry: CreateArchivedRecord) -> Result<ArchivedRecord> {
    let now = chrono::Utc::now().timestamp();
    let snapshot = serde_json::to_string(&entry.snapshot)?;

    let result = sqlx::query(
        "INSERT INTO archived_records
            (id, title, media_path, file_size_bytes, duration_seconds, snapshot, archived_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(entry.id.as_str())
    .bind(&entry.title)
    .bind(entry.media_path.to_string_lossy().to_string())
    .bind(entry.file_size_bytes as i64)
    .bind(entry.duration_seconds as i64)
    .bind(snapshot)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(ArchivedRecord {
        archive_id: result.last_insert_rowid(),
        id: entry.id,
        title: entry.title,
        media_path: entry.media_path,
        file_size_bytes: entry.file_size_bytes,
        duration_seconds: entry.duration_seconds,
        snapshot: entry.snapshot,
        archived_at: now,
    })
}

/// Get the whole archive, oldest first
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<ArchivedRecord>> {
    let rows = sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY archive_id"))
        .fetch_all(pool)
        .await?;

    rows.iter().map(archived_from_row).collect()
}

/// Get every archived snapshot of one record id
pub async fn get_by_record_id(pool: &SqlitePool, id: &RecordId) -> Result<Vec<ArchivedRecord>> {
    let rows = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ? ORDER BY archive_id"))
        .bind(id.as_str())
        .fetch_all(pool)
        .await?;

    rows.iter().map(archived_from_row).collect()
}

fn archived_from_row(row: &SqliteRow) -> Result<ArchivedRecord> {
    let snapshot: String = row.try_get("snapshot")?;

    Ok(ArchivedRecord {
        archive_id: row.try_get("archive_id")?,
        id: RecordId::new(row.try_get::<String, _>("id")?),
        title: row.try_get("title")?,
        media_path: PathBuf::from(row.try_get::<String, _>("media_path")?),
        file_size_bytes: row.try_get::<i64, _>("file_size_bytes")?.max(0) as u64,
        duration_seconds: row.try_get::<i64, _>("duration_seconds")?.max(0) as u64,
        snapshot: serde_json::from_str(&snapshot)?,
        archived_at: row.try_get("archived_at")?,
    })
}
