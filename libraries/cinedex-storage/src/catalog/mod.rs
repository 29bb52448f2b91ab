//! Live catalog storage
//!
//! One row per known media file. All multi-row writes run inside a single
//! transaction so a failed reload never leaves a partial commit behind.
//!
//! # Example
//!
//! ```rust,no_run
//! use cinedex_storage::catalog;
//!
//! # async fn example(pool: &sqlx::SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
//! let count = catalog::count(pool).await?;
//! let records = catalog::get_all(pool).await?;
//! assert_eq!(count as usize, records.len());
//! # Ok(())
//! # }
//! ```

use crate::{Result, StorageError};
use cinedex_core::types::{CatalogRecord, RecordId};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::path::PathBuf;

const SELECT_COLUMNS: &str = "SELECT id, title, media_path, thumbnail_path, duration_seconds,
        file_size_bytes, modified_time_unix, extras
     FROM catalog_records";

/// Get every record in the catalog
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<CatalogRecord>> {
    let rows = sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY title, id"))
        .fetch_all(pool)
        .await?;

    rows.iter().map(record_from_row).collect()
}

/// Get a record by id
pub async fn get_by_id(pool: &SqlitePool, id: &RecordId) -> Result<Option<CatalogRecord>> {
    let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
        .bind(id.as_str())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(record_from_row).transpose()
}

/// Number of records in the catalog
pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM catalog_records")
        .fetch_one(pool)
        .await?;

    Ok(row.try_get("count")?)
}

/// Insert records in one transaction
///
/// Re-inserting an existing id replaces the row, so the committed set does not
/// depend on insertion order.
pub async fn insert_many(pool: &SqlitePool, records: &[CatalogRecord]) -> Result<usize> {
    let mut tx = pool.begin().await?;

    for record in records {
        let extras = serde_json::to_string(&record.extras)?;

        sqlx::query(
            "INSERT OR REPLACE INTO catalog_records
                (id, title, media_path, thumbnail_path, duration_seconds,
                 file_size_bytes, modified_time_unix, extras)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id.as_str())
        .bind(&record.title)
        .bind(record.media_path.to_string_lossy().to_string())
        .bind(record.thumbnail_path.to_string_lossy().to_string())
        .bind(record.duration_seconds as i64)
        .bind(record.file_size_bytes as i64)
        .bind(record.modified_time_unix)
        .bind(extras)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(records.len())
}

/// Delete the given records in one transaction, returning how many rows went away
pub async fn delete_many(pool: &SqlitePool, ids: &[RecordId]) -> Result<u64> {
    let mut tx = pool.begin().await?;
    let mut removed = 0;

    for id in ids {
        let result = sqlx::query("DELETE FROM catalog_records WHERE id = ?")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await?;
        removed += result.rows_affected();
    }

    tx.commit().await?;

    Ok(removed)
}

/// Delete a single record
pub async fn delete(pool: &SqlitePool, id: &RecordId) -> Result<()> {
    let result = sqlx::query("DELETE FROM catalog_records WHERE id = ?")
        .bind(id.as_str())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StorageError::not_found("Record", id.as_str()));
    }

    Ok(())
}

/// Remove every record from the catalog
pub async fn delete_all(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM catalog_records")
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Persist the editable fields and extras of an existing record
pub async fn update(pool: &SqlitePool, record: &CatalogRecord) -> Result<()> {
    let extras = serde_json::to_string(&record.extras)?;

    let result = sqlx::query("UPDATE catalog_records SET title = ?, extras = ? WHERE id = ?")
        .bind(&record.title)
        .bind(extras)
        .bind(record.id.as_str())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StorageError::not_found("Record", record.id.as_str()));
    }

    Ok(())
}

fn record_from_row(row: &SqliteRow) -> Result<CatalogRecord> {
    let extras: String = row.try_get("extras")?;

    Ok(CatalogRecord {
        id: RecordId::new(row.try_get::<String, _>("id")?),
        title: row.try_get("title")?,
        media_path: PathBuf::from(row.try_get::<String, _>("media_path")?),
        thumbnail_path: PathBuf::from(row.try_get::<String, _>("thumbnail_path")?),
        duration_seconds: row.try_get::<i64, _>("duration_seconds")?.max(0) as u64,
        file_size_bytes: row.try_get::<i64, _>("file_size_bytes")?.max(0) as u64,
        modified_time_unix: row.try_get("modified_time_unix")?,
        extras: serde_json::from_str(&extras)?,
    })
}
