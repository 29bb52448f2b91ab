//! Cinedex Storage
//!
//! `SQLite` persistence for the media catalog.
//!
//! # Architecture
//!
//! - **Two stores**: the live catalog and the archive of deleted records live
//!   in separate databases, each with its own embedded migrations
//! - **Vertical Slicing**: `catalog` and `archive` own their queries
//! - **Explicit handles**: every function takes the `SqlitePool` it works on;
//!   there is no process-wide catalog
//!
//! # Example
//!
//! ```rust,no_run
//! use cinedex_storage::{catalog, create_pool, run_migrations};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://catalog.db").await?;
//! run_migrations(&pool).await?;
//!
//! let records = catalog::get_all(&pool).await?;
//! # Ok(())
//! # }
//! ```

mod error;

pub mod archive;
pub mod catalog;

pub use error::{Result, StorageError};

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static CATALOG_MIGRATOR: Migrator = sqlx::migrate!("./migrations/catalog");
static ARCHIVE_MIGRATOR: Migrator = sqlx::migrate!("./migrations/archive");

/// Run the live catalog migrations
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    CATALOG_MIGRATOR.run(pool).await?;
    Ok(())
}

/// Run the archive store migrations
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_archive_migrations(pool: &SqlitePool) -> Result<()> {
    ARCHIVE_MIGRATOR.run(pool).await?;
    Ok(())
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `sqlite://catalog.db`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!("Creating pool with URL: {}", database_url);

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}
