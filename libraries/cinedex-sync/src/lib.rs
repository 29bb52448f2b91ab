//! Cinedex Sync
//!
//! Keeps the catalog database in step with the media files on disk.
//!
//! - `FileDiscoverer` walks the library roots for allowed extensions
//! - `diff_catalog` splits the existing catalog into stale records and the
//!   stems that are already known
//! - `CatalogManager` runs hard and partial reloads, and owns every other
//!   catalog write (single-record delete with archive, audited edits)

mod differ;
mod discoverer;
mod error;
mod manager;
mod types;

pub use differ::{diff_catalog, is_record_valid, CatalogDiff};
pub use discoverer::{DiscoveryError, ExtensionAllowList, FileDiscoverer};
pub use error::{Result, SyncError};
pub use manager::CatalogManager;
pub use types::{LibrarySettings, ReloadMode, ReloadPhase, ReloadProgress, ReloadSummary};
