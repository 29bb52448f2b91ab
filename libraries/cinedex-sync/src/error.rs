use cinedex_core::types::RecordId;
use cinedex_core::CinedexError;
use cinedex_storage::StorageError;
use thiserror::Error;

/// Errors that abort a catalog operation
///
/// Per-file extraction failures never show up here; they are collected in
/// the reload summary instead.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Reading or committing the catalog failed; nothing was committed
    #[error("Persistence error: {0}")]
    Storage(#[from] StorageError),

    #[error("Record not found: {0}")]
    NotFound(RecordId),

    #[error(transparent)]
    Core(#[from] CinedexError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, SyncError>;

impl From<SyncError> for CinedexError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::NotFound(id) => Self::not_found("Record", id.as_str()),
            SyncError::Core(e) => e,
            SyncError::Storage(e) => e.into(),
            SyncError::Task(e) => Self::Other(e.to_string()),
        }
    }
}
