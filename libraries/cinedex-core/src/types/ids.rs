/// ID types for Cinedex entities
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use std::fmt;
use std::path::Path;

/// Catalog record identifier
///
/// Content-addressed rather than random: the same resolved media path,
/// thumbnail path and modification time always hash to the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap an existing identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive the identifier of a freshly extracted record
    ///
    /// SHA-512 over the media path, the thumbnail path and the modification
    /// time, hex encoded. Including the mtime means a file replaced in place
    /// gets a new identifier on its next extraction.
    pub fn derive(media_path: &Path, thumbnail_path: &Path, modified_time_unix: f64) -> Self {
        let mut hasher = Sha512::new();
        hasher.update(media_path.to_string_lossy().as_bytes());
        hasher.update(thumbnail_path.to_string_lossy().as_bytes());
        hasher.update(modified_time_unix.to_bits().to_le_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
