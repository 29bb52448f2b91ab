use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::discoverer::ExtensionAllowList;

/// Reload trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReloadMode {
    /// Drop every record and thumbnail, then rebuild from disk
    Hard,
    /// Purge invalid records and add files not seen before
    Partial,
}

impl ReloadMode {
    pub fn from_hard(hard: bool) -> Self {
        if hard {
            Self::Hard
        } else {
            Self::Partial
        }
    }
}

/// Where a reload currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReloadPhase {
    Idle,
    Diffing,
    Purging,
    Discovering,
    Extracting,
    Committing,
}

/// Progress event sent while a reload runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReloadProgress {
    pub phase: ReloadPhase,
    pub processed: usize,
    pub total: usize,
}

/// Summary of a completed reload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReloadSummary {
    pub mode: ReloadMode,
    pub started_at: String,
    pub completed_at: String,
    pub duration_ms: u64,
    pub records_purged: usize,
    pub files_discovered: usize,
    pub records_added: usize,
    /// `path: reason` for every file skipped this cycle
    pub failures: Vec<String>,
    pub discovery_errors: usize,
}

/// Library roots and extension allow-list
#[derive(Debug, Clone)]
pub struct LibrarySettings {
    pub roots: Vec<PathBuf>,
    pub extensions: ExtensionAllowList,
}

impl LibrarySettings {
    /// Roots that exist are canonicalised so containment checks compare
    /// resolved paths; missing roots are kept as given
    pub fn new<I, S>(roots: Vec<PathBuf>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let roots = roots
            .into_iter()
            .map(|root| root.canonicalize().unwrap_or(root))
            .collect();

        Self {
            roots,
            extensions: ExtensionAllowList::new(extensions),
        }
    }

    /// Whether `path` lies under one of the roots
    pub fn contains(&self, path: &std::path::Path) -> bool {
        self.roots.iter().any(|root| path.starts_with(root))
    }
}
