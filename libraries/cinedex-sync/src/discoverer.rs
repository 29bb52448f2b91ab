//! Library file discovery

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Case-insensitive set of accepted file extensions
///
/// Entries are stored lower-case without the leading dot, so `".MP4"`,
/// `"mp4"` and `".mp4"` all mean the same thing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionAllowList(HashSet<String>);

impl ExtensionAllowList {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
        )
    }

    pub fn allows(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.0.contains(&ext.to_lowercase()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A directory or entry the walk had to skip
#[derive(Debug, Clone)]
pub struct DiscoveryError {
    pub path: Option<PathBuf>,
    pub reason: String,
}

impl std::fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {}", path.display(), self.reason),
            None => f.write_str(&self.reason),
        }
    }
}

impl std::error::Error for DiscoveryError {}

impl From<walkdir::Error> for DiscoveryError {
    fn from(err: walkdir::Error) -> Self {
        Self {
            path: err.path().map(Path::to_path_buf),
            reason: err.to_string(),
        }
    }
}

/// Walks the library roots for media files
///
/// Symlinks are followed and entries are visited in file-name order, so the
/// same tree always yields the same sequence.
#[derive(Debug, Clone)]
pub struct FileDiscoverer {
    roots: Vec<PathBuf>,
    extensions: ExtensionAllowList,
}

impl FileDiscoverer {
    pub fn new(roots: Vec<PathBuf>, extensions: ExtensionAllowList) -> Self {
        Self { roots, extensions }
    }

    /// Lazily walk every root
    ///
    /// Each call starts a fresh walk. Unreadable entries come through as
    /// `Err` and the walk carries on past them.
    pub fn iter(&self) -> impl Iterator<Item = Result<PathBuf, DiscoveryError>> + '_ {
        self.roots.iter().flat_map(move |root| self.walk_root(root))
    }

    fn walk_root<'a>(
        &'a self,
        root: &'a Path,
    ) -> Box<dyn Iterator<Item = Result<PathBuf, DiscoveryError>> + 'a> {
        let root = match root.canonicalize() {
            Ok(root) => root,
            Err(e) => {
                return Box::new(std::iter::once(Err(DiscoveryError {
                    path: Some(root.to_path_buf()),
                    reason: format!("cannot open library root: {e}"),
                })))
            }
        };

        let walker = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter();

        Box::new(walker.filter_map(move |entry| match entry {
            Ok(entry) => {
                let is_candidate =
                    entry.file_type().is_file() && self.extensions.allows(entry.path());
                if !is_candidate {
                    return None;
                }
                // The catalog stores paths as text; such a file could never
                // be matched back to its record
                if entry.path().to_str().is_none() {
                    return Some(Err(DiscoveryError {
                        path: Some(entry.into_path()),
                        reason: "path is not valid UTF-8".to_string(),
                    }));
                }
                Some(Ok(entry.into_path()))
            }
            Err(e) => Some(Err(DiscoveryError::from(e))),
        }))
    }

    /// Collect candidates whose stem is not in `exclude_stems`
    ///
    /// Skipped entries are logged and returned alongside.
    pub fn collect_candidates(
        &self,
        exclude_stems: &HashSet<String>,
    ) -> (Vec<PathBuf>, Vec<DiscoveryError>) {
        let mut candidates = Vec::new();
        let mut errors = Vec::new();

        for item in self.iter() {
            match item {
                Ok(path) => {
                    let known = path
                        .file_stem()
                        .and_then(|stem| stem.to_str())
                        .is_some_and(|stem| exclude_stems.contains(stem));
                    if !known {
                        candidates.push(path);
                    }
                }
                Err(e) => {
                    tracing::warn!("Skipping during discovery: {}", e);
                    errors.push(e);
                }
            }
        }

        tracing::debug!(
            "Discovered {} new files ({} skipped entries)",
            candidates.len(),
            errors.len()
        );

        (candidates, errors)
    }
}
