/// Cinedex configuration
use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "cinedex.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CinedexConfig {
    #[serde(default)]
    pub library: LibraryConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibraryConfig {
    #[serde(default)]
    pub roots: Vec<PathBuf>,

    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Holds `catalog.db` and `archive.db`
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_thumbnail_dir")]
    pub thumbnail_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaConfig {
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,

    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Small WebP thumbnails instead of full-size PNG
    #[serde(default = "default_performance")]
    pub performance: bool,

    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl CinedexConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `cinedex.toml` is read when
    /// present. `CINEDEX_*` variables override both, with `__` between
    /// section and key (`CINEDEX_MEDIA__PERFORMANCE=false`). List values in
    /// the environment are comma separated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("CINEDEX")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("library.roots")
                .with_list_parse_key("library.extensions")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        Ok(config.normalized())
    }

    /// Expand `~` in every path and resolve roots that exist
    pub fn normalized(mut self) -> Self {
        self.library.roots = self
            .library
            .roots
            .into_iter()
            .map(|root| {
                let root = expand_home(&root);
                root.canonicalize().unwrap_or(root)
            })
            .collect();
        self.storage.data_dir = expand_home(&self.storage.data_dir);
        self.storage.thumbnail_dir = expand_home(&self.storage.thumbnail_dir);
        self.media.max_concurrency = self.media.max_concurrency.max(1);
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.library.roots.is_empty() {
            return Err(CliError::Config(
                "at least one library root is required (library.roots)".to_string(),
            ));
        }

        if self
            .library
            .extensions
            .iter()
            .all(|ext| ext.trim().trim_start_matches('.').is_empty())
        {
            return Err(CliError::Config(
                "at least one file extension is required (library.extensions)".to_string(),
            ));
        }

        for root in &self.library.roots {
            if !root.is_dir() {
                tracing::warn!("Library root {} is not a directory", root.display());
            }
        }

        Ok(())
    }

    pub fn catalog_database_url(&self) -> String {
        database_url(&self.storage.data_dir.join("catalog.db"))
    }

    pub fn archive_database_url(&self) -> String {
        database_url(&self.storage.data_dir.join("archive.db"))
    }
}

fn database_url(path: &Path) -> String {
    format!("sqlite://{}", path.display())
}

fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(rest),
        None => path.to_path_buf(),
    }
}

// Default values
fn default_extensions() -> Vec<String> {
    vec![".mp4".to_string()]
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_thumbnail_dir() -> PathBuf {
    PathBuf::from("./data/thumbnails")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_performance() -> bool {
    true
}

fn default_max_concurrency() -> usize {
    num_cpus::get().max(1)
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            extensions: default_extensions(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            thumbnail_dir: default_thumbnail_dir(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffprobe_path: default_ffprobe_path(),
            ffmpeg_path: default_ffmpeg_path(),
            performance: default_performance(),
            max_concurrency: default_max_concurrency(),
        }
    }
}
