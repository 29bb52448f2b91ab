/// Wiring from configuration to a ready catalog manager
use crate::config::CinedexConfig;
use crate::error::Result;
use cinedex_media::{Extractor, FfmpegRenderer, FfprobeProber, RecordBuilder, ThumbnailSettings};
use cinedex_sync::{CatalogManager, LibrarySettings};
use std::sync::Arc;

/// Open both databases, run migrations and build the manager
pub async fn open_manager(config: &CinedexConfig) -> Result<CatalogManager> {
    tokio::fs::create_dir_all(&config.storage.data_dir).await?;
    tokio::fs::create_dir_all(&config.storage.thumbnail_dir).await?;

    let catalog = cinedex_storage::create_pool(&config.catalog_database_url()).await?;
    cinedex_storage::run_migrations(&catalog).await?;

    let archive = cinedex_storage::create_pool(&config.archive_database_url()).await?;
    cinedex_storage::run_archive_migrations(&archive).await?;
    tracing::debug!("Databases ready in {}", config.storage.data_dir.display());

    let prober = FfprobeProber::new(&config.media.ffprobe_path);
    let renderer = FfmpegRenderer::new(
        &config.media.ffmpeg_path,
        ThumbnailSettings::new(&config.storage.thumbnail_dir, config.media.performance),
    );
    let builder = RecordBuilder::new(Arc::new(prober), Arc::new(renderer));
    let extractor = Extractor::new(builder, config.media.max_concurrency);

    let settings = LibrarySettings::new(
        config.library.roots.clone(),
        &config.library.extensions,
    );

    Ok(CatalogManager::new(catalog, archive, extractor, settings))
}
