use crate::differ::diff_catalog;
use crate::discoverer::FileDiscoverer;
use crate::error::Result;
use crate::types::{LibrarySettings, ReloadMode, ReloadPhase, ReloadProgress, ReloadSummary};
use crate::SyncError;
use cinedex_core::types::{ArchivedRecord, CatalogRecord, CreateArchivedRecord, RecordId, RecordUpdate};
use cinedex_media::{ExtractionProgress, Extractor};
use cinedex_storage::{archive, catalog};
use sqlx::SqlitePool;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, error, info, warn};

/// Owns every write to the catalog
///
/// Reloads, deletes and edits take the same writer lock, so at most one of
/// them touches the catalog at a time. Reads go straight to the pool and may
/// run alongside a reload.
pub struct CatalogManager {
    catalog: SqlitePool,
    archive: SqlitePool,
    extractor: Extractor,
    settings: Arc<LibrarySettings>,
    writer: Mutex<()>,
    phase: watch::Sender<ReloadPhase>,
    progress_tx: Option<mpsc::Sender<ReloadProgress>>,
}

impl CatalogManager {
    pub fn new(
        catalog: SqlitePool,
        archive: SqlitePool,
        extractor: Extractor,
        settings: LibrarySettings,
    ) -> Self {
        let (phase, _) = watch::channel(ReloadPhase::Idle);
        Self {
            catalog,
            archive,
            extractor,
            settings: Arc::new(settings),
            writer: Mutex::new(()),
            phase,
            progress_tx: None,
        }
    }

    /// Send progress events to `tx` during reloads
    ///
    /// Events are dropped rather than awaited when the channel is full.
    pub fn with_progress(mut self, tx: mpsc::Sender<ReloadProgress>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn settings(&self) -> &LibrarySettings {
        &self.settings
    }

    /// Current reload phase (`Idle` when no reload runs)
    pub fn status(&self) -> ReloadPhase {
        *self.phase.borrow()
    }

    /// Watch phase changes
    pub fn subscribe(&self) -> watch::Receiver<ReloadPhase> {
        self.phase.subscribe()
    }

    /// Reload trigger: `true` once the catalog is committed
    ///
    /// # Errors
    /// Persistence failures; nothing of this cycle is committed then
    pub async fn trigger_reload(&self, hard: bool) -> Result<bool> {
        self.reload(ReloadMode::from_hard(hard)).await.map(|_| true)
    }

    /// Reconcile the catalog with the library roots
    ///
    /// Per-file extraction failures end up in the summary and the file is
    /// retried on the next reload.
    pub async fn reload(&self, mode: ReloadMode) -> Result<ReloadSummary> {
        let _writer = self.writer.lock().await;
        let _idle = IdleOnDrop(&self.phase);
        info!("Starting {:?} reload", mode);

        let result = self.reload_impl(mode).await;
        self.set_phase(ReloadPhase::Idle, 0, 0);

        match &result {
            Ok(summary) => info!(
                "Reload complete: {} purged, {} discovered, {} added, {} failed in {}ms",
                summary.records_purged,
                summary.files_discovered,
                summary.records_added,
                summary.failures.len(),
                summary.duration_ms
            ),
            Err(e) => error!("Reload failed: {}", e),
        }

        result
    }

    async fn reload_impl(&self, mode: ReloadMode) -> Result<ReloadSummary> {
        let started_at = chrono::Utc::now();
        let start = Instant::now();

        // Phase 1: Diffing
        self.set_phase(ReloadPhase::Diffing, 0, 0);
        let records = catalog::get_all(&self.catalog).await?;
        let total_records = records.len();
        let settings = self.settings.clone();
        let diff =
            tokio::task::spawn_blocking(move || diff_catalog(records, mode, &settings)).await?;
        debug!(
            "Diff: {} of {} records stale, {} stems known",
            diff.stale.len(),
            total_records,
            diff.seen_stems.len()
        );

        // Phase 2: Purging
        self.set_phase(ReloadPhase::Purging, 0, diff.stale.len());
        let records_purged = match mode {
            ReloadMode::Hard => catalog::delete_all(&self.catalog).await? as usize,
            ReloadMode::Partial => {
                let ids: Vec<RecordId> = diff.stale.iter().map(|r| r.id.clone()).collect();
                catalog::delete_many(&self.catalog, &ids).await? as usize
            }
        };
        for record in &diff.stale {
            remove_file_logged(&record.thumbnail_path, "thumbnail").await;
        }

        // Phase 3: Discovering
        self.set_phase(ReloadPhase::Discovering, 0, 0);
        let discoverer =
            FileDiscoverer::new(self.settings.roots.clone(), self.settings.extensions.clone());
        let seen_stems = diff.seen_stems;
        let (candidates, discovery_errors) =
            tokio::task::spawn_blocking(move || discoverer.collect_candidates(&seen_stems))
                .await?;
        let files_discovered = candidates.len();

        // Phase 4: Extracting
        self.set_phase(ReloadPhase::Extracting, 0, files_discovered);
        let progress = self.extraction_progress(files_discovered);
        let report = self.extractor.extract(candidates, &progress).await;

        // Phase 5: Committing
        self.set_phase(ReloadPhase::Committing, report.records.len(), files_discovered);
        let records_added = catalog::insert_many(&self.catalog, &report.records).await?;

        let completed_at = chrono::Utc::now();
        Ok(ReloadSummary {
            mode,
            started_at: started_at.to_rfc3339(),
            completed_at: completed_at.to_rfc3339(),
            duration_ms: start.elapsed().as_millis() as u64,
            records_purged,
            files_discovered,
            records_added,
            failures: report
                .failures
                .iter()
                .map(|(path, e)| format!("{}: {}", path.display(), e))
                .collect(),
            discovery_errors: discovery_errors.len(),
        })
    }

    fn extraction_progress(&self, total: usize) -> ExtractionProgress {
        let Some(tx) = self.progress_tx.clone() else {
            return ExtractionProgress::default();
        };

        ExtractionProgress::with_callback(Arc::new(move |done| {
            let _ = tx.try_send(ReloadProgress {
                phase: ReloadPhase::Extracting,
                processed: done,
                total,
            });
        }))
    }

    fn set_phase(&self, phase: ReloadPhase, processed: usize, total: usize) {
        self.phase.send_replace(phase);
        if let Some(tx) = &self.progress_tx {
            let _ = tx.try_send(ReloadProgress {
                phase,
                processed,
                total,
            });
        }
    }

    /// Delete one record, archiving a snapshot first
    ///
    /// The media file and thumbnail are removed best-effort; a file that is
    /// already gone does not stop the delete. Returns the removed record.
    pub async fn delete_record(&self, id: &RecordId) -> Result<CatalogRecord> {
        let _writer = self.writer.lock().await;

        let record = catalog::get_by_id(&self.catalog, id)
            .await?
            .ok_or_else(|| SyncError::NotFound(id.clone()))?;

        let snapshot = CreateArchivedRecord::from_record(&record)?;
        let archived = archive::append(&self.archive, snapshot).await?;
        catalog::delete(&self.catalog, id).await?;

        remove_file_logged(&record.media_path, "media file").await;
        remove_file_logged(&record.thumbnail_path, "thumbnail").await;

        info!(
            "Deleted record {} ({}), archive entry {}",
            record.id, record.title, archived.archive_id
        );

        Ok(record)
    }

    /// Apply an edit, keeping the previous values in the audit log
    ///
    /// An update that changes nothing writes nothing.
    pub async fn update_record(&self, id: &RecordId, update: &RecordUpdate) -> Result<CatalogRecord> {
        let _writer = self.writer.lock().await;

        let mut record = catalog::get_by_id(&self.catalog, id)
            .await?
            .ok_or_else(|| SyncError::NotFound(id.clone()))?;

        if record.apply_update(update, chrono::Utc::now()) {
            catalog::update(&self.catalog, &record).await?;
            debug!("Updated record {}", record.id);
        }

        Ok(record)
    }

    pub async fn list_records(&self) -> Result<Vec<CatalogRecord>> {
        Ok(catalog::get_all(&self.catalog).await?)
    }

    pub async fn get_record(&self, id: &RecordId) -> Result<CatalogRecord> {
        catalog::get_by_id(&self.catalog, id)
            .await?
            .ok_or_else(|| SyncError::NotFound(id.clone()))
    }

    /// Archived snapshots, optionally only those of one record id
    pub async fn archived_records(&self, id: Option<&RecordId>) -> Result<Vec<ArchivedRecord>> {
        let records = match id {
            Some(id) => archive::get_by_record_id(&self.archive, id).await?,
            None => archive::get_all(&self.archive).await?,
        };
        Ok(records)
    }
}

/// Puts the phase back to `Idle` even when a reload future is dropped midway
struct IdleOnDrop<'a>(&'a watch::Sender<ReloadPhase>);

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        self.0.send_replace(ReloadPhase::Idle);
    }
}

async fn remove_file_logged(path: &Path, what: &str) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed {} {}", what, path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("{} {} already gone", what, path.display());
        }
        Err(e) => warn!("Failed to remove {} {}: {}", what, path.display(), e),
    }
}
