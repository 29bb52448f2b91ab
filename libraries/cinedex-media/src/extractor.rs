//! Concurrency-bounded extraction
//!
//! Runs the `RecordBuilder` over a batch of candidate files with at most
//! `max_concurrency` builds in flight. A failing file is logged and left out
//! of the result; it never aborts the batch.

use crate::builder::RecordBuilder;
use cinedex_core::types::CatalogRecord;
use cinedex_core::CinedexError;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{AbortHandle, JoinSet};

/// Callback fired after each file finishes, with the number of files done so far
pub type ProgressCallback = Arc<dyn Fn(usize) + Send + Sync>;

/// Shared progress counters for one extraction batch
#[derive(Clone, Default)]
pub struct ExtractionProgress {
    completed: Arc<AtomicUsize>,
    failed: Arc<AtomicUsize>,
    callback: Option<ProgressCallback>,
}

impl ExtractionProgress {
    pub fn with_callback(callback: ProgressCallback) -> Self {
        Self {
            callback: Some(callback),
            ..Self::default()
        }
    }

    /// Files finished so far, successful or not
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    fn record(&self, success: bool) {
        if !success {
            self.failed.fetch_add(1, Ordering::SeqCst);
        }
        let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(callback) = &self.callback {
            callback(done);
        }
    }
}

impl std::fmt::Debug for ExtractionProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionProgress")
            .field("completed", &self.completed())
            .field("failed", &self.failed())
            .finish_non_exhaustive()
    }
}

/// Outcome of one extraction batch
#[derive(Debug, Default)]
pub struct ExtractionReport {
    /// Successfully built records, in completion order
    pub records: Vec<CatalogRecord>,

    /// Files that failed, with the reason
    pub failures: Vec<(PathBuf, CinedexError)>,
}

/// Bounded-concurrency driver for `RecordBuilder`
#[derive(Debug, Clone)]
pub struct Extractor {
    builder: Arc<RecordBuilder>,
    max_concurrency: usize,
}

impl Extractor {
    /// `max_concurrency` is clamped to at least 1
    pub fn new(builder: RecordBuilder, max_concurrency: usize) -> Self {
        Self {
            builder: Arc::new(builder),
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Bound the batch by the number of CPUs
    pub fn with_default_concurrency(builder: RecordBuilder) -> Self {
        Self::new(builder, num_cpus::get())
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Build records for every candidate
    ///
    /// Each permit covers a whole build (probe and render), so no more than
    /// `max_concurrency` external tool invocations ever run at once.
    pub async fn extract(
        &self,
        candidates: Vec<PathBuf>,
        progress: &ExtractionProgress,
    ) -> ExtractionReport {
        let total = candidates.len();
        tracing::info!(
            "Extracting {} files (max {} concurrent)",
            total,
            self.max_concurrency
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();
        let mut report = ExtractionReport::default();

        for path in candidates {
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                break;
            };
            let builder = self.builder.clone();
            let progress = progress.clone();

            tasks.spawn(async move {
                let result = build_isolated(builder, path.clone()).await;
                drop(permit);
                progress.record(result.is_ok());
                (path, result)
            });

            // Drain finished builds while scheduling so results don't pile up
            while let Some(joined) = tasks.try_join_next() {
                collect(joined, &mut report);
            }
        }

        while let Some(joined) = tasks.join_next().await {
            collect(joined, &mut report);
        }

        tracing::info!(
            "Extraction finished: {} records, {} failures",
            report.records.len(),
            report.failures.len()
        );

        report
    }
}

/// Run one build on its own task so a panic becomes a failure for that path
async fn build_isolated(
    builder: Arc<RecordBuilder>,
    path: PathBuf,
) -> cinedex_core::Result<CatalogRecord> {
    let handle = tokio::spawn(async move { builder.build(&path).await });
    let _abort = AbortOnDrop(handle.abort_handle());

    match handle.await {
        Ok(result) => result,
        Err(e) => Err(CinedexError::Other(format!("extraction task failed: {e}"))),
    }
}

/// Aborts the inner build when the batch itself is dropped
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn collect(
    joined: std::result::Result<(PathBuf, cinedex_core::Result<CatalogRecord>), tokio::task::JoinError>,
    report: &mut ExtractionReport,
) {
    match joined {
        Ok((_, Ok(record))) => report.records.push(record),
        Ok((path, Err(e))) => {
            tracing::warn!("Skipping {}: {}", path.display(), e);
            report.failures.push((path, e));
        }
        Err(e) => {
            tracing::error!("Extraction task failed: {}", e);
        }
    }
}
