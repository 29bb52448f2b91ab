
use cinedex_core::types::StreamSelector;
use cinedex_core::CinedexError;
use cinedex_media::{ExtractionProgress, Extractor, RecordBuilder};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use test_helpers::*;
use tokio::sync::Semaphore;

#[tokio::test]
async fn test_build_produces_complete_record() {
    init_tracing();
    let media_dir = tempfile::tempdir().unwrap();
    let thumb_dir = tempfile::tempdir().unwrap();
    let path = touch(media_dir.path(), "Holiday Trip.mp4");

    let renderer = Arc::new(FakeRenderer::new(thumb_dir.path(), false));
    let builder = RecordBuilder::new(Arc::new(FakeProber::default()), renderer.clone());

    let record = builder.build(&path).await.unwrap();

    assert_eq!(record.title, "Holiday Trip");
    assert_eq!(record.media_path, path.canonicalize().unwrap());
    assert!(record.thumbnail_path.is_absolute());
    assert!(record.thumbnail_path.exists());
    assert_eq!(record.duration_seconds, 120);
    assert_eq!(record.file_size_bytes, 18);
    assert!(record.modified_time_unix > 0.0);
    assert!(record.extras.contains_key("format"));
    assert!(record.extras.contains_key("streams"));
    assert_eq!(
        *renderer.last_selector.lock().unwrap(),
        Some(StreamSelector::Seek)
    );
}

#[tokio::test]
async fn test_identifier_is_stable_across_extractions() {
    let media_dir = tempfile::tempdir().unwrap();
    let thumb_dir = tempfile::tempdir().unwrap();
    let path = touch(media_dir.path(), "clip.mp4");

    let builder = RecordBuilder::new(
        Arc::new(FakeProber::default()),
        Arc::new(FakeRenderer::new(thumb_dir.path(), true)),
    );

    let first = builder.build(&path).await.unwrap();
    let second = builder.build(&path).await.unwrap();

    assert_eq!(first.thumbnail_path, second.thumbnail_path);
    assert_eq!(first.id, second.id);
}

#[tokio::test]
async fn test_distinct_thumbnails_give_distinct_identifiers() {
    let media_dir = tempfile::tempdir().unwrap();
    let thumb_dir = tempfile::tempdir().unwrap();
    let path = touch(media_dir.path(), "clip.mp4");

    let builder = RecordBuilder::new(
        Arc::new(FakeProber::default()),
        Arc::new(FakeRenderer::new(thumb_dir.path(), false)),
    );

    let first = builder.build(&path).await.unwrap();
    let second = builder.build(&path).await.unwrap();

    assert_ne!(first.id, second.id);
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlinked_file_keeps_its_link_path() {
    let elsewhere = tempfile::tempdir().unwrap();
    let media_dir = tempfile::tempdir().unwrap();
    let thumb_dir = tempfile::tempdir().unwrap();
    let target = touch(elsewhere.path(), "original.mp4");
    let link = media_dir.path().join("linked.mp4");
    std::os::unix::fs::symlink(&target, &link).unwrap();

    let builder = RecordBuilder::new(
        Arc::new(FakeProber::default()),
        Arc::new(FakeRenderer::new(thumb_dir.path(), false)),
    );

    let record = builder.build(&link).await.unwrap();

    assert_eq!(
        record.media_path,
        media_dir.path().canonicalize().unwrap().join("linked.mp4")
    );
    assert!(record.media_path.is_symlink());
    assert_eq!(record.title, "linked");
    assert_eq!(record.file_size_bytes, 18);
}

#[tokio::test]
async fn test_probe_failure_skips_render() {
    let media_dir = tempfile::tempdir().unwrap();
    let thumb_dir = tempfile::tempdir().unwrap();
    let path = touch(media_dir.path(), "broken.mp4");

    let renderer = Arc::new(FakeRenderer::new(thumb_dir.path(), false));
    let builder = RecordBuilder::new(Arc::new(FakeProber::default()), renderer.clone());

    let err = builder.build(&path).await.unwrap_err();

    assert!(matches!(err, cinedex_core::CinedexError::ProbeFailed { .. }));
    assert_eq!(renderer.renders.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_failures_are_isolated() {
    init_tracing();
    let media_dir = tempfile::tempdir().unwrap();
    let thumb_dir = tempfile::tempdir().unwrap();

    let candidates = vec![
        touch(media_dir.path(), "a.mp4"),
        touch(media_dir.path(), "broken-1.mp4"),
        touch(media_dir.path(), "b.mp4"),
        touch(media_dir.path(), "broken-2.mp4"),
        touch(media_dir.path(), "c.mp4"),
    ];

    let builder = RecordBuilder::new(
        Arc::new(FakeProber::default()),
        Arc::new(FakeRenderer::new(thumb_dir.path(), false)),
    );
    let extractor = Extractor::new(builder, 2);

    let callbacks = Arc::new(AtomicUsize::new(0));
    let seen = callbacks.clone();
    let progress = ExtractionProgress::with_callback(Arc::new(move |_done| {
        seen.fetch_add(1, Ordering::SeqCst);
    }));

    let report = extractor.extract(candidates, &progress).await;

    let mut titles: Vec<_> = report.records.iter().map(|r| r.title.clone()).collect();
    titles.sort();
    assert_eq!(titles, vec!["a", "b", "c"]);
    assert_eq!(report.failures.len(), 2);
    assert!(report
        .failures
        .iter()
        .all(|(path, _)| path.to_string_lossy().contains("broken")));

    assert_eq!(progress.completed(), 5);
    assert_eq!(progress.failed(), 2);
    assert_eq!(callbacks.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_embedded_cover_is_rendered_from_its_stream() {
    let media_dir = tempfile::tempdir().unwrap();
    let thumb_dir = tempfile::tempdir().unwrap();
    let path = touch(media_dir.path(), "album-cover.mp4");

    let renderer = Arc::new(FakeRenderer::new(thumb_dir.path(), false));
    let builder = RecordBuilder::new(Arc::new(FakeProber::default()), renderer.clone());

    let record = builder.build(&path).await.unwrap();

    assert_eq!(
        *renderer.last_selector.lock().unwrap(),
        Some(StreamSelector::Stream(1))
    );
    assert_eq!(record.duration_seconds, 120);
}

#[tokio::test]
async fn test_thumbnail_removed_when_file_disappears_after_render() {
    let media_dir = tempfile::tempdir().unwrap();
    let thumb_dir = tempfile::tempdir().unwrap();
    let path = touch(media_dir.path(), "vanish.mp4");

    let renderer = Arc::new(FakeRenderer::new(thumb_dir.path(), false));
    let builder = RecordBuilder::new(Arc::new(FakeProber::default()), renderer.clone());

    let err = builder.build(&path).await.unwrap_err();

    assert!(matches!(err, CinedexError::Io(_)));
    assert_eq!(renderer.renders.load(Ordering::SeqCst), 1);
    assert_eq!(std::fs::read_dir(thumb_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_render_failures_are_isolated() {
    let media_dir = tempfile::tempdir().unwrap();
    let thumb_dir = tempfile::tempdir().unwrap();

    let candidates = vec![
        touch(media_dir.path(), "first.mp4"),
        touch(media_dir.path(), "norender.mp4"),
        touch(media_dir.path(), "second.mp4"),
    ];

    let builder = RecordBuilder::new(
        Arc::new(FakeProber::default()),
        Arc::new(FakeRenderer::new(thumb_dir.path(), false)),
    );
    let progress = ExtractionProgress::default();

    let report = Extractor::new(builder, 2).extract(candidates, &progress).await;

    let mut titles: Vec<_> = report.records.iter().map(|r| r.title.clone()).collect();
    titles.sort();
    assert_eq!(titles, vec!["first", "second"]);
    assert_eq!(report.failures.len(), 1);
    let (path, err) = &report.failures[0];
    assert!(path.ends_with("norender.mp4"));
    assert!(matches!(err, CinedexError::ThumbnailFailed { .. }));
    assert_eq!(progress.completed(), 3);
    assert_eq!(progress.failed(), 1);
}

#[tokio::test]
async fn test_panicking_build_is_reported_against_its_path() {
    init_tracing();
    let media_dir = tempfile::tempdir().unwrap();
    let thumb_dir = tempfile::tempdir().unwrap();
    let fine = touch(media_dir.path(), "fine.mp4");
    let explode = touch(media_dir.path(), "explode.mp4");

    let builder = RecordBuilder::new(
        Arc::new(FakeProber::default()),
        Arc::new(FakeRenderer::new(thumb_dir.path(), false)),
    );
    let progress = ExtractionProgress::default();

    let report = Extractor::new(builder, 2)
        .extract(vec![fine, explode.clone()], &progress)
        .await;

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].title, "fine");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, explode);
    assert_eq!(progress.completed(), 2);
    assert_eq!(progress.failed(), 1);
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_non_utf8_file_name_is_rejected_before_rendering() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let media_dir = tempfile::tempdir().unwrap();
    let thumb_dir = tempfile::tempdir().unwrap();
    let path = media_dir.path().join(OsStr::from_bytes(b"n\xf6te.mp4"));
    std::fs::write(&path, b"video bytes").unwrap();

    let prober = Arc::new(FakeProber::default());
    let renderer = Arc::new(FakeRenderer::new(thumb_dir.path(), false));
    let builder = RecordBuilder::new(prober.clone(), renderer.clone());

    let err = builder.build(&path).await.unwrap_err();

    assert!(matches!(err, CinedexError::InvalidInput(_)));
    assert_eq!(prober.calls.load(Ordering::SeqCst), 0);
    assert_eq!(renderer.renders.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_candidate_is_a_failure_not_a_panic() {
    let media_dir = tempfile::tempdir().unwrap();
    let thumb_dir = tempfile::tempdir().unwrap();

    let builder = RecordBuilder::new(
        Arc::new(FakeProber::default()),
        Arc::new(FakeRenderer::new(thumb_dir.path(), false)),
    );
    let extractor = Extractor::new(builder, 4);

    let report = extractor
        .extract(
            vec![
                media_dir.path().join("gone.mp4"),
                touch(media_dir.path(), "here.mp4"),
            ],
            &ExtractionProgress::default(),
        )
        .await;

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.failures.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrency_bound_is_respected() {
    init_tracing();
    let media_dir = tempfile::tempdir().unwrap();
    let thumb_dir = tempfile::tempdir().unwrap();

    let candidates: Vec<_> = (0..10)
        .map(|i| touch(media_dir.path(), &format!("clip-{i}.mp4")))
        .collect();

    let gate = Arc::new(Semaphore::new(0));
    let prober = Arc::new(FakeProber::gated(gate.clone()));
    let builder = RecordBuilder::new(
        prober.clone(),
        Arc::new(FakeRenderer::new(thumb_dir.path(), false)),
    );
    let extractor = Extractor::new(builder, 2);

    let handle = tokio::spawn(async move {
        extractor
            .extract(candidates, &ExtractionProgress::default())
            .await
    });

    // Wait for the first two builds to block on the gate
    for _ in 0..200 {
        if prober.in_flight.load(Ordering::SeqCst) == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(prober.in_flight.load(Ordering::SeqCst), 2);

    // Release one at a time
    for _ in 0..10 {
        gate.add_permits(1);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(prober.in_flight.load(Ordering::SeqCst) <= 2);
    }

    let report = handle.await.unwrap();

    assert_eq!(report.records.len(), 10);
    assert_eq!(prober.calls.load(Ordering::SeqCst), 10);
    assert_eq!(prober.max_in_flight.load(Ordering::SeqCst), 2);
}

#[test]
fn test_concurrency_is_at_least_one() {
    let builder = RecordBuilder::new(
        Arc::new(FakeProber::default()),
        Arc::new(FakeRenderer::new("/tmp", false)),
    );
    assert_eq!(Extractor::new(builder.clone(), 0).max_concurrency(), 1);
    assert!(Extractor::with_default_concurrency(builder).max_concurrency() >= 1);
}
