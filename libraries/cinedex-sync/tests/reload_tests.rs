
use cinedex_sync::{ReloadMode, ReloadPhase};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use test_helpers::*;

fn sorted(mut records: Vec<cinedex_core::types::CatalogRecord>) -> Vec<cinedex_core::types::CatalogRecord> {
    records.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
    records
}

#[tokio::test]
async fn test_initial_partial_reload_builds_catalog() {
    let library = Library::new().await;
    library.add_file("a.mp4");
    library.add_file("nested/b.MP4");
    library.add_file("notes.txt");
    let manager = library.manager();

    let summary = manager.reload(ReloadMode::Partial).await.unwrap();

    assert_eq!(summary.files_discovered, 2);
    assert_eq!(summary.records_added, 2);
    assert_eq!(summary.records_purged, 0);
    assert!(summary.failures.is_empty());

    let records = manager.list_records().await.unwrap();
    let mut titles: Vec<_> = records.iter().map(|r| r.title.as_str()).collect();
    titles.sort_unstable();
    assert_eq!(titles, vec!["a", "b"]);
    assert_eq!(library.thumbnail_count(), 2);
}

#[tokio::test]
async fn test_partial_reload_is_idempotent() {
    let library = Library::new().await;
    library.add_file("one.mp4");
    library.add_file("two.mp4");
    library.add_file("three.mp4");
    let manager = library.manager();

    manager.reload(ReloadMode::Partial).await.unwrap();
    let first = sorted(manager.list_records().await.unwrap());

    let summary = manager.reload(ReloadMode::Partial).await.unwrap();
    let second = sorted(manager.list_records().await.unwrap());

    assert_eq!(summary.files_discovered, 0);
    assert_eq!(summary.records_purged, 0);
    assert_eq!(first, second);
    assert_eq!(library.prober.calls.load(Ordering::SeqCst), 3);
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_non_utf8_directory_does_not_churn_catalog() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let library = Library::new().await;
    library.add_file("plain.mp4");
    let odd_dir = library.root.path().join(OsStr::from_bytes(b"caf\xe9"));
    std::fs::create_dir(&odd_dir).unwrap();
    std::fs::write(odd_dir.join("clip.mp4"), b"video bytes").unwrap();
    let manager = library.manager();

    let first = manager.reload(ReloadMode::Partial).await.unwrap();
    let before = sorted(manager.list_records().await.unwrap());

    assert_eq!(first.files_discovered, 1);
    assert_eq!(first.discovery_errors, 1);
    assert_eq!(before.len(), 1);
    assert_eq!(library.thumbnail_count(), 1);

    let second = manager.reload(ReloadMode::Partial).await.unwrap();
    let after = sorted(manager.list_records().await.unwrap());

    assert_eq!(second.files_discovered, 0);
    assert_eq!(second.records_purged, 0);
    assert_eq!(before, after);
    assert_eq!(library.thumbnail_count(), 1);
}

#[tokio::test]
async fn test_abandoned_reload_returns_to_idle() {
    let library = Library::new().await;
    library.add_file("stuck.mp4");
    library.prober.stall_on("stuck");
    let manager = library.manager();

    let outcome = tokio::time::timeout(
        std::time::Duration::from_millis(200),
        manager.reload(ReloadMode::Partial),
    )
    .await;

    assert!(outcome.is_err());
    assert_eq!(manager.status(), ReloadPhase::Idle);

    library.prober.heal("stuck");
    let summary = manager.reload(ReloadMode::Partial).await.unwrap();
    assert_eq!(summary.records_added, 1);
    assert_eq!(manager.status(), ReloadPhase::Idle);
}

#[tokio::test]
async fn test_deleted_file_is_purged_and_stays_gone() {
    let library = Library::new().await;
    library.add_file("keep.mp4");
    let doomed = library.add_file("doomed.mp4");
    let manager = library.manager();
    manager.reload(ReloadMode::Partial).await.unwrap();

    let doomed_thumb = manager
        .list_records()
        .await
        .unwrap()
        .into_iter()
        .find(|r| r.title == "doomed")
        .unwrap()
        .thumbnail_path;
    std::fs::remove_file(&doomed).unwrap();

    let summary = manager.reload(ReloadMode::Partial).await.unwrap();
    assert_eq!(summary.records_purged, 1);
    assert!(!doomed_thumb.exists());

    manager.reload(ReloadMode::Partial).await.unwrap();
    let titles: Vec<_> = manager
        .list_records()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.title)
        .collect();
    assert_eq!(titles, vec!["keep"]);
}

#[tokio::test]
async fn test_record_outside_roots_is_purged() {
    let library = Library::new().await;
    let second_root = tempfile::tempdir().unwrap();
    library.add_file("inside.mp4");
    std::fs::write(second_root.path().join("elsewhere.mp4"), b"video").unwrap();

    let both = library.manager_with_roots(vec![
        library.root.path().to_path_buf(),
        second_root.path().to_path_buf(),
    ]);
    both.reload(ReloadMode::Partial).await.unwrap();
    assert_eq!(both.list_records().await.unwrap().len(), 2);

    // Same catalog, but the second root is no longer configured
    let narrowed = library.manager();
    let summary = narrowed.reload(ReloadMode::Partial).await.unwrap();

    assert_eq!(summary.records_purged, 1);
    assert!(second_root.path().join("elsewhere.mp4").exists());
    let records = narrowed.list_records().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "inside");
}

#[tokio::test]
async fn test_failed_file_is_retried_next_reload() {
    let library = Library::new().await;
    library.add_file("good.mp4");
    library.add_file("flaky.mp4");
    library.prober.fail_on("flaky");
    let manager = library.manager();

    let summary = manager.reload(ReloadMode::Partial).await.unwrap();
    assert_eq!(summary.records_added, 1);
    assert_eq!(summary.failures.len(), 1);
    assert!(summary.failures[0].contains("flaky.mp4"));

    library.prober.heal("flaky");
    let summary = manager.reload(ReloadMode::Partial).await.unwrap();

    assert_eq!(summary.files_discovered, 1);
    assert_eq!(summary.records_added, 1);
    assert_eq!(manager.list_records().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_hard_reload_rebuilds_from_scratch() {
    let library = Library::new().await;
    for name in ["a", "b", "c", "d", "e"] {
        library.add_file(&format!("{name}.mp4"));
    }
    let manager = library.manager();
    manager.reload(ReloadMode::Partial).await.unwrap();

    let before = manager.list_records().await.unwrap();
    assert_eq!(before.len(), 5);
    assert!(before.iter().all(|r| r.thumbnail_path.exists()));

    // One file disappears before the rebuild
    std::fs::remove_file(library.root.path().join("e.mp4")).unwrap();

    let summary = manager.reload(ReloadMode::Hard).await.unwrap();

    assert_eq!(summary.records_purged, 5);
    assert_eq!(summary.records_added, 4);
    assert!(before.iter().all(|r| !r.thumbnail_path.exists()));

    let after = manager.list_records().await.unwrap();
    assert_eq!(after.len(), 4);
    assert!(after.iter().all(|r| before.iter().all(|b| b.id != r.id)));
    assert_eq!(library.thumbnail_count(), 4);
}

#[tokio::test]
async fn test_trigger_reload_reports_success() {
    let library = Library::new().await;
    library.add_file("a.mp4");
    let manager = library.manager();

    assert!(manager.trigger_reload(false).await.unwrap());
    assert!(manager.trigger_reload(true).await.unwrap());
    assert_eq!(manager.list_records().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_commit_failure_is_surfaced() {
    let library = Library::new().await;
    library.add_file("a.mp4");
    let manager = library.manager();

    library.db.catalog.close().await;

    assert!(manager.reload(ReloadMode::Partial).await.is_err());
    assert_eq!(manager.status(), ReloadPhase::Idle);
}

#[tokio::test]
async fn test_progress_events_and_status() {
    let library = Library::new().await;
    library.add_file("a.mp4");
    library.add_file("b.mp4");
    let (tx, mut rx) = tokio::sync::mpsc::channel(64);
    let manager = library.manager().with_progress(tx);

    manager.reload(ReloadMode::Partial).await.unwrap();
    drop(manager);

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    let phases: Vec<_> = events.iter().map(|e| e.phase).collect();
    assert_eq!(phases.first(), Some(&ReloadPhase::Diffing));
    assert_eq!(phases.last(), Some(&ReloadPhase::Idle));
    assert!(phases.contains(&ReloadPhase::Committing));
    assert!(events
        .iter()
        .any(|e| e.phase == ReloadPhase::Extracting && e.processed == 2 && e.total == 2));
}

#[tokio::test]
async fn test_concurrent_reloads_do_not_duplicate() {
    let library = Library::new().await;
    for i in 0..6 {
        library.add_file(&format!("clip-{i}.mp4"));
    }
    let manager = Arc::new(library.manager());

    let first = tokio::spawn({
        let manager = manager.clone();
        async move { manager.reload(ReloadMode::Partial).await }
    });
    let second = tokio::spawn({
        let manager = manager.clone();
        async move { manager.reload(ReloadMode::Partial).await }
    });

    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    assert_eq!(manager.list_records().await.unwrap().len(), 6);
    assert_eq!(manager.status(), ReloadPhase::Idle);
}
