/// Cinedex - media library catalog
use anyhow::Context;
use cinedex_cli::{config::CinedexConfig, state::open_manager};
use cinedex_core::types::{format_duration, RecordId, RecordUpdate, RecordView};
use cinedex_sync::{CatalogManager, ReloadMode, ReloadPhase, ReloadProgress};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cinedex")]
#[command(about = "Keep a media library catalog in sync with the disk", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "CINEDEX_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile the catalog with the library roots
    Reload {
        /// Drop every record and thumbnail and rebuild from scratch
        #[arg(long)]
        hard: bool,
    },
    /// List catalog records
    List {
        /// Include probe metadata
        #[arg(long)]
        extras: bool,
    },
    /// Show one record as JSON
    Show {
        /// Record id
        id: String,
    },
    /// Change a record's title
    Rename {
        /// Record id
        id: String,
        /// New title
        title: String,
    },
    /// Delete a record and its files, keeping an archive snapshot
    Delete {
        /// Record id
        id: String,
    },
    /// List archived (deleted) records
    Archived {
        /// Only snapshots of this record id
        #[arg(long)]
        id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinedex=info,cinedex_sync=info,cinedex_media=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = CinedexConfig::load(cli.config.as_deref()).context("loading configuration")?;
    config.validate()?;

    let manager = open_manager(&config).await?;

    match cli.command {
        Commands::Reload { hard } => reload(manager, ReloadMode::from_hard(hard)).await?,
        Commands::List { extras } => list(&manager, extras).await?,
        Commands::Show { id } => show(&manager, &RecordId::new(id)).await?,
        Commands::Rename { id, title } => rename(&manager, &RecordId::new(id), title).await?,
        Commands::Delete { id } => delete(&manager, &RecordId::new(id)).await?,
        Commands::Archived { id } => archived(&manager, id.map(RecordId::new)).await?,
    }

    Ok(())
}

async fn reload(manager: CatalogManager, mode: ReloadMode) -> anyhow::Result<()> {
    let (tx, rx) = mpsc::channel(256);
    let manager = manager.with_progress(tx);

    let progress_bar = ProgressBar::new(0);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("invalid progress bar template")?
            .progress_chars("#>-"),
    );
    let bar_task = tokio::spawn(drive_progress_bar(progress_bar.clone(), rx));

    let outcome = tokio::select! {
        result = manager.reload(mode) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    // Closes the progress channel so the bar task finishes
    drop(manager);
    let _ = bar_task.await;

    let Some(result) = outcome else {
        progress_bar.abandon_with_message("cancelled");
        tracing::warn!("Reload cancelled; records committed before this run are intact");
        return Ok(());
    };

    let summary = result?;
    progress_bar.finish_with_message("done");

    println!(
        "{:?} reload: {} purged, {} discovered, {} added, {} failed ({} ms)",
        summary.mode,
        summary.records_purged,
        summary.files_discovered,
        summary.records_added,
        summary.failures.len(),
        summary.duration_ms
    );
    for failure in &summary.failures {
        println!("  skipped {failure}");
    }

    Ok(())
}

async fn drive_progress_bar(bar: ProgressBar, mut rx: mpsc::Receiver<ReloadProgress>) {
    while let Some(event) = rx.recv().await {
        match event.phase {
            ReloadPhase::Extracting => {
                bar.set_length(event.total as u64);
                bar.set_position(event.processed as u64);
                bar.set_message("extracting");
            }
            ReloadPhase::Idle => {}
            phase => bar.set_message(format!("{phase:?}").to_lowercase()),
        }
    }
}

async fn list(manager: &CatalogManager, extras: bool) -> anyhow::Result<()> {
    let records = manager.list_records().await?;

    if extras {
        let views: Vec<_> = records
            .iter()
            .map(|r| RecordView::from_record(r, true))
            .collect();
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    for record in &records {
        let marker = if record.media_exists() { " " } else { "!" };
        println!(
            "{}{}  {:>6}  {:>10}  {}",
            marker,
            record.id,
            format_duration(record.duration_seconds as f64),
            record.file_size_bytes,
            record.title
        );
    }
    println!("{} records", records.len());

    Ok(())
}

async fn show(manager: &CatalogManager, id: &RecordId) -> anyhow::Result<()> {
    let record = manager.get_record(id).await?;
    let view = RecordView::from_record(&record, true);
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

async fn rename(manager: &CatalogManager, id: &RecordId, title: String) -> anyhow::Result<()> {
    let update = RecordUpdate { title: Some(title) };
    let record = manager.update_record(id, &update).await?;
    println!("{} is now titled {:?}", record.id, record.title);
    Ok(())
}

async fn delete(manager: &CatalogManager, id: &RecordId) -> anyhow::Result<()> {
    let record = manager.delete_record(id).await?;
    println!(
        "Deleted {:?} ({}), snapshot archived",
        record.title,
        record.media_path.display()
    );
    Ok(())
}

async fn archived(manager: &CatalogManager, id: Option<RecordId>) -> anyhow::Result<()> {
    let records = manager.archived_records(id.as_ref()).await?;

    for entry in &records {
        let archived_at = chrono::DateTime::from_timestamp(entry.archived_at, 0)
            .map(|at| at.to_rfc3339())
            .unwrap_or_default();
        println!(
            "{}  {}  {}  {}",
            archived_at,
            entry.id,
            format_duration(entry.duration_seconds as f64),
            entry.title
        );
    }
    println!("{} archived records", records.len());

    Ok(())
}
