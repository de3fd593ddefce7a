//! Memory Book - attach photos and a video to a memory from the command line.
//!
//! Runs files through the ingestion pipeline with FFmpeg as the playback
//! backend and prints the resulting memory as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use async_trait::async_trait;
use clap::Parser;

use mb_core::config::{ConfigManager, Settings};
use mb_core::logging::{init_tracing, init_tracing_with_file, LogLevel};
use mb_core::models::{MediaCandidate, MediaKind, MemoryDraft, TrimWindow};
use mb_core::orchestrator::{
    FfmpegRecorderFactory, IngestContext, IngestionOrchestrator, StartAt, TrimPrompt,
};
use mb_core::probe::FfprobeDurationProbe;

/// Memory Book - build a memory from local media files.
#[derive(Parser, Debug)]
#[command(name = "memory-book", version = mb_core::version())]
#[command(about = "Validate, encode and trim media for a Memory Book memory", long_about = None)]
struct Args {
    /// Config file (created with defaults if missing).
    #[arg(long, env = "MEMORY_BOOK_CONFIG")]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset; overrides the config.
    #[arg(long)]
    log_level: Option<LogLevel>,

    /// Memory title.
    #[arg(long)]
    title: String,

    /// Memory description.
    #[arg(long, default_value = "")]
    description: String,

    /// Date of the memory, YYYY-MM-DD.
    #[arg(long)]
    date: String,

    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    #[arg(long, allow_hyphen_values = true)]
    lng: f64,

    /// Marker color (defaults to one picked from the title).
    #[arg(long)]
    color: Option<String>,

    /// Photos to attach.
    #[arg(long = "photo")]
    photos: Vec<PathBuf>,

    /// Video to attach; trimmed when over the clip limit.
    #[arg(long)]
    video: Option<PathBuf>,

    /// Start of the trim window in seconds; overrides the config.
    #[arg(long)]
    trim_start: Option<f64>,
}

/// Refuses every trim, so over-length videos are rejected.
struct DeclineTrim;

#[async_trait]
impl TrimPrompt for DeclineTrim {
    async fn confirm(&self, _: &str, _: f64, _: TrimWindow) -> Option<TrimWindow> {
        None
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };
    let mut config = ConfigManager::new(&config_path);
    config
        .load_or_create()
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    let settings = config.settings().clone();
    let level = args.log_level.unwrap_or(settings.logging.level);
    let _log_guard = if settings.logging.log_to_file {
        Some(init_tracing_with_file(level, config.logs_folder())?)
    } else {
        init_tracing(level);
        None
    };
    tracing::debug!("Using config {}", config_path.display());

    let orchestrator = build_orchestrator(&settings, args.trim_start);
    let ctx = IngestContext::default().with_progress_callback(Box::new(
        |name: &str, done: usize, total: usize| {
            tracing::info!("[{}/{}] {}", done, total, name);
        },
    ));

    if !args.photos.is_empty() {
        let photos = load_candidates(&args.photos).await?;
        let report = orchestrator.ingest(photos, MediaKind::Photo, &ctx).await;
        if let Some(message) = report.error {
            eprintln!("photos: {}", message);
        }
    }

    if let Some(path) = &args.video {
        let video = load_candidates(std::slice::from_ref(path)).await?;
        let report = orchestrator.ingest(video, MediaKind::Video, &ctx).await;
        if let Some(message) = report.error {
            eprintln!("video: {}", message);
        }
    }

    let draft = MemoryDraft {
        title: args.title,
        description: args.description,
        date: args.date,
        lat: Some(args.lat),
        lng: Some(args.lng),
        music: None,
        color: args.color,
    };
    let payload = draft.into_payload(&ctx.media.snapshot())?;
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn default_config_path() -> anyhow::Result<PathBuf> {
    let base = dirs::config_dir().context("no config directory on this platform")?;
    Ok(base.join("memory-book").join("settings.toml"))
}

fn build_orchestrator(settings: &Settings, trim_start: Option<f64>) -> IngestionOrchestrator {
    let policy = settings.policy();
    let probe = FfprobeDurationProbe::new(&settings.tools.ffprobe_path, policy.metadata_timeout());
    let recorders = FfmpegRecorderFactory::new(&settings.tools.ffmpeg_path, probe.clone());

    let prompt: Arc<dyn TrimPrompt> = if settings.recorder.auto_trim {
        Arc::new(StartAt(
            trim_start.unwrap_or(settings.recorder.trim_start_seconds),
        ))
    } else {
        Arc::new(DeclineTrim)
    };

    IngestionOrchestrator::new(policy)
        .with_probe(Arc::new(probe))
        .with_recorders(Arc::new(recorders))
        .with_prompt(prompt)
}

async fn load_candidates(paths: &[PathBuf]) -> anyhow::Result<Vec<MediaCandidate>> {
    let mut candidates = Vec::with_capacity(paths.len());
    for path in paths {
        let candidate = MediaCandidate::from_path(path)
            .await
            .with_context(|| format!("opening {}", path.display()))?;
        candidates.push(candidate);
    }
    Ok(candidates)
}
