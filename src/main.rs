// src/main.rs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gesture_scoring::highlights::{self, COMBINED_PLAN_NAME};
use gesture_scoring::{Config, HighlightPlanner, VideoProcessor, VideoReport};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "gesture-scoring")]
#[command(about = "Score matches from hand gestures and plan highlight reels")]
struct Cli {
    /// YAML config; defaults are used when the file is missing
    #[arg(long, global = true, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Turn landmark sidecars into scores CSVs
    Process {
        #[arg(long)]
        input_dir: Option<String>,
        /// Videos processed in parallel
        #[arg(long)]
        jobs: Option<usize>,
    },
    /// Plan highlight clips from existing scores CSVs
    Plan {
        #[arg(long)]
        input_dir: Option<String>,
        /// Where the combined plan is written
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    let default_filter = format!("gesture_scoring={}", config.logging.level);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    info!("✋ Gesture Scoring Starting");

    match cli.command {
        Command::Process { input_dir, jobs } => {
            if let Some(dir) = input_dir {
                config.video.input_dir = dir;
            }
            if let Some(jobs) = jobs {
                config.video.max_parallel_videos = jobs.max(1);
            }
            config.validate().context("invalid configuration")?;
            process_all(config).await
        }
        Command::Plan { input_dir, output } => {
            if let Some(dir) = input_dir {
                config.video.input_dir = dir;
            }
            config.validate().context("invalid configuration")?;
            plan_highlights(&config, output)
        }
    }
}

async fn process_all(config: Config) -> Result<()> {
    info!(
        "Gesture thresholds: hold={:.2}s, cooldown={:.1}s, subsampling={}",
        config.gesture.required_duration_secs,
        config.gesture.cooldown_secs,
        config.gesture.frame_subsampling_factor
    );

    let processor = Arc::new(VideoProcessor::new(config.clone()));
    let video_files = processor.find_video_files()?;

    if video_files.is_empty() {
        error!("No video files found in {}", config.video.input_dir);
        return Ok(());
    }

    let (runnable, skipped): (Vec<PathBuf>, Vec<PathBuf>) = video_files
        .into_iter()
        .partition(|v| processor.landmark_path_for(v).exists());
    for video in &skipped {
        warn!(
            "⚠️  No landmarks for {} (expected {}), skipping",
            video.display(),
            processor.landmark_path_for(video).display()
        );
    }

    info!(
        "Processing {} video(s) with {} worker(s)",
        runnable.len(),
        config.video.max_parallel_videos
    );

    let started = Instant::now();
    let semaphore = Arc::new(Semaphore::new(config.video.max_parallel_videos));
    let mut handles = Vec::with_capacity(runnable.len());

    for (idx, video) in runnable.iter().cloned().enumerate() {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .context("worker pool closed")?;
        let processor = Arc::clone(&processor);
        let total = runnable.len();

        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            info!("Processing video {}/{}: {}", idx + 1, total, video.display());
            let result = processor.process_video(&video);
            (video, result)
        }));
    }

    let mut reports: Vec<VideoReport> = Vec::new();
    let mut failed = 0;
    for handle in handles {
        let (video, result) = handle.await.context("video worker panicked")?;
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                failed += 1;
                error!("❌ Failed to process {}: {}", video.display(), e);
            }
        }
    }

    info!("========================================");
    info!(
        "✓ {} video(s) scored, {} failed, {} skipped in {:.1}s",
        reports.len(),
        failed,
        skipped.len(),
        started.elapsed().as_secs_f64()
    );
    for report in &reports {
        info!(
            "  {} → {} / {} / {} highlights{}",
            report.video.display(),
            report.final_scores.0,
            report.final_scores.1,
            report.counts.highlights,
            if report.terminated.is_some() {
                " (stream ended early)"
            } else {
                ""
            }
        );
    }

    Ok(())
}

fn plan_highlights(config: &Config, output: Option<PathBuf>) -> Result<()> {
    let search_dir = config
        .video
        .output_dir
        .clone()
        .unwrap_or_else(|| config.video.input_dir.clone());

    let csvs = highlights::find_score_csvs(&search_dir, config.video.sort_gopro)
        .with_context(|| format!("listing scores CSVs in {search_dir}"))?;
    if csvs.is_empty() {
        error!("No scores CSVs found in {}", search_dir);
        return Ok(());
    }
    info!("Planning highlights from {} scores file(s)", csvs.len());

    let planner = HighlightPlanner::new(config.highlights.clone());
    let combined = planner.plan_all(&csvs, Path::new(&search_dir))?;

    for plan in &combined.plans {
        let path = plan.output_video.with_extension("json");
        highlights::write_json(plan, &path)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(
            "  {} clips → {}",
            plan.clips.len(),
            path.display()
        );
    }

    let output = output.unwrap_or_else(|| Path::new(&search_dir).join(COMBINED_PLAN_NAME));
    highlights::write_json(&combined, &output)
        .with_context(|| format!("writing {}", output.display()))?;
    info!(
        "✓ {} clips ({:.1}s of playback) planned → {}",
        combined.total_clips,
        combined.playback_secs,
        output.display()
    );
    Ok(())
}
