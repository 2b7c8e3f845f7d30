// src/video_processor.rs

use crate::detection::{Clock, SystemClock};
use crate::error::{Result, ScoringError};
use crate::event_log::{EventCounts, EventLog, EventLogHeader};
use crate::gopro;
use crate::landmark_source::{FrameSampler, JsonlLandmarkSource, LandmarkSource};
use crate::pipeline::{GesturePipeline, MetricsSummary, PipelineEvent};
use crate::types::Config;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "avi", "mov", "mkv"];
const SCORES_SUFFIX: &str = "_scores.csv";

/// Outcome of scoring one video
#[derive(Debug, Clone, Serialize)]
pub struct VideoReport {
    pub video: PathBuf,
    pub scores_path: PathBuf,
    pub counts: EventCounts,
    pub final_scores: (u32, u32),
    pub frames_read: u64,
    /// Set when the landmark stream failed before its end
    pub terminated: Option<String>,
    pub elapsed_secs: f64,
    pub metrics: MetricsSummary,
}

pub struct VideoProcessor {
    config: Config,
}

impl VideoProcessor {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn find_video_files(&self) -> Result<Vec<PathBuf>> {
        let mut videos: Vec<PathBuf> = WalkDir::new(&self.config.video.input_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| is_video(p))
            .collect();

        if self.config.video.sort_gopro {
            videos = gopro::sort_gopro_videos(videos)?;
        } else {
            videos.sort();
        }

        info!("Found {} video files", videos.len());
        Ok(videos)
    }

    /// Landmark sidecar the hand tracker wrote for `video`
    pub fn landmark_path_for(&self, video: &Path) -> PathBuf {
        video.with_file_name(format!(
            "{}{}",
            stem_of(video),
            self.config.video.landmark_suffix
        ))
    }

    pub fn scores_path_for(&self, video: &Path) -> PathBuf {
        let name = format!("{}{}", stem_of(video), SCORES_SUFFIX);
        match &self.config.video.output_dir {
            Some(dir) => PathBuf::from(dir).join(name),
            None => video.with_file_name(name),
        }
    }

    pub fn process_video(&self, video: &Path) -> Result<VideoReport> {
        let landmarks = self.landmark_path_for(video);
        info!(
            "Opening landmarks for {}: {}",
            video.display(),
            landmarks.display()
        );
        let source = JsonlLandmarkSource::open(&landmarks)?;
        self.process_source(video, source, SystemClock)
    }

    /// Score `source` as the landmarks of `video` and write its scores CSV
    pub fn process_source<S, C>(&self, video: &Path, source: S, clock: C) -> Result<VideoReport>
    where
        S: LandmarkSource,
        C: Clock,
    {
        let started = Instant::now();
        let info = source.info().clone();
        info!(
            "Landmark stream {} @ {:.1} fps, {} frames",
            info.source,
            info.fps,
            info.frame_count
                .map_or_else(|| "unknown".to_string(), |n| n.to_string())
        );

        let header = EventLogHeader::new(file_name_of(video), &self.config.match_info);
        let mut pipeline = GesturePipeline::new(&self.config.gesture, header, clock);
        let mut sampler = FrameSampler::new(source, self.config.gesture.frame_interval());
        let progress = progress_bar(info.frame_count);

        let result = pipeline.run(&mut sampler, |ctx, events| {
            progress.set_position(ctx.frame_index + 1);
            for event in &events {
                log_pipeline_event(event);
            }
        });

        let terminated = match result {
            Ok(()) => None,
            Err(ScoringError::StreamTerminated { reason }) => {
                warn!(
                    "⚠️  Landmark stream for {} terminated early: {}",
                    video.display(),
                    reason
                );
                Some(reason)
            }
            Err(e) => return Err(e),
        };
        progress.finish_and_clear();

        let metrics = pipeline.metrics().summary();
        let log = pipeline.finish();
        let scores_path = self.scores_path_for(video);
        self.save_log(&log, &scores_path)?;

        let report = VideoReport {
            video: video.to_path_buf(),
            scores_path,
            counts: log.counts(),
            final_scores: log.final_scores(),
            frames_read: sampler.frames_read(),
            terminated,
            elapsed_secs: started.elapsed().as_secs_f64(),
            metrics,
        };
        log_report(&report, &log);
        Ok(report)
    }

    fn save_log(&self, log: &EventLog, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ScoringError::io("creating output directory", e))?;
            }
        }
        log.save(path)?;
        debug!("Wrote {} events to {}", log.events.len(), path.display());
        Ok(())
    }
}

fn is_video(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn progress_bar(frame_count: Option<u64>) -> ProgressBar {
    let Some(total) = frame_count else {
        return ProgressBar::hidden();
    };
    let progress = ProgressBar::new(total);
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    progress
}

fn log_pipeline_event(event: &PipelineEvent) {
    match event {
        PipelineEvent::GestureArmed {
            class,
            frame_index,
            media_timestamp,
        } => debug!("{} armed at {:.2}s (frame {})", class, media_timestamp, frame_index),
        PipelineEvent::GestureReleased {
            class,
            frame_index,
            held_secs,
        } => debug!(
            "{} released after {:.2}s (frame {})",
            class, held_secs, frame_index
        ),
        PipelineEvent::ScoreRecorded { .. } => {}
        PipelineEvent::HandRejected {
            frame_index,
            reason,
        } => warn!("Hand rejected on frame {}: {}", frame_index, reason),
        PipelineEvent::FrameSuppressed {
            frame_index,
            remaining,
        } => debug!(
            "Frame {} suppressed, cooldown {:.1}s left",
            frame_index,
            remaining.as_secs_f64()
        ),
    }
}

fn log_report(report: &VideoReport, log: &EventLog) {
    info!("✓ Finished {}", report.video.display());
    info!("  {}: {}", log.header.team_one, report.counts.team_one);
    info!("  {}: {}", log.header.team_two, report.counts.team_two);
    info!("  Highlights: {}", report.counts.highlights);
    info!(
        "  Frames sampled: {} of {} read",
        report.metrics.frames_sampled, report.frames_read
    );
    if report.metrics.hands_rejected > 0 {
        info!("  Malformed hands: {}", report.metrics.hands_rejected);
    }
    info!("  Time taken: {:.2}s", report.elapsed_secs);
    info!("  Scores: {}", report.scores_path.display());
}
