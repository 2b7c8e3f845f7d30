// src/highlights.rs
//
// Highlight planning from scores CSVs. Produces the cut list an external
// video tool renders: one clip ending at each event, optional scoreboard
// captions, then all clips of a match concatenated.

use crate::error::{Result, ScoringError};
use crate::event_log::EventLog;
use crate::gopro;
use crate::types::{HighlightConfig, ScoreEvent};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

pub const COMBINED_PLAN_NAME: &str = "combined_highlights.json";
const COMBINED_VIDEO_NAME: &str = "combined_highlights.mp4";
const SCORES_SUFFIX: &str = "_scores.csv";

// ============================================================================
// TEAM COLOURS
// ============================================================================

pub type Rgb = (u8, u8, u8);

const WHITE: Rgb = (255, 255, 255);
const BLACK: Rgb = (0, 0, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TeamColors {
    pub background: Rgb,
    pub foreground: Rgb,
}

impl TeamColors {
    pub const fn new(background: Rgb, foreground: Rgb) -> Self {
        Self {
            background,
            foreground,
        }
    }
}

/// Checked in order; the first name found in a team label wins
const NAMED_COLORS: [(&str, TeamColors); 5] = [
    ("red", TeamColors::new((255, 0, 0), WHITE)),
    ("yellow", TeamColors::new((255, 255, 0), BLACK)),
    ("black", TeamColors::new(BLACK, WHITE)),
    ("blue", TeamColors::new((0, 0, 255), WHITE)),
    ("green", TeamColors::new((0, 255, 0), WHITE)),
];

pub const TEAM_ONE_DEFAULT: TeamColors = TeamColors::new((255, 255, 0), BLACK);
pub const TEAM_TWO_DEFAULT: TeamColors = TeamColors::new((0, 0, 255), WHITE);

pub fn team_colors(label: &str, default: TeamColors) -> TeamColors {
    let label = label.to_lowercase();
    NAMED_COLORS
        .iter()
        .find(|(name, _)| label.contains(name))
        .map(|(_, colors)| *colors)
        .unwrap_or(default)
}

// ============================================================================
// PLAN TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Caption {
    pub text: String,
    pub colors: TeamColors,
    /// Pixels from the top of the frame
    pub y_offset: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightClip {
    pub event: ScoreEvent,
    pub start_secs: f64,
    pub end_secs: f64,
    /// Playback speed multiplier (`1 / slow_motion_factor`)
    pub speed: f64,
    pub captions: Vec<Caption>,
}

impl HighlightClip {
    /// Length once slowed down
    pub fn playback_secs(&self) -> f64 {
        (self.end_secs - self.start_secs) / self.speed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightPlan {
    pub scores_csv: PathBuf,
    pub source_video: PathBuf,
    pub output_video: PathBuf,
    pub clips: Vec<HighlightClip>,
    pub final_scores: (u32, u32),
}

impl HighlightPlan {
    pub fn playback_secs(&self) -> f64 {
        self.clips.iter().map(HighlightClip::playback_secs).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedPlan {
    pub output_video: PathBuf,
    pub plans: Vec<HighlightPlan>,
    pub total_clips: usize,
    pub playback_secs: f64,
}

// ============================================================================
// PLANNER
// ============================================================================

pub struct HighlightPlanner {
    config: HighlightConfig,
}

impl HighlightPlanner {
    pub fn new(config: HighlightConfig) -> Self {
        Self { config }
    }

    /// `None` when the log has no events
    pub fn plan(&self, log: &EventLog, scores_csv: &Path) -> Option<HighlightPlan> {
        if log.events.is_empty() {
            return None;
        }

        let header = &log.header;
        let one_colors = team_colors(&header.team_one, TEAM_ONE_DEFAULT);
        let two_colors = team_colors(&header.team_two, TEAM_TWO_DEFAULT);
        let speed = 1.0 / self.config.slow_motion_factor;

        let mut score_one = header.starting_score_one;
        let mut score_two = header.starting_score_two;
        let mut clips = Vec::with_capacity(log.events.len());

        for event in &log.events {
            let end_secs = f64::from(event.timecode.total_seconds());
            let start_secs = (end_secs - self.config.clip_duration_secs).max(0.0);

            // Captions show the score going into the event
            let captions = if self.config.include_overlays {
                vec![
                    Caption {
                        text: format!("{}: {}", header.team_one, score_one),
                        colors: one_colors,
                        y_offset: 50,
                    },
                    Caption {
                        text: format!("{}: {}", header.team_two, score_two),
                        colors: two_colors,
                        y_offset: 100,
                    },
                ]
            } else {
                Vec::new()
            };

            clips.push(HighlightClip {
                event: *event,
                start_secs,
                end_secs,
                speed,
                captions,
            });

            let (one, two, _) = event.deltas();
            score_one += one;
            score_two += two;
        }

        let dir = scores_csv.parent().unwrap_or_else(|| Path::new(""));
        let source_video = dir.join(&header.source);
        let stem = source_video
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Some(HighlightPlan {
            scores_csv: scores_csv.to_path_buf(),
            output_video: dir.join(format!("{stem}_highlights.mp4")),
            source_video,
            clips,
            final_scores: (score_one, score_two),
        })
    }

    pub fn plan_file(&self, scores_csv: &Path) -> Result<Option<HighlightPlan>> {
        info!("Loading scores from {}", scores_csv.display());
        let log = EventLog::load(scores_csv)?;
        let plan = self.plan(&log, scores_csv);
        match &plan {
            Some(p) => debug!("{} clips planned for {}", p.clips.len(), scores_csv.display()),
            None => info!("No events in {}, skipping", scores_csv.display()),
        }
        Ok(plan)
    }

    /// Plan every CSV in order and join the plans into one reel
    pub fn plan_all(&self, scores_csvs: &[PathBuf], output_dir: &Path) -> Result<CombinedPlan> {
        let mut plans = Vec::new();
        for csv in scores_csvs {
            if let Some(plan) = self.plan_file(csv)? {
                plans.push(plan);
            }
        }
        Ok(combine(plans, output_dir))
    }
}

pub fn combine(plans: Vec<HighlightPlan>, output_dir: &Path) -> CombinedPlan {
    CombinedPlan {
        output_video: output_dir.join(COMBINED_VIDEO_NAME),
        total_clips: plans.iter().map(|p| p.clips.len()).sum(),
        playback_secs: plans.iter().map(HighlightPlan::playback_secs).sum(),
        plans,
    }
}

/// `*_scores.csv` under `dir`, GoPro-ordered when asked, else by path
pub fn find_score_csvs(dir: impl AsRef<Path>, sort_gopro: bool) -> Result<Vec<PathBuf>> {
    let mut csvs: Vec<PathBuf> = WalkDir::new(dir.as_ref())
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.file_name().to_string_lossy().ends_with(SCORES_SUFFIX))
        .map(|e| e.into_path())
        .collect();

    if sort_gopro {
        csvs = gopro::sort_gopro_score_csvs(csvs)?;
    } else {
        csvs.sort();
    }
    Ok(csvs)
}

pub fn write_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let file =
        File::create(path.as_ref()).map_err(|e| ScoringError::io("creating highlight plan", e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| ScoringError::json("writing highlight plan", e))?;
    writer
        .flush()
        .map_err(|e| ScoringError::io("flushing highlight plan", e))
}
