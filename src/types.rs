// src/types.rs

use crate::error::ScoringError;
use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gesture: GestureConfig,
    #[serde(rename = "match")]
    pub match_info: MatchInfo,
    pub video: VideoConfig,
    pub highlights: HighlightConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Media seconds a gesture must be held before it counts
    pub required_duration_secs: f64,
    /// Wall-clock seconds during which every gesture is ignored after an event
    pub cooldown_secs: f64,
    /// Native fps is divided by this to get the sampled rate
    pub frame_subsampling_factor: u32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            required_duration_secs: 0.1,
            cooldown_secs: 5.0,
            frame_subsampling_factor: 5, // 50 fps source → 10 fps sampled
        }
    }
}

impl GestureConfig {
    /// Keep every n-th native frame (`fps / (fps / factor)`)
    pub fn frame_interval(&self) -> u64 {
        u64::from(self.frame_subsampling_factor.max(1))
    }
}

/// Per-match labels and starting scores written into every event log header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchInfo {
    pub team_one: String,
    pub team_two: String,
    pub starting_score_one: u32,
    pub starting_score_two: u32,
}

impl Default for MatchInfo {
    fn default() -> Self {
        Self {
            team_one: "Team Black".to_string(),
            team_two: "Team Orange".to_string(),
            starting_score_one: 0,
            starting_score_two: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub input_dir: String,
    /// Where score CSVs go; next to each video when unset
    pub output_dir: Option<String>,
    /// Sidecar written by the hand tracker: `<video stem><suffix>`
    pub landmark_suffix: String,
    /// Order GoPro chapters (`GX010835.MP4`) by session, then chapter
    pub sort_gopro: bool,
    pub max_parallel_videos: usize,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            input_dir: ".".to_string(),
            output_dir: None,
            landmark_suffix: "_landmarks.jsonl".to_string(),
            sort_gopro: false,
            max_parallel_videos: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Seconds of footage kept before each event
    pub clip_duration_secs: f64,
    pub slow_motion_factor: f64,
    pub include_overlays: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            clip_duration_secs: 7.0,
            slow_motion_factor: 1.0,
            include_overlays: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ============================================================================
// LANDMARKS
// ============================================================================

/// Normalised image coordinates; y grows downwards
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
}

impl LandmarkPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One detected hand, indexed by anatomical landmark id
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LandmarkSet {
    pub points: Vec<LandmarkPoint>,
}

impl LandmarkSet {
    pub fn new(points: Vec<LandmarkPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<LandmarkPoint> {
        self.points.get(id).copied()
    }
}

/// Description of a landmark stream, taken from the tracker's header record
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    pub source: String,
    pub fps: f64,
    pub frame_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkFrame {
    pub frame_index: u64,
    /// Seconds into the video (`frame_index / fps`)
    pub media_timestamp: f64,
    pub hands: Vec<LandmarkSet>,
}

// ============================================================================
// GESTURES AND EVENTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GestureClass {
    IndexFinger,
    VSign,
    LittleFinger,
}

impl GestureClass {
    /// Evaluation order inside a frame
    pub const ALL: [GestureClass; 3] = [
        GestureClass::IndexFinger,
        GestureClass::VSign,
        GestureClass::LittleFinger,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IndexFinger => "index finger",
            Self::VSign => "v sign",
            Self::LittleFinger => "little finger",
        }
    }

    pub fn score_kind(&self) -> ScoreKind {
        match self {
            Self::IndexFinger => ScoreKind::TeamOne,
            Self::VSign => ScoreKind::TeamTwo,
            Self::LittleFinger => ScoreKind::Highlight,
        }
    }

    pub(crate) fn slot(&self) -> usize {
        match self {
            Self::IndexFinger => 0,
            Self::VSign => 1,
            Self::LittleFinger => 2,
        }
    }
}

impl fmt::Display for GestureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreKind {
    TeamOne,
    TeamTwo,
    Highlight,
}

impl ScoreKind {
    /// `(team_one, team_two, highlight)`; exactly one is 1
    pub fn deltas(&self) -> (u32, u32, u32) {
        match self {
            Self::TeamOne => (1, 0, 0),
            Self::TeamTwo => (0, 1, 0),
            Self::Highlight => (0, 0, 1),
        }
    }

    pub fn from_deltas(team_one: u32, team_two: u32, highlight: u32) -> Option<Self> {
        match (team_one, team_two, highlight) {
            (1, 0, 0) => Some(Self::TeamOne),
            (0, 1, 0) => Some(Self::TeamTwo),
            (0, 0, 1) => Some(Self::Highlight),
            _ => None,
        }
    }
}

/// Media time of an event at whole-second resolution, printed `HH:MM:SS`.
///
/// Seconds are counted from a zero epoch and rendered as a time of day, so
/// sub-second precision is truncated and hours wrap after 24.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Timecode(NaiveTime);

const SECONDS_PER_DAY: u64 = 86_400;

impl Timecode {
    pub fn from_media_seconds(seconds: f64) -> Self {
        let whole = if seconds.is_finite() && seconds > 0.0 {
            seconds.floor() as u64 % SECONDS_PER_DAY
        } else {
            0
        };
        let time = NaiveTime::from_num_seconds_from_midnight_opt(whole as u32, 0).unwrap_or_default();
        Self(time)
    }

    pub fn parse(text: &str) -> Option<Self> {
        NaiveTime::parse_from_str(text.trim(), "%H:%M:%S")
            .ok()
            .map(|t| Self(t.with_nanosecond(0).unwrap_or(t)))
    }

    pub fn total_seconds(&self) -> u32 {
        self.0.num_seconds_from_midnight()
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M:%S"))
    }
}

impl From<Timecode> for String {
    fn from(value: Timecode) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Timecode {
    type Error = ScoringError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| ScoringError::invalid_event_log(0, format!("bad timecode {value:?}")))
    }
}

/// One confirmed scoring or highlight gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEvent {
    pub timecode: Timecode,
    pub kind: ScoreKind,
}

impl ScoreEvent {
    pub fn new(timecode: Timecode, kind: ScoreKind) -> Self {
        Self { timecode, kind }
    }

    pub fn formatted_timestamp(&self) -> String {
        self.timecode.to_string()
    }

    pub fn deltas(&self) -> (u32, u32, u32) {
        self.kind.deltas()
    }
}
