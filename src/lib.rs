// src/lib.rs
//
// Hand-gesture scorekeeping for recorded matches. A hand tracker supplies
// per-frame landmarks; held gestures become timestamped score and highlight
// events, written as a scores CSV per video and planned into highlight reels.

pub mod config;
pub mod detection;
pub mod error;
pub mod event_log;
pub mod gopro;
pub mod highlights;
pub mod landmark_source;
pub mod pipeline;
pub mod types;
pub mod video_processor;

pub use error::{Result, ScoringError};
pub use event_log::{EventCounts, EventLog, EventLogBuilder, EventLogHeader};
pub use highlights::{CombinedPlan, HighlightPlan, HighlightPlanner};
pub use landmark_source::{FrameSampler, JsonlLandmarkSource, LandmarkSource, MemoryLandmarkSource};
pub use pipeline::GesturePipeline;
pub use types::{
    Config, GestureClass, LandmarkFrame, LandmarkPoint, LandmarkSet, ScoreEvent, ScoreKind,
    Timecode,
};
pub use video_processor::{VideoProcessor, VideoReport};
