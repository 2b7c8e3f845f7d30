// src/pipeline/metrics.rs
//
// Per-run counters for one video's gesture pipeline.

use crate::types::ScoreKind;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct PipelineMetrics {
    pub frames_sampled: Arc<AtomicU64>,
    pub frames_with_hands: Arc<AtomicU64>,
    pub frames_suppressed: Arc<AtomicU64>,
    pub hands_seen: Arc<AtomicU64>,
    pub hands_rejected: Arc<AtomicU64>,
    pub gestures_recognised: Arc<AtomicU64>,
    pub team_one_events: Arc<AtomicU64>,
    pub team_two_events: Arc<AtomicU64>,
    pub highlight_events: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            frames_sampled: Arc::new(AtomicU64::new(0)),
            frames_with_hands: Arc::new(AtomicU64::new(0)),
            frames_suppressed: Arc::new(AtomicU64::new(0)),
            hands_seen: Arc::new(AtomicU64::new(0)),
            hands_rejected: Arc::new(AtomicU64::new(0)),
            gestures_recognised: Arc::new(AtomicU64::new(0)),
            team_one_events: Arc::new(AtomicU64::new(0)),
            team_two_events: Arc::new(AtomicU64::new(0)),
            highlight_events: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }

    pub fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    pub fn record_event(&self, kind: ScoreKind) {
        let counter = match kind {
            ScoreKind::TeamOne => &self.team_one_events,
            ScoreKind::TeamTwo => &self.team_two_events,
            ScoreKind::Highlight => &self.highlight_events,
        };
        self.inc(counter);
    }

    /// Sampled frames per second of processing time
    pub fn fps(&self) -> f64 {
        let frames = self.frames_sampled.load(Ordering::Relaxed);
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.01 {
            frames as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            frames_sampled: self.frames_sampled.load(Ordering::Relaxed),
            frames_with_hands: self.frames_with_hands.load(Ordering::Relaxed),
            frames_suppressed: self.frames_suppressed.load(Ordering::Relaxed),
            hands_seen: self.hands_seen.load(Ordering::Relaxed),
            hands_rejected: self.hands_rejected.load(Ordering::Relaxed),
            gestures_recognised: self.gestures_recognised.load(Ordering::Relaxed),
            team_one_events: self.team_one_events.load(Ordering::Relaxed),
            team_two_events: self.team_two_events.load(Ordering::Relaxed),
            highlight_events: self.highlight_events.load(Ordering::Relaxed),
            fps: self.fps(),
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSummary {
    pub frames_sampled: u64,
    pub frames_with_hands: u64,
    pub frames_suppressed: u64,
    pub hands_seen: u64,
    pub hands_rejected: u64,
    pub gestures_recognised: u64,
    pub team_one_events: u64,
    pub team_two_events: u64,
    pub highlight_events: u64,
    pub fps: f64,
    pub elapsed_secs: f64,
}
