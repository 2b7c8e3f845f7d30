// src/pipeline/event_bus.rs
//
// Decoupled event system. The gesture pipeline publishes what happened on a
// frame; the video processor drains and reports it.

use crate::types::{GestureClass, ScoreEvent};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    GestureArmed {
        class: GestureClass,
        frame_index: u64,
        media_timestamp: f64,
    },

    /// Gesture dropped before it was held long enough
    GestureReleased {
        class: GestureClass,
        frame_index: u64,
        held_secs: f64,
    },

    ScoreRecorded {
        class: GestureClass,
        event: ScoreEvent,
        frame_index: u64,
        media_timestamp: f64,
    },

    HandRejected {
        frame_index: u64,
        reason: String,
    },

    /// Cooldown gate was closed at the top of the frame
    FrameSuppressed {
        frame_index: u64,
        remaining: Duration,
    },
}

pub struct EventBus {
    events: VecDeque<PipelineEvent>,
    max_pending: usize,
}

impl EventBus {
    pub fn new(max_pending: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_pending),
            max_pending,
        }
    }

    pub fn publish(&mut self, event: PipelineEvent) {
        if self.events.len() >= self.max_pending {
            warn!(
                "Event bus full ({} events), dropping oldest",
                self.max_pending
            );
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn drain(&mut self) -> Vec<PipelineEvent> {
        self.events.drain(..).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.events.len()
    }
}
