// src/pipeline/frame_context.rs
//
// Everything the pipeline decided about one sampled frame.

use crate::types::{GestureClass, LandmarkFrame, ScoreEvent};

#[derive(Debug, Clone)]
pub struct FrameContext {
    pub frame_index: u64,
    pub media_timestamp: f64,
    pub hand_count: usize,

    /// One entry per hand; `None` for unrecognised or malformed hands
    pub classifications: Vec<Option<GestureClass>>,
    pub rejected_hands: usize,

    /// Gate state sampled once at the top of the frame
    pub gate_open: bool,

    pub recorded: Vec<ScoreEvent>,
}

impl FrameContext {
    pub fn new(frame: &LandmarkFrame) -> Self {
        Self {
            frame_index: frame.frame_index,
            media_timestamp: frame.media_timestamp,
            hand_count: frame.hands.len(),
            classifications: Vec::with_capacity(frame.hands.len()),
            rejected_hands: 0,
            gate_open: true,
            recorded: Vec::new(),
        }
    }

    /// Any hand on this frame shows `class`
    pub fn is_present(&self, class: GestureClass) -> bool {
        self.classifications.contains(&Some(class))
    }
}
