// src/detection/landmarks.rs
//
// Hand landmark ids (MediaPipe hand model numbering).

// Only the joints the finger-pose rules read are named.

pub const INDEX_FINGER_PIP: usize = 6;
pub const INDEX_FINGER_TIP: usize = 8;
pub const MIDDLE_FINGER_PIP: usize = 10;
pub const MIDDLE_FINGER_TIP: usize = 12;
pub const RING_FINGER_PIP: usize = 14;
pub const RING_FINGER_TIP: usize = 16;
pub const PINKY_PIP: usize = 18;
pub const PINKY_TIP: usize = 20;

/// Points per hand
pub const HAND_LANDMARK_COUNT: usize = 21;
