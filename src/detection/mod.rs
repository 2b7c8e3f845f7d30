// src/detection/mod.rs
//
// Gesture state machine building blocks.
//
//   LandmarkSet → classifier → GestureClass ─┐
//                                            ├→ debouncer (one per class) → Confirmed
//   wall clock  → cooldown gate ─────────────┘

mod classifier;
mod cooldown;
mod debouncer;
pub mod landmarks;

// Re-export public APIs
pub use classifier::{classify, try_classify, FingerPose};
pub use cooldown::{Clock, CooldownGate, ManualClock, SystemClock};
pub use debouncer::{DebounceOutcome, DebounceState, GestureDebouncer};

#[cfg(test)]
pub(crate) use classifier::tests::hand;
