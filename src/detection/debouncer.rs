// src/detection/debouncer.rs

use crate::types::GestureClass;
use tracing::debug;

/// Slack for media times derived as `frame_index / fps`
const HOLD_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DebounceState {
    Idle,
    /// Gesture seen on every sampled frame since `since` (media seconds)
    Arming { since: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceOutcome {
    Confirmed,
    NotConfirmed,
}

/// Turns a per-frame "gesture present" signal into a single confirmation once
/// the gesture has been held for `required_duration` media seconds.
pub struct GestureDebouncer {
    class: GestureClass,
    required_duration: f64,
    state: DebounceState,
}

impl GestureDebouncer {
    pub fn new(class: GestureClass, required_duration: f64) -> Self {
        Self {
            class,
            required_duration,
            state: DebounceState::Idle,
        }
    }

    pub fn update(&mut self, present: bool, timestamp: f64) -> DebounceOutcome {
        match (self.state, present) {
            (DebounceState::Idle, false) => DebounceOutcome::NotConfirmed,

            (DebounceState::Arming { since }, false) => {
                debug!(
                    "{} released after {:.2}s at {:.2}s",
                    self.class,
                    timestamp - since,
                    timestamp
                );
                self.state = DebounceState::Idle;
                DebounceOutcome::NotConfirmed
            }

            (DebounceState::Idle, true) => {
                // Arming frame never confirms on its own
                debug!("{} armed at {:.2}s", self.class, timestamp);
                self.state = DebounceState::Arming { since: timestamp };
                DebounceOutcome::NotConfirmed
            }

            (DebounceState::Arming { since }, true) => {
                if timestamp - since + HOLD_EPSILON >= self.required_duration {
                    self.state = DebounceState::Idle;
                    DebounceOutcome::Confirmed
                } else {
                    DebounceOutcome::NotConfirmed
                }
            }
        }
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    pub fn is_arming(&self) -> bool {
        matches!(self.state, DebounceState::Arming { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: f64 = 0.1;

    fn feed(debouncer: &mut GestureDebouncer, frames: &[(bool, f64)]) -> Vec<f64> {
        frames
            .iter()
            .filter(|(present, t)| debouncer.update(*present, *t) == DebounceOutcome::Confirmed)
            .map(|(_, t)| *t)
            .collect()
    }

    #[test]
    fn test_confirms_at_first_frame_past_duration() {
        let mut debouncer = GestureDebouncer::new(GestureClass::IndexFinger, REQUIRED);
        let frames = [
            (true, 0.00),
            (true, 0.02),
            (true, 0.04),
            (true, 0.06),
            (true, 0.08),
            (true, 0.10),
        ];
        assert_eq!(feed(&mut debouncer, &frames), vec![0.10]);
        assert_eq!(debouncer.state(), DebounceState::Idle);
    }

    #[test]
    fn test_arming_frame_never_confirms() {
        let mut debouncer = GestureDebouncer::new(GestureClass::VSign, 0.0);
        assert_eq!(debouncer.update(true, 1.0), DebounceOutcome::NotConfirmed);
        assert_eq!(debouncer.state(), DebounceState::Arming { since: 1.0 });
        assert_eq!(debouncer.update(true, 1.0), DebounceOutcome::Confirmed);
    }

    #[test]
    fn test_short_gesture_resets() {
        let mut debouncer = GestureDebouncer::new(GestureClass::LittleFinger, REQUIRED);
        let frames = [(true, 0.00), (true, 0.02), (true, 0.04), (false, 0.06)];
        assert!(feed(&mut debouncer, &frames).is_empty());
        assert_eq!(debouncer.state(), DebounceState::Idle);
    }

    #[test]
    fn test_gap_restarts_timer() {
        let mut debouncer = GestureDebouncer::new(GestureClass::IndexFinger, REQUIRED);
        let frames = [
            (true, 0.0),
            (true, 0.2),
            (false, 0.4),
            (true, 0.6),
            (true, 0.64),
        ];
        // 0.2 confirms the first run; the second run has only 0.04s held
        assert_eq!(feed(&mut debouncer, &frames), vec![0.2]);
        assert_eq!(debouncer.state(), DebounceState::Arming { since: 0.6 });

        let mut debouncer = GestureDebouncer::new(GestureClass::IndexFinger, REQUIRED);
        let frames = [(true, 0.0), (true, 0.06), (false, 0.08), (true, 0.10), (true, 0.16)];
        assert!(feed(&mut debouncer, &frames).is_empty());
    }

    #[test]
    fn test_held_gesture_rearms_after_confirmation() {
        let mut debouncer = GestureDebouncer::new(GestureClass::IndexFinger, REQUIRED);
        let frames: Vec<(bool, f64)> = (0..=6).map(|i| (true, i as f64 * 0.25)).collect();
        // arm 0.0, confirm 0.25, arm 0.5, confirm 0.75, ...
        assert_eq!(feed(&mut debouncer, &frames), vec![0.25, 0.75, 1.25]);
    }

    #[test]
    fn test_exact_hold_confirms_anywhere_in_video() {
        let mut debouncer = GestureDebouncer::new(GestureClass::VSign, REQUIRED);
        assert_eq!(feed(&mut debouncer, &[(true, 10.0), (true, 10.1)]), vec![10.1]);

        let mut debouncer = GestureDebouncer::new(GestureClass::VSign, REQUIRED);
        assert_eq!(feed(&mut debouncer, &[(true, 0.2), (true, 0.3)]), vec![0.3]);

        // 50 fps sampled every 5th frame: a 0.1s hold always confirms on the next sample
        for k in (0..3000u64).step_by(5) {
            let mut debouncer = GestureDebouncer::new(GestureClass::IndexFinger, REQUIRED);
            let armed = k as f64 / 50.0;
            let next = (k + 5) as f64 / 50.0;
            assert_eq!(debouncer.update(true, armed), DebounceOutcome::NotConfirmed);
            assert_eq!(
                debouncer.update(true, next),
                DebounceOutcome::Confirmed,
                "armed at frame {k}"
            );
        }
    }

    #[test]
    fn test_frame_rate_independent() {
        // 0.1s held at 10 fps and at 50 fps both confirm at 0.1s
        let mut slow = GestureDebouncer::new(GestureClass::VSign, REQUIRED);
        assert_eq!(feed(&mut slow, &[(true, 0.0), (true, 0.1)]), vec![0.1]);

        let mut fast = GestureDebouncer::new(GestureClass::VSign, REQUIRED);
        let frames = [
            (true, 0.00),
            (true, 0.02),
            (true, 0.04),
            (true, 0.06),
            (true, 0.08),
            (true, 0.10),
        ];
        assert_eq!(feed(&mut fast, &frames), vec![0.10]);
    }
}
