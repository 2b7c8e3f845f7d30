// src/detection/cooldown.rs
//
// Wall-clock cooldown shared by every gesture class of one video run.
// Measured in processing time rather than media time, so the monitoring
// cadence (not playback speed) throttles repeated scoring.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of wall-clock time for the cooldown gate
pub trait Clock: Send {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-driven clock for tests and deterministic replays.
///
/// Clones share the same offset, so a test can keep one handle and advance
/// time while the pipeline owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    offset_nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset_nanos: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Set the elapsed time since the clock was created
    pub fn set(&self, elapsed: Duration) {
        self.offset_nanos
            .store(saturating_nanos(elapsed), Ordering::SeqCst);
    }

    pub fn set_secs(&self, elapsed_secs: f64) {
        self.set(Duration::from_secs_f64(elapsed_secs.max(0.0)));
    }

    pub fn advance(&self, by: Duration) {
        let by = saturating_nanos(by);
        // The closure always returns Some, so this cannot fail
        let _ = self
            .offset_nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                Some(n.saturating_add(by))
            });
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst))
    }
}

/// Clamped to `u64::MAX` nanoseconds (about 584 years)
fn saturating_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.elapsed()
    }
}

pub struct CooldownGate {
    duration: Duration,
    /// `None` behaves as the earliest possible deadline: the gate starts open
    deadline: Option<Instant>,
}

impl CooldownGate {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            deadline: None,
        }
    }

    pub fn from_secs(secs: f64) -> Self {
        Self::new(Duration::from_secs_f64(secs.max(0.0)))
    }

    /// Open only strictly after the deadline
    pub fn is_open(&self, now: Instant) -> bool {
        self.deadline.map_or(true, |deadline| now > deadline)
    }

    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.duration);
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_starts_open() {
        let clock = ManualClock::new();
        let gate = CooldownGate::from_secs(5.0);
        assert!(gate.is_open(clock.now()));
        assert_eq!(gate.remaining(clock.now()), Duration::ZERO);
    }

    #[test]
    fn test_gate_closed_until_deadline_passes() {
        let clock = ManualClock::new();
        let mut gate = CooldownGate::from_secs(5.0);

        clock.set_secs(1.0);
        gate.trigger(clock.now());

        clock.set_secs(3.0);
        assert!(!gate.is_open(clock.now()));
        assert_eq!(gate.remaining(clock.now()), Duration::from_secs(3));

        // exactly at the deadline is still closed
        clock.set_secs(6.0);
        assert!(!gate.is_open(clock.now()));

        clock.advance(Duration::from_millis(1));
        assert!(gate.is_open(clock.now()));
    }

    #[test]
    fn test_retrigger_extends_deadline() {
        let clock = ManualClock::new();
        let mut gate = CooldownGate::from_secs(5.0);
        gate.trigger(clock.now());
        clock.set_secs(4.0);
        gate.trigger(clock.now());
        clock.set_secs(8.0);
        assert!(!gate.is_open(clock.now()));
        clock.set_secs(9.5);
        assert!(gate.is_open(clock.now()));
    }

    #[test]
    fn test_manual_clock_saturates() {
        let clock = ManualClock::new();
        clock.set(Duration::MAX);
        assert_eq!(clock.elapsed(), Duration::from_nanos(u64::MAX));
        clock.advance(Duration::from_secs(1));
        assert_eq!(clock.elapsed(), Duration::from_nanos(u64::MAX));

        clock.set_secs(1.0);
        clock.advance(Duration::MAX);
        assert_eq!(clock.elapsed(), Duration::from_nanos(u64::MAX));
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        handle.advance(Duration::from_secs(2));
        assert_eq!(clock.elapsed(), Duration::from_secs(2));
        assert_eq!(clock.now(), handle.now());
    }
}
