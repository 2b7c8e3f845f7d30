// src/pipeline/gesture_pipeline.rs
//
// Per-video run context: three debouncers, one cooldown gate, one event log.
// Frames must be fed in stream order.

use super::event_bus::{EventBus, PipelineEvent};
use super::frame_context::FrameContext;
use super::metrics::PipelineMetrics;
use crate::detection::{
    try_classify, Clock, CooldownGate, DebounceOutcome, DebounceState, GestureDebouncer,
    SystemClock,
};
use crate::error::Result;
use crate::event_log::{EventLog, EventLogBuilder, EventLogHeader};
use crate::landmark_source::LandmarkSource;
use crate::types::{GestureClass, GestureConfig, LandmarkFrame};
use tracing::{debug, info, warn};

const MAX_PENDING_EVENTS: usize = 256;

pub struct GesturePipeline<C: Clock = SystemClock> {
    debouncers: [GestureDebouncer; 3],
    gate: CooldownGate,
    clock: C,
    log: EventLogBuilder,
    bus: EventBus,
    metrics: PipelineMetrics,
}

impl<C: Clock> GesturePipeline<C> {
    pub fn new(config: &GestureConfig, header: EventLogHeader, clock: C) -> Self {
        let required = config.required_duration_secs;
        Self {
            debouncers: GestureClass::ALL.map(|class| GestureDebouncer::new(class, required)),
            gate: CooldownGate::from_secs(config.cooldown_secs),
            clock,
            log: EventLogBuilder::new(header),
            bus: EventBus::new(MAX_PENDING_EVENTS),
            metrics: PipelineMetrics::new(),
        }
    }

    pub fn process_frame(&mut self, frame: &LandmarkFrame) -> FrameContext {
        let mut ctx = FrameContext::new(frame);
        self.metrics.inc(&self.metrics.frames_sampled);
        self.metrics
            .add(&self.metrics.hands_seen, frame.hands.len() as u64);
        if !frame.hands.is_empty() {
            self.metrics.inc(&self.metrics.frames_with_hands);
        }

        for hand in &frame.hands {
            match try_classify(hand) {
                Ok(class) => {
                    if class.is_some() {
                        self.metrics.inc(&self.metrics.gestures_recognised);
                    }
                    ctx.classifications.push(class);
                }
                Err(e) => {
                    ctx.classifications.push(None);
                    ctx.rejected_hands += 1;
                    self.metrics.inc(&self.metrics.hands_rejected);
                    self.bus.publish(PipelineEvent::HandRejected {
                        frame_index: frame.frame_index,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let now = self.clock.now();
        ctx.gate_open = self.gate.is_open(now);
        if !ctx.gate_open {
            self.metrics.inc(&self.metrics.frames_suppressed);
            self.bus.publish(PipelineEvent::FrameSuppressed {
                frame_index: frame.frame_index,
                remaining: self.gate.remaining(now),
            });
            return ctx;
        }

        // Tracker lost every hand: holds carry over to the next frame with hands
        if frame.hands.is_empty() {
            return ctx;
        }

        for class in GestureClass::ALL {
            let present = ctx.is_present(class);
            let debouncer = &mut self.debouncers[class.slot()];
            let before = debouncer.state();
            let outcome = debouncer.update(present, frame.media_timestamp);
            let after = debouncer.state();

            match (before, after, outcome) {
                (_, _, DebounceOutcome::Confirmed) => {
                    let event = self.log.record(class, frame.media_timestamp);
                    self.gate.trigger(self.clock.now());
                    self.metrics.record_event(event.kind);
                    info!(
                        "🎯 {} confirmed at {} (frame {})",
                        class,
                        event.timecode,
                        frame.frame_index
                    );
                    self.bus.publish(PipelineEvent::ScoreRecorded {
                        class,
                        event,
                        frame_index: frame.frame_index,
                        media_timestamp: frame.media_timestamp,
                    });
                    ctx.recorded.push(event);
                }
                (DebounceState::Idle, DebounceState::Arming { since }, _) => {
                    self.bus.publish(PipelineEvent::GestureArmed {
                        class,
                        frame_index: frame.frame_index,
                        media_timestamp: since,
                    });
                }
                (DebounceState::Arming { since }, DebounceState::Idle, _) => {
                    self.bus.publish(PipelineEvent::GestureReleased {
                        class,
                        frame_index: frame.frame_index,
                        held_secs: frame.media_timestamp - since,
                    });
                }
                _ => {}
            }
        }

        ctx
    }

    /// Pull frames until the source ends.
    ///
    /// On `Err` every event recorded so far is kept; call `finish` to get it.
    pub fn run<S: LandmarkSource>(
        &mut self,
        source: &mut S,
        mut on_frame: impl FnMut(&FrameContext, Vec<PipelineEvent>),
    ) -> Result<()> {
        while let Some(frame) = source.next_frame()? {
            let ctx = self.process_frame(&frame);
            let events = self.bus.drain();
            on_frame(&ctx, events);
        }
        debug!("Landmark stream {} ended", source.info().source);
        Ok(())
    }

    pub fn drain_events(&mut self) -> Vec<PipelineEvent> {
        self.bus.drain()
    }

    pub fn debouncer_state(&self, class: GestureClass) -> DebounceState {
        self.debouncers[class.slot()].state()
    }

    pub fn is_gate_open(&self) -> bool {
        self.gate.is_open(self.clock.now())
    }

    pub fn recorded(&self) -> usize {
        self.log.len()
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    pub fn finish(self) -> EventLog {
        if self.debouncers.iter().any(|d| d.is_arming()) {
            warn!("Stream ended with a gesture still being held; it was not recorded");
        }
        self.log.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{hand, ManualClock};
    use crate::error::ScoringError;
    use crate::landmark_source::MemoryLandmarkSource;
    use crate::types::{LandmarkPoint, LandmarkSet, MatchInfo, ScoreKind};

    fn index() -> LandmarkSet {
        hand(true, false, false, false)
    }

    fn v_sign() -> LandmarkSet {
        hand(true, true, false, false)
    }

    fn fist() -> LandmarkSet {
        hand(false, false, false, false)
    }

    fn frame(frame_index: u64, media_timestamp: f64, hands: Vec<LandmarkSet>) -> LandmarkFrame {
        LandmarkFrame {
            frame_index,
            media_timestamp,
            hands,
        }
    }

    fn pipeline(clock: &ManualClock) -> GesturePipeline<ManualClock> {
        GesturePipeline::new(
            &GestureConfig::default(),
            EventLogHeader::new("test.mp4", &MatchInfo::default()),
            clock.clone(),
        )
    }

    #[test]
    fn test_held_index_finger_records_one_team_one_event() {
        let clock = ManualClock::new();
        let mut pipeline = pipeline(&clock);
        for i in 0..=5 {
            pipeline.process_frame(&frame(i, i as f64 * 0.02, vec![index()]));
        }
        let log = pipeline.finish();
        assert_eq!(log.events.len(), 1);
        assert_eq!(log.events[0].kind, ScoreKind::TeamOne);
        assert_eq!(log.events[0].formatted_timestamp(), "00:00:00");
    }

    #[test]
    fn test_cooldown_blocks_second_confirmation() {
        let clock = ManualClock::new();
        let mut pipeline = pipeline(&clock);

        clock.set_secs(1.0);
        pipeline.process_frame(&frame(0, 0.0, vec![index()]));
        let ctx = pipeline.process_frame(&frame(1, 0.1, vec![index()]));
        assert_eq!(ctx.recorded.len(), 1);

        clock.set_secs(3.0);
        pipeline.process_frame(&frame(2, 0.2, vec![v_sign()]));
        let ctx = pipeline.process_frame(&frame(3, 0.3, vec![v_sign()]));
        assert!(!ctx.gate_open);
        assert!(ctx.recorded.is_empty());

        let events = pipeline.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, PipelineEvent::FrameSuppressed { frame_index: 3, .. })));
        assert_eq!(pipeline.finish().events.len(), 1);
    }

    #[test]
    fn test_cooldown_blocks_repeat_of_same_gesture() {
        let clock = ManualClock::new();
        let mut pipeline = pipeline(&clock);

        clock.set_secs(1.0);
        pipeline.process_frame(&frame(0, 0.0, vec![index()]));
        pipeline.process_frame(&frame(1, 0.1, vec![index()]));
        pipeline.process_frame(&frame(2, 0.2, vec![fist()]));

        clock.set_secs(3.0);
        pipeline.process_frame(&frame(3, 0.3, vec![index()]));
        let ctx = pipeline.process_frame(&frame(4, 0.4, vec![index()]));
        assert!(!ctx.gate_open);
        assert!(ctx.recorded.is_empty());
        assert_eq!(pipeline.recorded(), 1);

        let log = pipeline.finish();
        assert_eq!(log.events[0].kind, ScoreKind::TeamOne);
    }

    #[test]
    fn test_frame_without_hands_keeps_hold() {
        let clock = ManualClock::new();
        let mut pipeline = pipeline(&clock);
        pipeline.process_frame(&frame(0, 0.0, vec![index()]));
        pipeline.process_frame(&frame(1, 0.1, vec![]));
        assert_eq!(
            pipeline.debouncer_state(GestureClass::IndexFinger),
            DebounceState::Arming { since: 0.0 }
        );
        let ctx = pipeline.process_frame(&frame(2, 0.2, vec![index()]));

        assert_eq!(ctx.recorded.len(), 1);
        assert_eq!(pipeline.finish().events[0].kind, ScoreKind::TeamOne);
    }

    #[test]
    fn test_gate_reopens_after_cooldown() {
        let clock = ManualClock::new();
        let mut pipeline = pipeline(&clock);
        pipeline.process_frame(&frame(0, 0.0, vec![index()]));
        pipeline.process_frame(&frame(1, 0.1, vec![index()]));
        assert!(!pipeline.is_gate_open());

        clock.set_secs(5.5);
        assert!(pipeline.is_gate_open());
        pipeline.process_frame(&frame(2, 10.0, vec![v_sign()]));
        pipeline.process_frame(&frame(3, 10.1, vec![v_sign()]));

        let kinds: Vec<ScoreKind> = pipeline.finish().events.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ScoreKind::TeamOne, ScoreKind::TeamTwo]);
    }

    #[test]
    fn test_short_gesture_records_nothing() {
        let clock = ManualClock::new();
        let mut pipeline = pipeline(&clock);
        pipeline.process_frame(&frame(0, 0.00, vec![index()]));
        pipeline.process_frame(&frame(1, 0.02, vec![index()]));
        pipeline.process_frame(&frame(2, 0.04, vec![index()]));
        pipeline.process_frame(&frame(3, 0.06, vec![fist()]));

        assert_eq!(
            pipeline.debouncer_state(GestureClass::IndexFinger),
            DebounceState::Idle
        );
        let events = pipeline.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            PipelineEvent::GestureReleased {
                class: GestureClass::IndexFinger,
                ..
            }
        )));
        assert_eq!(pipeline.finish().events.len(), 0);
    }

    #[test]
    fn test_two_hands_confirm_on_same_frame() {
        let clock = ManualClock::new();
        let mut pipeline = pipeline(&clock);
        pipeline.process_frame(&frame(0, 0.0, vec![index(), v_sign()]));
        let ctx = pipeline.process_frame(&frame(5, 0.1, vec![v_sign(), index()]));

        let kinds: Vec<ScoreKind> = ctx.recorded.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ScoreKind::TeamOne, ScoreKind::TeamTwo]);
    }

    #[test]
    fn test_cooldown_freezes_arming() {
        let clock = ManualClock::new();
        let mut pipeline = pipeline(&clock);
        pipeline.process_frame(&frame(0, 0.0, vec![index()]));
        pipeline.process_frame(&frame(1, 0.1, vec![index()]));

        // Closed gate: the held little finger never arms
        clock.set_secs(2.0);
        let ctx = pipeline.process_frame(&frame(2, 0.2, vec![hand(false, false, false, true)]));
        assert!(!ctx.gate_open);
        assert_eq!(
            pipeline.debouncer_state(GestureClass::LittleFinger),
            DebounceState::Idle
        );
    }

    #[test]
    fn test_malformed_hand_is_counted_not_fatal() {
        let clock = ManualClock::new();
        let mut pipeline = pipeline(&clock);
        let short = LandmarkSet::new(vec![LandmarkPoint::new(0.5, 0.5); 4]);
        let ctx = pipeline.process_frame(&frame(0, 0.0, vec![short, fist()]));

        assert_eq!(ctx.rejected_hands, 1);
        assert_eq!(ctx.classifications, vec![None, None]);
        let summary = pipeline.metrics().summary();
        assert_eq!(summary.hands_rejected, 1);
        assert_eq!(summary.hands_seen, 2);
    }

    #[test]
    fn test_run_keeps_events_when_stream_terminates() {
        let clock = ManualClock::new();
        let mut pipeline = pipeline(&clock);
        let mut source = MemoryLandmarkSource::from_hands(
            "test.mp4",
            10.0,
            vec![(0, vec![index()]), (1, vec![index()]), (2, vec![])],
        )
        .terminate_with("decoder crashed");

        let mut frames = 0;
        let result = pipeline.run(&mut source, |_, _| frames += 1);
        assert!(matches!(result, Err(ScoringError::StreamTerminated { .. })));
        assert_eq!(frames, 3);
        assert_eq!(pipeline.finish().events.len(), 1);
    }

    #[test]
    fn test_timecodes_non_decreasing() {
        let clock = ManualClock::new();
        let mut pipeline = pipeline(&clock);
        let gestures = [index(), v_sign(), hand(false, false, false, true)];
        let mut t = 0.0;
        let mut frame_index = 0;
        for gesture in gestures.iter().cycle().take(6) {
            for _ in 0..2 {
                pipeline.process_frame(&frame(frame_index, t, vec![gesture.clone()]));
                frame_index += 1;
                t += 0.5;
            }
            pipeline.process_frame(&frame(frame_index, t, vec![]));
            frame_index += 1;
            t += 0.5;
            clock.advance(std::time::Duration::from_secs(6));
        }

        let log = pipeline.finish();
        assert_eq!(log.events.len(), 6);
        assert!(log
            .events
            .windows(2)
            .all(|w| w[0].timecode <= w[1].timecode));
    }
}
