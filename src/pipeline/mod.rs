// src/pipeline/mod.rs

pub mod event_bus;
pub mod frame_context;
pub mod gesture_pipeline;
pub mod metrics;

pub use event_bus::{EventBus, PipelineEvent};
pub use frame_context::FrameContext;
pub use gesture_pipeline::GesturePipeline;
pub use metrics::{MetricsSummary, PipelineMetrics};
