//! Motion-extraction pipeline.
//!
//! Drives a frame source and per-target feature trackers, reduces the
//! resulting bounding-box trajectories to scalar motion scores, decimates
//! the chosen score to categorized extrema and emits `(position,
//! timestamp)` actions to a script sink.
//!
//! Video decoding, the tracker algorithm itself, spherical projection and
//! the windowing/keyboard surface are external collaborators reached
//! through the narrow traits in [`interfaces`].

pub mod config;
pub mod generator;
pub mod interfaces;
pub mod score;
pub mod script;
pub mod tracking;
pub mod worker;

use thiserror::Error;

pub use config::{Direction, GeneratorParams, Hyperparameters, ProjectionConfig, Settings};
pub use generator::{CompletionReport, ScriptGenerator};
pub use interfaces::{
    FeatureTracker, FrameSource, MediaBackend, MediaError, Projector, RoiOptions, ScriptSink,
    TrackResult, Ui,
};
pub use script::{Action, MotionScript};
pub use tracking::{Target, TrackingOutcome, TrackingStatus};
pub use worker::TrackerWorker;

/// Top-level pipeline error.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Media(#[from] interfaces::MediaError),
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Signal(#[from] signal::SignalError),
}
