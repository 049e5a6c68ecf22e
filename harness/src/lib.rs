//! Test and demo harness for the motion-script pipeline.
//!
//! Provides synthetic stand-ins for every external collaborator: a video
//! backend rendering a bright blob along configurable motion profiles, a
//! brightness-centroid tracker, and a scripted UI that answers ROI and
//! calibration prompts from canned values. The end-to-end integration
//! tests and the `script_demo` binary run the full pipeline against these
//! fixtures.

pub mod centroid_tracker;
pub mod motion;
pub mod scripted_ui;
pub mod synthetic_video;

pub use centroid_tracker::CentroidTracker;
pub use motion::MotionProfile;
pub use scripted_ui::{PassthroughProjector, ScriptedUi};
pub use synthetic_video::SyntheticVideo;
