//! Narrow interfaces to the pipeline's external collaborators.
//!
//! Video decoding, the tracker algorithm, spherical projection, the
//! windowing/keyboard surface and script persistence all live behind these
//! traits; the pipeline never sees their implementations.

use std::path::Path;

use thiserror::Error;

use shared::{BoundingBox, Frame, KeyQueue, VideoInfo};

use crate::config::ProjectionConfig;

/// Errors surfaced by media backends.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("failed to open {0}: {1}")]
    Open(String, String),
    #[error("failed to decode frame {1} of {0}")]
    Decode(String, u64),
    #[error("no video info available for {0}")]
    NoVideoInfo(String),
}

/// One tracker output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackResult {
    /// False once the tracker has lost its target
    pub success: bool,
    pub bbox: BoundingBox,
}

impl TrackResult {
    pub fn lost() -> Self {
        Self {
            success: false,
            bbox: BoundingBox::default(),
        }
    }
}

/// A streaming source of decoded, projected frames.
pub trait FrameSource {
    /// Next frame, or `None` on end of stream or decode failure.
    fn read(&mut self) -> Option<Frame>;
    /// Whether the underlying stream is still open. Distinguishes a
    /// corrupt mid-stream frame (`true`) from end of video (`false`)
    /// after `read` returns `None`.
    fn is_open(&self) -> bool;
    /// Release the stream. Must be safe to call more than once.
    fn stop(&mut self);
}

/// Factory and random access over video files.
pub trait MediaBackend {
    fn video_info(&self, path: &Path) -> Result<VideoInfo, MediaError>;

    /// Decode a single frame without projection, or `None` when the frame
    /// cannot be decoded.
    fn get_frame(&self, path: &Path, index: u64) -> Option<Frame>;

    /// Open a streaming source with the given projection applied, starting
    /// at `start_frame`.
    fn open(
        &self,
        path: &Path,
        config: &ProjectionConfig,
        start_frame: u64,
    ) -> Result<Box<dyn FrameSource>, MediaError>;
}

/// Asynchronous single-target tracker protocol.
///
/// `update` enqueues a frame for processing; `result` blocks until the
/// next output is available. The i-th result corresponds to the i-th
/// frame submitted after seeding; implementations must not reorder.
pub trait FeatureTracker {
    fn update(&mut self, frame: Frame);
    fn result(&mut self) -> TrackResult;
}

/// Creates a seeded tracker from the seed frame and its initial box.
pub type TrackerFactory<'a> = dyn Fn(&Frame, BoundingBox) -> Box<dyn FeatureTracker> + 'a;

/// Projection of (possibly spherical) source frames into flat working
/// frames.
pub trait Projector {
    fn project(&self, frame: &Frame, config: &ProjectionConfig) -> Frame;

    /// Interactive phi-tilt picker for VR sources. Operates on a working
    /// copy of the config and returns the finalized record; the shared
    /// defaults are never mutated.
    fn configure_vr(
        &self,
        frame: &Frame,
        config: ProjectionConfig,
        keys: &KeyQueue,
    ) -> ProjectionConfig;
}

/// Hints for the interactive ROI selection step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoiOptions {
    /// Offer a zoom step before the box selection
    pub use_zoom: bool,
    /// Zoom magnification when enabled
    pub zoom_factor: f64,
    /// Preview window scaling
    pub preview_scaling: f64,
}

/// The interactive windowing surface.
pub trait Ui {
    /// Blocking region-of-interest selection on `frame`.
    fn select_roi(&mut self, frame: &Frame, label: &str, options: &RoiOptions) -> BoundingBox;

    /// Present a frame with textual overlay lines.
    fn show(&mut self, frame: &Frame, overlay: &[String]);

    /// Blocking min/max calibration dialog. Returns the two picked values
    /// in selection order; callers sort.
    #[allow(clippy::too_many_arguments)]
    fn min_max_selector(
        &mut self,
        image_min: &Frame,
        image_max: &Frame,
        info: &str,
        title_min: &str,
        title_max: &str,
        lower_limit: i64,
        upper_limit: i64,
    ) -> (i64, i64);

    /// Available monitor resolutions, largest-landscape first not
    /// required. Empty when monitor info is unavailable.
    fn monitors(&self) -> Vec<(u32, u32)>;
}

/// Destination for emitted script actions.
///
/// The sink is responsible for stable ordering by timestamp.
pub trait ScriptSink {
    fn add_action(&mut self, position: i32, timestamp_ms: i64);
}
