//! Configuration surface.
//!
//! Operator settings and algorithm hyperparameters are stored as JSON in a
//! per-user config directory and folded into an immutable
//! [`GeneratorParams`] record at pipeline start. The algorithms only ever
//! see the record; nothing reaches into process-wide state.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use signal::SignalParams;

/// Errors raised while loading or saving configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Scoring axis of the tracked motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    X,
    #[default]
    Y,
}

/// How a projection maps the source frame into the working frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionKind {
    #[default]
    Flat,
    /// Side-by-side stereoscopic VR, left eye used
    VrSbs,
    /// Over-under stereoscopic VR, top eye used
    VrOu,
}

/// Parameters of one entry in the projection table.
///
/// A width or height of `-1` means "preserve the aspect ratio from the
/// other dimension". VR tuning mutates a working copy of this record;
/// the shared defaults are never touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    pub kind: ProjectionKind,
    /// Output width in pixels, -1 preserves aspect
    pub width: i32,
    /// Output height in pixels, -1 preserves aspect
    pub height: i32,
    /// Vertical view angle offset in degrees (VR only)
    #[serde(default)]
    pub phi: f64,
}

impl ProjectionConfig {
    pub fn is_vr(&self) -> bool {
        !matches!(self.kind, ProjectionKind::Flat)
    }

    /// Resolve `-1` sentinels against the source frame dimensions.
    pub fn resolve_aspect(&mut self, frame_width: u32, frame_height: u32) {
        if self.height == -1 && self.width > 0 {
            let scaling = self.width as f64 / frame_width as f64;
            self.height = (frame_height as f64 * scaling).round() as i32;
        } else if self.width == -1 && self.height > 0 {
            let scaling = self.height as f64 / frame_height as f64;
            self.width = (frame_width as f64 * scaling).round() as i32;
        }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            kind: ProjectionKind::Flat,
            width: 1920,
            height: -1,
            phi: 0.0,
        }
    }
}

/// Built-in projection table keyed by the `projection` setting.
pub fn default_projections() -> HashMap<String, ProjectionConfig> {
    let mut table = HashMap::new();
    table.insert("flat".to_string(), ProjectionConfig::default());
    table.insert(
        "vr_sbs".to_string(),
        ProjectionConfig {
            kind: ProjectionKind::VrSbs,
            width: 1024,
            height: 1024,
            phi: -25.0,
        },
    );
    table.insert(
        "vr_ou".to_string(),
        ProjectionConfig {
            kind: ProjectionKind::VrOu,
            width: 1024,
            height: 1024,
            phi: -25.0,
        },
    );
    table
}

/// Operator-facing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Frames to skip between tracker updates (>= 0)
    pub skip_frames: u32,
    /// Playback cap in frames per second, 0 = uncapped
    pub max_playback_fps: u32,
    /// Which score axis drives the script
    pub tracking_direction: Direction,
    /// Offer a zoom step during ROI selection
    pub use_zoom: bool,
    /// Zoom magnification (>= 1.0)
    pub zoom_factor: f64,
    /// Preview window scaling factor
    pub preview_scaling: f64,
    /// Projection table key
    pub projection: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            skip_frames: 0,
            max_playback_fps: 0,
            tracking_direction: Direction::Y,
            use_zoom: false,
            zoom_factor: 1.0,
            preview_scaling: 1.0,
            projection: "flat".to_string(),
        }
    }
}

/// Algorithm hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hyperparameters {
    /// Frame offset applied to emitted maxima (y direction only)
    pub shift_top_points: i64,
    /// Frame offset applied to emitted minima (y direction only)
    pub shift_bottom_points: i64,
    /// Score offset added at maxima before emission
    pub top_points_offset: f64,
    /// Score offset added at minima before emission
    pub bottom_points_offset: f64,
    /// Snap-to-maximum threshold
    pub top_threshold: f64,
    /// Snap-to-minimum threshold
    pub bottom_threshold: f64,
    /// Minimum signal length required to emit a script
    pub min_frames: usize,
    /// Decimation parameters
    pub signal: SignalParams,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            shift_top_points: 0,
            shift_bottom_points: 0,
            top_points_offset: 0.0,
            bottom_points_offset: 0.0,
            top_threshold: 5.0,
            bottom_threshold: 5.0,
            min_frames: 30,
            signal: SignalParams::default(),
        }
    }
}

/// JSON-backed storage for settings and hyperparameters.
///
/// Files live under a single root directory (`~/.motionscript` by
/// default); missing files fall back to defaults.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    root_path: PathBuf,
}

impl ConfigStore {
    /// Storage rooted at `~/.motionscript`.
    pub fn new() -> std::io::Result<Self> {
        let home = std::env::var("HOME")
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::NotFound, "HOME not set"))?;
        Ok(Self {
            root_path: PathBuf::from(home).join(".motionscript"),
        })
    }

    /// Storage rooted at a custom path.
    pub fn with_path(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    fn settings_path(&self) -> PathBuf {
        self.root_path.join("settings.json")
    }

    fn hyperparameters_path(&self) -> PathBuf {
        self.root_path.join("hyperparameters.json")
    }

    /// Load settings, falling back to defaults when no file exists.
    pub fn load_settings(&self) -> Result<Settings, ConfigError> {
        Self::load_or_default(&self.settings_path())
    }

    /// Load hyperparameters, falling back to defaults when no file exists.
    pub fn load_hyperparameters(&self) -> Result<Hyperparameters, ConfigError> {
        Self::load_or_default(&self.hyperparameters_path())
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<PathBuf, ConfigError> {
        self.save(&self.settings_path(), settings)
    }

    pub fn save_hyperparameters(
        &self,
        hyperparameters: &Hyperparameters,
    ) -> Result<PathBuf, ConfigError> {
        self.save(&self.hyperparameters_path(), hyperparameters)
    }

    fn load_or_default<T>(path: &Path) -> Result<T, ConfigError>
    where
        T: Default + for<'de> Deserialize<'de>,
    {
        if !path.exists() {
            return Ok(T::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn save<T: Serialize>(&self, path: &Path, value: &T) -> Result<PathBuf, ConfigError> {
        std::fs::create_dir_all(&self.root_path)?;
        std::fs::write(path, serde_json::to_string_pretty(value)?)?;
        Ok(path.to_path_buf())
    }
}

/// Immutable per-run parameter record.
///
/// Snapshot of the settings, hyperparameters and resolved projection taken
/// once when a generation run starts.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorParams {
    pub video_path: PathBuf,
    /// First frame of the tracked range
    pub start_frame: u64,
    /// Exclusive end frame, -1 tracks to end of video
    pub end_frame: i64,
    /// Track the optional secondary feature
    pub track_secondary: bool,
    pub skip_frames: u32,
    pub max_playback_fps: u32,
    pub direction: Direction,
    pub use_zoom: bool,
    pub zoom_factor: f64,
    pub preview_scaling: f64,
    pub shift_top_points: i64,
    pub shift_bottom_points: i64,
    pub top_points_offset: f64,
    pub bottom_points_offset: f64,
    pub top_threshold: f64,
    pub bottom_threshold: f64,
    pub min_frames: usize,
    pub projection: ProjectionConfig,
    pub signal: SignalParams,
}

impl GeneratorParams {
    /// Build the record from loaded configuration, clamping out-of-range
    /// values the same way the configuration surface documents them.
    pub fn new(
        video_path: impl Into<PathBuf>,
        settings: &Settings,
        hyperparameters: &Hyperparameters,
        projection: ProjectionConfig,
    ) -> Self {
        Self {
            video_path: video_path.into(),
            start_frame: 0,
            end_frame: -1,
            track_secondary: true,
            skip_frames: settings.skip_frames,
            max_playback_fps: settings.max_playback_fps,
            direction: settings.tracking_direction,
            use_zoom: settings.use_zoom,
            zoom_factor: settings.zoom_factor.max(1.0),
            preview_scaling: settings.preview_scaling,
            shift_top_points: hyperparameters.shift_top_points,
            shift_bottom_points: hyperparameters.shift_bottom_points,
            top_points_offset: hyperparameters.top_points_offset,
            bottom_points_offset: hyperparameters.bottom_points_offset,
            top_threshold: hyperparameters.top_threshold,
            bottom_threshold: hyperparameters.bottom_threshold,
            min_frames: hyperparameters.min_frames,
            projection,
            signal: hyperparameters.signal.clone(),
        }
    }

    /// Restrict the run to `[start_frame, end_frame)`.
    pub fn with_frame_range(mut self, start_frame: u64, end_frame: i64) -> Self {
        self.start_frame = start_frame;
        self.end_frame = end_frame;
        self
    }

    /// Enable or disable the secondary target.
    pub fn with_secondary(mut self, track_secondary: bool) -> Self {
        self.track_secondary = track_secondary;
        self
    }
}
