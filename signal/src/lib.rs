//! Signal decimation for motion-script generation.
//!
//! Reduces a dense scalar motion signal to a sparse set of indices: base
//! points found by a first-pass extrema algorithm (direction changes or
//! local min/max) plus additional detail points (high second derivative or
//! maximum perpendicular deviation) merged under temporal and geometric
//! guards.

pub mod merge;
pub mod ops;
pub mod points;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use merge::{apply_manual_shift, categorize, local_min_max_categorized, merge};
pub use ops::{find_nearest, Side};
pub use points::decimate;

/// Errors raised by the decimation subsystem.
#[derive(Debug, Error)]
pub enum SignalError {
    /// A caller violated an operation's contract; unrecoverable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Tunable parameters of the decimation algorithms.
///
/// Constructed once at pipeline start and injected; the algorithms never
/// read process-wide state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalParams {
    /// Averaging horizon (seconds) for the local min/max reference mean
    pub avg_sec_for_local_min_max_extraction: f64,
    /// Minimum temporal spacing (milliseconds) between merged points
    pub additional_points_merge_time_threshold_in_ms: f64,
    /// Minimum perpendicular distance for an additional point to survive a merge
    pub additional_points_merge_distance_threshold: f64,
    /// Deviation threshold for the distance-minimization point search
    pub distance_minimization_threshold: f64,
    /// Std-deviation multiple for the high-second-derivative point search
    pub high_second_derivative_points_threshold: f64,
    /// Run length required to call a stretch of signal monotone
    pub direction_change_filter_len: usize,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            avg_sec_for_local_min_max_extraction: 2.0,
            additional_points_merge_time_threshold_in_ms: 110.0,
            additional_points_merge_distance_threshold: 10.0,
            distance_minimization_threshold: 20.0,
            high_second_derivative_points_threshold: 1.2,
            direction_change_filter_len: 3,
        }
    }
}

/// Base-point algorithm for the decimate pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasePointAlgorithm {
    DirectionChanges,
    LocalMinMax,
}

/// Additional-point algorithm for the decimate pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdditionalPointAlgorithm {
    HighSecondDerivative,
    DistanceMinimization,
}

/// Decimated signal indices split into minima and maxima.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extrema {
    /// Indices below the moving reference mean
    pub min: Vec<usize>,
    /// Indices above the moving reference mean
    pub max: Vec<usize>,
}

impl Extrema {
    /// All indices of both groups, sorted ascending.
    pub fn sorted_indices(&self) -> Vec<usize> {
        let mut all: Vec<usize> = self.min.iter().chain(self.max.iter()).copied().collect();
        all.sort_unstable();
        all
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_empty() && self.max.is_empty()
    }
}
