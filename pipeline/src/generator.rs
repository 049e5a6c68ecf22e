//! Script generation orchestrator.
//!
//! Sequences one full run: ROI selection and tracking, score computation,
//! operator min/max calibration, decimation to categorized extrema and
//! emission of the script actions with per-extremum offsets, snap
//! thresholds and frame shifts.

use std::sync::Arc;

use log::{info, warn};

use shared::timecode::frame_to_millis;
use shared::KeyQueue;
use signal::{local_min_max_categorized, Extrema};

use crate::config::{Direction, GeneratorParams};
use crate::interfaces::{MediaBackend, Projector, ScriptSink, TrackerFactory, Ui};
use crate::score::{self, Score};
use crate::tracking::TrackingLoop;
use crate::PipelineError;

/// Which extremum group an emitted action belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PointGroup {
    Min,
    Max,
}

/// Outcome of a generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionReport {
    /// Human-readable status, also shown during calibration
    pub status: String,
    /// False when no script could be produced
    pub success: bool,
    /// Number of actions handed to the sink
    pub actions_emitted: usize,
}

/// One-shot pipeline orchestrator.
pub struct ScriptGenerator<'a> {
    params: GeneratorParams,
    backend: &'a dyn MediaBackend,
    projector: &'a dyn Projector,
    keys: Arc<KeyQueue>,
}

impl<'a> ScriptGenerator<'a> {
    pub fn new(
        params: GeneratorParams,
        backend: &'a dyn MediaBackend,
        projector: &'a dyn Projector,
        keys: Arc<KeyQueue>,
    ) -> Self {
        Self {
            params,
            backend,
            projector,
            keys,
        }
    }

    pub fn params(&self) -> &GeneratorParams {
        &self.params
    }

    /// Run the full pipeline, emitting actions into `sink`.
    ///
    /// Partial tracking failures still yield a best-effort script from
    /// whatever trajectory was captured; only an insufficient signal
    /// produces an unsuccessful report.
    pub fn run(
        &self,
        ui: &mut dyn Ui,
        tracker_factory: &TrackerFactory,
        sink: &mut dyn ScriptSink,
    ) -> Result<CompletionReport, PipelineError> {
        self.run_with_progress(ui, tracker_factory, sink, None)
    }

    /// [`run`](Self::run) with a callback invoked per submitted frame.
    pub fn run_with_progress(
        &self,
        ui: &mut dyn Ui,
        tracker_factory: &TrackerFactory,
        sink: &mut dyn ScriptSink,
        progress: Option<&mut dyn FnMut(u64)>,
    ) -> Result<CompletionReport, PipelineError> {
        let video_info = self.backend.video_info(&self.params.video_path)?;

        let mut tracking = TrackingLoop::new(
            &self.params,
            self.backend,
            self.projector,
            self.keys.clone(),
            video_info,
        );
        if let Some(callback) = progress {
            tracking.on_progress(move |frame_num| callback(frame_num));
        }
        let outcome = tracking.run(ui, tracker_factory)?;
        let status = outcome.status.to_string();

        let mut score = score::calculate(&outcome.primary, outcome.secondary.as_ref());
        if score.len() < self.params.min_frames {
            let status = format!("{status} -> Tracking time insufficient");
            warn!("{status}");
            return Ok(CompletionReport {
                status,
                success: false,
                actions_emitted: 0,
            });
        }

        self.calibrate_score(ui, &mut score, &status);

        let axis = score.axis(self.params.direction);
        let extrema = local_min_max_categorized(axis, video_info.fps, &self.params.signal);
        info!(
            "decimated {} samples to {} minima and {} maxima",
            axis.len(),
            extrema.min.len(),
            extrema.max.len()
        );

        let actions_emitted =
            emit_actions(&self.params, axis, &extrema, video_info.fps, sink);

        Ok(CompletionReport {
            status,
            success: true,
            actions_emitted,
        })
    }

    /// Present the extreme frames to the operator and rescale the chosen
    /// axis to the picked range.
    fn calibrate_score(&self, ui: &mut dyn Ui, score: &mut Score, info: &str) {
        if score.len() < 2 {
            return;
        }

        let direction = self.params.direction;
        let axis = score.axis(direction);
        let min_frame = self.params.start_frame + score::argmin(axis) as u64;
        let max_frame = self.params.start_frame + score::argmax(axis) as u64;

        let image_min = self.backend.get_frame(&self.params.video_path, min_frame);
        let image_max = self.backend.get_frame(&self.params.video_path, max_frame);

        let (desired_min, desired_max) = match (image_min, image_max) {
            (Some(image_min), Some(image_max)) => {
                let (title_min, title_max) = match direction {
                    Direction::Y => ("Bottom", "Top"),
                    Direction::X => ("Left", "Right"),
                };
                let (a, b) = ui.min_max_selector(
                    &image_min, &image_max, info, title_min, title_max, 0, 99,
                );
                if a < b {
                    (a, b)
                } else {
                    (b, a)
                }
            }
            _ => {
                warn!("calibration frames could not be decoded, defaulting to full range");
                (0, 99)
            }
        };

        score::calibrate(score, direction, desired_min as f64, desired_max as f64);
    }
}

/// Clone of the chosen axis with the configured offsets applied at the
/// extrema, clamped to the axis' own range.
fn score_with_offsets(params: &GeneratorParams, axis: &[f64], extrema: &Extrema) -> Vec<f64> {
    let mut emitted = axis.to_vec();
    let score_min = axis.iter().copied().fold(f64::INFINITY, f64::min);
    let score_max = axis.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    for &idx in &extrema.min {
        emitted[idx] = (emitted[idx] + params.bottom_points_offset).clamp(score_min, score_max);
    }
    for &idx in &extrema.max {
        emitted[idx] = (emitted[idx] + params.top_points_offset).clamp(score_min, score_max);
    }
    emitted
}

/// Map an extremum index to its absolute output frame, applying the
/// configured per-group shift when it stays inside the signal.
fn apply_shift(
    params: &GeneratorParams,
    index: usize,
    group: PointGroup,
    score_len: usize,
) -> u64 {
    if params.direction == Direction::Y {
        let shift = match group {
            PointGroup::Max => params.shift_top_points,
            PointGroup::Min => params.shift_bottom_points,
        };
        let target = index as i64 + shift;
        if target >= 0 && (target as usize) < score_len {
            return params.start_frame + target as u64;
        }
    }
    params.start_frame + index as u64
}

/// Emit one action per extremum, snapping near-extreme positions to the
/// exact extreme values.
fn emit_actions(
    params: &GeneratorParams,
    axis: &[f64],
    extrema: &Extrema,
    fps: f64,
    sink: &mut dyn ScriptSink,
) -> usize {
    let emitted = score_with_offsets(params, axis, extrema);
    let emitted_min = emitted.iter().copied().fold(f64::INFINITY, f64::min);
    let emitted_max = emitted.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut count = 0usize;
    for &idx in &extrema.min {
        let position = if emitted[idx] < emitted_min + params.bottom_threshold {
            emitted_min.round()
        } else {
            emitted[idx].round()
        };
        let frame = apply_shift(params, idx, PointGroup::Min, axis.len());
        sink.add_action(position as i32, frame_to_millis(frame, fps));
        count += 1;
    }

    for &idx in &extrema.max {
        let position = if emitted[idx] > emitted_max - params.top_threshold {
            emitted_max.round()
        } else {
            emitted[idx].round()
        };
        let frame = apply_shift(params, idx, PointGroup::Max, axis.len());
        sink.add_action(position as i32, frame_to_millis(frame, fps));
        count += 1;
    }

    count
}
