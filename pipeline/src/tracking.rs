//! Interactive tracking loop.
//!
//! Pumps frames from the source into the per-target tracker workers,
//! interpolates boxes across skipped frames, renders the operator overlays
//! and honors stop and quit signals. While the workers compute the next
//! result, the loop processes the previous iteration; that overlap is the
//! pipeline's only source of parallelism and is load-bearing for
//! throughput.

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{info, warn};

use shared::timecode::frame_to_timestamp;
use shared::{BoundingBox, Frame, KeyQueue, Trajectory, VideoInfo};

use crate::config::GeneratorParams;
use crate::interfaces::{MediaBackend, MediaError, Projector, RoiOptions, TrackerFactory, Ui};
use crate::PipelineError;

const PRIMARY_BOX_COLOR: [u8; 3] = [255, 0, 255];
const SECONDARY_BOX_COLOR: [u8; 3] = [0, 255, 255];

/// The closed set of trackable targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Primary,
    Secondary,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Primary => write!(f, "Primary"),
            Target::Secondary => write!(f, "Secondary"),
        }
    }
}

/// How a tracking run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingStatus {
    EndOfVideo,
    CorruptFrame,
    StoppedAtActionPoint,
    StoppedByUser,
    TrackerLost(Target),
}

impl fmt::Display for TrackingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackingStatus::EndOfVideo => write!(f, "End of video reached"),
            TrackingStatus::CorruptFrame => write!(f, "Reach a corrupt video frame"),
            TrackingStatus::StoppedAtActionPoint => {
                write!(f, "Tracking stop at existing action point")
            }
            TrackingStatus::StoppedByUser => write!(f, "Tracking stopped by user"),
            TrackingStatus::TrackerLost(target) => write!(f, "Tracker {target} Lost"),
        }
    }
}

/// Result of a tracking run: final status plus the captured trajectories.
#[derive(Debug)]
pub struct TrackingOutcome {
    pub status: TrackingStatus,
    pub primary: Trajectory,
    pub secondary: Option<Trajectory>,
}

/// Drives the frame source and tracker workers for one run.
pub struct TrackingLoop<'a> {
    params: &'a GeneratorParams,
    backend: &'a dyn MediaBackend,
    projector: &'a dyn Projector,
    keys: Arc<KeyQueue>,
    video_info: VideoInfo,
    tracking_fps: Vec<f64>,
    preview_scaling: f64,
    on_progress: Option<Box<dyn FnMut(u64) + 'a>>,
}

impl<'a> TrackingLoop<'a> {
    pub fn new(
        params: &'a GeneratorParams,
        backend: &'a dyn MediaBackend,
        projector: &'a dyn Projector,
        keys: Arc<KeyQueue>,
        video_info: VideoInfo,
    ) -> Self {
        Self {
            params,
            backend,
            projector,
            keys,
            video_info,
            tracking_fps: Vec::new(),
            preview_scaling: params.preview_scaling,
            on_progress: None,
        }
    }

    /// Register a callback invoked with the frame number of every frame
    /// submitted to the trackers.
    pub fn on_progress(&mut self, callback: impl FnMut(u64) + 'a) {
        self.on_progress = Some(Box::new(callback));
    }

    /// Mean processing rate over the run so far, in frames per second.
    pub fn average_tracking_fps(&self) -> f64 {
        if self.tracking_fps.is_empty() {
            return 1.0;
        }
        self.tracking_fps.iter().sum::<f64>() / self.tracking_fps.len() as f64
    }

    fn determine_preview_scaling(&mut self, ui: &dyn Ui, frame_width: u32, frame_height: u32) {
        let scales: Vec<f64> = ui
            .monitors()
            .iter()
            .filter(|(w, h)| w > h)
            .map(|&(w, h)| {
                (w as f64 / frame_width as f64).min(h as f64 / frame_height as f64)
            })
            .collect();

        match scales.iter().copied().fold(None::<f64>, |acc, s| {
            Some(acc.map_or(s, |a| a.max(s)))
        }) {
            // Assume scripting happens on the largest monitor.
            Some(max_scale) => self.preview_scaling = self.params.preview_scaling * max_scale,
            None => warn!("monitor resolution info not found, keeping configured preview scaling"),
        }
    }

    fn overlay_lines(&mut self, fps: f64, frame_num: u64) -> Vec<String> {
        let current = frame_to_timestamp(frame_num + self.params.start_frame, self.video_info.fps);
        let end_frame = if self.params.end_frame < 1 {
            self.video_info.length
        } else {
            self.params.end_frame as u64
        };
        let end = frame_to_timestamp(end_frame, self.video_info.fps);
        vec![
            format!("{} fps", fps as i64),
            "Press 'q' if the tracking point shifts or a video cut occurred".to_string(),
            format!(
                "{} / {}",
                &current[..current.len() - 4],
                &end[..end.len() - 4]
            ),
        ]
    }

    /// Run the loop to completion.
    ///
    /// Returns the final status and the captured trajectories; the source
    /// and the tracker workers are stopped on every exit path.
    pub fn run(
        &mut self,
        ui: &mut dyn Ui,
        tracker_factory: &TrackerFactory,
    ) -> Result<TrackingOutcome, PipelineError> {
        let path = self.params.video_path.clone();
        let path_str = path.display().to_string();

        let first_frame = self
            .backend
            .get_frame(&path, self.params.start_frame)
            .ok_or_else(|| MediaError::Decode(path_str.clone(), self.params.start_frame))?;

        let mut projection = self.params.projection.clone();
        if projection.is_vr() {
            projection = self
                .projector
                .configure_vr(&first_frame, projection, &self.keys);
        } else {
            projection.resolve_aspect(first_frame.width(), first_frame.height());
        }
        self.determine_preview_scaling(
            ui,
            projection.width.max(1) as u32,
            projection.height.max(1) as u32,
        );

        let mut source = self
            .backend
            .open(&path, &projection, self.params.start_frame)?;

        let seed_frame = source
            .read()
            .ok_or_else(|| MediaError::Decode(path_str, self.params.start_frame))?;

        let roi_options = RoiOptions {
            use_zoom: self.params.use_zoom,
            zoom_factor: self.params.zoom_factor,
            preview_scaling: self.preview_scaling,
        };

        let primary_seed = ui.select_roi(&seed_frame, "Select primary feature", &roi_options);
        let mut primary_tracker = tracker_factory(&seed_frame, primary_seed);
        let mut primary = Trajectory::new();
        primary.push(primary_seed);

        let mut secondary: Option<Trajectory> = None;
        let mut secondary_tracker = None;
        let mut prev_secondary = BoundingBox::default();
        if self.params.track_secondary {
            let mut prompt = seed_frame.clone();
            prompt.draw_box(&primary_seed, PRIMARY_BOX_COLOR, 3);
            let secondary_seed = ui.select_roi(&prompt, "Select secondary feature", &roi_options);
            secondary_tracker = Some(tracker_factory(&seed_frame, secondary_seed));
            let mut trajectory = Trajectory::new();
            trajectory.push(secondary_seed);
            secondary = Some(trajectory);
            prev_secondary = secondary_seed;
        }

        let skip = self.params.skip_frames;
        let cycle_ms = if self.params.max_playback_fps > skip + 1 {
            (1000.0 / self.params.max_playback_fps as f64) * (skip + 1) as f64
        } else {
            0.0
        };

        self.keys.clear();
        let mut status = TrackingStatus::EndOfVideo;
        let mut last_frame: Option<Frame> = None;
        let mut prev_primary = primary_seed;
        // The seed frame counts as frame 1.
        let mut frame_num: u64 = 1;
        let mut fps_timer = Instant::now();

        while source.is_open() {
            let cycle_start = Instant::now();
            let frame = source.read();
            frame_num += 1;

            let Some(frame) = frame else {
                status = if source.is_open() {
                    TrackingStatus::CorruptFrame
                } else {
                    TrackingStatus::EndOfVideo
                };
                break;
            };

            // Compare against 1 so the first stride after the seed matches
            // the following ones; the interpolation depends on it.
            if skip > 0 && frame_num % (skip as u64 + 1) != 1 {
                continue;
            }

            if self.params.end_frame > 0
                && (frame_num + self.params.start_frame) as i64 >= self.params.end_frame
            {
                status = TrackingStatus::StoppedAtActionPoint;
                break;
            }

            primary_tracker.update(frame.clone());
            if let Some(tracker) = secondary_tracker.as_mut() {
                tracker.update(frame.clone());
            }
            if let Some(callback) = self.on_progress.as_mut() {
                callback(frame_num);
            }

            if let Some(prev) = last_frame.take() {
                // Process the previous iteration while the workers chew on
                // the frame just submitted.
                primary.append_interpolated(prev_primary, skip);
                let mut annotated = prev;
                annotated.draw_box(
                    primary.last().expect("primary has the seed box"),
                    PRIMARY_BOX_COLOR,
                    3,
                );
                if let Some(trajectory) = secondary.as_mut() {
                    trajectory.append_interpolated(prev_secondary, skip);
                    annotated.draw_box(
                        trajectory.last().expect("secondary has the seed box"),
                        SECONDARY_BOX_COLOR,
                        3,
                    );
                }

                let elapsed = fps_timer.elapsed().as_secs_f64().max(1e-9);
                let fps = (skip + 1) as f64 / elapsed;
                self.tracking_fps.push(fps);
                fps_timer = Instant::now();

                let overlay = self.overlay_lines(fps, frame_num);
                ui.show(&annotated, &overlay);

                if self.keys.was_key_pressed('q') {
                    status = TrackingStatus::StoppedByUser;
                    let drop_count = 3 * (self.average_tracking_fps() + 1.0).round() as usize;
                    primary.truncate_tail(drop_count);
                    if let Some(trajectory) = secondary.as_mut() {
                        trajectory.truncate_tail(drop_count);
                    }
                    break;
                }
            }

            let result = primary_tracker.result();
            if !result.success {
                status = TrackingStatus::TrackerLost(Target::Primary);
                let drop_count = 3 * (skip as usize + 1);
                primary.truncate_tail(drop_count);
                if let Some(trajectory) = secondary.as_mut() {
                    trajectory.truncate_tail(drop_count);
                }
                break;
            }
            prev_primary = result.bbox;

            if let Some(tracker) = secondary_tracker.as_mut() {
                let result = tracker.result();
                if !result.success {
                    status = TrackingStatus::TrackerLost(Target::Secondary);
                    let drop_count = 3 * (skip as usize + 1);
                    primary.truncate_tail(drop_count);
                    if let Some(trajectory) = secondary.as_mut() {
                        trajectory.truncate_tail(drop_count);
                    }
                    break;
                }
                prev_secondary = result.bbox;
            }

            last_frame = Some(frame);

            if cycle_ms > 0.0 {
                let elapsed_ms = cycle_start.elapsed().as_secs_f64() * 1000.0;
                if cycle_ms > elapsed_ms {
                    thread::sleep(Duration::from_secs_f64((cycle_ms - elapsed_ms) / 1000.0));
                }
            }
        }

        source.stop();
        info!("{status}");

        Ok(TrackingOutcome {
            status,
            primary,
            secondary,
        })
    }
}
