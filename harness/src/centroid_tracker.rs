//! Brightness-centroid tracker for the synthetic fixtures.
//!
//! Follows the brightest region inside a search window around the previous
//! box, the same intensity-weighted centroid idea fine-guidance systems
//! use, reduced to what the synthetic blob needs.

use pipeline::interfaces::FeatureTracker;
use pipeline::worker::TrackerWorker;
use shared::{BoundingBox, Frame};

/// Single-target tracker stepping one frame at a time.
#[derive(Debug, Clone)]
pub struct CentroidTracker {
    bbox: BoundingBox,
    /// Pixels of slack around the previous box when searching
    search_margin: f64,
    /// Minimum channel value counted as signal
    threshold: u8,
    /// Report the target lost after this many steps (test hook)
    fail_after: Option<u64>,
    steps: u64,
}

impl CentroidTracker {
    pub fn new(_seed_frame: &Frame, seed_bbox: BoundingBox) -> Self {
        Self {
            bbox: seed_bbox,
            search_margin: 16.0,
            threshold: 64,
            fail_after: None,
            steps: 0,
        }
    }

    /// Force a tracking loss after `steps` updates.
    pub fn with_fail_after(mut self, steps: u64) -> Self {
        self.fail_after = Some(steps);
        self
    }

    /// Track the target into `frame`. Returns the updated box, or `None`
    /// once the target is lost.
    pub fn step(&mut self, frame: &Frame) -> Option<BoundingBox> {
        self.steps += 1;
        if let Some(fail_after) = self.fail_after {
            if self.steps >= fail_after {
                return None;
            }
        }

        let row_lo = (self.bbox.y - self.search_margin).max(0.0) as usize;
        let row_hi = ((self.bbox.y + self.bbox.h + self.search_margin) as usize)
            .min(frame.height() as usize - 1);
        let col_lo = (self.bbox.x - self.search_margin).max(0.0) as usize;
        let col_hi = ((self.bbox.x + self.bbox.w + self.search_margin) as usize)
            .min(frame.width() as usize - 1);

        let mut weight = 0.0f64;
        let mut sum_row = 0.0f64;
        let mut sum_col = 0.0f64;
        for row in row_lo..=row_hi {
            for col in col_lo..=col_hi {
                let (b, g, r) = frame.pixel(row, col);
                let value = b.max(g).max(r);
                if value >= self.threshold {
                    let v = value as f64;
                    weight += v;
                    sum_row += v * row as f64;
                    sum_col += v * col as f64;
                }
            }
        }

        if weight == 0.0 {
            return None;
        }

        let center_row = sum_row / weight;
        let center_col = sum_col / weight;
        self.bbox = BoundingBox::new(
            (center_col - self.bbox.w / 2.0).round(),
            (center_row - self.bbox.h / 2.0).round(),
            self.bbox.w,
            self.bbox.h,
        );
        Some(self.bbox)
    }

    /// Move the tracker onto a worker thread.
    pub fn into_worker(self, label: &str) -> TrackerWorker {
        let mut tracker = self;
        TrackerWorker::spawn(label, move |frame| tracker.step(frame))
    }

    /// Tracker factory for the pipeline, optionally failing each spawned
    /// tracker after `fail_after` steps.
    pub fn factory(
        fail_after: Option<u64>,
    ) -> impl Fn(&Frame, BoundingBox) -> Box<dyn FeatureTracker> {
        move |seed_frame, seed_bbox| {
            let mut tracker = CentroidTracker::new(seed_frame, seed_bbox);
            if let Some(steps) = fail_after {
                tracker = tracker.with_fail_after(steps);
            }
            Box::new(tracker.into_worker("centroid"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::MotionProfile;
    use crate::synthetic_video::SyntheticVideo;

    #[test]
    fn test_tracks_moving_blob() {
        let video = SyntheticVideo::new(60, MotionProfile::SineY {
            amplitude: 30.0,
            period_frames: 60.0,
        });
        let seed = video.render_frame(0);
        let mut tracker = CentroidTracker::new(&seed, video.primary_bbox_at(0));

        for frame_index in 1..60 {
            let frame = video.render_frame(frame_index);
            let bbox = tracker.step(&frame).expect("target stays visible");
            let truth = video.primary_bbox_at(frame_index);
            assert!(
                (bbox.y - truth.y).abs() <= 3.0,
                "frame {frame_index}: tracked y {} vs truth {}",
                bbox.y,
                truth.y
            );
        }
    }

    #[test]
    fn test_reports_loss_on_empty_window() {
        let video = SyntheticVideo::new(2, MotionProfile::Stationary);
        let seed = video.render_frame(0);
        // Seed far away from any blob: nothing above threshold in window.
        let mut tracker =
            CentroidTracker::new(&seed, BoundingBox::new(260.0, 190.0, 16.0, 16.0));
        let frame = video.render_frame(1);
        assert!(tracker.step(&frame).is_none());
    }

    #[test]
    fn test_fail_after_hook() {
        let video = SyntheticVideo::new(10, MotionProfile::Stationary);
        let seed = video.render_frame(0);
        let mut tracker =
            CentroidTracker::new(&seed, video.primary_bbox_at(0)).with_fail_after(3);
        for i in 1..=2 {
            assert!(tracker.step(&video.render_frame(i)).is_some());
        }
        assert!(tracker.step(&video.render_frame(3)).is_none());
    }
}
