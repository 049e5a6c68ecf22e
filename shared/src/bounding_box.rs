//! Bounding boxes and per-target box trajectories.
//!
//! Boxes are axis-aligned `(x, y, w, h)` rectangles in original video pixel
//! space. Trackers emit integer-valued boxes; interpolation for skipped
//! frames produces real-valued ones, so all fields are `f64`.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in video pixel coordinates.
///
/// `x`/`y` is the top-left corner, `w`/`h` the extent. Integer on emission
/// from a tracker, real-valued when produced by interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge (pixels)
    pub x: f64,
    /// Top edge (pixels)
    pub y: f64,
    /// Width (pixels)
    pub w: f64,
    /// Height (pixels)
    pub h: f64,
}

impl BoundingBox {
    /// Create a box from its top-left corner and extent.
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Create a box from integer pixel coordinates.
    pub fn from_ints(x: i64, y: i64, w: i64, h: i64) -> Self {
        Self::new(x as f64, y as f64, w as f64, h as f64)
    }

    /// Center point of the box.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Componentwise linear interpolation between `self` (t = 0) and
    /// `other` (t = 1).
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            x: self.x + t * (other.x - self.x),
            y: self.y + t * (other.y - self.y),
            w: self.w + t * (other.w - self.w),
            h: self.h + t * (other.h - self.h),
        }
    }

    /// Top-left corner rounded to whole pixels.
    pub fn top_left_rounded(&self) -> (i64, i64) {
        (self.x.round() as i64, self.y.round() as i64)
    }

    /// Extent rounded to whole pixels.
    pub fn size_rounded(&self) -> (i64, i64) {
        (self.w.round() as i64, self.h.round() as i64)
    }
}

/// Ordered sequence of bounding boxes for one tracked target, one entry per
/// processed or interpolated frame.
///
/// Trajectories are append-only while tracking runs; the tail may be
/// truncated once when the operator aborts or a tracker fails.
#[derive(Debug, Clone, Default)]
pub struct Trajectory {
    boxes: Vec<BoundingBox>,
}

impl Trajectory {
    /// Create an empty trajectory.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// The most recently appended box.
    pub fn last(&self) -> Option<&BoundingBox> {
        self.boxes.last()
    }

    pub fn get(&self, index: usize) -> Option<&BoundingBox> {
        self.boxes.get(index)
    }

    /// All boxes in append order.
    pub fn as_slice(&self) -> &[BoundingBox] {
        &self.boxes
    }

    /// Append a box without interpolation (seed boxes).
    pub fn push(&mut self, bbox: BoundingBox) {
        self.boxes.push(bbox);
    }

    /// Append `bbox`, first filling in `skip` linearly interpolated boxes
    /// between the current tail and `bbox`.
    ///
    /// The inserted boxes lie at parameters `i / (skip + 1)` for
    /// `i in 1..=skip` on the straight line between the previous tail and
    /// the new box. On an empty trajectory only `bbox` is appended.
    pub fn append_interpolated(&mut self, bbox: BoundingBox, skip: u32) {
        if skip > 0 {
            if let Some(prev) = self.boxes.last().copied() {
                for i in 1..=skip {
                    let t = i as f64 / (skip + 1) as f64;
                    self.boxes.push(prev.lerp(&bbox, t));
                }
            }
        }
        self.boxes.push(bbox);
    }

    /// Remove exactly `min(n, len)` entries from the tail.
    ///
    /// Used to discard the visually unreliable tail after an operator abort
    /// or a tracker loss.
    pub fn truncate_tail(&mut self, n: usize) {
        let new_len = self.boxes.len().saturating_sub(n);
        self.boxes.truncate(new_len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lerp_endpoints_and_midpoint() {
        let a = BoundingBox::new(0.0, 10.0, 4.0, 8.0);
        let b = BoundingBox::new(10.0, 20.0, 8.0, 4.0);

        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);

        let mid = a.lerp(&b, 0.5);
        assert_relative_eq!(mid.x, 5.0);
        assert_relative_eq!(mid.y, 15.0);
        assert_relative_eq!(mid.w, 6.0);
        assert_relative_eq!(mid.h, 6.0);
    }

    #[test]
    fn test_append_interpolated_fills_skipped_frames() {
        let mut traj = Trajectory::new();
        traj.push(BoundingBox::new(0.0, 0.0, 10.0, 10.0));
        traj.append_interpolated(BoundingBox::new(3.0, 6.0, 10.0, 10.0), 2);

        assert_eq!(traj.len(), 4);
        // Inserted boxes sit at t = 1/3 and t = 2/3 on the interpolant.
        assert_relative_eq!(traj.get(1).unwrap().x, 1.0);
        assert_relative_eq!(traj.get(1).unwrap().y, 2.0);
        assert_relative_eq!(traj.get(2).unwrap().x, 2.0);
        assert_relative_eq!(traj.get(2).unwrap().y, 4.0);
        assert_relative_eq!(traj.get(3).unwrap().x, 3.0);
    }

    #[test]
    fn test_append_interpolated_seed_case() {
        let mut traj = Trajectory::new();
        traj.append_interpolated(BoundingBox::new(5.0, 5.0, 2.0, 2.0), 3);
        assert_eq!(traj.len(), 1);
    }

    #[test]
    fn test_append_interpolated_no_skip() {
        let mut traj = Trajectory::new();
        traj.push(BoundingBox::new(0.0, 0.0, 1.0, 1.0));
        traj.append_interpolated(BoundingBox::new(1.0, 1.0, 1.0, 1.0), 0);
        assert_eq!(traj.len(), 2);
    }

    #[test]
    fn test_truncate_tail_exact_count() {
        let mut traj = Trajectory::new();
        for i in 0..10 {
            traj.push(BoundingBox::new(i as f64, 0.0, 1.0, 1.0));
        }
        traj.truncate_tail(3);
        assert_eq!(traj.len(), 7);
        assert_relative_eq!(traj.last().unwrap().x, 6.0);
    }

    #[test]
    fn test_truncate_tail_clamps_at_empty() {
        let mut traj = Trajectory::new();
        traj.push(BoundingBox::default());
        traj.push(BoundingBox::default());
        traj.truncate_tail(5);
        assert!(traj.is_empty());
    }
}
