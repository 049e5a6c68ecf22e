//! Synthetic video backend.
//!
//! Renders a bright primary blob moving along a [`MotionProfile`] over a
//! dark, lightly noisy background, with an optional static secondary blob.
//! Implements both the random-access backend and the streaming source the
//! tracking loop consumes.

use std::path::Path;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use pipeline::config::ProjectionConfig;
use pipeline::interfaces::{FrameSource, MediaBackend, MediaError};
use shared::{BoundingBox, Frame, VideoInfo};

use crate::motion::MotionProfile;

/// Background noise stays well below this so the centroid tracker's
/// threshold cleanly separates blob from floor.
const NOISE_AMPLITUDE: u8 = 24;
const BLOB_VALUE: u8 = 255;

/// A procedurally generated video clip.
#[derive(Debug, Clone)]
pub struct SyntheticVideo {
    pub width: u32,
    pub height: u32,
    pub frame_count: u64,
    pub fps: f64,
    pub motion: MotionProfile,
    /// Base center of the moving primary blob
    pub primary_center: (f64, f64),
    /// Center of the static secondary blob, if present
    pub secondary_center: Option<(f64, f64)>,
    /// Half extent of the square blobs in pixels
    pub blob_half_size: u32,
    /// Seed for per-frame background noise; `None` renders clean frames
    pub noise_seed: Option<u64>,
    /// Frame index at which the stream reports a decode failure
    pub corrupt_at: Option<u64>,
}

impl SyntheticVideo {
    /// A 320x240, 30 fps clip with a moving primary and static secondary
    /// blob.
    pub fn new(frame_count: u64, motion: MotionProfile) -> Self {
        Self {
            width: 320,
            height: 240,
            frame_count,
            fps: 30.0,
            motion,
            primary_center: (160.0, 120.0),
            secondary_center: Some((48.0, 48.0)),
            blob_half_size: 8,
            noise_seed: Some(7),
            corrupt_at: None,
        }
    }

    /// Ground-truth box of the primary blob at `frame_index`.
    pub fn primary_bbox_at(&self, frame_index: u64) -> BoundingBox {
        let (dx, dy) = self.motion.offset(frame_index);
        let half = self.blob_half_size as f64;
        BoundingBox::new(
            (self.primary_center.0 + dx - half).round(),
            (self.primary_center.1 + dy - half).round(),
            2.0 * half,
            2.0 * half,
        )
    }

    /// Ground-truth box of the secondary blob, if one is rendered.
    pub fn secondary_bbox(&self) -> Option<BoundingBox> {
        let half = self.blob_half_size as f64;
        self.secondary_center.map(|(cx, cy)| {
            BoundingBox::new((cx - half).round(), (cy - half).round(), 2.0 * half, 2.0 * half)
        })
    }

    /// Render the frame at `frame_index`.
    pub fn render_frame(&self, frame_index: u64) -> Frame {
        let mut frame = Frame::new(self.width, self.height);

        if let Some(seed) = self.noise_seed {
            let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(frame_index));
            let data = frame.data_mut();
            for v in data.iter_mut() {
                *v = rng.gen_range(0..NOISE_AMPLITUDE);
            }
        }

        let (dx, dy) = self.motion.offset(frame_index);
        let primary = (self.primary_center.0 + dx, self.primary_center.1 + dy);
        self.draw_blob(&mut frame, primary);
        if let Some(secondary) = self.secondary_center {
            self.draw_blob(&mut frame, secondary);
        }
        frame
    }

    fn draw_blob(&self, frame: &mut Frame, center: (f64, f64)) {
        let half = self.blob_half_size as i64;
        let (cx, cy) = (center.0.round() as i64, center.1.round() as i64);
        let data = frame.data_mut();
        let (rows, cols) = (data.shape()[0] as i64, data.shape()[1] as i64);
        for row in (cy - half).max(0)..=(cy + half).min(rows - 1) {
            for col in (cx - half).max(0)..=(cx + half).min(cols - 1) {
                for channel in 0..3 {
                    data[[row as usize, col as usize, channel]] = BLOB_VALUE;
                }
            }
        }
    }
}

impl MediaBackend for SyntheticVideo {
    fn video_info(&self, _path: &Path) -> Result<VideoInfo, MediaError> {
        Ok(VideoInfo::new(
            self.fps,
            self.frame_count,
            self.width,
            self.height,
        ))
    }

    fn get_frame(&self, _path: &Path, index: u64) -> Option<Frame> {
        if index >= self.frame_count {
            return None;
        }
        Some(self.render_frame(index))
    }

    fn open(
        &self,
        _path: &Path,
        _config: &ProjectionConfig,
        start_frame: u64,
    ) -> Result<Box<dyn FrameSource>, MediaError> {
        Ok(Box::new(SyntheticStream {
            video: self.clone(),
            next_frame: start_frame,
            open: true,
        }))
    }
}

/// Streaming view over a [`SyntheticVideo`].
pub struct SyntheticStream {
    video: SyntheticVideo,
    next_frame: u64,
    open: bool,
}

impl FrameSource for SyntheticStream {
    fn read(&mut self) -> Option<Frame> {
        if !self.open {
            return None;
        }
        if Some(self.next_frame) == self.video.corrupt_at {
            // Decode failure mid-stream: the stream itself stays open.
            return None;
        }
        if self.next_frame >= self.video.frame_count {
            self.open = false;
            return None;
        }
        let frame = self.video.render_frame(self.next_frame);
        self.next_frame += 1;
        Some(frame)
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn stop(&mut self) {
        self.open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_is_rendered_at_ground_truth() {
        let video = SyntheticVideo::new(10, MotionProfile::Stationary);
        let frame = video.render_frame(0);
        let bbox = video.primary_bbox_at(0);
        let (cx, cy) = bbox.center();
        assert_eq!(
            frame.pixel(cy as usize, cx as usize),
            (BLOB_VALUE, BLOB_VALUE, BLOB_VALUE)
        );
    }

    #[test]
    fn test_noise_stays_below_blob_value() {
        let video = SyntheticVideo::new(1, MotionProfile::Stationary);
        let frame = video.render_frame(0);
        // A corner pixel far from both blobs only carries noise.
        let (b, g, r) = frame.pixel(video.height as usize - 1, video.width as usize - 1);
        assert!(b < NOISE_AMPLITUDE && g < NOISE_AMPLITUDE && r < NOISE_AMPLITUDE);
    }

    #[test]
    fn test_stream_reaches_end_of_video() {
        let video = SyntheticVideo::new(3, MotionProfile::Stationary);
        let mut stream = video
            .open(Path::new("synthetic"), &ProjectionConfig::default(), 0)
            .unwrap();
        for _ in 0..3 {
            assert!(stream.read().is_some());
        }
        assert!(stream.read().is_none());
        assert!(!stream.is_open());
    }

    #[test]
    fn test_stream_corrupt_frame_keeps_stream_open() {
        let mut video = SyntheticVideo::new(10, MotionProfile::Stationary);
        video.corrupt_at = Some(2);
        let mut stream = video
            .open(Path::new("synthetic"), &ProjectionConfig::default(), 0)
            .unwrap();
        assert!(stream.read().is_some());
        assert!(stream.read().is_some());
        assert!(stream.read().is_none());
        assert!(stream.is_open());
    }

    #[test]
    fn test_get_frame_past_end_is_none() {
        let video = SyntheticVideo::new(5, MotionProfile::Stationary);
        assert!(video.get_frame(Path::new("synthetic"), 4).is_some());
        assert!(video.get_frame(Path::new("synthetic"), 5).is_none());
    }
}
