//! Video stream metadata.

use serde::{Deserialize, Serialize};

/// Metadata describing a video file, as reported by the frame source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Frames per second
    pub fps: f64,
    /// Total number of frames
    pub length: u64,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
}

impl VideoInfo {
    pub fn new(fps: f64, length: u64, width: u32, height: u32) -> Self {
        Self {
            fps,
            length,
            width,
            height,
        }
    }

    /// Total duration of the stream in milliseconds.
    pub fn duration_millis(&self) -> i64 {
        crate::timecode::frame_to_millis(self.length, self.fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration() {
        let info = VideoInfo::new(30.0, 900, 1920, 1080);
        assert_eq!(info.duration_millis(), 30_000);
    }
}
