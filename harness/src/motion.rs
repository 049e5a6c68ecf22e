//! Motion profiles for the synthetic video source.

use std::f64::consts::TAU;

/// Path of the synthetic blob over time, as an offset from its base
/// position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionProfile {
    /// No motion
    Stationary,
    /// Sinusoidal oscillation along x
    SineX { amplitude: f64, period_frames: f64 },
    /// Sinusoidal oscillation along y
    SineY { amplitude: f64, period_frames: f64 },
    /// Circular motion combining x and y
    Circle { radius: f64, period_frames: f64 },
}

impl MotionProfile {
    /// Offset from the base position at the given frame.
    pub fn offset(&self, frame_index: u64) -> (f64, f64) {
        match *self {
            MotionProfile::Stationary => (0.0, 0.0),
            MotionProfile::SineX {
                amplitude,
                period_frames,
            } => {
                let phase = TAU * frame_index as f64 / period_frames;
                (amplitude * phase.sin(), 0.0)
            }
            MotionProfile::SineY {
                amplitude,
                period_frames,
            } => {
                let phase = TAU * frame_index as f64 / period_frames;
                (0.0, amplitude * phase.sin())
            }
            MotionProfile::Circle {
                radius,
                period_frames,
            } => {
                let phase = TAU * frame_index as f64 / period_frames;
                (radius * phase.cos(), radius * phase.sin())
            }
        }
    }

    /// Look up a profile by name, as used by the demo binary.
    pub fn by_name(name: &str, amplitude: f64, period_frames: f64) -> Option<Self> {
        match name {
            "stationary" => Some(MotionProfile::Stationary),
            "sine_x" => Some(MotionProfile::SineX {
                amplitude,
                period_frames,
            }),
            "sine_y" => Some(MotionProfile::SineY {
                amplitude,
                period_frames,
            }),
            "circle" => Some(MotionProfile::Circle {
                radius: amplitude,
                period_frames,
            }),
            _ => None,
        }
    }
}
