//! Scalar motion scores derived from bounding-box trajectories.

use shared::Trajectory;
use signal::ops::scale;

use crate::config::Direction;

/// Paired x/y motion signals, index-aligned with the trajectories they
/// were computed from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Score {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Score {
    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn axis(&self, direction: Direction) -> &[f64] {
        match direction {
            Direction::X => &self.x,
            Direction::Y => &self.y,
        }
    }

    fn axis_mut(&mut self, direction: Direction) -> &mut Vec<f64> {
        match direction {
            Direction::X => &mut self.x,
            Direction::Y => &mut self.y,
        }
    }
}

/// Reduce the tracked trajectories to x/y scores scaled into [0, 100].
///
/// With both targets present the score is the per-frame difference of the
/// box origins (primary minus secondary); with only the primary target the
/// score is the distance below the trajectory's own maximum.
pub fn calculate(primary: &Trajectory, secondary: Option<&Trajectory>) -> Score {
    let mut score = match secondary {
        Some(secondary) => {
            let x = primary
                .as_slice()
                .iter()
                .zip(secondary.as_slice())
                .map(|(p, s)| p.x - s.x)
                .collect();
            let y = primary
                .as_slice()
                .iter()
                .zip(secondary.as_slice())
                .map(|(p, s)| p.y - s.y)
                .collect();
            Score { x, y }
        }
        None => {
            let boxes = primary.as_slice();
            let max_x = boxes.iter().map(|b| b.x).fold(f64::NEG_INFINITY, f64::max);
            let max_y = boxes.iter().map(|b| b.y).fold(f64::NEG_INFINITY, f64::max);
            Score {
                x: boxes.iter().map(|b| max_x - b.x).collect(),
                y: boxes.iter().map(|b| max_y - b.y).collect(),
            }
        }
    };

    score.x = scale(&score.x, 0.0, 100.0);
    score.y = scale(&score.y, 0.0, 100.0);
    score
}

/// Rescale one axis to the operator's calibrated range.
pub fn calibrate(score: &mut Score, direction: Direction, desired_min: f64, desired_max: f64) {
    let axis = score.axis_mut(direction);
    *axis = scale(axis, desired_min, desired_max);
}

/// Index of the smallest value of `axis`.
pub fn argmin(axis: &[f64]) -> usize {
    axis.iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).expect("score contains NaN"))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Index of the largest value of `axis`.
pub fn argmax(axis: &[f64]) -> usize {
    axis.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).expect("score contains NaN"))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
