//! Base-point and additional-point searches over a scalar signal.
//!
//! All algorithms return index lists into the input signal. Base points
//! come from direction changes or local min/max extraction; additional
//! points from high-second-derivative or maximum-deviation searches and
//! are merged into the base list by [`crate::merge::merge`].

use itertools::Itertools;
use log::info;

use crate::ops::{moving_average, moving_std, second_derivative};
use crate::{AdditionalPointAlgorithm, BasePointAlgorithm, SignalParams};

/// Indices where the signal's direction of travel flips.
///
/// An index is monotone at scale `filter_len` when the next `filter_len`
/// steps all move the same way. Direction is assigned pairwise between
/// consecutive monotone indices; every monotone index whose direction
/// differs from its predecessor's is emitted, offset by the first monotone
/// index of the signal.
pub fn direction_changes(signal: &[f64], filter_len: usize) -> Vec<usize> {
    if filter_len == 0 || signal.len() < filter_len {
        return Vec::new();
    }

    let monotone: Vec<usize> = (0..signal.len() - filter_len)
        .filter(|&i| {
            (0..filter_len).all(|j| signal[i + j] > signal[i + j + 1])
                || (0..filter_len).all(|j| signal[i + j] < signal[i + j + 1])
        })
        .collect();

    if monotone.len() < 2 {
        return Vec::new();
    }

    let directions: Vec<i8> = monotone
        .iter()
        .tuple_windows()
        .map(|(&a, &b)| if signal[a] > signal[b] { -1 } else { 1 })
        .collect();

    let start_position = monotone[0];
    let mut current = directions[0];
    let mut changepoints = Vec::new();
    for (&idx, &dir) in monotone.iter().zip(directions.iter()) {
        if dir != current {
            changepoints.push(idx + start_position);
            current = dir;
        }
    }
    changepoints
}

/// Local extrema relative to a long moving average.
///
/// Walks the lightly smoothed signal keeping a running minimum candidate
/// while below the reference average and a running maximum candidate while
/// above it; each candidate is committed when the signal crosses back over
/// the average. Returned in commit order.
pub fn local_min_max(signal: &[f64], fps: f64, params: &SignalParams) -> Vec<usize> {
    let avg_window = (fps * params.avg_sec_for_local_min_max_extraction).round() as usize;
    let avg = moving_average(signal, avg_window);
    let smoothed = moving_average(signal, 3);

    let mut points = Vec::new();
    let mut tmp_min: Option<usize> = None;
    let mut tmp_max: Option<usize> = None;

    for pos in 0..smoothed.len() {
        if smoothed[pos] < avg[pos] {
            match tmp_min {
                Some(m) if smoothed[m] < smoothed[pos] => {}
                _ => tmp_min = Some(pos),
            }
        } else if let Some(m) = tmp_min.take() {
            points.push(m);
        }

        if smoothed[pos] > avg[pos] {
            match tmp_max {
                Some(m) if smoothed[m] > smoothed[pos] => {}
                _ => tmp_max = Some(pos),
            }
        } else if let Some(m) = tmp_max.take() {
            points.push(m);
        }
    }

    points
}

/// Change points where the second derivative spikes above `alpha` times
/// its rolling standard deviation.
///
/// Each maximal contiguous over-threshold run contributes the argmax of
/// the absolute second derivative within the run; a run still open at the
/// end of the signal is discarded.
pub fn high_second_derivative(
    signal: &[f64],
    fps: f64,
    alpha: f64,
    params: &SignalParams,
) -> Vec<usize> {
    let d2 = second_derivative(signal, 1);
    let d2_abs: Vec<f64> = d2.iter().map(|v| v.abs()).collect();
    let std_window = (fps * params.avg_sec_for_local_min_max_extraction).round() as usize;
    let std = moving_std(&d2, std_window);

    let mut changepoints = Vec::new();
    let mut run_max: Option<usize> = None;
    for pos in 0..d2_abs.len() {
        if d2_abs[pos] > alpha * std[pos] {
            match run_max {
                Some(m) if d2_abs[m] > d2_abs[pos] => {}
                _ => run_max = Some(pos),
            }
        } else if let Some(m) = run_max.take() {
            changepoints.push(m);
        }
    }
    changepoints
}

/// Points of maximum perpendicular deviation between adjacent base points.
///
/// The index axis between each base-point pair is remapped onto the span
/// of the two signal values, so deviation is measured against the chord in
/// a square coordinate frame. Pairs whose maximum deviation exceeds
/// `threshold` contribute their argmax.
pub fn edge_points(signal: &[f64], base_points: &[usize], threshold: f64) -> Vec<usize> {
    if base_points.len() < 2 {
        return Vec::new();
    }

    let mut base = base_points.to_vec();
    base.sort_unstable();

    let mut edge_points = Vec::new();
    let mut overall_max_distance = 0.0f64;
    for (&a, &b) in base.iter().tuple_windows() {
        let lo = signal[a].min(signal[b]);
        let hi = signal[a].max(signal[b]);
        let start = (lo, signal[a]);
        let end = (hi, signal[b]);
        let remap = |j: usize| (hi - lo) * (j - a) as f64 / (b - a) as f64 + lo;

        let mut max_distance = 0.0f64;
        let mut argmax = 0usize;
        for j in a..b {
            let d = perpendicular_distance(start, end, (remap(j), signal[j]));
            if d > max_distance {
                max_distance = d;
                argmax = j - a;
            }
        }

        if max_distance > overall_max_distance {
            overall_max_distance = max_distance;
        }
        if max_distance > threshold {
            edge_points.push(a + argmax);
        }
    }

    info!("max deviation between base points was {overall_max_distance:.2}");
    edge_points
}

/// Perpendicular distance from `point` to the segment `start`-`end` (2-D
/// scalar cross product). A zero-length segment yields distance 0.
pub(crate) fn perpendicular_distance(
    start: (f64, f64),
    end: (f64, f64),
    point: (f64, f64),
) -> f64 {
    let seg = (end.0 - start.0, end.1 - start.1);
    let len = (seg.0 * seg.0 + seg.1 * seg.1).sqrt();
    if len == 0.0 {
        return 0.0;
    }
    let rel = (start.0 - point.0, start.1 - point.1);
    (seg.0 * rel.1 - seg.1 * rel.0).abs() / len
}

/// Compute the decimated index list for `signal` with the selected
/// algorithms.
///
/// The base algorithm runs first; each additional algorithm's candidates
/// are merged into the running list under the temporal and geometric
/// guards of [`crate::merge::merge`].
pub fn decimate(
    signal: &[f64],
    base_algorithm: BasePointAlgorithm,
    additional_algorithms: &[AdditionalPointAlgorithm],
    fps: f64,
    params: &SignalParams,
) -> Vec<usize> {
    let mut decimated = match base_algorithm {
        BasePointAlgorithm::DirectionChanges => {
            direction_changes(signal, params.direction_change_filter_len)
        }
        BasePointAlgorithm::LocalMinMax => local_min_max(signal, fps, params),
    };

    for algorithm in additional_algorithms {
        let additional = match algorithm {
            AdditionalPointAlgorithm::HighSecondDerivative => {
                let found = high_second_derivative(
                    signal,
                    fps,
                    params.high_second_derivative_points_threshold,
                    params,
                );
                info!(
                    "high second derivative found {} new point candidates",
                    found.len()
                );
                found
            }
            AdditionalPointAlgorithm::DistanceMinimization => {
                let found = edge_points(signal, &decimated, params.distance_minimization_threshold);
                info!(
                    "distance minimization found {} new point candidates",
                    found.len()
                );
                found
            }
        };

        if !additional.is_empty() {
            decimated = crate::merge::merge(signal, &decimated, &additional, fps, params);
        }
    }

    decimated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::moving_std;
    use approx::assert_relative_eq;

    fn triangle_wave() -> Vec<f64> {
        vec![
            0.0, 1.0, 2.0, 3.0, 2.0, 1.0, 0.0, 1.0, 2.0, 3.0, 2.0, 1.0, 0.0,
        ]
    }

    #[test]
    fn test_direction_changes_on_triangle_wave() {
        let signal = triangle_wave();
        assert_eq!(direction_changes(&signal, 2), vec![3, 6, 9]);
    }

    #[test]
    fn test_direction_changes_too_short() {
        assert!(direction_changes(&[1.0, 2.0], 3).is_empty());
        assert!(direction_changes(&[], 3).is_empty());
    }

    #[test]
    fn test_direction_changes_constant_signal() {
        let signal = vec![5.0; 100];
        assert!(direction_changes(&signal, 2).is_empty());
    }

    #[test]
    fn test_direction_changes_monotone_signal() {
        let signal: Vec<f64> = (0..50).map(|i| i as f64).collect();
        assert!(direction_changes(&signal, 3).is_empty());
    }

    #[test]
    fn test_direction_changes_offset_convention() {
        // A flat lead-in shifts the first monotone index; the emitted
        // changepoints carry that offset on top of their absolute index.
        let mut signal = vec![0.0; 4];
        signal.extend([1.0, 2.0, 3.0, 2.0, 1.0, 0.0, 1.0, 2.0, 3.0]);
        let changes = direction_changes(&signal, 2);
        let bare: Vec<usize> = vec![6, 9];
        let first_monotone = 3; // index of the last flat sample before the ramp
        let expected: Vec<usize> = bare.iter().map(|c| c + first_monotone).collect();
        assert_eq!(changes, expected);
    }

    #[test]
    fn test_local_min_max_constant_signal_is_empty() {
        let signal = vec![42.0; 100];
        let params = SignalParams::default();
        assert!(local_min_max(&signal, 10.0, &params).is_empty());
    }

    #[test]
    fn test_local_min_max_finds_sine_extrema() {
        let signal: Vec<f64> = (0..200)
            .map(|i| 50.0 + 40.0 * (2.0 * std::f64::consts::PI * i as f64 / 50.0).sin())
            .collect();
        let params = SignalParams::default();
        let points = local_min_max(&signal, 10.0, &params);

        assert!(points.len() >= 6, "expected most extrema, got {points:?}");
        for &p in &points {
            let v = signal[p];
            assert!(
                v < 30.0 || v > 70.0,
                "committed point {p} (value {v}) is not near an extremum"
            );
        }
    }

    #[test]
    fn test_local_min_max_survives_measurement_noise() {
        use rand::Rng;
        use rand::SeedableRng;
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(42);

        let signal: Vec<f64> = (0..200)
            .map(|i| {
                50.0 + 40.0 * (2.0 * std::f64::consts::PI * i as f64 / 50.0).sin()
                    + rng.gen_range(-2.0..2.0)
            })
            .collect();
        let params = SignalParams::default();
        let points = local_min_max(&signal, 10.0, &params);

        assert!(points.len() >= 6);
        for &p in &points {
            let v = signal[p];
            assert!(v < 35.0 || v > 65.0, "noisy extremum {p} at {v}");
        }
    }

    #[test]
    fn test_high_second_derivative_linear_signal_is_empty() {
        let signal: Vec<f64> = (0..100).map(|i| 2.0 * i as f64).collect();
        let params = SignalParams::default();
        assert!(high_second_derivative(&signal, 5.0, 1.2, &params).is_empty());
    }

    #[test]
    fn test_high_second_derivative_points_exceed_threshold() {
        // Ramp into a plateau: curvature spikes at the corner.
        let mut signal: Vec<f64> = (0..50).map(|i| i as f64).collect();
        signal.extend(vec![49.0; 50]);
        let params = SignalParams::default();
        let alpha = params.high_second_derivative_points_threshold;
        let points = high_second_derivative(&signal, 5.0, alpha, &params);
        assert!(!points.is_empty(), "corner curvature was not detected");

        let d2 = second_derivative(&signal, 1);
        let window = (5.0 * params.avg_sec_for_local_min_max_extraction).round() as usize;
        let std = moving_std(&d2, window);
        for &p in &points {
            assert!(d2[p].abs() > alpha * std[p]);
        }
    }

    #[test]
    fn test_edge_points_detects_deviation() {
        // Ramp with a spike dips far from the chord between its endpoints.
        let mut signal: Vec<f64> = (0..=6).map(|i| 10.0 + i as f64 * 10.0 / 6.0).collect();
        signal[1] = 5.0;
        signal[2] = 0.0;
        signal[3] = 5.0;
        let base = vec![0, 6];

        let found = edge_points(&signal, &base, 9.0);
        assert_eq!(found, vec![2]);
        assert!(edge_points(&signal, &base, 15.0).is_empty());
    }

    #[test]
    fn test_edge_points_needs_two_base_points() {
        let signal = vec![1.0, 2.0, 3.0];
        assert!(edge_points(&signal, &[1], 1.0).is_empty());
        assert!(edge_points(&signal, &[], 1.0).is_empty());
    }

    #[test]
    fn test_edge_points_degenerate_segment() {
        // Equal endpoint values collapse the remapped segment to a point;
        // no deviation can be measured, so nothing is emitted.
        let signal = vec![5.0, 0.0, 5.0];
        assert!(edge_points(&signal, &[0, 2], 1.0).is_empty());
    }

    #[test]
    fn test_perpendicular_distance() {
        let d = perpendicular_distance((0.0, 0.0), (10.0, 0.0), (5.0, 3.0));
        assert_relative_eq!(d, 3.0);
        let d = perpendicular_distance((0.0, 0.0), (10.0, 10.0), (10.0, 0.0));
        assert_relative_eq!(d, 10.0 / 2.0_f64.sqrt());
        assert_relative_eq!(
            perpendicular_distance((1.0, 1.0), (1.0, 1.0), (4.0, 5.0)),
            0.0
        );
    }

    #[test]
    fn test_decimate_direction_changes_no_extra_points_on_triangle() {
        // Every segment of the triangle wave lies on its chord, so
        // distance minimization adds nothing.
        let signal = triangle_wave();
        let mut params = SignalParams::default();
        params.direction_change_filter_len = 2;
        let decimated = decimate(
            &signal,
            BasePointAlgorithm::DirectionChanges,
            &[AdditionalPointAlgorithm::DistanceMinimization],
            10.0,
            &params,
        );
        assert_eq!(decimated, vec![3, 6, 9]);
    }
}
