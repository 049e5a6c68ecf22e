//! Merging of additional points into a base point list.

use log::info;

use crate::ops::{find_nearest, moving_average, Side};
use crate::points::{local_min_max, perpendicular_distance};
use crate::{Extrema, SignalError, SignalParams};

/// Merge `additional_points` into a sorted copy of `base_points`.
///
/// A candidate survives only when it is temporally clear of every already
/// merged point and deviates far enough from the chord between its sorted
/// neighbors. The result is sorted and contains all of `base_points`.
pub fn merge(
    signal: &[f64],
    base_points: &[usize],
    additional_points: &[usize],
    fps: f64,
    params: &SignalParams,
) -> Vec<usize> {
    let mut merged = base_points.to_vec();
    merged.sort_unstable();

    let merge_time_threshold =
        ((fps * params.additional_points_merge_time_threshold_in_ms).round() / 1000.0).max(1.0);

    let mut merge_counter = 0usize;
    for &idx in additional_points {
        if merged
            .iter()
            .any(|&x| (idx as f64 - x as f64).abs() <= merge_time_threshold)
        {
            continue;
        }

        let (Some(p1), Some(p2)) = (
            find_nearest(&merged, idx, Side::Left),
            find_nearest(&merged, idx, Side::Right),
        ) else {
            continue;
        };
        if p1 >= p2 {
            continue;
        }

        let lo = signal[p1].min(signal[p2]);
        let hi = signal[p1].max(signal[p2]);
        let remapped = (hi - lo) * (idx - p1) as f64 / (p2 - p1) as f64 + lo;
        let distance = perpendicular_distance(
            (lo, signal[p1]),
            (hi, signal[p2]),
            (remapped, signal[idx]),
        );

        if distance < params.additional_points_merge_distance_threshold {
            continue;
        }

        let pos = merged.binary_search(&idx).unwrap_or_else(|p| p);
        merged.insert(pos, idx);
        merge_counter += 1;
    }

    info!("merged {merge_counter} additional points");
    merged
}

/// Split `points` into minima and maxima against the moving reference
/// average of `signal`.
pub fn categorize(
    signal: &[f64],
    points: &[usize],
    fps: f64,
    params: &SignalParams,
) -> Extrema {
    let avg_window = (fps * params.avg_sec_for_local_min_max_extraction).round() as usize;
    let avg = moving_average(signal, avg_window);
    let smoothed = moving_average(signal, 3);

    let mut grouped = Extrema::default();
    for &idx in points {
        if smoothed[idx] > avg[idx] {
            grouped.max.push(idx);
        } else {
            grouped.min.push(idx);
        }
    }
    grouped
}

/// Local min/max extraction with the results already categorized.
pub fn local_min_max_categorized(signal: &[f64], fps: f64, params: &SignalParams) -> Extrema {
    let points = local_min_max(signal, fps, params);
    categorize(signal, &points, fps, params)
}

/// Replace a single-point group with its shifted, clamped index.
///
/// The group must hold exactly one index; any other length is a contract
/// violation and fails with [`SignalError::InvalidArgument`].
pub fn apply_manual_shift(
    points: &mut Vec<usize>,
    max_idx: usize,
    shift: i64,
) -> Result<(), SignalError> {
    if points.len() != 1 {
        return Err(SignalError::InvalidArgument(format!(
            "manual shift requires exactly one point per group, got {}",
            points.len()
        )));
    }
    let shifted = (points[0] as i64 + shift).clamp(0, max_idx as i64) as usize;
    points[0] = shifted;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spiked_ramp() -> Vec<f64> {
        // Linear ramp with one sample knocked far off the chord.
        let mut signal: Vec<f64> = (0..=10).map(|i| i as f64).collect();
        signal[5] = 50.0;
        signal
    }

    #[test]
    fn test_merge_inserts_deviating_point() {
        let signal = spiked_ramp();
        let params = SignalParams::default();
        let merged = merge(&signal, &[0, 10], &[5], 1.0, &params);
        assert_eq!(merged, vec![0, 5, 10]);
    }

    #[test]
    fn test_merge_skips_point_on_chord() {
        let mut signal = spiked_ramp();
        signal[5] = 5.0;
        let params = SignalParams::default();
        let merged = merge(&signal, &[0, 10], &[5], 1.0, &params);
        assert_eq!(merged, vec![0, 10]);
    }

    #[test]
    fn test_merge_respects_time_threshold() {
        let signal = spiked_ramp();
        let params = SignalParams::default();
        // Index 1 is within one frame of base point 0.
        let merged = merge(&signal, &[0, 10], &[1], 1.0, &params);
        assert_eq!(merged, vec![0, 10]);
    }

    #[test]
    fn test_merge_keeps_base_and_stays_sorted() {
        let signal = spiked_ramp();
        let params = SignalParams::default();
        let merged = merge(&signal, &[10, 0], &[5, 5, 5], 1.0, &params);
        assert_eq!(merged, vec![0, 5, 10]);
        // Duplicate candidates collapse: each extra index adds at most one
        // element and the second attempt fails the temporal guard.
    }

    #[test]
    fn test_merge_with_empty_base() {
        let signal = spiked_ramp();
        let params = SignalParams::default();
        // No base segment to measure deviation against.
        assert!(merge(&signal, &[], &[5], 1.0, &params).is_empty());
    }

    #[test]
    fn test_categorize_splits_against_average() {
        let signal: Vec<f64> = (0..100)
            .map(|i| 50.0 + 40.0 * (2.0 * std::f64::consts::PI * i as f64 / 25.0).sin())
            .collect();
        let params = SignalParams::default();
        let points = local_min_max(&signal, 5.0, &params);
        let extrema = categorize(&signal, &points, 5.0, &params);

        assert!(!extrema.min.is_empty());
        assert!(!extrema.max.is_empty());
        for &i in &extrema.min {
            assert!(signal[i] < 50.0);
        }
        for &i in &extrema.max {
            assert!(signal[i] > 50.0);
        }
    }

    #[test]
    fn test_local_min_max_categorized_matches_two_step() {
        let signal: Vec<f64> = (0..100)
            .map(|i| (i as f64 / 7.0).sin() * 30.0 + 50.0)
            .collect();
        let params = SignalParams::default();
        let combined = local_min_max_categorized(&signal, 5.0, &params);
        let two_step = categorize(
            &signal,
            &local_min_max(&signal, 5.0, &params),
            5.0,
            &params,
        );
        assert_eq!(combined, two_step);
    }

    #[test]
    fn test_apply_manual_shift_clamps() {
        let mut points = vec![5];
        apply_manual_shift(&mut points, 10, 3).unwrap();
        assert_eq!(points, vec![8]);

        apply_manual_shift(&mut points, 10, 100).unwrap();
        assert_eq!(points, vec![10]);

        apply_manual_shift(&mut points, 10, -100).unwrap();
        assert_eq!(points, vec![0]);
    }

    #[test]
    fn test_apply_manual_shift_rejects_non_singleton() {
        let mut points = vec![1, 2];
        assert!(matches!(
            apply_manual_shift(&mut points, 10, 1),
            Err(SignalError::InvalidArgument(_))
        ));
        let mut empty = Vec::new();
        assert!(apply_manual_shift(&mut empty, 10, 1).is_err());
    }
}
