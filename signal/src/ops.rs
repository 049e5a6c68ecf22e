//! Pure numeric primitives over scalar signals.
//!
//! All functions operate on `&[f64]` and return owned vectors; empty input
//! yields empty output unless noted. Window sizes are in samples.

/// Which neighbor [`find_nearest`] should prefer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Moving average with window radius `w` (window size `2w`).
///
/// Sequences no longer than `w + 1` samples collapse to their arithmetic
/// mean; `w == 1` returns the input unchanged. Otherwise a valid-mode
/// uniform convolution is padded with its first value on the left and its
/// last value on the right until the length matches the input.
///
/// Convolution is commutative, so when the kernel is longer than the
/// signal (`len(x) < 2w`) every fully-overlapping position sees the whole
/// signal and the valid output is `sum(x) / 2w` throughout. The padded
/// result is truncated to the input length.
pub fn moving_average(x: &[f64], w: usize) -> Vec<f64> {
    if x.is_empty() {
        return Vec::new();
    }
    if x.len() <= w + 1 {
        let mean = x.iter().sum::<f64>() / x.len() as f64;
        return vec![mean; x.len()];
    }
    if w <= 1 {
        return x.to_vec();
    }

    let window = 2 * w;
    let inner: Vec<f64> = if x.len() >= window {
        x.windows(window)
            .map(|win| win.iter().sum::<f64>() / window as f64)
            .collect()
    } else {
        let full = x.iter().sum::<f64>() / window as f64;
        vec![full; window - x.len() + 1]
    };

    let mut out = Vec::with_capacity(x.len());
    out.extend(std::iter::repeat(inner[0]).take(w));
    out.extend_from_slice(&inner);
    let last = *inner.last().expect("inner convolution is non-empty");
    out.extend(std::iter::repeat(last).take(x.len().saturating_sub(inner.len() + w)));
    out.truncate(x.len());
    out
}

/// Moving population standard deviation over `x[i-w ..= i+w]`.
///
/// Edges are padded with the nearest interior value; inputs of at most
/// `2w` samples collapse to the whole-input standard deviation.
pub fn moving_std(x: &[f64], w: usize) -> Vec<f64> {
    if x.is_empty() {
        return Vec::new();
    }
    if x.len() <= 2 * w {
        return vec![population_std(x); x.len()];
    }

    let mut inner = Vec::with_capacity(x.len() - 2 * w);
    for i in w..x.len() - w {
        inner.push(population_std(&x[i - w..=i + w]));
    }

    let mut out = Vec::with_capacity(x.len());
    out.extend(std::iter::repeat(inner[0]).take(w));
    out.extend_from_slice(&inner);
    let last = *inner.last().expect("inner std is non-empty");
    out.extend(std::iter::repeat(last).take(w));
    out
}

/// Pairwise differences `x[i+1] - x[i]`.
pub fn diff(x: &[f64]) -> Vec<f64> {
    x.windows(2).map(|p| p[1] - p[0]).collect()
}

/// First derivative: pairwise differences smoothed by [`moving_average`].
///
/// Negative windows are treated as 1 and even windows rounded up to the
/// next odd value.
pub fn first_derivative(x: &[f64], w: i64) -> Vec<f64> {
    moving_average(&diff(x), derivative_window(w))
}

/// Second derivative with asymmetric smoothing around the inner
/// difference: `avg(diff(avg(diff(x))))`.
pub fn second_derivative(x: &[f64], w: i64) -> Vec<f64> {
    let w = derivative_window(w);
    moving_average(&diff(&moving_average(&diff(x), w)), w)
}

fn derivative_window(w: i64) -> usize {
    let mut w = if w < 0 { 1 } else { w };
    if w % 2 == 0 {
        w += 1;
    }
    w as usize
}

fn population_std(x: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mean = x.iter().sum::<f64>() / n;
    (x.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
}

/// Affine rescale of `x` to span exactly `[lower, upper]`.
///
/// Length-1 input returns `[lower]`; a constant signal rescales to all
/// `lower`.
pub fn scale(x: &[f64], lower: f64, upper: f64) -> Vec<f64> {
    if x.is_empty() {
        return Vec::new();
    }
    if x.len() == 1 {
        return vec![lower];
    }
    let min = x.iter().copied().fold(f64::INFINITY, f64::min);
    let max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max <= min {
        return vec![lower; x.len()];
    }
    x.iter()
        .map(|&v| (upper - lower) * (v - min) / (max - min) + lower)
        .collect()
}

/// [`scale`] with the span taken from the values strictly between the
/// `lower_quantile` and `upper_quantile` quantiles of `x`.
///
/// The rescaled output is clamped to the anomaly-free `[min, max]` band so
/// outliers cannot blow up the range. Falls back to [`scale`] when no
/// value lies strictly inside the quantile band.
pub fn scale_with_anomalies(
    x: &[f64],
    lower: f64,
    upper: f64,
    lower_quantile: f64,
    upper_quantile: f64,
) -> Vec<f64> {
    if x.is_empty() {
        return Vec::new();
    }
    if x.len() == 1 {
        return vec![lower];
    }

    let a1 = quantile(x, lower_quantile);
    let a2 = quantile(x, upper_quantile);
    let interior: Vec<f64> = x.iter().copied().filter(|&v| a1 < v && v < a2).collect();

    let min = interior.iter().copied().fold(f64::INFINITY, f64::min);
    let max = interior.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if interior.is_empty() || max <= min {
        return scale(x, lower, upper);
    }

    x.iter()
        .map(|&v| (upper - lower) * (v - min) / (max - min) + lower)
        .map(|v| v.clamp(min, max))
        .collect()
}

/// Linear-interpolated quantile of `x` (matching the convention of the
/// usual scientific stacks).
fn quantile(x: &[f64], q: f64) -> f64 {
    let mut sorted = x.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("signal contains NaN"));
    let h = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (h - lo as f64)
}

/// Find the neighbor of `value` in a sorted slice.
///
/// `Side::Left` returns the element immediately not past `value`,
/// `Side::Right` the element immediately not before it; when no such
/// element exists the nearest endpoint is returned. Empty input yields
/// `None`.
pub fn find_nearest<T: PartialOrd + Copy>(sorted: &[T], value: T, side: Side) -> Option<T> {
    if sorted.is_empty() {
        return None;
    }
    match side {
        Side::Left => {
            let mut pos = 0;
            for (i, &v) in sorted.iter().enumerate() {
                if value <= v {
                    break;
                }
                pos = i;
            }
            Some(sorted[pos])
        }
        Side::Right => {
            let mut pos = sorted.len() - 1;
            for (i, &v) in sorted.iter().enumerate().rev() {
                if value >= v {
                    break;
                }
                pos = i;
            }
            Some(sorted[pos])
        }
    }
}
