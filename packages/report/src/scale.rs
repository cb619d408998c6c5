//! Per-slice color scale windows.
//!
//! The window is centred on the mean of the slice's per-city values with a
//! half-width of [`MIN_HALF_WIDTH`], then widened to cover the actual data
//! extremes. Every city therefore lands inside the gradient, and slices
//! where all cities are nearly equal do not exaggerate tiny differences.

use spendmap_spending_models::ScaleBounds;

/// Minimum distance of each window edge from the mean, in percentage
/// points.
pub const MIN_HALF_WIDTH: f64 = 1.0;

/// Computes the scale window for one slice.
///
/// Non-finite values are ignored. An empty input yields a window around
/// zero.
#[must_use]
pub fn scale_range(values: &[f64]) -> ScaleBounds {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();

    if finite.is_empty() {
        return ScaleBounds {
            min: -MIN_HALF_WIDTH,
            max: MIN_HALF_WIDTH,
        };
    }

    #[allow(clippy::cast_precision_loss)]
    let mean = finite.iter().sum::<f64>() / finite.len() as f64;
    let data_min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let data_max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    ScaleBounds {
        min: data_min.min(mean - MIN_HALF_WIDTH),
        max: data_max.max(mean + MIN_HALF_WIDTH),
    }
}
