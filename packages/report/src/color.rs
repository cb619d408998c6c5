//! Five-stop heatmap gradient.
//!
//! Maps a value within a `[min, max]` window onto
//! cyan → green-cyan → green → yellow/orange → red. The page script in
//! `templates/page.js` carries the same arithmetic (`getHeatmapColor`); the
//! two must stay identical so colors do not shift when the user changes a
//! selection.

/// RGB color, each channel in `0..=255`.
pub type Rgb = [u8; 3];

/// Position of `value` within `[min, max]`.
///
/// A degenerate window (`max == min`) or a non-finite value maps to the
/// middle of the gradient.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if max == min || !value.is_finite() {
        0.5
    } else {
        (value - min) / (max - min)
    }
}

/// Heatmap color for `value` in the `[min, max]` window.
#[must_use]
#[allow(clippy::suboptimal_flops)]
pub fn heatmap_color(value: f64, min: f64, max: f64) -> Rgb {
    let t = normalize(value, min, max);

    let (r, g, b) = if t < 0.25 {
        (0.0, 200.0 + 800.0 * t, 200.0)
    } else if t < 0.5 {
        (0.0, 255.0, 800.0 * (0.5 - t))
    } else if t < 0.75 {
        (800.0 * (t - 0.5), 255.0, 0.0)
    } else {
        (255.0, 800.0 * (1.0 - t), 0.0)
    };

    [channel(r), channel(g), channel(b)]
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn channel(v: f64) -> u8 {
    v.floor().clamp(0.0, 255.0) as u8
}

/// CSS `rgb(...)` form of a color.
#[must_use]
pub fn css_rgb(color: Rgb) -> String {
    format!("rgb({}, {}, {})", color[0], color[1], color[2])
}
