//! Standalone 3D building map documents.
//!
//! Each artifact is a self-contained HTML page that draws one city's
//! buildings as an extruded deck.gl `PolygonLayer`, every building filled
//! with the single color of the slice.

use serde::Serialize;
use spendmap_buildings_models::BuildingRecord;

use crate::ReportError;
use crate::color::Rgb;
use crate::template::{escape_html, fill, script_json};

const CITYMAP_TEMPLATE: &str = include_str!("../templates/citymap.html");

/// Default camera zoom for a whole city.
pub const DEFAULT_ZOOM: f64 = 12.0;

/// Camera tilt in degrees.
pub const DEFAULT_PITCH: f64 = 45.0;

/// Building outline color.
pub const LINE_COLOR: Rgb = [50, 50, 50];

/// Initial camera for an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewState {
    /// Camera centre latitude.
    pub latitude: f64,
    /// Camera centre longitude.
    pub longitude: f64,
    /// Zoom level.
    pub zoom: f64,
    /// Tilt in degrees.
    pub pitch: f64,
    /// Rotation in degrees.
    pub bearing: f64,
}

impl ViewState {
    /// Tilted whole-city camera centred on `(lat, lon)`.
    #[must_use]
    pub const fn city(lat: f64, lon: f64) -> Self {
        Self {
            latitude: lat,
            longitude: lon,
            zoom: DEFAULT_ZOOM,
            pitch: DEFAULT_PITCH,
            bearing: 0.0,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LayerStyle {
    fill_color: Rgb,
    line_color: Rgb,
    elevation_scale: f64,
    opacity: f64,
    line_width_min_pixels: u32,
}

/// Serializes a city's buildings once for reuse across its artifacts.
///
/// # Errors
///
/// Returns [`ReportError::Json`] if serialization fails.
pub fn buildings_json(buildings: &[BuildingRecord]) -> Result<String, ReportError> {
    Ok(script_json(buildings, false)?)
}

/// Renders one artifact document.
///
/// `buildings` is the output of [`buildings_json`].
///
/// # Errors
///
/// Returns [`ReportError::Json`] if serialization fails.
pub fn render_citymap(
    title: &str,
    buildings: &str,
    view: &ViewState,
    color: Rgb,
) -> Result<String, ReportError> {
    let style = LayerStyle {
        fill_color: color,
        line_color: LINE_COLOR,
        elevation_scale: 1.0,
        opacity: 0.8,
        line_width_min_pixels: 1,
    };

    let title = escape_html(title);
    let view = script_json(view, false)?;
    let style = script_json(&style, false)?;

    Ok(fill(
        CITYMAP_TEMPLATE,
        &[
            ("TITLE", title.as_str()),
            ("BUILDINGS", buildings),
            ("VIEW_STATE", view.as_str()),
            ("LAYER_STYLE", style.as_str()),
        ],
    ))
}
