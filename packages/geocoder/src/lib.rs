#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! City centre geocoding for the spending heatmap.
//!
//! Resolves a free-form city name (e.g. `"Delhi, India"`) to a
//! latitude/longitude pair through a [`CityGeocoder`] implementation,
//! normally [`nominatim::NominatimClient`].
//!
//! Lookups never abort a run: [`geocode_city`] falls back to `(0.0, 0.0)`
//! on any failure. A [`CoordinateOverride`] table is applied afterwards,
//! unconditionally, to correct cities the provider is known to place
//! badly.

pub mod nominatim;

use serde::Deserialize;
use thiserror::Error;

/// A geocoding result for a city.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedCity {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// The canonical place name returned by the provider.
    pub matched_name: Option<String>,
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,
}

/// Resolves city names to centre coordinates.
#[async_trait::async_trait]
pub trait CityGeocoder: Send + Sync {
    /// Looks up `city`. Returns `Ok(None)` when the provider has no match.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request or response parsing fails.
    async fn locate(&self, city: &str) -> Result<Option<GeocodedCity>, GeocodeError>;
}

/// A fixed coordinate that replaces whatever the provider returned for a
/// city.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CoordinateOverride {
    /// City name exactly as configured.
    pub name: String,
    /// Replacement latitude.
    pub lat: f64,
    /// Replacement longitude.
    pub lon: f64,
}

/// Overrides for cities whose provider centroid lands far from the
/// built-up area.
#[must_use]
pub fn default_overrides() -> Vec<CoordinateOverride> {
    vec![
        CoordinateOverride {
            name: "Ahmedabad, India".to_string(),
            lat: 23.021_537,
            lon: 72.580_057,
        },
        CoordinateOverride {
            name: "Delhi, India".to_string(),
            lat: 28.6448,
            lon: 77.2164,
        },
    ]
}

/// Returns the override coordinate for `city`, if one is configured.
#[must_use]
pub fn find_override(overrides: &[CoordinateOverride], city: &str) -> Option<(f64, f64)> {
    overrides
        .iter()
        .find(|o| o.name == city)
        .map(|o| (o.lat, o.lon))
}

/// Resolves `city` to `(lat, lon)`.
///
/// Provider errors and misses are logged and yield `(0.0, 0.0)`. The
/// override table is consulted afterwards regardless of the lookup outcome.
pub async fn geocode_city(
    geocoder: &dyn CityGeocoder,
    city: &str,
    overrides: &[CoordinateOverride],
) -> (f64, f64) {
    let looked_up = match geocoder.locate(city).await {
        Ok(Some(found)) => (found.latitude, found.longitude),
        Ok(None) => {
            log::warn!("Could not get coordinates for {city}: no match");
            (0.0, 0.0)
        }
        Err(e) => {
            log::warn!("Could not get coordinates for {city}: {e}");
            (0.0, 0.0)
        }
    };

    find_override(overrides, city).map_or(looked_up, |fixed| {
        log::debug!("Applying coordinate override for {city}: {fixed:?}");
        fixed
    })
}
