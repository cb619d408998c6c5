#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Building footprints for the city heatmaps.
//!
//! Fetches building-tagged footprints for each configured city from a
//! [`GeometryProvider`] (normally [`overpass::OverpassProvider`]), converts
//! them into extrudable [`BuildingRecord`]s and caches the result in a
//! single `MessagePack` blob so repeated runs skip the expensive geometry
//! queries.
//!
//! Heights come from OSM tags where present and from a seeded random draw
//! per building type otherwise; see [`height`].

pub mod cache;
pub mod convert;
pub mod height;
pub mod overpass;
pub mod progress;

use std::path::PathBuf;

use spendmap_buildings_models::BuildingTags;
use thiserror::Error;

pub use spendmap_buildings_models::{BuildingRecord, CityBuildings};

/// A raw building footprint with the tags used for height estimation.
#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    /// Footprint geometry in `(lon, lat)` order.
    pub geometry: geo::Geometry<f64>,
    /// OSM tags of the building.
    pub tags: BuildingTags,
}

/// Errors that can occur while fetching, converting, or caching buildings.
#[derive(Debug, Error)]
pub enum BuildingsError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Place resolution failed.
    #[error("Geocode error: {0}")]
    Geocode(#[from] spendmap_geocoder::GeocodeError),

    /// File I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Cache serialization failed.
    #[error("Cache encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// Cache deserialization failed.
    #[error("Cache decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    /// A cache load was requested but no cache file exists.
    #[error("Building cache not found at {}", path.display())]
    CacheMissing {
        /// Path that was expected to hold the cache.
        path: PathBuf,
    },

    /// Provider data could not be interpreted.
    #[error("Conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// Source of building footprints for a named place.
#[async_trait::async_trait]
pub trait GeometryProvider: Send + Sync {
    /// Returns every building-tagged footprint within `place`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildingsError`] if the place cannot be resolved or the
    /// provider request fails.
    async fn fetch_footprints(&self, place: &str) -> Result<Vec<Footprint>, BuildingsError>;
}
