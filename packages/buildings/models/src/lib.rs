#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Building footprint types shared between the fetch, cache, and report
//! stages.
//!
//! A [`BuildingRecord`] is the renderable form of one footprint polygon:
//! its exterior ring plus an extrusion height. Records are grouped per city
//! in [`CityBuildings`], which always carries the city name so that callers
//! never depend on positional alignment with the configured city list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// OSM tag holding an explicit building height (e.g. `"15m"`).
pub const TAG_HEIGHT: &str = "height";

/// OSM tag holding the number of above-ground floors.
pub const TAG_LEVELS: &str = "building:levels";

/// OSM tag holding the building type (e.g. `"house"`, `"office"`).
pub const TAG_BUILDING: &str = "building";

/// One extrudable polygon ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingRecord {
    /// Rings of `[lon, lat]` pairs. Only the exterior ring is kept.
    pub coordinates: Vec<Vec<[f64; 2]>>,
    /// Extrusion height in meters. Always positive.
    pub height: f64,
}

impl BuildingRecord {
    /// Number of coordinate pairs across all rings.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.coordinates.iter().map(Vec::len).sum()
    }
}

/// A city's renderable buildings, keyed by the city's configured name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityBuildings {
    /// City name exactly as configured (e.g. `"Delhi, India"`).
    pub name: String,
    /// All converted building records for the city.
    pub buildings: Vec<BuildingRecord>,
}

/// Raw OSM tags attached to a building footprint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingTags(pub BTreeMap<String, String>);

impl BuildingTags {
    /// Returns the value of `key`, or `None` if it is absent or blank.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Sets `key` to `value`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// The `height` tag.
    #[must_use]
    pub fn height(&self) -> Option<&str> {
        self.get(TAG_HEIGHT)
    }

    /// The `building:levels` tag.
    #[must_use]
    pub fn levels(&self) -> Option<&str> {
        self.get(TAG_LEVELS)
    }

    /// The `building` tag.
    #[must_use]
    pub fn building_type(&self) -> Option<&str> {
        self.get(TAG_BUILDING)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for BuildingTags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
