//! Building height estimation from sparse OSM tags.
//!
//! Rules are tried in order and the first success wins:
//!
//! 1. an explicit `height` tag (unit suffixes `m`/`ft` stripped),
//! 2. `building:levels` × [`METERS_PER_LEVEL`],
//! 3. a uniform draw from the range of the building's [`HeightClass`].
//!
//! Malformed numeric tags are treated as absent. The random draw uses the
//! caller's generator so a seeded run is reproducible.

use std::ops::RangeInclusive;

use rand::Rng;
use spendmap_buildings_models::BuildingTags;

/// Assumed storey height in meters.
pub const METERS_PER_LEVEL: f64 = 3.5;

/// Coarse building classes used when no numeric height data exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeightClass {
    /// Commercial, office, retail, hotel, apartments.
    High,
    /// Industrial, warehouse, school, hospital, public.
    Medium,
    /// Houses and other low residential buildings.
    Low,
    /// Garages, sheds, cabins, huts, roofs.
    VeryLow,
    /// Churches, cathedrals, mosques, temples, shrines.
    Religious,
    /// Anything else, including a missing `building` tag.
    Generic,
}

impl HeightClass {
    /// Classifies a `building` tag value.
    #[must_use]
    pub fn from_building_type(building_type: Option<&str>) -> Self {
        match building_type.map(str::trim) {
            Some("commercial" | "office" | "retail" | "hotel" | "apartments") => Self::High,
            Some("industrial" | "warehouse" | "school" | "hospital" | "public") => Self::Medium,
            Some("house" | "residential" | "detached" | "terrace" | "bungalow") => Self::Low,
            Some("garage" | "shed" | "cabin" | "hut" | "roof") => Self::VeryLow,
            Some("church" | "cathedral" | "mosque" | "temple" | "shrine") => Self::Religious,
            _ => Self::Generic,
        }
    }

    /// Height range in meters for this class.
    #[must_use]
    pub const fn range(self) -> RangeInclusive<f64> {
        match self {
            Self::High => 20.0..=40.0,
            Self::Medium => 10.0..=20.0,
            Self::Low => 5.0..=12.0,
            Self::VeryLow => 3.0..=6.0,
            Self::Religious => 15.0..=30.0,
            Self::Generic => 8.0..=18.0,
        }
    }
}

/// Parses an explicit `height` tag such as `"15m"`, `"20"` or `"40 ft"`.
///
/// Returns `None` unless the stripped value is a finite positive number.
#[must_use]
pub fn parse_height_tag(raw: &str) -> Option<f64> {
    let stripped = raw.replace('m', "").replace("ft", "");
    stripped
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|h| h.is_finite() && *h > 0.0)
}

/// Parses a `building:levels` tag. Non-positive counts are rejected so the
/// resulting height stays positive.
#[must_use]
pub fn parse_levels_tag(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|l| l.is_finite() && *l > 0.0)
}

/// Estimates a building's height in meters from its tags.
pub fn estimate_height<R: Rng + ?Sized>(tags: &BuildingTags, rng: &mut R) -> f64 {
    if let Some(height) = tags.height().and_then(parse_height_tag) {
        return height;
    }

    if let Some(levels) = tags.levels().and_then(parse_levels_tag) {
        return levels * METERS_PER_LEVEL;
    }

    rng.gen_range(HeightClass::from_building_type(tags.building_type()).range())
}
