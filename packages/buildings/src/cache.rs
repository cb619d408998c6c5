//! Per-city building cache.
//!
//! The cache is a single `MessagePack` blob holding one [`CachedCity`]
//! entry per configured city, in configured order. Cities whose fetch
//! failed are stored with `buildings: None` so the blob stays aligned with
//! the configuration.
//!
//! [`get_buildings`] either fetches everything from a [`GeometryProvider`]
//! (checkpointing the blob every [`SAVE_EVERY`] cities) or loads the blob.
//! A loaded cache is reordered by descending building count so data-rich
//! cities come first; every returned [`CityBuildings`] carries its name, so
//! callers must key on that rather than on position.

use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};
use spendmap_buildings_models::{BuildingRecord, CityBuildings};

use crate::convert::convert_buildings;
use crate::progress::ProgressCallback;
use crate::{BuildingsError, GeometryProvider};

/// Current cache schema version. Bump when the blob layout changes.
pub const CACHE_VERSION: u32 = 1;

/// The blob is rewritten after every `SAVE_EVERY`-th city (ordinals 0, 10,
/// 20, ...) and once more at the end.
pub const SAVE_EVERY: usize = 10;

/// Upper bound on buildings kept per city for rendering.
pub const MAX_BUILDINGS_PER_CITY: usize = 20_000;

/// The on-disk cache blob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildingCache {
    /// Schema version, see [`CACHE_VERSION`].
    pub version: u32,
    /// One entry per processed city, in configured order.
    pub cities: Vec<CachedCity>,
}

/// A single city's cached buildings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedCity {
    /// Position of the city in the configured list at fetch time.
    pub ordinal: usize,
    /// Configured city name.
    pub name: String,
    /// Converted buildings, or `None` if the fetch failed.
    pub buildings: Option<Vec<BuildingRecord>>,
}

/// Where buildings come from and how they are converted.
pub struct BuildingSource<'a> {
    /// Footprint provider used on the fetch path.
    pub provider: &'a dyn GeometryProvider,
    /// Location of the cache blob.
    pub cache_path: &'a Path,
    /// Douglas-Peucker tolerance passed to the converter.
    pub simplify_tolerance: f64,
}

/// Returns the building lists for `city_names`.
///
/// With `use_cache` the blob at `source.cache_path` is loaded and the result
/// is sorted by descending building count. Otherwise every city is fetched
/// in order; cities that fail are logged and omitted.
///
/// # Errors
///
/// Returns [`BuildingsError::CacheMissing`] if a cache load is requested and
/// the blob does not exist, or another [`BuildingsError`] if the blob cannot
/// be read or written.
pub async fn get_buildings<R: Rng + ?Sized>(
    city_names: &[String],
    use_cache: bool,
    source: &BuildingSource<'_>,
    rng: &mut R,
    progress: &dyn ProgressCallback,
) -> Result<Vec<CityBuildings>, BuildingsError> {
    if use_cache {
        let cache = load_cache(source.cache_path)?;
        let cities = pair_cached(city_names, &cache);
        log::info!(
            "Loaded building data for {}/{} cities from {}",
            cities.len(),
            city_names.len(),
            source.cache_path.display()
        );
        Ok(cities)
    } else {
        fetch_buildings(city_names, source, rng, progress).await
    }
}

/// Fetches and converts buildings for every city, checkpointing the cache.
///
/// # Errors
///
/// Returns [`BuildingsError`] if the cache blob cannot be written. Provider
/// failures are logged and never returned.
pub async fn fetch_buildings<R: Rng + ?Sized>(
    city_names: &[String],
    source: &BuildingSource<'_>,
    rng: &mut R,
    progress: &dyn ProgressCallback,
) -> Result<Vec<CityBuildings>, BuildingsError> {
    let mut cache = BuildingCache {
        version: CACHE_VERSION,
        cities: Vec::with_capacity(city_names.len()),
    };

    progress.set_total(city_names.len() as u64);

    for (ordinal, city) in city_names.iter().enumerate() {
        progress.set_message(format!("({}/{}) {city}", ordinal + 1, city_names.len()));
        log::info!("({}/{}), City: {city}", ordinal + 1, city_names.len());

        let buildings = match source.provider.fetch_footprints(city).await {
            Ok(footprints) if footprints.is_empty() => {
                log::warn!("Did not find data for city: {city}: no footprints");
                None
            }
            Ok(footprints) => {
                let records = convert_buildings(&footprints, source.simplify_tolerance, rng);
                log::info!(
                    "{city}: {} footprints -> {} building records",
                    footprints.len(),
                    records.len()
                );
                Some(records)
            }
            Err(e) => {
                log::warn!("Did not find data for city: {city}: {e}");
                None
            }
        };

        cache.cities.push(CachedCity {
            ordinal,
            name: city.clone(),
            buildings,
        });

        if ordinal % SAVE_EVERY == 0 {
            save_cache(source.cache_path, &cache)?;
        }
        progress.inc(1);
    }

    save_cache(source.cache_path, &cache)?;
    progress.finish(format!("Fetched buildings for {} cities", city_names.len()));

    Ok(cache
        .cities
        .into_iter()
        .filter_map(|c| {
            c.buildings.map(|buildings| CityBuildings {
                name: c.name,
                buildings,
            })
        })
        .collect())
}

/// Writes the cache blob, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`BuildingsError`] if encoding or the file write fails.
pub fn save_cache(path: &Path, cache: &BuildingCache) -> Result<(), BuildingsError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let bytes = rmp_serde::to_vec_named(cache)?;
    std::fs::write(path, bytes)?;
    log::debug!(
        "Saved building cache ({} cities) to {}",
        cache.cities.len(),
        path.display()
    );
    Ok(())
}

/// Reads the cache blob.
///
/// # Errors
///
/// Returns [`BuildingsError::CacheMissing`] if `path` does not exist, or
/// another [`BuildingsError`] if it cannot be read or decoded.
pub fn load_cache(path: &Path) -> Result<BuildingCache, BuildingsError> {
    if !path.exists() {
        return Err(BuildingsError::CacheMissing {
            path: path.to_path_buf(),
        });
    }
    let bytes = std::fs::read(path)?;
    let cache: BuildingCache = rmp_serde::from_slice(&bytes)?;
    if cache.version != CACHE_VERSION {
        log::warn!(
            "Building cache version {} differs from expected {CACHE_VERSION}",
            cache.version
        );
    }
    Ok(cache)
}

/// Pairs configured city names with their cached buildings.
///
/// Cities absent from the cache or cached as failures are dropped. The
/// result is stably sorted by descending building count.
#[must_use]
pub fn pair_cached(city_names: &[String], cache: &BuildingCache) -> Vec<CityBuildings> {
    let mut cities: Vec<CityBuildings> = city_names
        .iter()
        .filter_map(|name| {
            let entry = cache.cities.iter().find(|c| &c.name == name);
            match entry.and_then(|c| c.buildings.as_ref()) {
                Some(buildings) => Some(CityBuildings {
                    name: name.clone(),
                    buildings: buildings.clone(),
                }),
                None => {
                    log::warn!("No cached buildings for city: {name}");
                    None
                }
            }
        })
        .collect();

    cities.sort_by(|a, b| b.buildings.len().cmp(&a.buildings.len()));
    cities
}

/// Returns the slice of `buildings` retained for rendering.
///
/// Keeps `min(len - 1, MAX_BUILDINGS_PER_CITY)` records, so the last record
/// of a short list is always dropped and an empty list stays empty.
#[must_use]
pub fn cap_buildings(buildings: &[BuildingRecord]) -> &[BuildingRecord] {
    let keep = buildings
        .len()
        .saturating_sub(1)
        .min(MAX_BUILDINGS_PER_CITY);
    &buildings[..keep]
}
