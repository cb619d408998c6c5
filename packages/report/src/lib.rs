#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Report generation.
//!
//! Renders one standalone 3D building heatmap per
//! (quarter, category, city) slice and the interactive page that switches
//! between them.

pub mod cities;
pub mod citymap;
pub mod color;
pub mod page;
pub mod paths;
pub mod scale;
pub mod template;

use std::collections::BTreeSet;
use std::path::Path;

use spendmap_buildings::progress::ProgressCallback;
use spendmap_spending_models::{ArtifactIndex, PercentageTable, ScaleRanges};

pub use cities::{CityEntry, build_city_entries};
pub use page::{PageCity, PageData, render_page, write_page};

use crate::citymap::{ViewState, buildings_json, render_citymap};
use crate::color::heatmap_color;
use crate::paths::{CITYMAPS_DIR, artifact_path, claim_unique, ensure_dir};
use crate::scale::scale_range;

/// Errors that can occur while writing the report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization of embedded data failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Writes every artifact and returns the scale windows and artifact paths.
///
/// Cities without a percentage for a slice are treated as `0.0`. A failed
/// artifact write is logged and its slot left out of the returned index.
/// Labels that sanitize to the same file name get numbered suffixes, so
/// every slot has its own file.
///
/// # Errors
///
/// Returns an error if the artifact directory cannot be created or a
/// city's buildings fail to serialize.
pub fn generate_citymaps(
    quarters: &[String],
    categories: &[String],
    percentages: &PercentageTable,
    cities: &[CityEntry],
    out_dir: &Path,
    progress: &dyn ProgressCallback,
) -> Result<(ScaleRanges, ArtifactIndex), ReportError> {
    ensure_dir(&out_dir.join(CITYMAPS_DIR))?;

    let city_buildings = cities
        .iter()
        .map(|city| buildings_json(&city.buildings))
        .collect::<Result<Vec<_>, _>>()?;

    let mut scale_ranges = ScaleRanges::new();
    let mut artifacts = ArtifactIndex::new();
    let mut used_paths = BTreeSet::new();
    let mut written = 0_usize;

    progress.set_total((quarters.len() * categories.len() * cities.len()) as u64);

    for quarter in quarters {
        for category in categories {
            let slice = percentages
                .get(quarter)
                .and_then(|by_category| by_category.get(category));
            let values: Vec<f64> = cities
                .iter()
                .map(|city| {
                    slice
                        .and_then(|by_city| by_city.get(&city.name))
                        .copied()
                        .unwrap_or(0.0)
                })
                .collect();

            let bounds = scale_range(&values);
            scale_ranges
                .entry(quarter.clone())
                .or_default()
                .insert(category.clone(), bounds);

            progress.set_message(format!("{quarter} / {category}"));

            let slots = artifacts
                .entry(quarter.clone())
                .or_default()
                .entry(category.clone())
                .or_default();

            for ((city, buildings), value) in cities.iter().zip(&city_buildings).zip(&values) {
                let color = heatmap_color(*value, bounds.min, bounds.max);
                let title = format!("{} - {quarter} - {category}", city.name);
                let html = render_citymap(
                    &title,
                    buildings,
                    &ViewState::city(city.lat, city.lon),
                    color,
                )?;

                let relative =
                    claim_unique(&mut used_paths, artifact_path(quarter, category, city.index));
                match std::fs::write(out_dir.join(&relative), html) {
                    Ok(()) => {
                        log::debug!("Wrote {relative}");
                        slots.insert(city.index, relative);
                        written += 1;
                    }
                    Err(e) => log::warn!("Failed to write {relative}: {e}"),
                }
                progress.inc(1);
            }
        }
    }

    progress.finish(format!("{written} artifacts written"));
    log::info!("Wrote {written} artifacts to {}", out_dir.join(CITYMAPS_DIR).display());

    Ok((scale_ranges, artifacts))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use spendmap_buildings::progress::NullProgress;
    use spendmap_buildings_models::BuildingRecord;

    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("spendmap_report_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn entry(name: &str, index: usize) -> CityEntry {
        CityEntry {
            name: name.to_string(),
            lat: 20.0,
            lon: 75.0,
            buildings: vec![BuildingRecord {
                coordinates: vec![vec![
                    [75.0, 20.0],
                    [75.001, 20.0],
                    [75.001, 20.001],
                    [75.0, 20.0],
                ]],
                height: 10.0,
            }],
            index,
        }
    }

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    fn percentages(
        quarters: &[String],
        categories: &[String],
        cities: &[CityEntry],
    ) -> PercentageTable {
        let mut table = PercentageTable::new();
        for quarter in quarters {
            for category in categories {
                let by_city: BTreeMap<String, f64> = cities
                    .iter()
                    .enumerate()
                    .map(|(i, c)| (c.name.clone(), 10.0 * f64::from(u32::try_from(i).unwrap())))
                    .collect();
                table
                    .entry(quarter.clone())
                    .or_default()
                    .insert(category.clone(), by_city);
            }
        }
        table
    }

    #[test]
    fn writes_one_artifact_per_slice_and_city() {
        let dir = temp_dir("all_slices");
        let quarters = labels(&["All Time", "2014-Q4"]);
        let categories = labels(&["All Categories", "Food"]);
        let cities = vec![
            entry("Mumbai, India", 0),
            entry("Delhi, India", 1),
            entry("Bengaluru, India", 2),
        ];
        let table = percentages(&quarters, &categories, &cities);

        let (ranges, artifacts) =
            generate_citymaps(&quarters, &categories, &table, &cities, &dir, &NullProgress)
                .unwrap();

        let mut paths = Vec::new();
        for quarter in &quarters {
            for category in &categories {
                let slots = &artifacts[quarter][category];
                assert_eq!(slots.len(), 3);
                paths.extend(slots.values().cloned());
                assert!(ranges[quarter].contains_key(category));
            }
        }
        assert_eq!(paths.len(), 12);
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), 12);

        for path in &paths {
            assert!(dir.join(path).is_file(), "missing {path}");
        }
        assert!(
            dir.join("citymaps/map_q_All_Time_city_2_cat_All_Categories.html")
                .is_file()
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn artifacts_are_colored_by_scaled_share() {
        let dir = temp_dir("colors");
        let quarters = labels(&["All Time"]);
        let categories = labels(&["All Categories"]);
        let cities = vec![entry("A", 0), entry("B", 1), entry("C", 2)];
        // shares 0, 10, 20: window [0, 20], so A is the low end and C the high end
        let table = percentages(&quarters, &categories, &cities);

        let (ranges, artifacts) =
            generate_citymaps(&quarters, &categories, &table, &cities, &dir, &NullProgress)
                .unwrap();

        let bounds = ranges["All Time"]["All Categories"];
        assert!(bounds.min.abs() < 1e-9);
        assert!((bounds.max - 20.0).abs() < 1e-9);

        let slots = &artifacts["All Time"]["All Categories"];
        let low = std::fs::read_to_string(dir.join(&slots[&0])).unwrap();
        let mid = std::fs::read_to_string(dir.join(&slots[&1])).unwrap();
        let high = std::fs::read_to_string(dir.join(&slots[&2])).unwrap();
        assert!(low.contains("\"fillColor\":[0,200,200]"));
        assert!(mid.contains("\"fillColor\":[0,255,0]"));
        assert!(high.contains("\"fillColor\":[255,0,0]"));
        assert!(low.contains("<title>A - All Time - All Categories</title>"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_percentages_default_to_zero() {
        let dir = temp_dir("missing");
        let quarters = labels(&["All Time"]);
        let categories = labels(&["Fuel"]);
        let cities = vec![entry("A", 0)];

        let (ranges, artifacts) = generate_citymaps(
            &quarters,
            &categories,
            &PercentageTable::new(),
            &cities,
            &dir,
            &NullProgress,
        )
        .unwrap();

        let bounds = ranges["All Time"]["Fuel"];
        assert!((bounds.min + 1.0).abs() < 1e-9);
        assert!((bounds.max - 1.0).abs() < 1e-9);
        assert_eq!(artifacts["All Time"]["Fuel"].len(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn categories_with_the_same_file_name_keep_their_own_artifacts() {
        let dir = temp_dir("colliding_categories");
        let quarters = labels(&["All Time"]);
        let categories = labels(&["Food/Drink", "Food-Drink"]);
        let cities = vec![entry("A", 0), entry("B", 1)];

        let mut table = PercentageTable::new();
        let slices = table.entry("All Time".to_string()).or_default();
        slices.insert(
            "Food/Drink".to_string(),
            [("A".to_string(), 0.0), ("B".to_string(), 100.0)].into(),
        );
        slices.insert(
            "Food-Drink".to_string(),
            [("A".to_string(), 100.0), ("B".to_string(), 0.0)].into(),
        );

        let (_, artifacts) =
            generate_citymaps(&quarters, &categories, &table, &cities, &dir, &NullProgress)
                .unwrap();

        let slash = &artifacts["All Time"]["Food/Drink"][&0];
        let dash = &artifacts["All Time"]["Food-Drink"][&0];
        assert_ne!(slash, dash);

        let low = std::fs::read_to_string(dir.join(slash)).unwrap();
        let high = std::fs::read_to_string(dir.join(dash)).unwrap();
        assert!(low.contains("\"fillColor\":[0,200,200]"));
        assert!(high.contains("\"fillColor\":[255,0,0]"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
