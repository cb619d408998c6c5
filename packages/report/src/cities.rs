//! Per-city render inputs.

use spendmap_buildings::cache::cap_buildings;
use spendmap_buildings_models::{BuildingRecord, CityBuildings};
use spendmap_geocoder::{CityGeocoder, CoordinateOverride, geocode_city};

/// Everything needed to render one city's artifacts.
#[derive(Debug, Clone, PartialEq)]
pub struct CityEntry {
    /// City name, matching the spending tables.
    pub name: String,
    /// Camera latitude.
    pub lat: f64,
    /// Camera longitude.
    pub lon: f64,
    /// Buildings retained for rendering.
    pub buildings: Vec<BuildingRecord>,
    /// Position in the report; used in artifact names and page element ids.
    pub index: usize,
}

/// Geocodes each city and applies the per-city building cap.
///
/// The output preserves the order of `cities`, and `index` is the position
/// in that order.
pub async fn build_city_entries(
    cities: &[CityBuildings],
    geocoder: &dyn CityGeocoder,
    overrides: &[CoordinateOverride],
) -> Vec<CityEntry> {
    let mut entries = Vec::with_capacity(cities.len());

    for (index, city) in cities.iter().enumerate() {
        let (lat, lon) = geocode_city(geocoder, &city.name, overrides).await;
        let buildings = cap_buildings(&city.buildings).to_vec();
        log::info!(
            "{}: {} of {} buildings at ({lat:.4}, {lon:.4})",
            city.name,
            buildings.len(),
            city.buildings.len()
        );
        entries.push(CityEntry {
            name: city.name.clone(),
            lat,
            lon,
            buildings,
            index,
        });
    }

    entries
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use spendmap_geocoder::{GeocodeError, GeocodedCity};

    use super::*;

    struct Fixed;

    #[async_trait]
    impl CityGeocoder for Fixed {
        async fn locate(&self, city: &str) -> Result<Option<GeocodedCity>, GeocodeError> {
            if city == "Nowhere" {
                return Ok(None);
            }
            Ok(Some(GeocodedCity {
                latitude: 19.0,
                longitude: 72.8,
                matched_name: Some(city.to_string()),
            }))
        }
    }

    fn building(height: f64) -> BuildingRecord {
        BuildingRecord {
            coordinates: vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
            height,
        }
    }

    fn city(name: &str, count: usize) -> CityBuildings {
        CityBuildings {
            name: name.to_string(),
            buildings: (0..count).map(|i| building(f64::from(u32::try_from(i).unwrap()))).collect(),
        }
    }

    #[tokio::test]
    async fn indexes_follow_input_order() {
        let cities = vec![city("Mumbai", 3), city("Nowhere", 1), city("Delhi, India", 0)];
        let overrides = spendmap_geocoder::default_overrides();

        let entries = build_city_entries(&cities, &Fixed, &overrides).await;

        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Mumbai", "Nowhere", "Delhi, India"]);
        assert_eq!(entries.iter().map(|e| e.index).collect::<Vec<_>>(), [0, 1, 2]);

        assert_eq!(entries[0].buildings.len(), 2);
        assert!((entries[0].lat - 19.0).abs() < f64::EPSILON);

        assert!(entries[1].buildings.is_empty());
        assert!(entries[1].lat.abs() < f64::EPSILON);
        assert!(entries[1].lon.abs() < f64::EPSILON);

        assert!(entries[2].buildings.is_empty());
        assert!((entries[2].lat - 28.6448).abs() < 1e-9);
        assert!((entries[2].lon - 77.2164).abs() < 1e-9);
    }
}
