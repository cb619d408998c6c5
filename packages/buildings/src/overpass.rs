//! Overpass API building footprint provider.
//!
//! Resolves a place name to an OSM area through Nominatim, then asks
//! Overpass for every `building`-tagged node, way and relation inside that
//! area with inline geometry (`out geom tags`).
//!
//! Element mapping:
//!
//! - closed way → `Polygon`
//! - open way → `LineString`
//! - node → `Point`
//! - relation → `MultiPolygon` built from its closed `outer` members
//!
//! Only the polygonal variants survive [`crate::convert`]; the rest are
//! returned so the converter's skip accounting sees them.

use geo::{Coord, Geometry, LineString, MultiPolygon, Point, Polygon};
use spendmap_buildings_models::BuildingTags;
use spendmap_geocoder::nominatim::NominatimClient;

use crate::{BuildingsError, Footprint, GeometryProvider};

/// Public Overpass interpreter endpoint.
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Server-side timeout requested in the query, in seconds.
const QUERY_TIMEOUT_SECS: u32 = 300;

/// Footprint provider backed by Nominatim area lookup plus Overpass.
pub struct OverpassProvider {
    client: reqwest::Client,
    overpass_url: String,
    nominatim: NominatimClient,
}

impl OverpassProvider {
    /// Creates a provider posting queries to `overpass_url`.
    #[must_use]
    pub fn new(client: reqwest::Client, overpass_url: &str, nominatim: NominatimClient) -> Self {
        Self {
            client,
            overpass_url: overpass_url.to_string(),
            nominatim,
        }
    }
}

#[async_trait::async_trait]
impl GeometryProvider for OverpassProvider {
    async fn fetch_footprints(&self, place: &str) -> Result<Vec<Footprint>, BuildingsError> {
        let area_id = self
            .nominatim
            .area_id(place)
            .await?
            .ok_or_else(|| BuildingsError::Conversion {
                message: format!("{place} did not resolve to an area"),
            })?;

        log::debug!("Querying Overpass for buildings in {place} (area {area_id})");

        let resp = self
            .client
            .post(&self.overpass_url)
            .form(&[("data", building_query(area_id))])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(BuildingsError::Conversion {
                message: format!("Overpass request failed with status {}", resp.status()),
            });
        }

        let body = resp.text().await?;
        let json: serde_json::Value = serde_json::from_str(&body)?;
        parse_elements(&json)
    }
}

/// Builds the Overpass QL query for all buildings within `area_id`.
#[must_use]
pub fn building_query(area_id: u64) -> String {
    format!(
        "[out:json][timeout:{QUERY_TIMEOUT_SECS}];\n\
         area(id:{area_id})->.searchArea;\n\
         (\n  \
           node[\"building\"](area.searchArea);\n  \
           way[\"building\"](area.searchArea);\n  \
           relation[\"building\"](area.searchArea);\n\
         );\n\
         out geom tags;"
    )
}

/// Parses an Overpass JSON response into footprints.
///
/// Elements whose geometry cannot be built are dropped.
///
/// # Errors
///
/// Returns [`BuildingsError::Conversion`] if the response has no
/// `elements` array.
pub fn parse_elements(json: &serde_json::Value) -> Result<Vec<Footprint>, BuildingsError> {
    let elements = json["elements"]
        .as_array()
        .ok_or_else(|| BuildingsError::Conversion {
            message: "No elements array in Overpass response".to_string(),
        })?;

    Ok(elements
        .iter()
        .filter_map(|el| {
            let geometry = match el["type"].as_str()? {
                "node" => Geometry::Point(Point::new(el["lon"].as_f64()?, el["lat"].as_f64()?)),
                "way" => way_geometry(&el["geometry"])?,
                "relation" => relation_geometry(el)?,
                _ => return None,
            };
            Some(Footprint {
                geometry,
                tags: element_tags(el),
            })
        })
        .collect())
}

fn coords(geometry: &serde_json::Value) -> Option<Vec<Coord<f64>>> {
    geometry
        .as_array()?
        .iter()
        .map(|node| {
            Some(Coord {
                x: node["lon"].as_f64()?,
                y: node["lat"].as_f64()?,
            })
        })
        .collect()
}

fn is_closed_ring(ring: &[Coord<f64>]) -> bool {
    ring.len() >= 4 && ring.first() == ring.last()
}

fn way_geometry(geometry: &serde_json::Value) -> Option<Geometry<f64>> {
    let ring = coords(geometry)?;
    if is_closed_ring(&ring) {
        Some(Geometry::Polygon(Polygon::new(LineString(ring), vec![])))
    } else if ring.len() >= 2 {
        Some(Geometry::LineString(LineString(ring)))
    } else {
        None
    }
}

// Outer members that are split across several open ways are not stitched.
fn relation_geometry(el: &serde_json::Value) -> Option<Geometry<f64>> {
    let polygons: Vec<Polygon<f64>> = el["members"]
        .as_array()?
        .iter()
        .filter(|m| m["type"] == "way" && m["role"] == "outer")
        .filter_map(|m| coords(&m["geometry"]))
        .filter(|ring| is_closed_ring(ring))
        .map(|ring| Polygon::new(LineString(ring), vec![]))
        .collect();

    if polygons.is_empty() {
        None
    } else {
        Some(Geometry::MultiPolygon(MultiPolygon(polygons)))
    }
}

fn element_tags(el: &serde_json::Value) -> BuildingTags {
    el["tags"].as_object().map_or_else(BuildingTags::default, |tags| {
        tags.iter()
            .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
            .collect()
    })
}
