//! Nominatim / OpenStreetMap geocoder client.
//!
//! Nominatim has strict rate limits: **1 request per second** maximum on
//! the public instance. [`NominatimClient`] sleeps for its configured
//! courtesy delay before every request.
//!
//! Besides the centre coordinate, search results carry the OSM object the
//! place resolved to, which [`NominatimPlace::overpass_area_id`] turns into
//! an Overpass area id for footprint queries.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use std::time::Duration;

use crate::{CityGeocoder, GeocodeError, GeocodedCity};

/// Public Nominatim search endpoint.
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Overpass derives area ids from relation ids by adding this offset.
const RELATION_AREA_OFFSET: u64 = 3_600_000_000;

/// Overpass derives area ids from closed way ids by adding this offset.
const WAY_AREA_OFFSET: u64 = 2_400_000_000;

/// Hits requested when looking for an areal match; the top hit for a
/// city is sometimes its centre node.
pub const AREA_CANDIDATES: u8 = 5;

/// A single Nominatim search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct NominatimPlace {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Full display name.
    pub display_name: Option<String>,
    /// `"relation"`, `"way"` or `"node"`.
    pub osm_type: Option<String>,
    /// OSM object id.
    pub osm_id: Option<u64>,
}

impl NominatimPlace {
    /// The Overpass area id for this place, if it resolved to an areal
    /// object (relation or way).
    #[must_use]
    pub fn overpass_area_id(&self) -> Option<u64> {
        let id = self.osm_id?;
        match self.osm_type.as_deref()? {
            "relation" => Some(RELATION_AREA_OFFSET + id),
            "way" => Some(WAY_AREA_OFFSET + id),
            _ => None,
        }
    }
}

/// Rate-limited Nominatim free-form search client.
pub struct NominatimClient {
    client: reqwest::Client,
    base_url: String,
    delay: Duration,
}

impl NominatimClient {
    /// Creates a client against `base_url`, waiting `rate_limit_ms`
    /// before each request.
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str, rate_limit_ms: u64) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            delay: Duration::from_millis(rate_limit_ms),
        }
    }

    /// Searches for a free-form place name and returns the best hit.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the HTTP request or response parsing fails.
    pub async fn search(&self, query: &str) -> Result<Option<NominatimPlace>, GeocodeError> {
        Ok(self.request(query, 1).await?.into_iter().next())
    }

    /// Returns the Overpass area id of the first relation or way among the
    /// top [`AREA_CANDIDATES`] hits for `query`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the HTTP request or response parsing fails.
    pub async fn area_id(&self, query: &str) -> Result<Option<u64>, GeocodeError> {
        let places = self.request(query, AREA_CANDIDATES).await?;
        Ok(first_area_id(&places))
    }

    async fn request(&self, query: &str, limit: u8) -> Result<Vec<NominatimPlace>, GeocodeError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let limit = limit.to_string();
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("q", query), ("format", "jsonv2"), ("limit", limit.as_str())])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        let body: serde_json::Value = resp.error_for_status()?.json().await?;
        parse_response(&body)
    }
}

/// Area id of the first hit that is a relation or way.
#[must_use]
pub fn first_area_id(places: &[NominatimPlace]) -> Option<u64> {
    places.iter().find_map(NominatimPlace::overpass_area_id)
}

#[async_trait::async_trait]
impl CityGeocoder for NominatimClient {
    async fn locate(&self, city: &str) -> Result<Option<GeocodedCity>, GeocodeError> {
        Ok(self.search(city).await?.map(|place| GeocodedCity {
            latitude: place.latitude,
            longitude: place.longitude,
            matched_name: place.display_name,
        }))
    }
}

/// Parses a Nominatim `jsonv2` search response, keeping result order.
fn parse_response(body: &serde_json::Value) -> Result<Vec<NominatimPlace>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    results.iter().map(parse_place).collect()
}

fn parse_place(hit: &serde_json::Value) -> Result<NominatimPlace, GeocodeError> {
    let lat = hit["lat"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lat in Nominatim response".to_string(),
        })?;

    let lon = hit["lon"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lon in Nominatim response".to_string(),
        })?;

    Ok(NominatimPlace {
        latitude: lat,
        longitude: lon,
        display_name: hit["display_name"].as_str().map(String::from),
        osm_type: hit["osm_type"].as_str().map(String::from),
        osm_id: hit["osm_id"].as_u64(),
    })
}
