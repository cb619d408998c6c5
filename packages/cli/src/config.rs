//! Run configuration loaded from `spendmap.toml`.
//!
//! Every key is optional; a missing key takes the default shown on the
//! corresponding field.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use spendmap_buildings::convert::DEFAULT_SIMPLIFY_TOLERANCE;
use spendmap_buildings::overpass::DEFAULT_OVERPASS_URL;
use spendmap_geocoder::nominatim::DEFAULT_NOMINATIM_URL;
use spendmap_geocoder::{CoordinateOverride, default_overrides};
use thiserror::Error;

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "spendmap.toml";

/// Errors that can occur while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`Config`].
    #[error("Invalid config {path}: {source}")]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: toml::de::Error,
    },
}

/// Top-level run settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Transaction CSV (`data/data.csv`).
    pub transactions_csv: PathBuf,
    /// Cities to report on, named as in the CSV `City` column.
    pub cities: Vec<String>,
    /// Read buildings from the cache blob instead of the network (`true`).
    pub use_cache: bool,
    /// Building cache blob (`buildings_data.msgpack`).
    pub cache_path: PathBuf,
    /// Directory receiving the page and the `citymaps/` artifacts (`.`).
    pub output_dir: PathBuf,
    /// Page heading.
    pub title: String,
    /// Footprint simplification tolerance in degrees; `0` disables it.
    pub simplify_tolerance: f64,
    /// Height estimator seed. Unset means a fresh seed per run.
    pub seed: Option<u64>,
    /// Network provider settings.
    pub providers: ProviderSettings,
    /// Fixed coordinates applied after geocoding.
    pub overrides: Vec<CoordinateOverride>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transactions_csv: PathBuf::from("data/data.csv"),
            cities: vec![
                "Bengaluru, India".to_string(),
                "Delhi, India".to_string(),
                "Ahmedabad, India".to_string(),
            ],
            use_cache: true,
            cache_path: PathBuf::from("buildings_data.msgpack"),
            output_dir: PathBuf::from("."),
            title: "Indian Cities Spending Habits".to_string(),
            simplify_tolerance: DEFAULT_SIMPLIFY_TOLERANCE,
            seed: None,
            providers: ProviderSettings::default(),
            overrides: default_overrides(),
        }
    }
}

/// `[providers]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderSettings {
    /// Nominatim search endpoint.
    pub nominatim_url: String,
    /// Overpass interpreter endpoint.
    pub overpass_url: String,
    /// Sent with every request; the public Nominatim and Overpass
    /// instances reject anonymous clients.
    pub user_agent: String,
    /// Delay before each Nominatim request, in milliseconds.
    pub rate_limit_ms: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            nominatim_url: DEFAULT_NOMINATIM_URL.to_string(),
            overpass_url: DEFAULT_OVERPASS_URL.to_string(),
            user_agent: concat!("spendmap/", env!("CARGO_PKG_VERSION")).to_string(),
            rate_limit_ms: 1000,
        }
    }
}

impl Config {
    /// Parses a config document.
    ///
    /// # Errors
    ///
    /// Returns the TOML error if the document is malformed or has unknown
    /// keys.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Loads the config for a run.
    ///
    /// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_PATH`]
    /// is read if present and defaults are used otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };

        if !required && !path.exists() {
            log::info!("No {DEFAULT_CONFIG_PATH} found, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
