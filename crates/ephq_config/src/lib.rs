//! Configuration for the ephemeris facade.
//!
//! A TOML file names the ephemeris data directory, an optional default
//! observer and the atmosphere used for refraction. `EPHQ_EPHE_PATH`
//! overrides the file's data directory.
//!
//! ```toml
//! ephe_path = "/usr/share/ephe"
//! [observer]
//! longitude_deg = -122.42
//! latitude_deg  = 37.77
//! altitude_m    = 16.0
//! [atmosphere]
//! pressure_hpa  = 1013.25
//! temperature_c = 15.0
//! ```

use std::path::{Path, PathBuf};

use ephq_core::{Atmosphere, DataSource, GeoLocation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding [`EphqConfig::ephe_path`].
pub const EPHE_PATH_ENV: &str = "EPHQ_EPHE_PATH";

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EphqConfig {
    /// Directory of installed ephemeris files. Absent or empty selects the
    /// engine's built-in model.
    #[serde(default)]
    pub ephe_path: Option<PathBuf>,

    /// Default observer for commands that need one.
    #[serde(default)]
    pub observer: Option<ObserverConfig>,

    #[serde(default)]
    pub atmosphere: AtmosphereConfig,
}

/// `[observer]` table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObserverConfig {
    pub longitude_deg: f64,
    pub latitude_deg: f64,
    #[serde(default)]
    pub altitude_m: f64,
}

/// `[atmosphere]` table. Zero pressure disables refraction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AtmosphereConfig {
    #[serde(default)]
    pub pressure_hpa: f64,
    #[serde(default)]
    pub temperature_c: f64,
}

impl EphqConfig {
    /// Read and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup(EPHE_PATH_ENV) {
            log::debug!("{EPHE_PATH_ENV} overrides ephe_path");
            self.ephe_path = Some(PathBuf::from(path));
        }
    }

    /// Reject coordinates outside their ranges and non-finite numbers.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(obs) = &self.observer {
            check_finite("observer.longitude_deg", obs.longitude_deg)?;
            check_finite("observer.latitude_deg", obs.latitude_deg)?;
            check_finite("observer.altitude_m", obs.altitude_m)?;
            if !(-90.0..=90.0).contains(&obs.latitude_deg) {
                return Err(ConfigError::Invalid(format!(
                    "observer.latitude_deg {} outside [-90, 90]",
                    obs.latitude_deg
                )));
            }
            if !(-180.0..=180.0).contains(&obs.longitude_deg) {
                return Err(ConfigError::Invalid(format!(
                    "observer.longitude_deg {} outside [-180, 180]",
                    obs.longitude_deg
                )));
            }
        }
        check_finite("atmosphere.pressure_hpa", self.atmosphere.pressure_hpa)?;
        check_finite("atmosphere.temperature_c", self.atmosphere.temperature_c)?;
        if self.atmosphere.pressure_hpa < 0.0 {
            return Err(ConfigError::Invalid(
                "atmosphere.pressure_hpa must not be negative".into(),
            ));
        }
        Ok(())
    }

    pub fn data_source(&self) -> DataSource {
        DataSource::from_path(self.ephe_path.as_deref())
    }

    pub fn observer(&self) -> Option<GeoLocation> {
        self.observer
            .map(|o| GeoLocation::new(o.longitude_deg, o.latitude_deg, o.altitude_m))
    }

    pub fn atmosphere(&self) -> Atmosphere {
        Atmosphere::new(self.atmosphere.pressure_hpa, self.atmosphere.temperature_c)
    }
}

fn check_finite(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{field} must be finite")))
    }
}
