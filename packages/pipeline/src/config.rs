//! Dashboard configuration read from the environment.

use std::path::PathBuf;
use std::str::FromStr;

use culture_map_analytics_models::{DEFAULT_DENSITY_CEILING, GroupKeyPolicy};
use thiserror::Error;

/// Default source file.
pub const DEFAULT_DATA_PATH: &str = "data/cultural_data.csv";

/// Default number of memoized filter results.
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8080;

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed.
    #[error("invalid {var}={value:?}: {message}")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
        /// What was expected.
        message: String,
    },
}

/// Settings shared by the server and the CLI.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Source file to load.
    pub data_path: PathBuf,
    /// Schema id, or `None` to detect from the header row.
    pub schema_id: Option<String>,
    /// Upper bound of the density color scale.
    pub density_ceiling: f64,
    /// How communes are grouped.
    pub group_key: GroupKeyPolicy,
    /// Maximum number of memoized filter results.
    pub cache_capacity: usize,
    /// HTTP bind address.
    pub bind_addr: String,
    /// HTTP port.
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            schema_id: None,
            density_ceiling: DEFAULT_DENSITY_CEILING,
            group_key: GroupKeyPolicy::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

fn parse_var<T>(var: &'static str, value: &str, expected: &str) -> Result<T, ConfigError>
where
    T: FromStr,
{
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        value: value.to_string(),
        message: format!("expected {expected}"),
    })
}

/// Validates a density ceiling.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] unless `ceiling` is finite and not
/// negative.
pub fn validate_ceiling(ceiling: f64) -> Result<f64, ConfigError> {
    if ceiling.is_finite() && ceiling >= 0.0 {
        Ok(ceiling)
    } else {
        Err(ConfigError::Invalid {
            var: "CULTURE_MAP_DENSITY_CEILING",
            value: ceiling.to_string(),
            message: "expected a finite, non-negative number".to_string(),
        })
    }
}

impl DashboardConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads the configuration through `lookup`, falling back to defaults
    /// for unset or empty variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an unparseable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(path) = get("CULTURE_MAP_DATA") {
            config.data_path = PathBuf::from(path);
        }
        config.schema_id = get("CULTURE_MAP_SCHEMA").map(|s| s.trim().to_string());
        if let Some(v) = get("CULTURE_MAP_DENSITY_CEILING") {
            let ceiling = parse_var("CULTURE_MAP_DENSITY_CEILING", &v, "a number")?;
            config.density_ceiling = validate_ceiling(ceiling)?;
        }
        if let Some(v) = get("CULTURE_MAP_GROUP_KEY") {
            config.group_key = parse_var("CULTURE_MAP_GROUP_KEY", &v, "auto, code or name")?;
        }
        if let Some(v) = get("CULTURE_MAP_CACHE_CAPACITY") {
            config.cache_capacity =
                parse_var("CULTURE_MAP_CACHE_CAPACITY", &v, "a non-negative integer")?;
        }
        if let Some(v) = get("BIND_ADDR") {
            config.bind_addr = v;
        }
        if let Some(v) = get("PORT") {
            config.port = parse_var("PORT", &v, "a port number")?;
        }

        Ok(config)
    }
}
