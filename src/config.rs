/// Service configuration loader - parses airmon.toml
///
/// Keeps the upstream API location and the database path out of the code
/// so a deployment can point at a mirror or a different data directory
/// without recompiling.
///
/// Precedence, lowest to highest: built-in defaults, `airmon.toml`,
/// environment (`AIRMON_API_URL`, `AIRMON_DB_PATH`, also read from `.env`),
/// then whatever the CLI passes on top.

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Default location of the configuration file (current working directory).
pub const CONFIG_FILE: &str = "airmon.toml";

/// Public REST endpoint of the GIOS air-quality network.
pub const DEFAULT_API_BASE_URL: &str = "https://api.gios.gov.pl/pjp-api/rest";

pub const ENV_API_URL: &str = "AIRMON_API_URL";
pub const ENV_DB_PATH: &str = "AIRMON_DB_PATH";

/// Runtime configuration for the monitor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the pjp-api REST service, without a trailing slash.
    pub api_base_url: String,
    /// SQLite database file holding saved measurements.
    pub database_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            database_path: default_db_path(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file. Missing keys take defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::from_toml_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        let mut config: AppConfig = toml::from_str(contents)?;
        config.api_base_url = config.api_base_url.trim_end_matches('/').to_string();
        Ok(config)
    }

    /// Loads `path` if it exists (defaults otherwise), then applies the
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let path = path.unwrap_or_else(|| Path::new(CONFIG_FILE));
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };

        config.apply_overrides(env::var(ENV_API_URL).ok(), env::var(ENV_DB_PATH).ok());
        Ok(config)
    }

    /// Applies optional overrides on top of the loaded values.
    pub fn apply_overrides(&mut self, api_base_url: Option<String>, database_path: Option<String>) {
        if let Some(url) = api_base_url.filter(|u| !u.trim().is_empty()) {
            self.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(path) = database_path.filter(|p| !p.trim().is_empty()) {
            self.database_path = PathBuf::from(path);
        }
    }
}

/// Default database path following platform conventions.
///
/// - Linux: `~/.local/share/airmon/air_quality.db`
/// - macOS: `~/Library/Application Support/airmon/air_quality.db`
/// - Windows: `C:\Users\<user>\AppData\Local\airmon\air_quality.db`
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("data"))
        .join("airmon")
        .join("air_quality.db")
}
