//! Application configuration loaded from YAML.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::geodata::GeoDataSource;

pub const DEFAULT_GEOJSON_URL: &str =
    "https://raw.githubusercontent.com/datasets/geo-countries/master/data/countries.geojson";

fn default_geojson_url() -> String {
    DEFAULT_GEOJSON_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_summary_delay_ms() -> u64 {
    800
}

fn default_simulation_delay_ms() -> u64 {
    1500
}

fn default_banner_secs() -> u64 {
    5
}

fn default_log_capacity() -> usize {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub geodata: GeoDataConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoDataConfig {
    #[serde(default = "default_geojson_url")]
    pub url: String,
    /// Local GeoJSON file; takes precedence over `url` when set.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeoDataConfig {
    fn default() -> Self {
        Self {
            url: default_geojson_url(),
            path: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GeoDataConfig {
    pub fn source(&self) -> GeoDataSource {
        match &self.path {
            Some(path) => GeoDataSource::File(path.clone()),
            None => GeoDataSource::Url(self.url.clone()),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Master seed for the simulation RNG; drawn from entropy when omitted.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_summary_delay_ms")]
    pub summary_delay_ms: u64,
    #[serde(default = "default_simulation_delay_ms")]
    pub simulation_delay_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            summary_delay_ms: default_summary_delay_ms(),
            simulation_delay_ms: default_simulation_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_banner_secs")]
    pub banner_secs: u64,
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            banner_secs: default_banner_secs(),
            log_capacity: default_log_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<AppConfig> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        let geodata = GeoDataConfig {
            path: config.geodata.path.as_ref().map(|p| self.base_dir.join(p)),
            ..config.geodata
        };
        Ok(AppConfig { geodata, ..config })
    }
}
