//! Country boundary dataset: source selection, loading and the load-state slot.

mod feature;

use std::{path::PathBuf, sync::Arc, time::Duration};

use thiserror::Error;
use tracing::{debug, info};

pub use feature::{CountryCollection, CountryFeature, GeoPoint, NAME_KEYS, UNKNOWN_NAME};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeoDataSource {
    Url(String),
    File(PathBuf),
}

impl std::fmt::Display for GeoDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoDataSource::Url(url) => write!(f, "{url}"),
            GeoDataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum LoadError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("unable to read {path}: {message}")]
    Io { path: PathBuf, message: String },
    #[error("invalid geodata: {0}")]
    Parse(String),
    #[error("dataset contains no polygon features")]
    Empty,
}

pub struct GeoDataLoader {
    source: GeoDataSource,
    timeout: Duration,
}

impl GeoDataLoader {
    pub fn new(source: GeoDataSource, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    pub fn source(&self) -> &GeoDataSource {
        &self.source
    }

    pub async fn load(&self) -> Result<CountryCollection, LoadError> {
        info!(source = %self.source, "loading geodata");
        let text = match &self.source {
            GeoDataSource::Url(url) => self.fetch(url).await?,
            GeoDataSource::File(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|err| LoadError::Io {
                        path: path.clone(),
                        message: err.to_string(),
                    })?
            }
        };
        debug!(bytes = text.len(), "geodata received");
        let collection = CountryCollection::parse(text)?;
        info!(features = collection.len(), "geodata parsed");
        Ok(collection)
    }

    async fn fetch(&self, url: &str) -> Result<String, LoadError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|err| LoadError::Network(err.to_string()))?;
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|err| LoadError::Network(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status(status.as_u16()));
        }
        response
            .text()
            .await
            .map_err(|err| LoadError::Network(err.to_string()))
    }
}

/// Load state of the dataset as seen by the resolver.
#[derive(Debug, Clone, Default)]
pub enum GeoData {
    #[default]
    Pending,
    Ready(Arc<CountryCollection>),
    Failed(String),
}

impl GeoData {
    pub fn ready(&self) -> Option<&CountryCollection> {
        match self {
            GeoData::Ready(collection) => Some(collection),
            _ => None,
        }
    }
}
