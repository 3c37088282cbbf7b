use std::{fmt, str::FromStr};

use bytes::Bytes;

use geo::{BoundingRect, Geometry, MultiPolygon, Rect};
use geojson::{Feature, GeoJson};
use serde::Serialize;
use tracing::warn;

use super::LoadError;

/// Property keys checked, in order, for a feature's display name.
pub const NAME_KEYS: [&str; 3] = ["ADMIN", "name", "NAME"];
const ISO_KEYS: [&str; 2] = ["ISO_A3", "ISO3166-1-Alpha-3"];
pub const UNKNOWN_NAME: &str = "Unknown";

#[derive(Debug, Clone)]
pub struct CountryFeature {
    pub name: String,
    pub iso_a3: Option<String>,
    pub geometry: MultiPolygon<f64>,
    pub bbox: Rect<f64>,
}

impl CountryFeature {
    pub fn new(name: impl Into<String>, geometry: MultiPolygon<f64>) -> Option<Self> {
        let bbox = geometry.bounding_rect()?;
        Some(Self {
            name: name.into(),
            iso_a3: None,
            geometry,
            bbox,
        })
    }

    fn from_geojson(index: usize, feature: Feature) -> Option<Self> {
        let name = string_property(&feature, &NAME_KEYS)
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());
        let iso_a3 = string_property(&feature, &ISO_KEYS);

        let Some(geometry) = feature.geometry else {
            warn!(index, %name, "skipping feature without geometry");
            return None;
        };
        let geometry = match Geometry::<f64>::try_from(geometry.value) {
            Ok(Geometry::Polygon(polygon)) => MultiPolygon::new(vec![polygon]),
            Ok(Geometry::MultiPolygon(multi)) => multi,
            Ok(_) => {
                warn!(index, %name, "skipping non-areal feature");
                return None;
            }
            Err(err) => {
                warn!(index, %name, error = %err, "skipping feature with invalid geometry");
                return None;
            }
        };

        let Some(mut country) = Self::new(name.clone(), geometry) else {
            warn!(index, %name, "skipping feature with empty geometry");
            return None;
        };
        country.iso_a3 = iso_a3;
        Some(country)
    }
}

fn string_property(feature: &Feature, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| feature.property(key).and_then(|v| v.as_str()))
        .find(|value| !value.trim().is_empty())
        .map(str::to_string)
}

/// Immutable, non-empty set of country features in dataset order.
#[derive(Clone)]
pub struct CountryCollection {
    features: Vec<CountryFeature>,
    raw: Bytes,
}

impl CountryCollection {
    /// Builds a collection directly from features, e.g. for tests.
    pub fn from_features(features: Vec<CountryFeature>) -> Result<Self, LoadError> {
        if features.is_empty() {
            return Err(LoadError::Empty);
        }
        Ok(Self {
            features,
            raw: Bytes::new(),
        })
    }

    /// Parses a FeatureCollection, keeping the source text as the overlay
    /// document.
    pub fn parse(text: impl Into<String>) -> Result<Self, LoadError> {
        let text = text.into();
        let document =
            GeoJson::from_str(&text).map_err(|err| LoadError::Parse(err.to_string()))?;
        let GeoJson::FeatureCollection(collection) = document else {
            return Err(LoadError::Parse(
                "expected a GeoJSON FeatureCollection".to_string(),
            ));
        };

        let features: Vec<_> = collection
            .features
            .into_iter()
            .enumerate()
            .filter_map(|(index, feature)| CountryFeature::from_geojson(index, feature))
            .collect();

        let mut parsed = Self::from_features(features)?;
        parsed.raw = Bytes::from(text);
        Ok(parsed)
    }

    pub fn features(&self) -> &[CountryFeature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Source document, served to the map as the boundary overlay. Clones
    /// share one buffer.
    pub fn raw_geojson(&self) -> Bytes {
        self.raw.clone()
    }
}

impl fmt::Debug for CountryCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountryCollection")
            .field("features", &self.features.len())
            .field("raw_bytes", &self.raw.len())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lng: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lng.is_finite() && self.lat.is_finite()
    }
}
