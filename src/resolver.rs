//! Point-to-country lookup over the loaded boundary dataset.
//!
//! Features are scanned in dataset order and the first one containing the
//! point wins. Overlapping polygons therefore resolve to the earlier feature.

use geo::algorithm::coordinate_position::{CoordPos, CoordinatePosition};
use geo::{Coord, MultiPolygon, Rect};
use thiserror::Error;

use crate::geodata::{CountryCollection, CountryFeature, GeoData, GeoPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Geodata is not loaded yet")]
pub struct DataNotReady;

/// Containment test used by the resolver.
pub trait PointInPolygon {
    fn contains(&self, geometry: &MultiPolygon<f64>, point: Coord<f64>) -> bool;
}

/// Boundary-inclusive containment backed by `geo`; honours holes and
/// multipart polygons.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoPredicate;

impl PointInPolygon for GeoPredicate {
    fn contains(&self, geometry: &MultiPolygon<f64>, point: Coord<f64>) -> bool {
        geometry.coordinate_position(&point) != CoordPos::Outside
    }
}

#[derive(Debug, Clone, Default)]
pub struct PointResolver<P = GeoPredicate> {
    predicate: P,
}

impl PointResolver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: PointInPolygon> PointResolver<P> {
    pub fn with_predicate(predicate: P) -> Self {
        Self { predicate }
    }

    pub fn resolve<'a>(
        &self,
        data: &'a GeoData,
        point: GeoPoint,
    ) -> Result<Option<&'a CountryFeature>, DataNotReady> {
        let collection = data.ready().ok_or(DataNotReady)?;
        Ok(self.find(collection, point))
    }

    pub fn find<'a>(
        &self,
        collection: &'a CountryCollection,
        point: GeoPoint,
    ) -> Option<&'a CountryFeature> {
        if !point.is_finite() {
            return None;
        }
        let coord = Coord {
            x: point.lng,
            y: point.lat,
        };
        collection
            .features()
            .iter()
            .filter(|feature| bbox_contains(&feature.bbox, coord))
            .find(|feature| self.predicate.contains(&feature.geometry, coord))
    }
}

fn bbox_contains(bbox: &Rect<f64>, coord: Coord<f64>) -> bool {
    let (min, max) = (bbox.min(), bbox.max());
    coord.x >= min.x && coord.x <= max.x && coord.y >= min.y && coord.y <= max.y
}
