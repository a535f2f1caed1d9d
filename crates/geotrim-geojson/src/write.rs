//! Compact GeoJSON writer.
//!
//! Emits the collection with no insignificant whitespace. Coordinates
//! with no fractional part are written as integers (`10` rather than
//! `10.0`), which matters once quantization has rounded most of them.
//!
//! Member order is `type`, then foreign members, then `features` (and
//! `crs` when still present). Features are written as `type`, `id`,
//! `geometry`, `properties`, then foreign members.

use serde::ser::{Error as _, SerializeMap, SerializeSeq, Serializer};
use serde::Serialize;
use serde_json::Value;

use geotrim_pipeline::{Feature, FeatureCollection, Geometry, MultiPolygon, Point, Polygon, Ring};

use crate::GeoJsonError;

/// Encode a collection as compact GeoJSON bytes.
///
/// # Errors
///
/// Returns [`GeoJsonError::Json`] if a coordinate is not finite, since
/// JSON has no representation for NaN or infinity.
pub fn to_vec(collection: &FeatureCollection) -> Result<Vec<u8>, GeoJsonError> {
    Ok(serde_json::to_vec(&CollectionOut(collection))?)
}

/// Encode a collection as a compact GeoJSON string.
///
/// # Errors
///
/// See [`to_vec`].
pub fn to_string(collection: &FeatureCollection) -> Result<String, GeoJsonError> {
    Ok(serde_json::to_string(&CollectionOut(collection))?)
}

struct CollectionOut<'a>(&'a FeatureCollection);

impl Serialize for CollectionOut<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let collection = self.0;
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", "FeatureCollection")?;
        for (key, value) in &collection.foreign_members {
            map.serialize_entry(key, value)?;
        }
        if let Some(crs) = &collection.crs {
            map.serialize_entry("crs", crs)?;
        }
        map.serialize_entry("features", &FeaturesOut(&collection.features))?;
        map.end()
    }
}

struct FeaturesOut<'a>(&'a [Feature]);

impl Serialize for FeaturesOut<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(FeatureOut))
    }
}

struct FeatureOut<'a>(&'a Feature);

impl Serialize for FeatureOut<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let feature = self.0;
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", "Feature")?;
        if let Some(id) = &feature.id {
            map.serialize_entry("id", id)?;
        }
        map.serialize_entry("geometry", &feature.geometry.as_ref().map(GeometryOut))?;
        map.serialize_entry("properties", &feature.properties)?;
        for (key, value) in &feature.foreign_members {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct GeometryOut<'a>(&'a Geometry);

impl Serialize for GeometryOut<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Geometry::Polygon(polygon) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "Polygon")?;
                map.serialize_entry("coordinates", &PolygonOut(polygon))?;
                map.end()
            }
            Geometry::MultiPolygon(multi) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "MultiPolygon")?;
                map.serialize_entry("coordinates", &MultiPolygonOut(multi))?;
                map.end()
            }
            Geometry::Other(value) => Value::serialize(value, serializer),
        }
    }
}

struct MultiPolygonOut<'a>(&'a MultiPolygon);

impl Serialize for MultiPolygonOut<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.polygons().iter().map(PolygonOut))
    }
}

struct PolygonOut<'a>(&'a Polygon);

impl Serialize for PolygonOut<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.rings().iter().map(RingOut))
    }
}

struct RingOut<'a>(&'a Ring);

impl Serialize for RingOut<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.points().iter().copied().map(PositionOut))
    }
}

/// A `[x, y]` position.
struct PositionOut(Point);

impl Serialize for PositionOut {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(&CoordinateOut(self.0.x))?;
        seq.serialize_element(&CoordinateOut(self.0.y))?;
        seq.end()
    }
}

/// A single coordinate, written as an integer when it has no fraction.
struct CoordinateOut(f64);

impl CoordinateOut {
    /// Magnitudes up to 2^53 convert to `i64` without loss.
    const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;
}

impl Serialize for CoordinateOut {
    #[allow(clippy::cast_possible_truncation)]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let v = self.0;
        if !v.is_finite() {
            return Err(S::Error::custom(format!("non-finite coordinate {v}")));
        }
        if v.fract() == 0.0 && v.abs() <= Self::MAX_EXACT_INT {
            serializer.serialize_i64(v as i64)
        } else {
            serializer.serialize_f64(v)
        }
    }
}
