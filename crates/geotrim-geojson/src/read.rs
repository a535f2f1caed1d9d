//! GeoJSON reader.
//!
//! Decodes a `FeatureCollection` document into the pipeline's typed
//! model. Only the structure the pipeline needs is checked:
//!
//! - the top-level `type` must be `FeatureCollection`,
//! - each feature's `type` must be `Feature`,
//! - `Polygon` and `MultiPolygon` coordinates must nest correctly and
//!   every position must have at least two numbers.
//!
//! Positions with extra dimensions (altitude, measures) are truncated to
//! `[x, y]`. Any other geometry type is kept as its raw JSON value.

use serde::Deserialize;
use serde_json::Value;

use geotrim_pipeline::{
    Feature, FeatureCollection, Geometry, MultiPolygon, Point, Polygon, Properties, Ring,
};

use crate::GeoJsonError;

#[derive(Deserialize)]
struct RawCollection {
    #[serde(rename = "type")]
    kind: String,
    features: Vec<RawFeature>,
    #[serde(default)]
    crs: Option<Value>,
    #[serde(flatten)]
    foreign: Properties,
}

#[derive(Deserialize)]
struct RawFeature {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    geometry: Option<Value>,
    #[serde(default)]
    properties: Option<Value>,
    #[serde(flatten)]
    foreign: Properties,
}

#[derive(Deserialize)]
struct RawCoordinates<T> {
    coordinates: T,
}

type RawRing = Vec<Vec<f64>>;
type RawPolygon = Vec<RawRing>;

/// Decode a GeoJSON `FeatureCollection` from bytes.
///
/// # Errors
///
/// Returns [`GeoJsonError::Json`] for malformed JSON or a document whose
/// shape does not match a feature collection, and the other
/// [`GeoJsonError`] variants for the structural checks listed in the
/// module docs.
pub fn from_slice(bytes: &[u8]) -> Result<FeatureCollection, GeoJsonError> {
    let raw: RawCollection = serde_json::from_slice(bytes)?;
    convert_collection(raw)
}

/// Decode a GeoJSON `FeatureCollection` from a string.
///
/// # Errors
///
/// See [`from_slice`].
pub fn from_str(text: &str) -> Result<FeatureCollection, GeoJsonError> {
    from_slice(text.as_bytes())
}

fn convert_collection(raw: RawCollection) -> Result<FeatureCollection, GeoJsonError> {
    if raw.kind != "FeatureCollection" {
        return Err(GeoJsonError::NotFeatureCollection(raw.kind));
    }

    let features = raw
        .features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| convert_feature(index, feature))
        .collect::<Result<Vec<_>, _>>()?;
    log::debug!("decoded {} features", features.len());

    Ok(FeatureCollection {
        features,
        crs: raw.crs,
        foreign_members: raw.foreign,
    })
}

fn convert_feature(index: usize, raw: RawFeature) -> Result<Feature, GeoJsonError> {
    if raw.kind != "Feature" {
        return Err(GeoJsonError::UnexpectedType {
            feature: index,
            expected: "Feature",
            found: raw.kind,
        });
    }

    let properties = match raw.properties {
        None => Properties::new(),
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(GeoJsonError::InvalidProperties {
                feature: index,
                found: json_type_name(&other),
            });
        }
    };

    let geometry = raw
        .geometry
        .map(|value| convert_geometry(index, value))
        .transpose()?;

    Ok(Feature {
        id: raw.id,
        geometry,
        properties,
        foreign_members: raw.foreign,
    })
}

fn convert_geometry(feature: usize, value: Value) -> Result<Geometry, GeoJsonError> {
    let kind = value.get("type").and_then(Value::as_str).map(str::to_owned);
    match kind.as_deref() {
        Some("Polygon") => {
            let raw: RawCoordinates<RawPolygon> = serde_json::from_value(value)?;
            Ok(Geometry::Polygon(convert_polygon(feature, 0, raw.coordinates)?))
        }
        Some("MultiPolygon") => {
            let raw: RawCoordinates<Vec<RawPolygon>> = serde_json::from_value(value)?;
            let polygons = raw
                .coordinates
                .into_iter()
                .enumerate()
                .map(|(i, polygon)| convert_polygon(feature, i, polygon))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Geometry::MultiPolygon(MultiPolygon::new(polygons)))
        }
        Some(_) => Ok(Geometry::Other(value)),
        None => Err(GeoJsonError::MissingGeometryType { feature }),
    }
}

fn convert_polygon(
    feature: usize,
    polygon: usize,
    rings: RawPolygon,
) -> Result<Polygon, GeoJsonError> {
    let rings = rings
        .into_iter()
        .enumerate()
        .map(|(ring, positions)| {
            positions
                .into_iter()
                .enumerate()
                .map(|(point, position)| match position.as_slice() {
                    [x, y, ..] => Ok(Point::new(*x, *y)),
                    _ => Err(GeoJsonError::InvalidPosition {
                        feature,
                        polygon,
                        ring,
                        point,
                        len: position.len(),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Ring::new)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(rings))
}

const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn reads_polygon_feature() {
        let collection = from_str(
            r#"{
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "id": "ATA",
                    "properties": {"name": "Antarctica"},
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[0, 0], [0, 10], [10, 10], [10, 0], [0, 0]]]
                    }
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(collection.features.len(), 1);
        let feature = &collection.features[0];
        assert_eq!(feature.id, Some(Value::from("ATA")));
        assert_eq!(feature.properties["name"], "Antarctica");
        let Some(Geometry::Polygon(polygon)) = &feature.geometry else {
            unreachable!("expected a polygon");
        };
        assert_eq!(polygon.rings().len(), 1);
        assert_eq!(polygon.rings()[0].len(), 5);
        assert_eq!(polygon.rings()[0].points()[2], Point::new(10.0, 10.0));
    }

    #[test]
    fn reads_multipolygon_with_holes() {
        let collection = from_str(
            r#"{"type": "FeatureCollection", "features": [{
                "type": "Feature", "properties": null,
                "geometry": {"type": "MultiPolygon", "coordinates": [
                    [[[0,0],[0,9],[9,9],[9,0],[0,0]], [[1,1],[1,2],[2,2],[2,1],[1,1]]],
                    [[[20,0],[20,9],[29,9],[29,0],[20,0]]]
                ]}
            }]}"#,
        )
        .unwrap();

        let Some(Geometry::MultiPolygon(multi)) = &collection.features[0].geometry else {
            unreachable!("expected a multipolygon");
        };
        assert_eq!(multi.polygons().len(), 2);
        assert_eq!(multi.polygons()[0].rings().len(), 2);
        assert_eq!(multi.polygons()[1].rings().len(), 1);
        assert!(collection.features[0].properties.is_empty());
    }

    #[test]
    fn keeps_crs_and_foreign_members() {
        let collection = from_str(
            r#"{"type": "FeatureCollection", "name": "world",
                "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:OGC:1.3:CRS84"}},
                "features": [{"type": "Feature", "bbox": [0, 0, 1, 1], "properties": {}, "geometry": null}]}"#,
        )
        .unwrap();

        assert!(collection.crs.is_some());
        assert_eq!(collection.foreign_members["name"], "world");
        assert!(!collection.foreign_members.contains_key("type"));
        assert!(collection.features[0].geometry.is_none());
        assert!(collection.features[0].foreign_members.contains_key("bbox"));
    }

    #[test]
    fn other_geometry_kept_verbatim() {
        let collection = from_str(
            r#"{"type": "FeatureCollection", "features": [{"type": "Feature", "properties": {},
                "geometry": {"type": "LineString", "coordinates": [[0.123456, 1], [2, 3]]}}]}"#,
        )
        .unwrap();

        let Some(Geometry::Other(value)) = &collection.features[0].geometry else {
            unreachable!("expected an opaque geometry");
        };
        assert_eq!(value["type"], "LineString");
        assert_eq!(value["coordinates"][0][0], 0.123_456);
    }

    #[test]
    fn altitude_is_dropped() {
        let collection = from_str(
            r#"{"type": "FeatureCollection", "features": [{"type": "Feature", "properties": {},
                "geometry": {"type": "Polygon", "coordinates": [[[1, 2, 300], [3, 4, 300], [5, 6, 300], [1, 2, 300]]]}}]}"#,
        )
        .unwrap();

        let Some(Geometry::Polygon(polygon)) = &collection.features[0].geometry else {
            unreachable!("expected a polygon");
        };
        assert_eq!(polygon.rings()[0].points()[1], Point::new(3.0, 4.0));
    }

    #[test]
    fn rejects_non_collection() {
        let result = from_str(r#"{"type": "Feature", "features": []}"#);
        assert!(matches!(result, Err(GeoJsonError::NotFeatureCollection(t)) if t == "Feature"));
    }

    #[test]
    fn rejects_non_feature_member() {
        let result = from_str(
            r#"{"type": "FeatureCollection", "features": [{"type": "Polygon", "coordinates": []}]}"#,
        );
        assert!(matches!(
            result,
            Err(GeoJsonError::UnexpectedType { feature: 0, .. })
        ));
    }

    #[test]
    fn rejects_short_position() {
        let result = from_str(
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": {}, "geometry": null},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1], [1, 1], [0, 0]]]}}
            ]}"#,
        );
        assert!(matches!(
            result,
            Err(GeoJsonError::InvalidPosition {
                feature: 1,
                polygon: 0,
                ring: 0,
                point: 1,
                len: 1,
            })
        ));
    }

    #[test]
    fn rejects_non_numeric_coordinate() {
        let result = from_str(
            r#"{"type": "FeatureCollection", "features": [{"type": "Feature", "properties": {},
                "geometry": {"type": "Polygon", "coordinates": [[[0, "x"], [1, 1], [0, 0]]]}}]}"#,
        );
        assert!(matches!(result, Err(GeoJsonError::Json(_))));
    }

    #[test]
    fn rejects_geometry_without_type() {
        let result = from_str(
            r#"{"type": "FeatureCollection", "features": [{"type": "Feature", "properties": {},
                "geometry": {"coordinates": []}}]}"#,
        );
        assert!(matches!(
            result,
            Err(GeoJsonError::MissingGeometryType { feature: 0 })
        ));
    }

    #[test]
    fn rejects_non_object_properties() {
        let result = from_str(
            r#"{"type": "FeatureCollection", "features": [{"type": "Feature", "properties": [1], "geometry": null}]}"#,
        );
        assert!(matches!(
            result,
            Err(GeoJsonError::InvalidProperties {
                feature: 0,
                found: "array"
            })
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(from_str("{"), Err(GeoJsonError::Json(_))));
    }
}
