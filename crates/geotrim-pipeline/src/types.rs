//! Shared types for the geotrim outline simplification pipeline.

use serde::{Deserialize, Serialize};

/// Re-export the JSON value type so downstream crates can build
/// feature metadata without depending on `serde_json` directly.
pub use serde_json::Value;

/// Arbitrary key-value members attached to a feature or collection.
pub type Properties = serde_json::Map<String, Value>;

/// A 2D point in geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Longitude in decimal degrees.
    pub x: f64,
    /// Latitude in decimal degrees.
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Returns `true` if both components are finite.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A closed sequence of points forming a polygon boundary or hole.
///
/// By convention the first and last point are equal. The type does not
/// enforce this: rings read from the outside world are kept as given and
/// the pipeline only promises not to break closure that was present.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ring(Vec<Point>);

impl Ring {
    /// Minimum number of points for a ring to describe a closed area:
    /// three distinct vertices plus the repeated closing vertex.
    pub const MIN_POINTS: usize = 4;

    /// Create a new ring from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the ring has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the ring.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Point> {
        self.0.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Point> {
        self.0.last()
    }

    /// Returns `true` if the ring is non-empty and its first and last
    /// points are equal.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!((self.first(), self.last()), (Some(a), Some(b)) if a == b)
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the ring and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }
}

impl From<Vec<Point>> for Ring {
    fn from(points: Vec<Point>) -> Self {
        Self(points)
    }
}

/// A polygon: an outer boundary ring followed by zero or more holes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon(Vec<Ring>);

impl Polygon {
    /// Create a new polygon from its rings (outer boundary first).
    #[must_use]
    pub const fn new(rings: Vec<Ring>) -> Self {
        Self(rings)
    }

    /// The outer boundary, if the polygon has any rings.
    #[must_use]
    pub fn exterior(&self) -> Option<&Ring> {
        self.0.first()
    }

    /// The hole rings (everything after the outer boundary).
    #[must_use]
    pub fn interiors(&self) -> &[Ring] {
        self.0.get(1..).unwrap_or_default()
    }

    /// All rings in order.
    #[must_use]
    pub fn rings(&self) -> &[Ring] {
        &self.0
    }

    /// Consumes the polygon and returns its rings.
    #[must_use]
    pub fn into_rings(self) -> Vec<Ring> {
        self.0
    }

    /// Total number of points across all rings.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.0.iter().map(Ring::len).sum()
    }
}

/// An ordered collection of polygons.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultiPolygon(Vec<Polygon>);

impl MultiPolygon {
    /// Create a new multipolygon.
    #[must_use]
    pub const fn new(polygons: Vec<Polygon>) -> Self {
        Self(polygons)
    }

    /// All polygons in order.
    #[must_use]
    pub fn polygons(&self) -> &[Polygon] {
        &self.0
    }

    /// Consumes the multipolygon and returns its polygons.
    #[must_use]
    pub fn into_polygons(self) -> Vec<Polygon> {
        self.0
    }

    /// Total number of points across all polygons.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.0.iter().map(Polygon::point_count).sum()
    }
}

/// Feature geometry, dispatched by kind.
///
/// Only polygonal geometry is simplified. Everything else (points,
/// lines, collections, unknown types) is carried as its raw JSON value
/// and passed through untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// A single polygon with optional holes.
    Polygon(Polygon),
    /// Several polygons, each with optional holes.
    MultiPolygon(MultiPolygon),
    /// Any other geometry, kept verbatim.
    Other(Value),
}

impl Geometry {
    /// The GeoJSON type name for polygonal variants, or the `type`
    /// member of an opaque geometry when it has one.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Polygon(_) => Some("Polygon"),
            Self::MultiPolygon(_) => Some("MultiPolygon"),
            Self::Other(value) => value.get("type").and_then(Value::as_str),
        }
    }
}

/// A labelled geometry with its metadata.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Feature {
    /// Feature identifier, if any.
    pub id: Option<Value>,
    /// The feature geometry; `None` for a `null` geometry.
    pub geometry: Option<Geometry>,
    /// Semantic properties (names, codes, population, ...).
    pub properties: Properties,
    /// Any other members of the feature object, kept as-is.
    pub foreign_members: Properties,
}

/// An ordered set of features plus collection-level members.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureCollection {
    /// Features in document order.
    pub features: Vec<Feature>,
    /// Legacy coordinate reference system member.
    pub crs: Option<Value>,
    /// Any other members of the collection object (`bbox`, `name`, ...).
    pub foreign_members: Properties,
}

/// Configuration for the simplification pipeline.
///
/// Missing fields fall back to their defaults when deserializing, so a
/// partial JSON object such as `{"tolerance": 0.2}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifyConfig {
    /// Douglas-Peucker tolerance in decimal degrees. Points closer than
    /// this to the retained chord are dropped.
    pub tolerance: f64,

    /// Number of decimal places kept in output coordinates.
    pub precision: u8,

    /// Simplify features on the rayon thread pool.
    pub parallel: bool,
}

impl SimplifyConfig {
    /// Default simplification tolerance (degrees).
    pub const DEFAULT_TOLERANCE: f64 = 0.5;

    /// Default coordinate precision (decimal places).
    pub const DEFAULT_PRECISION: u8 = 1;

    /// Largest accepted precision. `f64` carries roughly 15-17
    /// significant digits, so more decimal places are meaningless.
    pub const MAX_PRECISION: u8 = 15;

    /// Check the configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns [`SimplifyError::InvalidConfig`] if the tolerance is
    /// negative or not finite, or if the precision exceeds
    /// [`Self::MAX_PRECISION`].
    pub fn validate(&self) -> Result<(), SimplifyError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(SimplifyError::InvalidConfig(format!(
                "tolerance must be a finite, non-negative number, got {}",
                self.tolerance
            )));
        }
        if self.precision > Self::MAX_PRECISION {
            return Err(SimplifyError::InvalidConfig(format!(
                "precision must be at most {}, got {}",
                Self::MAX_PRECISION,
                self.precision
            )));
        }
        Ok(())
    }
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self {
            tolerance: Self::DEFAULT_TOLERANCE,
            precision: Self::DEFAULT_PRECISION,
            parallel: false,
        }
    }
}

/// Errors that can occur while simplifying a feature collection.
#[derive(Debug, thiserror::Error)]
pub enum SimplifyError {
    /// Pipeline configuration is invalid.
    #[error("invalid simplify configuration: {0}")]
    InvalidConfig(String),

    /// A point has a non-finite component.
    #[error("invalid coordinate ({x}, {y}) at polygon {polygon}, ring {ring}, point {point}")]
    InvalidCoordinate {
        /// Polygon index within the geometry (always 0 for `Polygon`).
        polygon: usize,
        /// Ring index within the polygon.
        ring: usize,
        /// Point index within the ring.
        point: usize,
        /// Offending longitude.
        x: f64,
        /// Offending latitude.
        y: f64,
    },

    /// Simplifying a specific feature failed.
    #[error("feature {index}: {source}")]
    Feature {
        /// Feature index within the collection.
        index: usize,
        /// The underlying failure.
        source: Box<Self>,
    },
}

impl SimplifyError {
    /// Index of the feature that failed, when known.
    #[must_use]
    pub const fn feature_index(&self) -> Option<usize> {
        match self {
            Self::Feature { index, .. } => Some(*index),
            _ => None,
        }
    }
}
