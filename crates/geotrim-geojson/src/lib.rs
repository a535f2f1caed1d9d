//! geotrim-geojson: Pure GeoJSON codec (sans-IO)
//!
//! Reads a GeoJSON `FeatureCollection` into the pipeline's typed model
//! and writes it back as compact GeoJSON. Operates on byte slices and
//! strings only; files and streams are the caller's business.

pub mod read;
pub mod write;

pub use read::{from_slice, from_str};
pub use write::{to_string, to_vec};

/// Errors that can occur while reading or writing GeoJSON.
#[derive(Debug, thiserror::Error)]
pub enum GeoJsonError {
    /// Malformed JSON, a document of the wrong shape, or a value that
    /// cannot be written as JSON.
    #[error("invalid GeoJSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The top-level object is not a `FeatureCollection`.
    #[error("expected a FeatureCollection, found type {0:?}")]
    NotFeatureCollection(String),

    /// A member of `features` is not a `Feature`.
    #[error("feature {feature}: expected type {expected:?}, found {found:?}")]
    UnexpectedType {
        /// Feature index.
        feature: usize,
        /// The expected `type` value.
        expected: &'static str,
        /// The `type` value actually present.
        found: String,
    },

    /// A feature's `properties` is neither an object nor `null`.
    #[error("feature {feature}: properties must be an object or null, found {found}")]
    InvalidProperties {
        /// Feature index.
        feature: usize,
        /// JSON type of the offending value.
        found: &'static str,
    },

    /// A geometry object has no string `type` member.
    #[error("feature {feature}: geometry has no type")]
    MissingGeometryType {
        /// Feature index.
        feature: usize,
    },

    /// A position has fewer than two coordinates.
    #[error(
        "feature {feature}: position {point} of ring {ring} in polygon {polygon} has {len} coordinate(s), need at least 2"
    )]
    InvalidPosition {
        /// Feature index.
        feature: usize,
        /// Polygon index within the geometry.
        polygon: usize,
        /// Ring index within the polygon.
        ring: usize,
        /// Position index within the ring.
        point: usize,
        /// Number of coordinates found.
        len: usize,
    },
}

/// Encoded size of a document before and after simplification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeReport {
    /// Input size in bytes.
    pub before: usize,
    /// Output size in bytes.
    pub after: usize,
}

impl SizeReport {
    /// Bytes saved (zero if the output grew).
    #[must_use]
    pub const fn saved(&self) -> usize {
        self.before.saturating_sub(self.after)
    }

    /// Output size as a fraction of the input size.
    ///
    /// Returns 1.0 for an empty input.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> f64 {
        if self.before == 0 {
            1.0
        } else {
            self.after as f64 / self.before as f64
        }
    }
}

impl std::fmt::Display for SizeReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {} bytes ({:.1}% of original)",
            self.before,
            self.after,
            self.ratio() * 100.0,
        )
    }
}
