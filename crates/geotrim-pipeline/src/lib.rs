//! geotrim-pipeline: Pure outline simplification pipeline (sans-IO).
//!
//! Shrinks polygon outlines for use as low-detail decorative geometry:
//! metadata stripping -> per-ring Douglas-Peucker simplification ->
//! degenerate-ring repair -> coordinate quantization.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! feature collections and returns new ones. Reading and writing GeoJSON
//! lives in `geotrim-geojson`; files and the command line live in
//! `geotrim`.

pub mod diagnostics;
pub mod distance;
pub mod geometry;
pub mod ring;
pub mod simplify;
pub mod types;

use rayon::prelude::*;

pub use diagnostics::{Clock, GeometryStats, SimplifyDiagnostics, process_with_diagnostics};
pub use geometry::process_geometry;
pub use ring::{NormalizedRing, RingOutcome, normalize_ring};
pub use types::{
    Feature, FeatureCollection, Geometry, MultiPolygon, Point, Polygon, Properties, Ring,
    SimplifyConfig, SimplifyError, Value,
};

/// Simplify every feature of a collection.
///
/// Produces a new collection in which:
///
/// 1. every feature's `properties` is an empty mapping,
/// 2. every polygon and multipolygon ring is simplified, repaired if it
///    collapsed, and quantized to `config.precision` decimal places,
/// 3. the collection-level `crs` member is removed.
///
/// Feature order, feature ids, non-polygonal geometry and other foreign
/// members are kept as they are, except that foreign members named
/// after a GeoJSON member (`crs`, `properties`, `type`, ...) are
/// dropped. The input is not modified.
///
/// # Errors
///
/// Returns [`SimplifyError::InvalidConfig`] if `config` fails
/// [`SimplifyConfig::validate`].
/// Returns [`SimplifyError::Feature`] wrapping
/// [`SimplifyError::InvalidCoordinate`] for the first feature (in
/// collection order) containing a non-finite coordinate. No partial
/// output is produced.
pub fn process(
    collection: &FeatureCollection,
    config: &SimplifyConfig,
) -> Result<FeatureCollection, SimplifyError> {
    run(collection, config).map(|(output, _)| output)
}

/// Shared body of [`process`] and [`process_with_diagnostics`].
pub(crate) fn run(
    collection: &FeatureCollection,
    config: &SimplifyConfig,
) -> Result<(FeatureCollection, GeometryStats), SimplifyError> {
    config.validate()?;

    // Results are gathered in collection order in both modes, so the
    // error reported is always the one from the earliest feature.
    let results: Vec<Result<(Feature, GeometryStats), SimplifyError>> = if config.parallel {
        collection
            .features
            .par_iter()
            .enumerate()
            .map(|(index, feature)| process_feature(index, feature, config))
            .collect()
    } else {
        collection
            .features
            .iter()
            .enumerate()
            .map(|(index, feature)| process_feature(index, feature, config))
            .collect()
    };

    let mut features = Vec::with_capacity(results.len());
    let mut stats = GeometryStats::default();
    for result in results {
        let (feature, feature_stats) = result?;
        stats.merge(&feature_stats);
        features.push(feature);
    }

    log::debug!(
        "simplified {} features: {} rings, {} -> {} points",
        features.len(),
        stats.rings,
        stats.points_before,
        stats.points_after,
    );

    let output = FeatureCollection {
        features,
        crs: None,
        foreign_members: foreign_only(&collection.foreign_members),
    };
    Ok((output, stats))
}

/// Strip one feature's properties and simplify its geometry.
fn process_feature(
    index: usize,
    feature: &Feature,
    config: &SimplifyConfig,
) -> Result<(Feature, GeometryStats), SimplifyError> {
    let mut stats = GeometryStats::default();
    let geometry = feature
        .geometry
        .as_ref()
        .map(|g| geometry::process_geometry_with_stats(g, config, &mut stats))
        .transpose()
        .map_err(|source| SimplifyError::Feature {
            index,
            source: Box::new(source),
        })?;

    if stats.degenerate_sampled > 0 {
        log::warn!(
            "feature {index}: {} collapsed ring(s) replaced by a zero-area sample",
            stats.degenerate_sampled,
        );
    }
    log::trace!(
        "feature {index}: {} rings, {} -> {} points",
        stats.rings,
        stats.points_before,
        stats.points_after,
    );

    let feature = Feature {
        id: feature.id.clone(),
        geometry,
        properties: Properties::new(),
        foreign_members: foreign_only(&feature.foreign_members),
    };
    Ok((feature, stats))
}

/// Member names GeoJSON gives a meaning of its own on features and
/// collections. They never travel as foreign members.
const RESERVED_MEMBERS: [&str; 6] = ["type", "id", "geometry", "properties", "features", "crs"];

/// Copy `members`, leaving out [`RESERVED_MEMBERS`].
fn foreign_only(members: &Properties) -> Properties {
    members
        .iter()
        .filter(|(key, _)| !RESERVED_MEMBERS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
