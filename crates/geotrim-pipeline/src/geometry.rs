//! Per-geometry dispatch: normalize every ring of polygonal geometry.

use crate::diagnostics::GeometryStats;
use crate::ring::normalize_ring;
use crate::types::{Geometry, MultiPolygon, Polygon, Ring, SimplifyConfig, SimplifyError};

/// Normalize every ring of a polygon or multipolygon.
///
/// Ring order and polygon order are preserved. [`Geometry::Other`] is
/// returned unchanged.
///
/// # Errors
///
/// Returns [`SimplifyError::InvalidCoordinate`] if any point has a
/// non-finite component.
pub fn process_geometry(
    geometry: &Geometry,
    config: &SimplifyConfig,
) -> Result<Geometry, SimplifyError> {
    process_geometry_with_stats(geometry, config, &mut GeometryStats::default())
}

/// [`process_geometry`], tallying ring outcomes into `stats`.
pub(crate) fn process_geometry_with_stats(
    geometry: &Geometry,
    config: &SimplifyConfig,
    stats: &mut GeometryStats,
) -> Result<Geometry, SimplifyError> {
    match geometry {
        Geometry::Polygon(polygon) => {
            let polygon = process_polygon(0, polygon, config, stats)?;
            Ok(Geometry::Polygon(polygon))
        }
        Geometry::MultiPolygon(multi) => {
            let polygons = multi
                .polygons()
                .iter()
                .enumerate()
                .map(|(i, polygon)| process_polygon(i, polygon, config, stats))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Geometry::MultiPolygon(MultiPolygon::new(polygons)))
        }
        Geometry::Other(_) => {
            stats.passthrough += 1;
            Ok(geometry.clone())
        }
    }
}

fn process_polygon(
    polygon_index: usize,
    polygon: &Polygon,
    config: &SimplifyConfig,
    stats: &mut GeometryStats,
) -> Result<Polygon, SimplifyError> {
    stats.polygons += 1;
    let rings = polygon
        .rings()
        .iter()
        .enumerate()
        .map(|(ring_index, ring)| -> Result<Ring, SimplifyError> {
            check_finite(polygon_index, ring_index, ring)?;
            let normalized = normalize_ring(ring, config);
            stats.record(ring.len(), &normalized);
            Ok(normalized.ring)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(rings))
}

fn check_finite(polygon: usize, ring_index: usize, ring: &Ring) -> Result<(), SimplifyError> {
    match ring.points().iter().position(|p| !p.is_finite()) {
        Some(point) => {
            let p = ring.points()[point];
            Err(SimplifyError::InvalidCoordinate {
                polygon,
                ring: ring_index,
                point,
                x: p.x,
                y: p.y,
            })
        }
        None => Ok(()),
    }
}
