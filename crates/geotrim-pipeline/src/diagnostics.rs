//! Pipeline diagnostics: timing and point/ring counts for a run.
//!
//! Every call to [`process_with_diagnostics`] collects these alongside
//! the simplified collection. Timestamps come from a caller-supplied
//! [`Clock`] so this crate never touches the system clock itself.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ring::{NormalizedRing, RingOutcome};
use crate::types::{FeatureCollection, SimplifyConfig, SimplifyError};

/// Source of timestamps for measuring pipeline duration.
pub trait Clock {
    /// Opaque timestamp type.
    type Instant;

    /// Capture the current time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Ring and point counts accumulated while processing geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeometryStats {
    /// Polygons visited (each multipolygon member counts once).
    pub polygons: usize,
    /// Rings normalized.
    pub rings: usize,
    /// Total ring points before simplification.
    pub points_before: usize,
    /// Total ring points after normalization.
    pub points_after: usize,
    /// Rings whose Douglas-Peucker result was kept.
    pub simplified: usize,
    /// Rings already below the minimum size, only quantized.
    pub too_short: usize,
    /// Rings replaced by a 4-point sample of the original.
    pub sampled: usize,
    /// Sampled rings that enclose no area.
    pub degenerate_sampled: usize,
    /// Non-polygonal geometries passed through untouched.
    pub passthrough: usize,
}

impl GeometryStats {
    /// Record one normalized ring that had `points_before` points.
    pub(crate) fn record(&mut self, points_before: usize, normalized: &NormalizedRing) {
        self.rings += 1;
        self.points_before += points_before;
        self.points_after += normalized.ring.len();
        match normalized.outcome {
            RingOutcome::Simplified => self.simplified += 1,
            RingOutcome::TooShort => self.too_short += 1,
            RingOutcome::Sampled { degenerate } => {
                self.sampled += 1;
                if degenerate {
                    self.degenerate_sampled += 1;
                }
            }
        }
    }

    /// Add another tally into this one.
    pub fn merge(&mut self, other: &Self) {
        self.polygons += other.polygons;
        self.rings += other.rings;
        self.points_before += other.points_before;
        self.points_after += other.points_after;
        self.simplified += other.simplified;
        self.too_short += other.too_short;
        self.sampled += other.sampled;
        self.degenerate_sampled += other.degenerate_sampled;
        self.passthrough += other.passthrough;
    }

    /// Fraction of points removed: `1.0 - (after / before)`.
    ///
    /// Zero when there were no points to begin with.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn reduction_ratio(&self) -> f64 {
        if self.points_before == 0 {
            0.0
        } else {
            1.0 - self.points_after as f64 / self.points_before as f64
        }
    }
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplifyDiagnostics {
    /// Wall-clock duration of the run (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Tolerance the run used.
    pub tolerance: f64,
    /// Precision the run used.
    pub precision: u8,
    /// Whether features were processed in parallel.
    pub parallel: bool,
    /// Number of features in the collection.
    pub feature_count: usize,
    /// Number of features with a non-null geometry.
    pub features_with_geometry: usize,
    /// Ring and point counts.
    pub stats: GeometryStats,
}

impl SimplifyDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let stats = &self.stats;
        let mut lines = Vec::new();

        lines.push(format!("Simplify Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Config: tolerance={} precision={} parallel={}",
            self.tolerance, self.precision, self.parallel,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.duration)
        ));
        lines.push(String::new());
        lines.push(format!(
            "Features: {} ({} with geometry, {} passed through)",
            self.feature_count, self.features_with_geometry, stats.passthrough,
        ));
        lines.push(format!(
            "Polygons: {}  |  Rings: {}",
            stats.polygons, stats.rings
        ));
        lines.push(format!(
            "Points: {} -> {} ({:.1}% reduction)",
            stats.points_before,
            stats.points_after,
            stats.reduction_ratio() * 100.0,
        ));
        lines.push(format!(
            "Rings simplified: {}  too short: {}  sampled: {} ({} degenerate)",
            stats.simplified, stats.too_short, stats.sampled, stats.degenerate_sampled,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Run [`crate::process`] and collect diagnostics for the run.
///
/// # Errors
///
/// Same as [`crate::process`].
pub fn process_with_diagnostics<C: Clock>(
    collection: &FeatureCollection,
    config: &SimplifyConfig,
    clock: &C,
) -> Result<(FeatureCollection, SimplifyDiagnostics), SimplifyError> {
    let start = clock.now();
    let (output, stats) = crate::run(collection, config)?;
    let duration = clock.elapsed(&start);

    let diagnostics = SimplifyDiagnostics {
        duration,
        tolerance: config.tolerance,
        precision: config.precision,
        parallel: config.parallel,
        feature_count: collection.features.len(),
        features_with_geometry: collection
            .features
            .iter()
            .filter(|f| f.geometry.is_some())
            .count(),
        stats,
    };
    Ok((output, diagnostics))
}
