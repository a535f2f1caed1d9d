//! geotrim: shrink GeoJSON country and region outlines.
//!
//! Reads a GeoJSON `FeatureCollection`, strips feature properties and the
//! `crs` member, simplifies every polygon ring and rounds coordinates,
//! then writes the result as compact GeoJSON.
//!
//! # Usage
//!
//! ```text
//! geotrim [OPTIONS] <INPUT> [-o <OUTPUT>]
//! ```
//!
//! Without `-o` the result goes to stdout. Progress and the optional
//! diagnostics report go to stderr.

#![allow(clippy::print_stderr)]

use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use geotrim_geojson::{GeoJsonError, SizeReport};
use geotrim_pipeline::{Clock, SimplifyConfig, SimplifyError};

/// Shrink GeoJSON outlines into low-detail decorative geometry.
///
/// Strips properties, simplifies polygon rings with Douglas-Peucker and
/// rounds coordinates to a fixed number of decimal places.
#[derive(Parser, Debug)]
#[command(name = "geotrim", version, about)]
struct Cli {
    /// Input GeoJSON file (a FeatureCollection).
    input: PathBuf,

    /// Output file. Writes to stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Simplification tolerance, in coordinate units.
    #[arg(long, default_value_t = SimplifyConfig::DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Number of decimal places kept in output coordinates.
    #[arg(long, default_value_t = SimplifyConfig::DEFAULT_PRECISION)]
    precision: u8,

    /// Process features on all available cores.
    #[arg(long)]
    parallel: bool,

    /// Full simplification config as a JSON string.
    ///
    /// When provided, `--tolerance`, `--precision` and `--parallel` are
    /// ignored. Missing fields take their default values.
    #[arg(long)]
    config_json: Option<String>,

    /// Print a diagnostics report to stderr.
    #[arg(long)]
    report: bool,

    /// Print the diagnostics report as JSON.
    #[arg(long, requires = "report")]
    json: bool,

    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("error parsing --config-json: {0}")]
    ConfigJson(#[source] serde_json::Error),

    #[error("error reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("error decoding {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: GeoJsonError,
    },

    #[error(transparent)]
    Simplify(#[from] SimplifyError),

    #[error("error encoding output: {0}")]
    Encode(#[source] GeoJsonError),

    #[error("error writing {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("error writing to stdout: {0}")]
    Stdout(#[source] std::io::Error),

    #[error("error serializing diagnostics: {0}")]
    Diagnostics(#[source] serde_json::Error),
}

/// Build a [`SimplifyConfig`] from CLI arguments.
///
/// `--config-json` wins over the individual flags. The config is not
/// validated here; the pipeline rejects invalid values itself.
fn config_from_cli(cli: &Cli) -> Result<SimplifyConfig, CliError> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(CliError::ConfigJson);
    }

    Ok(SimplifyConfig {
        tolerance: cli.tolerance,
        precision: cli.precision,
        parallel: cli.parallel,
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .format_timestamp(None)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = config_from_cli(cli)?;
    log::debug!("config: {config:?}");

    let input = std::fs::read(&cli.input).map_err(|source| CliError::Read {
        path: cli.input.clone(),
        source,
    })?;
    let collection = geotrim_geojson::from_slice(&input).map_err(|source| CliError::Decode {
        path: cli.input.clone(),
        source,
    })?;
    log::info!(
        "read {} features from {}",
        collection.features.len(),
        cli.input.display(),
    );

    let (output, diagnostics) =
        geotrim_pipeline::process_with_diagnostics(&collection, &config, &StdClock)?;
    let encoded = geotrim_geojson::to_vec(&output).map_err(CliError::Encode)?;

    match &cli.output {
        Some(path) => {
            std::fs::write(path, &encoded).map_err(|source| CliError::Write {
                path: path.clone(),
                source,
            })?;
            log::info!("wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&encoded)
                .and_then(|()| stdout.flush())
                .map_err(CliError::Stdout)?;
        }
    }

    let size = SizeReport {
        before: input.len(),
        after: encoded.len(),
    };
    log::info!("{size}, saved {} bytes", size.saved());

    if cli.report {
        if cli.json {
            let json =
                serde_json::to_string_pretty(&diagnostics).map_err(CliError::Diagnostics)?;
            eprintln!("{json}");
        } else {
            eprintln!("{}", diagnostics.report());
        }
    }

    Ok(())
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}
