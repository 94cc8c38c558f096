//! sigdist benchmark harness.
//!
//! Generates random signatures, checks every distance strategy against the
//! naive reference, and reports per-strategy cost.
//!
//! ## Environment
//!
//! - `SIGDIST_LENGTHS` - comma-separated word counts to sweep
//! - `SIGDIST_ITERATIONS` - timed calls per cell
//! - `SIGDIST_SEED` - RNG seed
//! - `SIGDIST_FORMAT` - `table` (log lines) or `json` (stdout)
//! - `SIGDIST_BATCH` - candidates in the one-to-many run (0 skips it)
//! - `SIGDIST_WIDTH` / `SIGDIST_UNROLL` / `SIGDIST_STYLE` - strategy for
//!   the one-to-many run

mod config;
mod report;
mod runner;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{BenchConfig, OutputFormat};
use crate::report::Report;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sigdist_bench=info,sigdist_hamming=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = BenchConfig::from_env();

    info!("Starting sigdist benchmark");
    info!("Lengths (words): {:?}", config.lengths);
    info!("Iterations per cell: {}", config.iterations);
    info!("Seed: {}", config.seed);

    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut measurements = runner::run_sweep(&config, &mut rng).context("length sweep failed")?;
    measurements.extend(runner::run_fixed(&config, &mut rng).context("256-bit run failed")?);
    let batch = runner::run_batch(&config, &mut rng).context("batch run failed")?;

    info!(
        "All {} strategy cells agree with the reference",
        measurements.len()
    );

    let report = Report {
        seed: config.seed,
        iterations: config.iterations,
        measurements,
        batch,
    };

    match config.format {
        OutputFormat::Table => report.log_table(),
        OutputFormat::Json => println!("{}", report.to_json().context("serializing report")?),
    }

    Ok(())
}
