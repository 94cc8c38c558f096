//! Configuration module - Environment-based configuration
//!
//! Every value has a default, so the harness runs with no environment at all.

use std::env;
use std::str::FromStr;

use sigdist_hamming::{EngineConfig, STYLE_VAR, UNROLL_VAR, WIDTH_VAR};
use tracing::warn;

/// Word counts swept by default.
pub const DEFAULT_LENGTHS: [usize; 21] = [
    1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 12, 15, 18, 21, 24, 27, 30, 40, 50, 75, 100,
];

/// How the report is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" | "text" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

/// Harness configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Signature lengths to sweep, in u64 words.
    pub lengths: Vec<usize>,
    /// Timed calls per (strategy, length) cell.
    pub iterations: u64,
    /// RNG seed for signature generation.
    pub seed: u64,
    pub format: OutputFormat,
    /// Candidates in the batch fan-out run; 0 skips it.
    pub batch: usize,
    /// Strategy used for the batch run.
    pub engine: EngineConfig,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            lengths: DEFAULT_LENGTHS.to_vec(),
            iterations: 100_000,
            seed: 42,
            format: OutputFormat::Table,
            batch: 10_000,
            engine: EngineConfig::default(),
        }
    }
}

/// Read `name` and parse it, falling back to `default` when unset or
/// unparseable.
fn var_or<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(var = name, value = %raw, "ignoring unparseable value");
            default
        }),
        Err(_) => default,
    }
}

/// Parse a comma-separated list of word counts. Zero and junk entries are
/// dropped.
pub fn parse_lengths(raw: &str) -> Vec<usize> {
    raw.split(',')
        .filter_map(|s| s.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .collect()
}

impl BenchConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let lengths = env::var("SIGDIST_LENGTHS")
            .map(|raw| parse_lengths(&raw))
            .ok()
            .filter(|l| !l.is_empty())
            .unwrap_or(defaults.lengths);

        let engine = EngineConfig {
            width: var_or(WIDTH_VAR, defaults.engine.width),
            factor: var_or(UNROLL_VAR, defaults.engine.factor),
            style: var_or(STYLE_VAR, defaults.engine.style),
        };

        Self {
            lengths,
            iterations: var_or("SIGDIST_ITERATIONS", defaults.iterations).max(1),
            seed: var_or("SIGDIST_SEED", defaults.seed),
            format: var_or("SIGDIST_FORMAT", defaults.format),
            batch: var_or("SIGDIST_BATCH", defaults.batch),
            engine,
        }
    }

    /// Longest swept signature, in words.
    pub fn max_len(&self) -> usize {
        self.lengths.iter().copied().max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigdist_hamming::{IterationStyle, UnrollFactor, WordWidth};

    const VARS: [&str; 8] = [
        "SIGDIST_LENGTHS",
        "SIGDIST_ITERATIONS",
        "SIGDIST_SEED",
        "SIGDIST_FORMAT",
        "SIGDIST_BATCH",
        WIDTH_VAR,
        UNROLL_VAR,
        STYLE_VAR,
    ];

    #[test]
    fn test_parse_lengths() {
        assert_eq!(parse_lengths("1, 2,x,0,40"), vec![1, 2, 40]);
        assert!(parse_lengths("").is_empty());
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = BenchConfig::default();
        assert_eq!(config.max_len(), 100);
        assert_eq!(config.lengths.len(), 21);
    }

    #[test]
    fn test_from_env_falls_back_per_variable() {
        for var in VARS {
            env::remove_var(var);
        }
        let config = BenchConfig::from_env();
        assert_eq!(config.lengths, DEFAULT_LENGTHS.to_vec());
        assert_eq!(config.engine, EngineConfig::default());

        env::set_var("SIGDIST_LENGTHS", "4,8");
        env::set_var("SIGDIST_ITERATIONS", "lots");
        env::set_var("SIGDIST_SEED", "7");
        env::set_var("SIGDIST_FORMAT", "json");
        env::set_var(WIDTH_VAR, "8");
        env::set_var(UNROLL_VAR, "5");
        env::set_var(STYLE_VAR, "cursor");
        let config = BenchConfig::from_env();
        assert_eq!(config.lengths, vec![4, 8]);
        assert_eq!(config.iterations, 100_000);
        assert_eq!(config.seed, 7);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.engine.width, WordWidth::Byte);
        assert_eq!(config.engine.factor, UnrollFactor::Four);
        assert_eq!(config.engine.style, IterationStyle::Cursor);

        env::set_var(UNROLL_VAR, "16");
        env::set_var(STYLE_VAR, "sideways");
        let config = BenchConfig::from_env();
        assert_eq!(config.engine.factor, UnrollFactor::Sixteen);
        assert_eq!(config.engine.style, IterationStyle::Indexed);

        for var in VARS {
            env::remove_var(var);
        }
    }
}
