//! Configurable single entry point.
//!
//! [`Engine`] bundles a word width and a [`Strategy`] chosen at runtime,
//! typically from environment variables or a deserialized config file, and
//! dispatches width-erased [`SignatureRef`] operands to the right kernel.

use std::env;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::convert::{distance_widened, words_to_bytes};
use crate::{HammingError, IterationStyle, Result, SignatureRef, Strategy, UnrollFactor, WordWidth};

/// Kernel width variable read by [`EngineConfig::from_env`].
pub const WIDTH_VAR: &str = "SIGDIST_WIDTH";
/// Unroll factor variable read by [`EngineConfig::from_env`].
pub const UNROLL_VAR: &str = "SIGDIST_UNROLL";
/// Iteration style variable read by [`EngineConfig::from_env`].
pub const STYLE_VAR: &str = "SIGDIST_STYLE";

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct EngineConfig {
    /// Width the kernels run at. Byte operands are packed into quad-words
    /// when this is `QuadWord`.
    pub width: WordWidth,
    pub factor: UnrollFactor,
    pub style: IterationStyle,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: WordWidth::QuadWord,
            factor: UnrollFactor::Four,
            style: IterationStyle::Indexed,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// [`WIDTH_VAR`] (`8`/`64`), [`UNROLL_VAR`] (`1`..`16`, `full`) and
    /// [`STYLE_VAR`] (`indexed`/`cursor`). Unset variables keep their
    /// defaults; set but unparseable ones are an error.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(width) = env::var(WIDTH_VAR) {
            config.width = width.parse()?;
        }
        if let Ok(factor) = env::var(UNROLL_VAR) {
            config.factor = factor.parse()?;
        }
        if let Ok(style) = env::var(STYLE_VAR) {
            config.style = style.parse()?;
        }
        Ok(config)
    }

    pub fn strategy(&self) -> Strategy {
        Strategy::new(self.factor, self.style)
    }
}

/// A configured distance engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        debug!(
            width = %config.width,
            factor = %config.factor,
            style = %config.style,
            "distance engine configured"
        );
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn strategy(&self) -> Strategy {
        self.config.strategy()
    }

    /// Hamming distance between two width-erased signatures.
    pub fn distance(&self, a: SignatureRef<'_>, b: SignatureRef<'_>) -> Result<u64> {
        distance(a, b, &self.config)
    }
}

/// Hamming distance between two width-erased signatures under `config`.
///
/// Both operands must share a width. Byte operands run at byte width when
/// `config.width` is `Byte`, and are packed into quad-words first when it
/// is `QuadWord`. Quad-word operands asked to run at `Byte` width are
/// unpacked to their little-endian bytes, which yields the same count;
/// when the byte kernel has no variant for the unpacked length but the
/// quad-word kernel does (a full unroll over 8 words), they run as words.
pub fn distance(a: SignatureRef<'_>, b: SignatureRef<'_>, config: &EngineConfig) -> Result<u64> {
    let strategy = config.strategy();
    match (a, b, config.width) {
        (SignatureRef::Bytes(a), SignatureRef::Bytes(b), WordWidth::Byte) => {
            strategy.distance(a, b)
        }
        (SignatureRef::Bytes(a), SignatureRef::Bytes(b), WordWidth::QuadWord) => {
            distance_widened(a, b, strategy)
        }
        (SignatureRef::Words(a), SignatureRef::Words(b), WordWidth::QuadWord) => {
            strategy.distance(a, b)
        }
        (SignatureRef::Words(a), SignatureRef::Words(b), WordWidth::Byte) => {
            if a.len() != b.len() {
                return Err(HammingError::LengthMismatch {
                    left: a.len(),
                    right: b.len(),
                });
            }
            let unpacked = a.len() * WordWidth::QuadWord.bytes();
            if !strategy.supports::<u8>(unpacked) && strategy.supports::<u64>(a.len()) {
                return strategy.distance(a, b);
            }
            let a = words_to_bytes(a);
            let b = words_to_bytes(b);
            strategy.distance(&a, &b)
        }
        (a, b, _) => Err(HammingError::WidthMismatch {
            left: a.width(),
            right: b.width(),
        }),
    }
}
