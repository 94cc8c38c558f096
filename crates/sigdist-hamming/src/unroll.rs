//! Unroll factors and the startup/stride split shared by every unrolled loop.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::HammingError;

/// How many word pairs one loop body processes before the index advances.
///
/// Purely a throughput knob: every factor yields the same distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnrollFactor {
    One,
    Two,
    Three,
    Four,
    Six,
    Eight,
    Sixteen,
    /// Complete unroll over a statically known length; no loop, no startup.
    Full,
}

impl UnrollFactor {
    pub const ALL: [UnrollFactor; 8] = [
        UnrollFactor::One,
        UnrollFactor::Two,
        UnrollFactor::Three,
        UnrollFactor::Four,
        UnrollFactor::Six,
        UnrollFactor::Eight,
        UnrollFactor::Sixteen,
        UnrollFactor::Full,
    ];

    /// Stride of the loop body, or `None` for a full unroll.
    pub const fn stride(self) -> Option<usize> {
        match self {
            UnrollFactor::One => Some(1),
            UnrollFactor::Two => Some(2),
            UnrollFactor::Three => Some(3),
            UnrollFactor::Four => Some(4),
            UnrollFactor::Six => Some(6),
            UnrollFactor::Eight => Some(8),
            UnrollFactor::Sixteen => Some(16),
            UnrollFactor::Full => None,
        }
    }

    pub fn from_stride(stride: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.stride() == Some(stride))
    }
}

impl fmt::Display for UnrollFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stride() {
            Some(k) => write!(f, "{k}"),
            None => f.write_str("full"),
        }
    }
}

impl FromStr for UnrollFactor {
    type Err = HammingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("full") {
            return Ok(UnrollFactor::Full);
        }
        s.parse::<usize>()
            .ok()
            .and_then(Self::from_stride)
            .ok_or_else(|| HammingError::UnknownStrategy(format!("unroll factor '{s}'")))
    }
}

impl Serialize for UnrollFactor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for UnrollFactor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(usize),
            Str(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(k) => Self::from_stride(k).ok_or_else(|| {
                serde::de::Error::custom(format!("unsupported unroll factor {k}"))
            }),
            Raw::Str(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// How the loop walks the two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IterationStyle {
    /// Absolute index loop: `a[x + j]` for `j in 0..k`.
    #[default]
    Indexed,
    /// Advancing cursor: each stride is re-sliced from the front of the rest.
    Cursor,
}

impl fmt::Display for IterationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IterationStyle::Indexed => f.write_str("indexed"),
            IterationStyle::Cursor => f.write_str("cursor"),
        }
    }
}

impl FromStr for IterationStyle {
    type Err = HammingError;

    /// Accepts `indexed`/`index` and `cursor`/`inc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "indexed" | "index" => Ok(IterationStyle::Indexed),
            "cursor" | "inc" => Ok(IterationStyle::Cursor),
            other => Err(HammingError::UnknownStrategy(format!("style '{other}'"))),
        }
    }
}

/// Layout of an unrolled pass over `len` elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split {
    /// Elements handled by the scalar startup loop.
    pub remainder: usize,
    /// First index of the strided main loop.
    pub main_start: usize,
    /// Number of full strides in the main loop.
    pub strides: usize,
}

/// Split `len` elements into a scalar startup prefix and whole strides of
/// `factor`. The prefix comes first so the main loop only sees multiples of
/// `factor`.
#[inline(always)]
pub const fn split_remainder(len: usize, factor: usize) -> Split {
    let remainder = len % factor;
    Split {
        remainder,
        main_start: remainder,
        strides: len / factor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_remainder() {
        assert_eq!(
            split_remainder(10, 4),
            Split {
                remainder: 2,
                main_start: 2,
                strides: 2
            }
        );
        assert_eq!(split_remainder(0, 3).strides, 0);
        assert_eq!(split_remainder(2, 3).remainder, 2);
        assert_eq!(split_remainder(32, 16).remainder, 0);
        for len in 0..100 {
            for k in [1, 2, 3, 4, 6, 8, 16] {
                let s = split_remainder(len, k);
                assert_eq!(s.main_start + s.strides * k, len);
            }
        }
    }

    #[test]
    fn test_factor_parse() {
        assert_eq!("6".parse::<UnrollFactor>().unwrap(), UnrollFactor::Six);
        assert_eq!("FULL".parse::<UnrollFactor>().unwrap(), UnrollFactor::Full);
        assert!("5".parse::<UnrollFactor>().is_err());
        assert!("x".parse::<UnrollFactor>().is_err());
        for f in UnrollFactor::ALL {
            assert_eq!(f.to_string().parse::<UnrollFactor>().unwrap(), f);
        }
    }

    #[test]
    fn test_style_parse() {
        assert_eq!("Index".parse::<IterationStyle>().unwrap(), IterationStyle::Indexed);
        assert_eq!(" inc ".parse::<IterationStyle>().unwrap(), IterationStyle::Cursor);
        assert_eq!(
            "zigzag".parse::<IterationStyle>().unwrap_err(),
            HammingError::UnknownStrategy("style 'zigzag'".to_string())
        );
        for style in [IterationStyle::Indexed, IterationStyle::Cursor] {
            assert_eq!(style.to_string().parse::<IterationStyle>().unwrap(), style);
        }
    }

    #[test]
    fn test_factor_serde() {
        let f: UnrollFactor = serde_json::from_str("16").unwrap();
        assert_eq!(f, UnrollFactor::Sixteen);
        let f: UnrollFactor = serde_json::from_str("\"full\"").unwrap();
        assert_eq!(f, UnrollFactor::Full);
        assert_eq!(serde_json::to_string(&UnrollFactor::Three).unwrap(), "\"3\"");
        assert!(serde_json::from_str::<UnrollFactor>("7").is_err());
    }
}
