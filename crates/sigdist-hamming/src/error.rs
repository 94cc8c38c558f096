//! Error types for signature distance operations.

use thiserror::Error;

use crate::WordWidth;

/// Errors that can occur at the boundary of a distance computation.
///
/// Every variant is detected before any inner loop runs; the XOR/popcount
/// kernels themselves cannot fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HammingError {
    #[error("Signature length mismatch: left has {left} words, right has {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("Invalid signature length: expected {expected}, got {actual}")]
    InvalidLength { expected: String, actual: usize },

    #[error("Signature width mismatch: left is {left}, right is {right}")]
    WidthMismatch { left: WordWidth, right: WordWidth },

    #[error("Invalid hex string: {0}")]
    InvalidHex(String),

    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("Unknown word width: {0}")]
    UnknownWidth(String),

    #[error("Candidate {index}: {source}")]
    Candidate {
        index: usize,
        source: Box<HammingError>,
    },
}

impl HammingError {
    pub(crate) fn invalid_length(expected: impl Into<String>, actual: usize) -> Self {
        HammingError::InvalidLength {
            expected: expected.into(),
            actual,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HammingError>;

/// Check that two operands have the same number of words.
#[inline]
pub(crate) fn check_lengths(left: usize, right: usize) -> Result<()> {
    if left != right {
        return Err(HammingError::LengthMismatch { left, right });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_lengths() {
        assert!(check_lengths(10, 10).is_ok());
        assert_eq!(
            check_lengths(10, 11),
            Err(HammingError::LengthMismatch { left: 10, right: 11 })
        );
    }

    #[test]
    fn test_candidate_message() {
        let err = HammingError::Candidate {
            index: 3,
            source: Box::new(HammingError::LengthMismatch { left: 4, right: 5 }),
        };
        assert_eq!(
            err.to_string(),
            "Candidate 3: Signature length mismatch: left has 4 words, right has 5"
        );
    }
}
