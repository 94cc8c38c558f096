//! # sigdist-hamming
//!
//! Hamming distance between fixed-length binary signatures (SimHash and
//! MinHash fingerprints, perceptual hashes, embedding sketches).
//!
//! Features:
//! - Byte (`u8`) and quad-word (`u64`) signatures behind one [`Word`] trait
//! - One unrolled kernel, generic over width and unroll factor
//!   (1, 2, 3, 4, 6, 8, 16), in index-loop and cursor styles
//! - Fully unrolled kernels for 256-bit and 512-bit signatures, with the
//!   length carried in the type
//! - Little-endian byte-to-word packing so byte signatures can run on the
//!   wide kernels
//! - Sequential and rayon-parallel one-to-many comparison
//!
//! ```
//! use sigdist_hamming::{Bytes256, Strategy, UnrollFactor};
//!
//! let a = Bytes256::zeros();
//! let b = Bytes256::ones();
//! assert_eq!(a.distance(&b), 256);
//! assert_eq!(a.distance_widened(&b), 256);
//!
//! let eight = Strategy::cursor(UnrollFactor::Eight);
//! assert_eq!(eight.distance(a.as_slice(), b.as_slice()).unwrap(), 256);
//! ```

pub mod batch;
pub mod convert;
pub mod distance;
pub mod engine;
pub mod error;
pub mod popcount;
pub mod signature;
pub mod unroll;

pub use batch::{distances, par_distances};
pub use convert::{
    bytes_to_word_array, bytes_to_words, bytes_to_words_into, distance_widened, to_bytes,
    to_words, words_to_bytes,
};
pub use distance::{
    distance_cursor, distance_fixed, distance_full, distance_naive, distance_unrolled, Strategy,
};
pub use engine::{Engine, EngineConfig, STYLE_VAR, UNROLL_VAR, WIDTH_VAR};
pub use error::{HammingError, Result};
pub use popcount::{popcount64, popcount64_portable, popcount8, popcount8_portable, Word};
pub use signature::{Bytes256, FixedSignature, Signature, SignatureRef, Words256, Words512, WordWidth};
pub use unroll::{split_remainder, IterationStyle, Split, UnrollFactor};

/// Bits in the canonical fixed-size signature.
pub const SIGNATURE_BITS: usize = 256;

/// Bytes in the canonical fixed-size signature.
pub const SIGNATURE_BYTES: usize = SIGNATURE_BITS / 8;

/// u64 words in the canonical fixed-size signature.
pub const SIGNATURE_WORDS: usize = SIGNATURE_BYTES / 8;
