//! Byte-to-word reinterpretation.
//!
//! Byte signatures are packed eight at a time into `u64` words in
//! little-endian order: byte `8 * i` becomes the least significant byte of
//! word `i`, so bit `j` of the byte stream is bit `j % 64` of word `j / 64`.
//! The distance between two signatures is the same in either form as long
//! as both sides are packed the same way.

use crate::distance::distance_fixed;
use crate::{Bytes256, HammingError, Result, Signature, Strategy, Words256};

/// Bytes per packed word.
pub const WORD_BYTES: usize = 8;

/// Operands up to this many bytes are widened into stack buffers.
const STACK_WORDS: usize = 8;

#[inline(always)]
fn pack(chunk: &[u8]) -> u64 {
    let mut arr = [0u8; WORD_BYTES];
    arr.copy_from_slice(chunk);
    u64::from_le_bytes(arr)
}

fn check_multiple(len: usize) -> Result<()> {
    if len % WORD_BYTES != 0 {
        return Err(HammingError::invalid_length(
            format!("a multiple of {} bytes", WORD_BYTES),
            len,
        ));
    }
    Ok(())
}

/// Pack bytes into a newly allocated word vector.
///
/// `bytes.len()` must be a multiple of 8.
pub fn bytes_to_words(bytes: &[u8]) -> Result<Vec<u64>> {
    check_multiple(bytes.len())?;
    Ok(bytes.chunks_exact(WORD_BYTES).map(pack).collect())
}

/// Pack bytes into a caller-owned buffer of exactly `bytes.len() / 8` words.
///
/// Nothing is written unless both lengths are valid.
pub fn bytes_to_words_into(bytes: &[u8], out: &mut [u64]) -> Result<()> {
    check_multiple(bytes.len())?;
    let words = bytes.len() / WORD_BYTES;
    if out.len() != words {
        return Err(HammingError::invalid_length(
            format!("an output buffer of {words} words"),
            out.len(),
        ));
    }
    for (dst, chunk) in out.iter_mut().zip(bytes.chunks_exact(WORD_BYTES)) {
        *dst = pack(chunk);
    }
    Ok(())
}

/// Pack exactly `N * 8` bytes into an `N`-word array.
pub fn bytes_to_word_array<const N: usize>(bytes: &[u8]) -> Result<[u64; N]> {
    if bytes.len() != N * WORD_BYTES {
        return Err(HammingError::invalid_length(
            format!("exactly {} bytes", N * WORD_BYTES),
            bytes.len(),
        ));
    }
    let mut out = [0u64; N];
    for (dst, chunk) in out.iter_mut().zip(bytes.chunks_exact(WORD_BYTES)) {
        *dst = pack(chunk);
    }
    Ok(out)
}

/// Unpack words back into little-endian bytes.
pub fn words_to_bytes(words: &[u64]) -> Vec<u8> {
    let mut out = Vec::with_capacity(words.len() * WORD_BYTES);
    for w in words {
        out.extend_from_slice(&w.to_le_bytes());
    }
    out
}

/// Pack a byte signature into a word signature.
pub fn to_words(bytes: &Signature<u8>) -> Result<Signature<u64>> {
    bytes_to_words(bytes.as_slice()).map(Signature::new)
}

/// Unpack a word signature into a byte signature.
pub fn to_bytes(words: &Signature<u64>) -> Signature<u8> {
    Signature::new(words_to_bytes(words.as_slice()))
}

impl Bytes256 {
    /// Pack into four words. Infallible: the length is fixed by the type.
    pub fn to_words(&self) -> Words256 {
        let b = self.words();
        Words256::new([
            pack(&b[0..8]),
            pack(&b[8..16]),
            pack(&b[16..24]),
            pack(&b[24..32]),
        ])
    }

    /// Distance computed on the packed 64-bit form.
    pub fn distance_widened(&self, other: &Self) -> u64 {
        distance_fixed(self.to_words().words(), other.to_words().words())
    }
}

impl From<Words256> for Bytes256 {
    fn from(words: Words256) -> Self {
        let mut out = [0u8; 32];
        for (dst, w) in out.chunks_exact_mut(WORD_BYTES).zip(words.words()) {
            dst.copy_from_slice(&w.to_le_bytes());
        }
        Bytes256::new(out)
    }
}

/// Compare two byte signatures with a 64-bit strategy.
///
/// Both operands are packed first; operands of at most 64 bytes are packed
/// into stack buffers, larger ones into heap buffers. The strategy applied
/// after packing is a free choice, since no single unroll factor wins for
/// every length.
pub fn distance_widened(a: &[u8], b: &[u8], strategy: Strategy) -> Result<u64> {
    if a.len() != b.len() {
        return Err(HammingError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    check_multiple(a.len())?;

    let words = a.len() / WORD_BYTES;
    if words <= STACK_WORDS {
        let mut wa = [0u64; STACK_WORDS];
        let mut wb = [0u64; STACK_WORDS];
        bytes_to_words_into(a, &mut wa[..words])?;
        bytes_to_words_into(b, &mut wb[..words])?;
        strategy.distance(&wa[..words], &wb[..words])
    } else {
        let wa = bytes_to_words(a)?;
        let wb = bytes_to_words(b)?;
        strategy.distance(&wa, &wb)
    }
}
