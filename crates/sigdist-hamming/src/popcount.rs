//! Population count over single signature words.
//!
//! `count_ones` lowers to the native POPCNT/CNT instruction when the target
//! supports it. The portable variants use the classic SWAR reduction and are
//! kept for cross-checking and for the `portable-popcount` feature.

use std::fmt::Debug;
use std::hash::Hash;
use std::ops::BitXor;

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u64 {}
}

/// An unsigned machine word a signature can be stored in.
///
/// Implemented for `u8` and `u64` only.
pub trait Word:
    sealed::Sealed
    + Copy
    + Default
    + Eq
    + Hash
    + Debug
    + Send
    + Sync
    + BitXor<Output = Self>
    + 'static
{
    /// Width of the word in bits.
    const BITS: u32;
    /// Width of the word in bytes.
    const BYTES: usize;
    /// All bits clear.
    const ZERO: Self;
    /// All bits set.
    const ONES: Self;
    /// Runtime tag for this width.
    const WIDTH: crate::WordWidth;
    /// Word counts that have a fully unrolled kernel.
    const FULL_LENGTHS: &'static [usize];

    /// Number of set bits, via the native instruction where available.
    fn popcount(self) -> u32;

    /// Number of set bits, via the portable SWAR reduction.
    fn popcount_portable(self) -> u32;

    /// Bitwise complement.
    fn complement(self) -> Self;

    /// A word with only bit `index` set. `index` must be below `BITS`.
    fn single_bit(index: u32) -> Self;

    /// Width-erased view over a run of these words.
    fn view(words: &[Self]) -> crate::SignatureRef<'_>;

    /// Append this word to `out` in little-endian byte order.
    fn extend_le_bytes(self, out: &mut Vec<u8>);

    /// Read a word from exactly `Self::BYTES` little-endian bytes.
    fn from_le_slice(bytes: &[u8]) -> Self;
}

impl Word for u8 {
    const BITS: u32 = 8;
    const BYTES: usize = 1;
    const ZERO: Self = 0;
    const ONES: Self = u8::MAX;
    const WIDTH: crate::WordWidth = crate::WordWidth::Byte;
    const FULL_LENGTHS: &'static [usize] = &[32];

    #[inline(always)]
    fn popcount(self) -> u32 {
        popcount8(self)
    }

    #[inline(always)]
    fn popcount_portable(self) -> u32 {
        popcount8_portable(self)
    }

    #[inline(always)]
    fn complement(self) -> Self {
        !self
    }

    #[inline(always)]
    fn single_bit(index: u32) -> Self {
        1u8 << index
    }

    #[inline]
    fn view(words: &[Self]) -> crate::SignatureRef<'_> {
        crate::SignatureRef::Bytes(words)
    }

    #[inline]
    fn extend_le_bytes(self, out: &mut Vec<u8>) {
        out.push(self);
    }

    #[inline]
    fn from_le_slice(bytes: &[u8]) -> Self {
        bytes[0]
    }
}

impl Word for u64 {
    const BITS: u32 = 64;
    const BYTES: usize = 8;
    const ZERO: Self = 0;
    const ONES: Self = u64::MAX;
    const WIDTH: crate::WordWidth = crate::WordWidth::QuadWord;
    const FULL_LENGTHS: &'static [usize] = &[4, 8];

    #[inline(always)]
    fn popcount(self) -> u32 {
        popcount64(self)
    }

    #[inline(always)]
    fn popcount_portable(self) -> u32 {
        popcount64_portable(self)
    }

    #[inline(always)]
    fn complement(self) -> Self {
        !self
    }

    #[inline(always)]
    fn single_bit(index: u32) -> Self {
        1u64 << index
    }

    #[inline]
    fn view(words: &[Self]) -> crate::SignatureRef<'_> {
        crate::SignatureRef::Words(words)
    }

    #[inline]
    fn extend_le_bytes(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    #[inline]
    fn from_le_slice(bytes: &[u8]) -> Self {
        let mut arr = [0u8; 8];
        arr.copy_from_slice(&bytes[..8]);
        u64::from_le_bytes(arr)
    }
}

/// Popcount a single byte.
#[inline(always)]
pub fn popcount8(word: u8) -> u32 {
    #[cfg(feature = "portable-popcount")]
    {
        popcount8_portable(word)
    }

    #[cfg(not(feature = "portable-popcount"))]
    {
        word.count_ones()
    }
}

/// Popcount a single u64 word.
#[inline(always)]
pub fn popcount64(word: u64) -> u32 {
    #[cfg(feature = "portable-popcount")]
    {
        popcount64_portable(word)
    }

    #[cfg(not(feature = "portable-popcount"))]
    {
        word.count_ones()
    }
}

/// Portable byte popcount (no intrinsics).
#[inline(always)]
pub fn popcount8_portable(mut x: u8) -> u32 {
    x = x - ((x >> 1) & 0x55);
    x = (x & 0x33) + ((x >> 2) & 0x33);
    ((x + (x >> 4)) & 0x0f) as u32
}

/// Portable u64 popcount (no intrinsics).
#[inline(always)]
pub fn popcount64_portable(mut x: u64) -> u32 {
    const M1: u64 = 0x5555_5555_5555_5555;
    const M2: u64 = 0x3333_3333_3333_3333;
    const M4: u64 = 0x0f0f_0f0f_0f0f_0f0f;
    const H01: u64 = 0x0101_0101_0101_0101;

    x = x - ((x >> 1) & M1);
    x = (x & M2) + ((x >> 2) & M2);
    x = (x + (x >> 4)) & M4;
    (x.wrapping_mul(H01) >> 56) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    #[test]
    fn test_popcount8_exhaustive() {
        for b in 0..=u8::MAX {
            assert_eq!(popcount8_portable(b), b.count_ones(), "byte {b:#04x}");
            assert_eq!(popcount8(b), b.count_ones());
        }
    }

    #[test]
    fn test_popcount64_edges() {
        assert_eq!(popcount64(0), 0);
        assert_eq!(popcount64(u64::MAX), 64);
        assert_eq!(popcount64_portable(0), 0);
        assert_eq!(popcount64_portable(u64::MAX), 64);
        assert_eq!(popcount64_portable(1 << 63), 1);
        assert_eq!(popcount64_portable(0xAAAA_AAAA_AAAA_AAAA), 32);
    }

    quickcheck! {
        fn prop_popcount64_portable_agrees(x: u64) -> bool {
            popcount64_portable(x) == x.count_ones()
        }

        fn prop_popcount64_bounded(x: u64) -> bool {
            x.popcount() <= u64::BITS
        }
    }

    #[test]
    fn test_le_bytes() {
        let mut out = Vec::new();
        0x0807_0605_0403_0201u64.extend_le_bytes(&mut out);
        assert_eq!(out, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(u64::from_le_slice(&out), 0x0807_0605_0403_0201);
        assert_eq!(u8::from_le_slice(&[0x7f]), 0x7f);
    }
}
