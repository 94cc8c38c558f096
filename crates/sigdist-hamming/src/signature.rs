//! Signature representations.
//!
//! A signature is an ordered run of words of one width. [`Signature`] owns a
//! variable number of words and is compared through the checked strategies;
//! [`FixedSignature`] carries its word count in the type, so two values of
//! the same type can never disagree on length.

use std::fmt;
use std::ops::Not;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::distance::{distance_fixed, distance_naive};
use crate::{HammingError, Result, Word};

/// Element width of a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WordWidth {
    /// 8-bit words.
    Byte,
    /// 64-bit words.
    QuadWord,
}

impl WordWidth {
    pub const fn bits(self) -> usize {
        match self {
            WordWidth::Byte => 8,
            WordWidth::QuadWord => 64,
        }
    }

    pub const fn bytes(self) -> usize {
        self.bits() / 8
    }
}

impl fmt::Display for WordWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordWidth::Byte => f.write_str("byte"),
            WordWidth::QuadWord => f.write_str("quad-word"),
        }
    }
}

impl FromStr for WordWidth {
    type Err = HammingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "8" | "u8" | "byte" => Ok(WordWidth::Byte),
            "64" | "u64" | "quad-word" | "quadword" => Ok(WordWidth::QuadWord),
            other => Err(HammingError::UnknownWidth(other.to_string())),
        }
    }
}

/// An owned, variable-length signature.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Signature<W: Word> {
    words: Vec<W>,
}

impl<W: Word> Signature<W> {
    pub fn new(words: Vec<W>) -> Self {
        Self { words }
    }

    /// A signature of `len` words with every bit clear.
    pub fn zeros(len: usize) -> Self {
        Self {
            words: vec![W::ZERO; len],
        }
    }

    /// A signature of `len` words with every bit set.
    pub fn ones(len: usize) -> Self {
        Self {
            words: vec![W::ONES; len],
        }
    }

    /// Create a random signature of `len` words using the given RNG.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Self {
        let mut bytes = vec![0u8; len * W::BYTES];
        rng.fill(bytes.as_mut_slice());
        Self {
            words: bytes.chunks_exact(W::BYTES).map(W::from_le_slice).collect(),
        }
    }

    /// Create a signature of `len` words from a seed string using SHA256.
    ///
    /// The seed is hashed together with a block counter until enough bytes
    /// have been produced, so the same seed always yields the same words.
    pub fn from_seed(seed: &str, len: usize) -> Self {
        let needed = len * W::BYTES;
        let mut bytes = Vec::with_capacity(needed + 32);
        let mut hasher = Sha256::new();
        let mut block = 0u64;

        while bytes.len() < needed {
            hasher.update(seed.as_bytes());
            hasher.update(block.to_le_bytes());
            bytes.extend_from_slice(&hasher.finalize_reset());
            block += 1;
        }
        bytes.truncate(needed);

        Self {
            words: bytes.chunks_exact(W::BYTES).map(W::from_le_slice).collect(),
        }
    }

    /// Build a signature from little-endian bytes.
    pub fn from_le_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() % W::BYTES != 0 {
            return Err(HammingError::invalid_length(
                format!("a multiple of {} bytes", W::BYTES),
                bytes.len(),
            ));
        }
        Ok(Self {
            words: bytes.chunks_exact(W::BYTES).map(W::from_le_slice).collect(),
        })
    }

    /// Serialize the words to little-endian bytes.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.words.len() * W::BYTES);
        for w in &self.words {
            w.extend_le_bytes(&mut out);
        }
        out
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_le_bytes())
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|e| HammingError::InvalidHex(e.to_string()))?;
        Self::from_le_bytes(&bytes)
    }

    #[inline]
    pub fn as_slice(&self) -> &[W] {
        &self.words
    }

    #[inline]
    pub fn into_inner(self) -> Vec<W> {
        self.words
    }

    /// Number of words.
    #[inline]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of bits carried by the signature.
    #[inline]
    pub fn bit_len(&self) -> u64 {
        self.words.len() as u64 * W::BITS as u64
    }

    pub fn width(&self) -> WordWidth {
        W::WIDTH
    }

    /// A new signature with every bit flipped.
    pub fn complement(&self) -> Self {
        Self {
            words: self.words.iter().map(|w| w.complement()).collect(),
        }
    }

    /// Number of set bits.
    pub fn popcount(&self) -> u64 {
        self.words.iter().map(|w| w.popcount() as u64).sum()
    }

    /// Hamming distance to another signature using the naive reference loop.
    pub fn distance(&self, other: &Self) -> Result<u64> {
        distance_naive(&self.words, &other.words)
    }

    /// Borrow as a width-erased view.
    pub fn view(&self) -> SignatureRef<'_> {
        W::view(&self.words)
    }
}

impl<W: Word> From<Vec<W>> for Signature<W> {
    fn from(words: Vec<W>) -> Self {
        Self::new(words)
    }
}

impl<W: Word> AsRef<[W]> for Signature<W> {
    fn as_ref(&self) -> &[W] {
        &self.words
    }
}

impl<W: Word> Not for &Signature<W> {
    type Output = Signature<W>;

    fn not(self) -> Self::Output {
        self.complement()
    }
}

impl<W: Word> fmt::Debug for Signature<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Signature<{}>(len={}, popcount={})",
            W::WIDTH,
            self.words.len(),
            self.popcount()
        )
    }
}

impl<W: Word> Serialize for Signature<W> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            serializer.serialize_bytes(&self.to_le_bytes())
        }
    }
}

impl<'de, W: Word> Deserialize<'de> for Signature<W> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let hex = String::deserialize(deserializer)?;
            Self::from_hex(&hex).map_err(serde::de::Error::custom)
        } else {
            let bytes = Vec::<u8>::deserialize(deserializer)?;
            Self::from_le_bytes(&bytes).map_err(serde::de::Error::custom)
        }
    }
}

/// A signature whose word count is part of its type.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedSignature<W: Word, const N: usize> {
    words: [W; N],
}

/// 256-bit signature stored as 32 bytes.
pub type Bytes256 = FixedSignature<u8, 32>;
/// 256-bit signature stored as four u64 words.
pub type Words256 = FixedSignature<u64, 4>;
/// 512-bit signature stored as eight u64 words.
pub type Words512 = FixedSignature<u64, 8>;

impl<W: Word, const N: usize> FixedSignature<W, N> {
    pub const fn new(words: [W; N]) -> Self {
        Self { words }
    }

    pub const fn zeros() -> Self {
        Self { words: [W::ZERO; N] }
    }

    pub const fn ones() -> Self {
        Self { words: [W::ONES; N] }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let dynamic = Signature::<W>::random(rng, N);
        let mut words = [W::ZERO; N];
        words.copy_from_slice(dynamic.as_slice());
        Self { words }
    }

    pub fn from_seed(seed: &str) -> Self {
        let dynamic = Signature::<W>::from_seed(seed, N);
        let mut words = [W::ZERO; N];
        words.copy_from_slice(dynamic.as_slice());
        Self { words }
    }

    /// Copy from a slice that must hold exactly `N` words.
    pub fn from_slice(words: &[W]) -> Result<Self> {
        let words: [W; N] = words
            .try_into()
            .map_err(|_| HammingError::invalid_length(format!("exactly {} words", N), words.len()))?;
        Ok(Self { words })
    }

    #[inline]
    pub fn words(&self) -> &[W; N] {
        &self.words
    }

    #[inline]
    pub fn as_slice(&self) -> &[W] {
        &self.words
    }

    pub const fn bit_len() -> u64 {
        N as u64 * W::BITS as u64
    }

    pub fn complement(&self) -> Self {
        let mut words = self.words;
        for w in words.iter_mut() {
            *w = w.complement();
        }
        Self { words }
    }

    /// Flip a single bit. Bit `i` lives in word `i / W::BITS`.
    pub fn flip_bit(&mut self, index: usize) {
        let bits = W::BITS as usize;
        if index >= N * bits {
            return;
        }
        let word = &mut self.words[index / bits];
        *word = *word ^ W::single_bit((index % bits) as u32);
    }

    /// Hamming distance, fully unrolled over the `N` words.
    ///
    /// Both operands share a type, so there is no length to check.
    #[inline]
    pub fn distance(&self, other: &Self) -> u64 {
        distance_fixed(&self.words, &other.words)
    }
}

impl<W: Word, const N: usize> Default for FixedSignature<W, N> {
    fn default() -> Self {
        Self::zeros()
    }
}

impl<W: Word, const N: usize> From<[W; N]> for FixedSignature<W, N> {
    fn from(words: [W; N]) -> Self {
        Self { words }
    }
}

impl<W: Word, const N: usize> Not for FixedSignature<W, N> {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.complement()
    }
}

impl<W: Word, const N: usize> fmt::Debug for FixedSignature<W, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let popcount: u64 = self.words.iter().map(|w| w.popcount() as u64).sum();
        write!(f, "FixedSignature<{}, {}>(popcount={})", W::WIDTH, N, popcount)
    }
}

/// A borrowed signature whose width is only known at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureRef<'a> {
    Bytes(&'a [u8]),
    Words(&'a [u64]),
}

impl SignatureRef<'_> {
    pub fn width(&self) -> WordWidth {
        match self {
            SignatureRef::Bytes(_) => WordWidth::Byte,
            SignatureRef::Words(_) => WordWidth::QuadWord,
        }
    }

    /// Number of words at the view's own width.
    pub fn len(&self) -> usize {
        match self {
            SignatureRef::Bytes(b) => b.len(),
            SignatureRef::Words(w) => w.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bit_len(&self) -> u64 {
        self.len() as u64 * self.width().bits() as u64
    }
}

impl<'a> From<&'a [u8]> for SignatureRef<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        SignatureRef::Bytes(bytes)
    }
}

impl<'a> From<&'a [u64]> for SignatureRef<'a> {
    fn from(words: &'a [u64]) -> Self {
        SignatureRef::Words(words)
    }
}
