//! Hamming distance kernels and runtime strategy selection.
//!
//! Every kernel computes `sum(popcount(a[i] ^ b[i]))`. They differ only in
//! how the loop is shaped:
//!
//! - `naive`: one pair per iteration, the reference all others are checked
//!   against.
//! - `unrolled::<K>`: scalar startup over `len % K` pairs, then strides of
//!   `K` pairs feeding `K` independent accumulators.
//! - `cursor::<K>`: same split, but the strided part walks the operands as
//!   consecutive `K`-wide chunks instead of absolute indices.
//! - `fixed::<N>`: a constant trip count the optimizer unrolls completely
//!   for a length known at compile time.
//!
//! Lengths are validated once at the entry points; kernels re-slice `b` to
//! `a.len()` up front so the optimizer can drop per-element bounds checks.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::check_lengths;
use crate::unroll::split_remainder;
use crate::{HammingError, IterationStyle, Result, UnrollFactor, Word};

/// Reference distance: one word pair per iteration.
pub fn distance_naive<W: Word>(a: &[W], b: &[W]) -> Result<u64> {
    check_lengths(a.len(), b.len())?;
    Ok(naive_kernel(a, b))
}

/// Index-loop distance with `K` pairs per iteration.
///
/// `K` must be at least 1; a zero stride is rejected at build time:
///
/// ```compile_fail
/// let a = [0u64; 4];
/// let _ = sigdist_hamming::distance_unrolled::<u64, 0>(&a, &a);
/// ```
pub fn distance_unrolled<W: Word, const K: usize>(a: &[W], b: &[W]) -> Result<u64> {
    check_lengths(a.len(), b.len())?;
    Ok(unrolled_kernel::<W, K>(a, b))
}

/// Cursor-loop distance with `K` pairs per iteration.
///
/// ```compile_fail
/// let a = [0u8; 4];
/// let _ = sigdist_hamming::distance_cursor::<u8, 0>(&a, &a);
/// ```
pub fn distance_cursor<W: Word, const K: usize>(a: &[W], b: &[W]) -> Result<u64> {
    check_lengths(a.len(), b.len())?;
    Ok(cursor_kernel::<W, K>(a, b))
}

/// Fully unrolled distance over `N` words.
///
/// The length lives in the type, so there is nothing to validate. The loop
/// has a constant trip count and no early exit; the complete unroll is left
/// to the optimizer, which flattens it for the supported sizes (4, 8, 32)
/// in release builds.
#[inline(always)]
#[allow(clippy::needless_range_loop)]
pub fn distance_fixed<W: Word, const N: usize>(a: &[W; N], b: &[W; N]) -> u64 {
    let mut sum = 0u64;
    for i in 0..N {
        sum += (a[i] ^ b[i]).popcount() as u64;
    }
    sum
}

/// Fully unrolled distance over a runtime slice.
///
/// The slice length must be one of `W::FULL_LENGTHS` (32 bytes, or 4 or 8
/// quad-words).
pub fn distance_full<W: Word>(a: &[W], b: &[W]) -> Result<u64> {
    check_lengths(a.len(), b.len())?;
    full_kernel(a, b)
}

/// Rejects a zero unroll factor when a kernel is instantiated.
struct Stride<const K: usize>;

impl<const K: usize> Stride<K> {
    const NON_ZERO: () = assert!(K > 0, "unroll factor must be at least 1");
}

#[inline(always)]
fn naive_kernel<W: Word>(a: &[W], b: &[W]) -> u64 {
    let b = &b[..a.len()];
    let mut sum = 0u64;
    for (x, y) in a.iter().zip(b) {
        sum += (*x ^ *y).popcount() as u64;
    }
    sum
}

#[inline(always)]
#[allow(clippy::needless_range_loop)]
fn unrolled_kernel<W: Word, const K: usize>(a: &[W], b: &[W]) -> u64 {
    let () = Stride::<K>::NON_ZERO;
    let len = a.len();
    let b = &b[..len];
    let split = split_remainder(len, K);

    let mut sum = naive_kernel(&a[..split.remainder], &b[..split.remainder]);

    let mut acc = [0u64; K];
    let mut x = split.main_start;
    while x < len {
        for j in 0..K {
            acc[j] += (a[x + j] ^ b[x + j]).popcount() as u64;
        }
        x += K;
    }

    for partial in acc {
        sum += partial;
    }
    sum
}

#[inline(always)]
#[allow(clippy::needless_range_loop)]
fn cursor_kernel<W: Word, const K: usize>(a: &[W], b: &[W]) -> u64 {
    let () = Stride::<K>::NON_ZERO;
    let b = &b[..a.len()];
    let split = split_remainder(a.len(), K);
    let (head_a, rest_a) = a.split_at(split.main_start);
    let (head_b, rest_b) = b.split_at(split.main_start);

    let mut sum = naive_kernel(head_a, head_b);

    let mut acc = [0u64; K];
    for (ca, cb) in rest_a.chunks_exact(K).zip(rest_b.chunks_exact(K)) {
        for j in 0..K {
            acc[j] += (ca[j] ^ cb[j]).popcount() as u64;
        }
    }

    for partial in acc {
        sum += partial;
    }
    sum
}

fn full_kernel<W: Word>(a: &[W], b: &[W]) -> Result<u64> {
    let supported = W::FULL_LENGTHS.contains(&a.len());
    match a.len() {
        4 if supported => fixed_from_slices::<W, 4>(a, b),
        8 if supported => fixed_from_slices::<W, 8>(a, b),
        32 if supported => fixed_from_slices::<W, 32>(a, b),
        len => Err(HammingError::invalid_length(
            format!("{:?} {} words for a full unroll", W::FULL_LENGTHS, W::WIDTH),
            len,
        )),
    }
}

#[inline(always)]
fn fixed_from_slices<W: Word, const N: usize>(a: &[W], b: &[W]) -> Result<u64> {
    let a: &[W; N] = a
        .try_into()
        .map_err(|_| HammingError::invalid_length(format!("exactly {} words", N), a.len()))?;
    let b: &[W; N] = b
        .try_into()
        .map_err(|_| HammingError::invalid_length(format!("exactly {} words", N), b.len()))?;
    Ok(distance_fixed(a, b))
}

/// Dispatch a stride to its monomorphized kernel.
#[inline]
fn strided<W: Word>(stride: usize, style: IterationStyle, a: &[W], b: &[W]) -> u64 {
    match style {
        IterationStyle::Indexed => match stride {
            2 => unrolled_kernel::<W, 2>(a, b),
            3 => unrolled_kernel::<W, 3>(a, b),
            4 => unrolled_kernel::<W, 4>(a, b),
            6 => unrolled_kernel::<W, 6>(a, b),
            8 => unrolled_kernel::<W, 8>(a, b),
            16 => unrolled_kernel::<W, 16>(a, b),
            _ => naive_kernel(a, b),
        },
        IterationStyle::Cursor => match stride {
            2 => cursor_kernel::<W, 2>(a, b),
            3 => cursor_kernel::<W, 3>(a, b),
            4 => cursor_kernel::<W, 4>(a, b),
            6 => cursor_kernel::<W, 6>(a, b),
            8 => cursor_kernel::<W, 8>(a, b),
            16 => cursor_kernel::<W, 16>(a, b),
            _ => naive_kernel(a, b),
        },
    }
}

/// A runtime-selectable distance strategy: one unroll factor and one
/// iteration style.
///
/// # Example
/// ```
/// use sigdist_hamming::{Strategy, UnrollFactor};
///
/// let a = [0u64, u64::MAX, 7];
/// let b = [0u64, 0, 7];
/// let four = Strategy::indexed(UnrollFactor::Four);
/// assert_eq!(four.distance(&a, &b).unwrap(), 64);
/// assert_eq!(Strategy::NAIVE.distance(&a, &b).unwrap(), 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Strategy {
    pub factor: UnrollFactor,
    #[serde(default)]
    pub style: IterationStyle,
}

impl Strategy {
    /// The k=1 reference loop.
    pub const NAIVE: Strategy = Strategy::indexed(UnrollFactor::One);

    pub const fn new(factor: UnrollFactor, style: IterationStyle) -> Self {
        Self { factor, style }
    }

    pub const fn indexed(factor: UnrollFactor) -> Self {
        Self::new(factor, IterationStyle::Indexed)
    }

    pub const fn cursor(factor: UnrollFactor) -> Self {
        Self::new(factor, IterationStyle::Cursor)
    }

    /// Every distinct strategy, reference first.
    ///
    /// Cursor variants are listed for the strided factors only: at k=1 and
    /// for a full unroll there is no stride to walk.
    pub fn all() -> Vec<Strategy> {
        let mut out: Vec<Strategy> = UnrollFactor::ALL
            .iter()
            .map(|&f| Strategy::indexed(f))
            .collect();
        out.extend(
            UnrollFactor::ALL
                .iter()
                .filter(|f| !matches!(f, UnrollFactor::One | UnrollFactor::Full))
                .map(|&f| Strategy::cursor(f)),
        );
        out
    }

    /// Strategies that accept any length (everything but the full unroll).
    pub fn variable_length() -> Vec<Strategy> {
        Self::all()
            .into_iter()
            .filter(|s| s.factor != UnrollFactor::Full)
            .collect()
    }

    /// Whether this strategy can run on `len` words of width `W`.
    pub fn supports<W: Word>(&self, len: usize) -> bool {
        self.factor != UnrollFactor::Full || W::FULL_LENGTHS.contains(&len)
    }

    /// Hamming distance between `a` and `b`.
    ///
    /// Fails with `LengthMismatch` when the operands differ in length, and
    /// with `InvalidLength` when a full unroll is asked for a length it has
    /// no kernel for.
    #[inline]
    pub fn distance<W: Word>(&self, a: &[W], b: &[W]) -> Result<u64> {
        check_lengths(a.len(), b.len())?;
        match self.factor.stride() {
            None => full_kernel(a, b),
            Some(1) => Ok(naive_kernel(a, b)),
            Some(k) => Ok(strided(k, self.style, a, b)),
        }
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::indexed(UnrollFactor::Four)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.factor, self.style) {
            (UnrollFactor::One, IterationStyle::Indexed) => f.write_str("naive"),
            (UnrollFactor::Full, _) => f.write_str("full"),
            (k, IterationStyle::Indexed) => write!(f, "{k}-way"),
            (k, IterationStyle::Cursor) => write!(f, "{k}-way-cursor"),
        }
    }
}

impl FromStr for Strategy {
    type Err = HammingError;

    /// Accepts `naive`, `full`, `<k>`, `<k>-way`, `<k>-cursor` and
    /// `<k>-way-cursor`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "naive" => return Ok(Strategy::NAIVE),
            "full" => return Ok(Strategy::indexed(UnrollFactor::Full)),
            _ => {}
        }

        let (body, style) = match s.strip_suffix("-cursor") {
            Some(body) => (body, IterationStyle::Cursor),
            None => (s.as_str(), IterationStyle::Indexed),
        };
        let body = body.strip_suffix("-way").unwrap_or(body);
        let factor: UnrollFactor = body
            .parse()
            .map_err(|_| HammingError::UnknownStrategy(s.clone()))?;
        Ok(Strategy::new(factor, style))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Signature;
    use quickcheck::quickcheck;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn check_all_lengths<W: Word>(max: usize) {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let a = Signature::<W>::random(&mut rng, max);
        let b = Signature::<W>::random(&mut rng, max);

        for len in 0..=max {
            let (a, b) = (&a.as_slice()[..len], &b.as_slice()[..len]);
            let expected = distance_naive(a, b).unwrap();
            for strategy in Strategy::all() {
                if !strategy.supports::<W>(len) {
                    continue;
                }
                assert_eq!(
                    strategy.distance(a, b).unwrap(),
                    expected,
                    "{strategy} on {len} {} words",
                    W::WIDTH
                );
            }
        }
    }

    #[test]
    fn test_strategies_agree_u64() {
        check_all_lengths::<u64>(100);
    }

    #[test]
    fn test_strategies_agree_u8() {
        check_all_lengths::<u8>(128);
    }

    #[test]
    fn test_generic_entry_points() {
        let a = Signature::<u8>::from_seed("a", 37);
        let b = Signature::<u8>::from_seed("b", 37);
        let (a, b) = (a.as_slice(), b.as_slice());
        let expected = distance_naive(a, b).unwrap();
        assert_eq!(distance_unrolled::<u8, 5>(a, b).unwrap(), expected);
        assert_eq!(distance_unrolled::<u8, 16>(a, b).unwrap(), expected);
        assert_eq!(distance_cursor::<u8, 7>(a, b).unwrap(), expected);
        assert_eq!(distance_cursor::<u8, 1>(a, b).unwrap(), expected);
    }

    #[test]
    fn test_length_mismatch() {
        let a = [0u64; 10];
        let b = [0u64; 11];
        for strategy in Strategy::all() {
            assert_eq!(
                strategy.distance(&a, &b),
                Err(HammingError::LengthMismatch { left: 10, right: 11 })
            );
        }
        assert!(distance_unrolled::<u64, 4>(&a, &b).is_err());
        assert!(distance_cursor::<u64, 4>(&a, &b).is_err());
    }

    #[test]
    fn test_full_lengths() {
        let full = Strategy::indexed(UnrollFactor::Full);
        assert_eq!(full.distance(&[0u8; 32], &[0xffu8; 32]).unwrap(), 256);
        assert_eq!(full.distance(&[0u64; 4], &[u64::MAX; 4]).unwrap(), 256);
        assert_eq!(full.distance(&[0u64; 8], &[u64::MAX; 8]).unwrap(), 512);

        assert!(matches!(
            full.distance(&[0u64; 5], &[0u64; 5]),
            Err(HammingError::InvalidLength { actual: 5, .. })
        ));
        assert!(matches!(
            distance_full(&[0u8; 4], &[0u8; 4]),
            Err(HammingError::InvalidLength { actual: 4, .. })
        ));
        assert!(!full.supports::<u8>(4));
        assert!(full.supports::<u64>(4));
    }

    #[test]
    fn test_fixed() {
        let mut b = [0u64; 4];
        b[2] = 1 << 17;
        assert_eq!(distance_fixed(&[0u64; 4], &b), 1);
        assert_eq!(distance_fixed(&[0xf0u8; 32], &[0x0fu8; 32]), 256);
        assert_eq!(distance_fixed(&[u64::MAX; 8], &[0u64; 8]), 512);
    }

    #[test]
    fn test_strategy_names() {
        for strategy in Strategy::all() {
            let parsed: Strategy = strategy.to_string().parse().unwrap();
            assert_eq!(parsed, strategy);
        }
        assert_eq!(
            "4".parse::<Strategy>().unwrap(),
            Strategy::indexed(UnrollFactor::Four)
        );
        assert_eq!(
            "8-cursor".parse::<Strategy>().unwrap(),
            Strategy::cursor(UnrollFactor::Eight)
        );
        assert!(matches!(
            "5-way".parse::<Strategy>(),
            Err(HammingError::UnknownStrategy(_))
        ));
        assert_eq!(Strategy::all().len(), 14);
    }

    quickcheck! {
        fn prop_strategies_match_naive(pairs: Vec<(u64, u64)>) -> bool {
            let a: Vec<u64> = pairs.iter().map(|p| p.0).collect();
            let b: Vec<u64> = pairs.iter().map(|p| p.1).collect();
            let expected = distance_naive(&a, &b).unwrap();
            Strategy::variable_length()
                .iter()
                .all(|s| s.distance(&a, &b).unwrap() == expected)
        }

        fn prop_symmetric(pairs: Vec<(u8, u8)>) -> bool {
            let a: Vec<u8> = pairs.iter().map(|p| p.0).collect();
            let b: Vec<u8> = pairs.iter().map(|p| p.1).collect();
            let s = Strategy::cursor(UnrollFactor::Three);
            s.distance(&a, &b) == s.distance(&b, &a)
        }
    }
}
