//! One-query-against-many comparison.
//!
//! Each pairwise distance is independent, so the parallel variant is a
//! plain rayon fan-out; results are collected in candidate order either way.

use rayon::prelude::*;
use tracing::debug;

use crate::{HammingError, Result, Strategy, Word};

fn tag(index: usize, err: HammingError) -> HammingError {
    HammingError::Candidate {
        index,
        source: Box::new(err),
    }
}

/// Distances from `query` to every candidate, in candidate order.
///
/// Stops at the first candidate whose length differs from the query.
pub fn distances<W, C>(query: &[W], candidates: &[C], strategy: Strategy) -> Result<Vec<u64>>
where
    W: Word,
    C: AsRef<[W]>,
{
    candidates
        .iter()
        .enumerate()
        .map(|(i, c)| strategy.distance(query, c.as_ref()).map_err(|e| tag(i, e)))
        .collect()
}

/// Parallel variant of [`distances`].
///
/// On failure the reported candidate is the lowest offending index.
pub fn par_distances<W, C>(query: &[W], candidates: &[C], strategy: Strategy) -> Result<Vec<u64>>
where
    W: Word,
    C: AsRef<[W]> + Sync,
{
    debug!(
        candidates = candidates.len(),
        strategy = %strategy,
        threads = rayon::current_num_threads(),
        "parallel batch distance"
    );

    if !candidates.is_empty() && !strategy.supports::<W>(query.len()) {
        let err = strategy
            .distance(query, candidates[0].as_ref())
            .err()
            .unwrap_or(HammingError::invalid_length("a supported length", query.len()));
        return Err(tag(0, err));
    }

    if let Some(index) = candidates
        .par_iter()
        .position_first(|c| c.as_ref().len() != query.len())
    {
        return Err(tag(
            index,
            HammingError::LengthMismatch {
                left: query.len(),
                right: candidates[index].as_ref().len(),
            },
        ));
    }

    candidates
        .par_iter()
        .enumerate()
        .map(|(i, c)| strategy.distance(query, c.as_ref()).map_err(|e| tag(i, e)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Signature, UnrollFactor};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn corpus(n: usize, len: usize) -> (Signature<u64>, Vec<Signature<u64>>) {
        let mut rng = StdRng::seed_from_u64(99);
        let query = Signature::random(&mut rng, len);
        let candidates = (0..n).map(|_| Signature::random(&mut rng, len)).collect();
        (query, candidates)
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let (query, candidates) = corpus(500, 9);
        let strategy = Strategy::indexed(UnrollFactor::Six);
        let seq = distances(query.as_slice(), &candidates, strategy).unwrap();
        let par = par_distances(query.as_slice(), &candidates, strategy).unwrap();
        assert_eq!(seq, par);
        for (d, c) in seq.iter().zip(&candidates) {
            assert_eq!(*d, query.distance(c).unwrap());
        }
    }

    #[test]
    fn test_reports_first_bad_candidate() {
        let (query, mut candidates) = corpus(50, 4);
        candidates[17] = Signature::zeros(3);
        candidates[40] = Signature::zeros(5);

        let expected = HammingError::Candidate {
            index: 17,
            source: Box::new(HammingError::LengthMismatch { left: 4, right: 3 }),
        };
        let strategy = Strategy::default();
        assert_eq!(
            distances(query.as_slice(), &candidates, strategy).unwrap_err(),
            expected
        );
        assert_eq!(
            par_distances(query.as_slice(), &candidates, strategy).unwrap_err(),
            expected
        );
    }

    #[test]
    fn test_empty_batch() {
        let query = [0u8; 4];
        let candidates: Vec<Vec<u8>> = Vec::new();
        assert!(distances(&query[..], &candidates, Strategy::NAIVE)
            .unwrap()
            .is_empty());
        assert!(par_distances(&query[..], &candidates, Strategy::NAIVE)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_full_unroll_unsupported_query() {
        let strategy = Strategy::indexed(UnrollFactor::Full);

        let (query, candidates) = corpus(20, 5);
        let seq = distances(query.as_slice(), &candidates, strategy).unwrap_err();
        let par = par_distances(query.as_slice(), &candidates, strategy).unwrap_err();
        assert!(matches!(
            &seq,
            HammingError::Candidate { index: 0, source }
                if matches!(**source, HammingError::InvalidLength { actual: 5, .. })
        ));
        assert_eq!(par, seq);

        let (query, mut candidates) = corpus(20, 5);
        candidates[0] = Signature::zeros(4);
        let expected = HammingError::Candidate {
            index: 0,
            source: Box::new(HammingError::LengthMismatch { left: 5, right: 4 }),
        };
        assert_eq!(
            distances(query.as_slice(), &candidates, strategy).unwrap_err(),
            expected
        );
        assert_eq!(
            par_distances(query.as_slice(), &candidates, strategy).unwrap_err(),
            expected
        );

        let (query, candidates) = corpus(20, 8);
        assert_eq!(
            par_distances(query.as_slice(), &candidates, strategy).unwrap(),
            distances(query.as_slice(), &candidates, Strategy::NAIVE).unwrap()
        );
    }
}
