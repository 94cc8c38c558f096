//! Strategy cross-check and timing.
//!
//! Every timed cell first compares its strategy against the naive reference
//! on the same operands; a disagreement aborts the run instead of producing
//! a throughput number for a wrong answer.

use std::hint::black_box;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use rand::Rng;
use sigdist_hamming::{
    distance_naive, distance_widened, distances, par_distances, to_bytes, Bytes256, Signature,
    Strategy, Word, Words256,
};
use tracing::debug;

use crate::config::BenchConfig;
use crate::report::{BatchMeasurement, Measurement};

/// Run `f` `iterations` times and return its last result with the mean
/// cost per call in nanoseconds.
fn time<F: FnMut() -> u64>(iterations: u64, mut f: F) -> (u64, f64) {
    let mut last = 0;
    let start = Instant::now();
    for _ in 0..iterations {
        last = black_box(f());
    }
    let elapsed = start.elapsed();
    (last, elapsed.as_nanos() as f64 / iterations as f64)
}

fn verify(group: &str, name: &str, bits: u64, got: u64, expected: u64) -> Result<()> {
    if got != expected {
        bail!("{group}/{name} disagrees with the reference at {bits} bits: {got} != {expected}");
    }
    Ok(())
}

/// Cross-check and time every strategy able to run on `a`/`b`.
fn sweep_width<W: Word>(
    group: &str,
    a: &[W],
    b: &[W],
    iterations: u64,
    out: &mut Vec<Measurement>,
) -> Result<()> {
    let bits = a.len() as u64 * W::BITS as u64;
    let expected = distance_naive(a, b).context("reference distance")?;

    for strategy in Strategy::all() {
        if !strategy.supports::<W>(a.len()) {
            continue;
        }
        let got = strategy.distance(a, b)?;
        verify(group, &strategy.to_string(), bits, got, expected)?;

        let (_, ns) = time(iterations, || {
            strategy.distance(black_box(a), black_box(b)).unwrap_or(0)
        });
        out.push(Measurement::new(group, strategy.to_string(), bits, got, ns));
    }
    Ok(())
}

/// Sweep all configured lengths at both widths, plus the widened path.
pub fn run_sweep<R: Rng>(config: &BenchConfig, rng: &mut R) -> Result<Vec<Measurement>> {
    let max = config.max_len();
    let a = Signature::<u64>::random(rng, max);
    let b = Signature::<u64>::random(rng, max);
    let a8 = to_bytes(&a);
    let b8 = to_bytes(&b);

    let mut out = Vec::new();
    for &len in &config.lengths {
        debug!(words = len, "sweeping length");
        let (wa, wb) = (&a.as_slice()[..len], &b.as_slice()[..len]);
        let (ba, bb) = (&a8.as_slice()[..len * 8], &b8.as_slice()[..len * 8]);

        sweep_width("u64 slice", wa, wb, config.iterations, &mut out)?;
        sweep_width("u8 slice", ba, bb, config.iterations, &mut out)?;

        let bits = len as u64 * 64;
        let expected = distance_naive(wa, wb)?;
        for strategy in Strategy::all() {
            if !strategy.supports::<u64>(len) {
                continue;
            }
            let got = distance_widened(ba, bb, strategy)?;
            verify("u8 widened", &strategy.to_string(), bits, got, expected)?;
            let (_, ns) = time(config.iterations, || {
                distance_widened(black_box(ba), black_box(bb), strategy).unwrap_or(0)
            });
            out.push(Measurement::new("u8 widened", strategy.to_string(), bits, got, ns));
        }
    }
    Ok(out)
}

/// Time the 256-bit fixed-size paths.
pub fn run_fixed<R: Rng>(config: &BenchConfig, rng: &mut R) -> Result<Vec<Measurement>> {
    let b1 = Bytes256::random(rng);
    let b2 = Bytes256::random(rng);
    let w1 = b1.to_words();
    let w2 = b2.to_words();

    let expected = distance_naive(b1.as_slice(), b2.as_slice())?;
    let mut out = Vec::new();

    let cases: [(&str, Box<dyn Fn() -> u64>); 3] = [
        ("u8 array full", Box::new(|| b1.distance(black_box(&b2)))),
        ("u64 array full", Box::new(|| w1.distance(black_box(&w2)))),
        (
            "u8 array widened",
            Box::new(|| b1.distance_widened(black_box(&b2))),
        ),
    ];
    for (name, f) in cases {
        let (got, ns) = time(config.iterations, &*f);
        verify("256-bit", name, Words256::bit_len(), got, expected)?;
        out.push(Measurement::new("256-bit", name, Words256::bit_len(), got, ns));
    }
    Ok(out)
}

/// Compare one query against `config.batch` 256-bit candidates, first
/// sequentially then fanned out over the rayon pool.
pub fn run_batch<R: Rng>(config: &BenchConfig, rng: &mut R) -> Result<Option<BatchMeasurement>> {
    if config.batch == 0 {
        return Ok(None);
    }

    let query = Words256::random(rng);
    let candidates: Vec<Words256> = (0..config.batch).map(|_| Words256::random(rng)).collect();
    let slices: Vec<&[u64]> = candidates.iter().map(|c| c.as_slice()).collect();
    let strategy = config.engine.strategy();

    let start = Instant::now();
    let seq = distances(query.as_slice(), &slices, strategy).context("sequential batch")?;
    let sequential_ms = start.elapsed().as_secs_f64() * 1e3;

    let start = Instant::now();
    let par = par_distances(query.as_slice(), &slices, strategy).context("parallel batch")?;
    let parallel_ms = start.elapsed().as_secs_f64() * 1e3;

    if seq != par {
        bail!("parallel batch results differ from sequential ones");
    }

    Ok(Some(BatchMeasurement {
        strategy: strategy.to_string(),
        candidates: config.batch,
        sequential_ms,
        parallel_ms,
        min_distance: seq.iter().copied().min().unwrap_or(0),
    }))
}
