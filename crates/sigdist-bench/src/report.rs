//! Report types and rendering.

use serde::Serialize;
use tracing::info;

/// One timed (group, strategy, length) cell.
#[derive(Debug, Clone, Serialize)]
pub struct Measurement {
    pub group: String,
    pub strategy: String,
    pub bits: u64,
    pub distance: u64,
    pub ns_per_op: f64,
}

impl Measurement {
    pub fn new(
        group: impl Into<String>,
        strategy: impl Into<String>,
        bits: u64,
        distance: u64,
        ns_per_op: f64,
    ) -> Self {
        Self {
            group: group.into(),
            strategy: strategy.into(),
            bits,
            distance,
            ns_per_op,
        }
    }

    /// Comparisons per second implied by `ns_per_op`.
    pub fn ops_per_sec(&self) -> f64 {
        if self.ns_per_op > 0.0 {
            1e9 / self.ns_per_op
        } else {
            f64::INFINITY
        }
    }
}

/// Sequential vs parallel one-to-many run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchMeasurement {
    pub strategy: String,
    pub candidates: usize,
    pub sequential_ms: f64,
    pub parallel_ms: f64,
    pub min_distance: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub seed: u64,
    pub iterations: u64,
    pub measurements: Vec<Measurement>,
    pub batch: Option<BatchMeasurement>,
}

impl Report {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Fastest strategy per (group, bits), in first-seen order.
    pub fn winners(&self) -> Vec<&Measurement> {
        let mut out: Vec<&Measurement> = Vec::new();
        for m in &self.measurements {
            match out
                .iter_mut()
                .find(|w| w.group == m.group && w.bits == m.bits)
            {
                Some(w) if m.ns_per_op < w.ns_per_op => *w = m,
                Some(_) => {}
                None => out.push(m),
            }
        }
        out
    }

    /// Log the report as an aligned table.
    pub fn log_table(&self) {
        info!(
            "{:<12} {:<16} {:>7} {:>9} {:>11} {:>14}",
            "group", "strategy", "bits", "distance", "ns/op", "ops/s"
        );
        for m in &self.measurements {
            info!(
                "{:<12} {:<16} {:>7} {:>9} {:>11.2} {:>14.0}",
                m.group,
                m.strategy,
                m.bits,
                m.distance,
                m.ns_per_op,
                m.ops_per_sec()
            );
        }

        info!("");
        info!("Fastest per length:");
        for w in self.winners() {
            info!("  {:<12} {:>7} bits: {} ({:.2} ns/op)", w.group, w.bits, w.strategy, w.ns_per_op);
        }

        if let Some(b) = &self.batch {
            info!("");
            info!(
                "Batch {} x 256-bit with {}: sequential {:.3} ms, parallel {:.3} ms, nearest at {}",
                b.candidates, b.strategy, b.sequential_ms, b.parallel_ms, b.min_distance
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> Report {
        Report {
            seed: 1,
            iterations: 10,
            measurements: vec![
                Measurement::new("u64 slice", "naive", 64, 30, 4.0),
                Measurement::new("u64 slice", "4-way", 64, 30, 2.5),
                Measurement::new("u64 slice", "full", 256, 130, 1.0),
                Measurement::new("u8 slice", "naive", 64, 30, 9.0),
            ],
            batch: None,
        }
    }

    #[test]
    fn test_winners() {
        let r = report();
        let winners: Vec<(&str, u64)> = r
            .winners()
            .iter()
            .map(|m| (m.strategy.as_str(), m.bits))
            .collect();
        assert_eq!(winners, vec![("4-way", 64), ("full", 256), ("naive", 64)]);
    }

    #[test]
    fn test_json() {
        let json = report().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["measurements"].as_array().unwrap().len(), 4);
        assert_eq!(value["measurements"][1]["strategy"], "4-way");
        assert!(value["batch"].is_null());
    }

    #[test]
    fn test_ops_per_sec() {
        assert_eq!(Measurement::new("g", "s", 8, 0, 2.0).ops_per_sec(), 5e8);
    }
}
