/*!
 * Grind Report
 * Per-workload timing summary
 */

use super::Workload;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Timing of one workload across every round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadTiming {
    pub workload: Workload,
    pub mean_secs: f64,
    pub min_secs: f64,
    pub max_secs: f64,
}

impl WorkloadTiming {
    /// Summarize a set of round durations; `None` when there are none
    pub fn from_rounds(workload: Workload, rounds: &[Duration]) -> Option<Self> {
        if rounds.is_empty() {
            return None;
        }

        let secs = rounds.iter().map(Duration::as_secs_f64);
        let total: f64 = secs.clone().sum();
        let min_secs = secs.clone().fold(f64::INFINITY, f64::min);
        let max_secs = secs.fold(0.0, f64::max);

        Some(Self {
            workload,
            mean_secs: total / rounds.len() as f64,
            min_secs,
            max_secs,
        })
    }
}

/// Outcome of a full memgrind run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrindReport {
    pub iterations: usize,
    pub seed: u64,
    pub results: Vec<WorkloadTiming>,
}

impl GrindReport {
    pub fn timing(&self, workload: Workload) -> Option<&WorkloadTiming> {
        self.results.iter().find(|t| t.workload == workload)
    }
}

impl fmt::Display for GrindReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for timing in &self.results {
            writeln!(f, "{} mean runtime: {:.6}", timing.workload, timing.mean_secs)?;
        }
        Ok(())
    }
}
