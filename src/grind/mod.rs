/*!
 * memgrind
 *
 * Timing harness for an allocator. Each of the five workloads runs for a
 * configured number of rounds against the same heap, and the mean wall time
 * per round is reported.
 */

pub mod config;
pub mod report;
pub mod workloads;

pub use config::GrindConfig;
pub use report::{GrindReport, WorkloadTiming};
pub use workloads::Workload;

use crate::memory::{Allocator, MemoryInfo, MemoryResult};
use crate::monitoring::WorkloadSpan;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Run every workload `config.iterations` times against `heap`
///
/// Stops at the first allocator error. A heap that still holds allocated
/// blocks afterwards is logged but not treated as a failure.
pub fn run<A>(heap: &mut A, config: &GrindConfig) -> MemoryResult<GrindReport>
where
    A: Allocator + MemoryInfo,
{
    let seed = config
        .seed
        .unwrap_or_else(|| StdRng::from_entropy().next_u64());
    let mut rng = StdRng::seed_from_u64(seed);

    info!(
        "memgrind: {} rounds per workload, seed {}",
        config.iterations, seed
    );

    let mut results = Vec::with_capacity(Workload::ALL.len());
    for workload in Workload::ALL {
        let mut rounds = Vec::with_capacity(config.iterations);
        for round in 0..config.iterations {
            let span = WorkloadSpan::start(workload, round);
            let result = {
                let _guard = span.enter();
                workload.run(heap, &mut rng)
            };
            rounds.push(span.finish(&result));
            result?;
        }

        if let Some(timing) = WorkloadTiming::from_rounds(workload, &rounds) {
            results.push(timing);
        }
    }

    let stats = heap.stats()?;
    if stats.allocated_blocks > 0 {
        warn!(
            "{} blocks ({} bytes) still allocated after memgrind",
            stats.allocated_blocks, stats.used_memory
        );
    }

    Ok(GrindReport {
        iterations: config.iterations,
        seed,
        results,
    })
}
