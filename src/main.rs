/*!
 * memgrind - Main Entry Point
 *
 * Times the allocation workloads against the process-wide heap and prints
 * the mean runtime of each.
 */

use anyhow::Context;
use arena_heap::{grind, init_tracing, GlobalHeap, GrindConfig, MemoryInfo};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = GrindConfig::from_env();
    info!(
        iterations = config.iterations,
        seed = ?config.seed,
        json = config.json,
        "memgrind starting"
    );

    let mut heap = GlobalHeap;
    let report = grind::run(&mut heap, &config).context("memgrind workload failed")?;

    if config.json {
        let json = serde_json::to_string_pretty(&report).context("failed to encode report")?;
        println!("{}", json);
    } else {
        print!("{}", report);
    }

    let stats = heap.stats().context("failed to read heap statistics")?;
    info!(
        allocations = stats.allocations,
        releases = stats.releases,
        failures = stats.failures,
        pressure = %stats.memory_pressure(),
        "memgrind complete"
    );

    Ok(())
}
