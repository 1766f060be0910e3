/*!
 * Monitoring
 * Tracing setup and timed spans for workload runs
 */

mod tracer;

pub use tracer::{init_tracing, WorkloadSpan};
