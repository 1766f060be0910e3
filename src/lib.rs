/*!
 * Arena Heap Library
 * Fixed-size heap arena with first-fit allocation and validated release
 */

pub mod core;
pub mod grind;
pub mod memory;
pub mod monitoring;

// Re-exports
pub use crate::core::limits::{HEADER_SIZE, HEAP_SIZE};
pub use grind::{GrindConfig, GrindReport, Workload};
pub use memory::{
    free, malloc, set_diagnostic_sink, with_heap, Allocator, Arena, BlockInfo, Diagnostic,
    DiagnosticSink, FreeFault, GlobalHeap, MemoryError, MemoryInfo, MemoryPressure,
    MemoryResult, MemoryStats,
};
pub use monitoring::init_tracing;
