/*!
 * Memory Module
 * Arena allocation, diagnostics, and the process-wide heap
 */

pub mod arena;
pub mod diagnostics;
pub mod global;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use arena::{Arena, Blocks};
pub use diagnostics::{set_diagnostic_sink, Diagnostic, DiagnosticSink, LogSink};
pub use global::{free, malloc, with_heap, GlobalHeap};
pub use traits::*;
pub use types::*;
