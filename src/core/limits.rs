/*!
 * Allocator Limits and Constants
 *
 * Centralized location for arena sizing, header layout, pressure thresholds
 * and the memgrind workload shape.
 *
 * ## Conventions
 * - Values are grouped by domain (arena, pressure, workloads)
 * - Layout-critical constants are marked with [LAYOUT]
 */

// =============================================================================
// ARENA LAYOUT
// =============================================================================

/// Capacity of the process-wide heap (4KB)
/// Default for `Arena` when no capacity is given
pub const HEAP_SIZE: usize = 4096;

/// Size of the in-band block header in bytes
/// [LAYOUT] 15 bits of payload size plus a 1-bit free flag packed in a `u16`
pub const HEADER_SIZE: usize = 2;

/// Largest arena a block header can describe (32KB)
/// [LAYOUT] The 15-bit size field must reach `capacity - HEADER_SIZE`
pub const MAX_ARENA_SIZE: usize = 1 << 15;

// =============================================================================
// MEMORY PRESSURE
// =============================================================================

/// Usage ratio at which pressure is reported as MEDIUM
pub const PRESSURE_MEDIUM_RATIO: f64 = 0.60;

/// Usage ratio at which pressure is reported as HIGH
pub const PRESSURE_HIGH_RATIO: f64 = 0.80;

/// Usage ratio at which pressure is reported as CRITICAL
pub const PRESSURE_CRITICAL_RATIO: f64 = 0.95;

// =============================================================================
// MEMGRIND WORKLOADS
// =============================================================================

/// Rounds each workload is timed over
pub const DEFAULT_GRIND_ITERATIONS: usize = 50;

/// One-byte operations performed by workloads A, B and E
pub const SMALL_OPS: usize = 120;

/// Random steps taken by workload C
pub const RANDOM_STEPS: usize = 240;

/// Large chunks that tile the arena in workload D
pub const LARGE_CHUNKS: usize = 32;

/// Small chunks that replace the large ones in workload D
pub const SMALL_CHUNKS: usize = 96;
