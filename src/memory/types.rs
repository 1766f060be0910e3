/*!
 * Memory Types
 * Common types for arena allocation
 */

use crate::core::limits::{
    HEADER_SIZE, PRESSURE_CRITICAL_RATIO, PRESSURE_HIGH_RATIO, PRESSURE_MEDIUM_RATIO,
};
use crate::core::types::{Address, Offset, Size};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Memory operation result
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Reasons a pointer handed to `release` is rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreeFault {
    #[error("null pointer")]
    Null,

    #[error("pointer out of range")]
    OutOfRange,

    #[error("not a valid block pointer")]
    ForeignPointer,

    #[error("double free")]
    DoubleFree,
}

/// Memory errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum MemoryError {
    #[error("Out of memory: requested {requested} bytes, largest free block {largest_free} bytes ({capacity} byte arena)")]
    #[diagnostic(
        code(memory::out_of_memory),
        help("No free block is large enough. Release blocks that are no longer needed and retry.")
    )]
    OutOfMemory {
        requested: Size,
        largest_free: Size,
        capacity: Size,
    },

    #[error("Invalid free: {0}")]
    #[diagnostic(
        code(memory::invalid_free),
        help("Only pointers returned by allocate may be released, and only once.")
    )]
    InvalidFree(#[from] FreeFault),

    #[error("Invalid memory address: 0x{0:x}")]
    #[diagnostic(
        code(memory::invalid_address),
        help("The address does not name the start of an allocated block.")
    )]
    InvalidAddress(Address),

    #[error("Access of {len} bytes at offset {offset} exceeds block of {size} bytes")]
    #[diagnostic(code(memory::out_of_bounds))]
    AccessOutOfBounds { offset: Offset, len: Size, size: Size },

    #[error("Memory corruption detected: header at offset {offset} claims {size} bytes past the arena boundary")]
    #[diagnostic(
        code(memory::corruption),
        help("A block header was overwritten. The arena can no longer be trusted.")
    )]
    CorruptionDetected { offset: Offset, size: Size },
}

impl MemoryError {
    /// Corruption is an internal-consistency failure; everything else is a caller error
    pub fn is_fatal(&self) -> bool {
        matches!(self, MemoryError::CorruptionDetected { .. })
    }

    /// The release fault behind this error, if it came from `release`
    pub fn free_fault(&self) -> Option<FreeFault> {
        match self {
            MemoryError::InvalidFree(fault) => Some(*fault),
            _ => None,
        }
    }
}

/// A block as seen by walking the header chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    /// Offset of the block header from the arena start
    pub offset: Offset,
    /// Payload size in bytes, header excluded
    pub size: Size,
    pub free: bool,
}

impl BlockInfo {
    /// Offset of the first payload byte
    pub fn payload_offset(&self) -> Offset {
        self.offset + HEADER_SIZE
    }

    /// Offset one past the last payload byte, where the next header starts
    pub fn end(&self) -> Offset {
        self.payload_offset() + self.size
    }

    pub fn is_allocated(&self) -> bool {
        !self.free
    }
}

/// Memory statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryStats {
    pub capacity: Size,
    /// Payload bytes held by allocated blocks, absorbed slack included
    pub used_memory: Size,
    /// Payload bytes held by free blocks
    pub free_memory: Size,
    /// Bytes spent on block headers
    pub overhead: Size,
    pub usage_percentage: f64,
    pub allocated_blocks: usize,
    pub free_blocks: usize,
    pub largest_free_block: Size,
    pub allocations: u64,
    pub releases: u64,
    pub failures: u64,
}

impl MemoryStats {
    pub fn memory_pressure(&self) -> MemoryPressure {
        MemoryPressure::from_usage(self.used_memory, self.capacity)
    }

    /// Free payload bytes that cannot be served by the largest free block
    pub fn fragmented_memory(&self) -> Size {
        self.free_memory - self.largest_free_block
    }
}

/// Memory pressure levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MemoryPressure {
    Low,
    Medium,
    High,
    Critical,
}

impl MemoryPressure {
    pub fn from_usage(used: Size, capacity: Size) -> Self {
        if capacity == 0 {
            return MemoryPressure::Critical;
        }
        let usage_ratio = used as f64 / capacity as f64;

        if usage_ratio >= PRESSURE_CRITICAL_RATIO {
            MemoryPressure::Critical
        } else if usage_ratio >= PRESSURE_HIGH_RATIO {
            MemoryPressure::High
        } else if usage_ratio >= PRESSURE_MEDIUM_RATIO {
            MemoryPressure::Medium
        } else {
            MemoryPressure::Low
        }
    }
}

impl std::fmt::Display for MemoryPressure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            MemoryPressure::Low => write!(f, "LOW"),
            MemoryPressure::Medium => write!(f, "MEDIUM"),
            MemoryPressure::High => write!(f, "HIGH"),
            MemoryPressure::Critical => write!(f, "CRITICAL"),
        }
    }
}
