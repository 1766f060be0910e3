/*!
 * Memory Traits
 * Allocation abstractions shared by arenas and the process-wide heap
 */

use super::types::*;
use crate::core::types::Size;
use std::ptr::NonNull;

/// Memory allocator interface
pub trait Allocator {
    /// Allocate `size` payload bytes; `Ok(None)` for zero-byte requests
    fn allocate(&mut self, size: Size) -> MemoryResult<Option<NonNull<u8>>>;

    /// Release a pointer previously returned by `allocate`
    ///
    /// Any pointer value is accepted and validated before it is trusted.
    fn release(&mut self, ptr: *const u8) -> MemoryResult<()>;

    /// Check if a pointer names a currently allocated block
    fn is_valid(&self, ptr: *const u8) -> bool;

    /// Get the payload size of an allocated block
    fn block_size(&self, ptr: *const u8) -> Option<Size>;

    /// Total bytes managed, headers included
    fn capacity(&self) -> Size;
}

/// Memory statistics provider
pub trait MemoryInfo {
    /// Walk the block chain and summarize it
    fn stats(&self) -> MemoryResult<MemoryStats>;

    /// Get memory info as (total, used, available)
    fn info(&self) -> (Size, Size, Size);

    /// Get memory pressure level
    fn pressure(&self) -> MemoryPressure {
        let (total, used, _) = self.info();
        MemoryPressure::from_usage(used, total)
    }
}
