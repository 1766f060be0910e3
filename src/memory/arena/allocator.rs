/*!
 * Arena Allocation
 * First-fit allocation, splitting, and validated release
 */

use super::header::BlockHeader;
use super::Arena;
use crate::core::limits::HEADER_SIZE;
use crate::core::types::Size;
use crate::memory::types::{
    BlockInfo, FreeFault, MemoryError, MemoryPressure, MemoryResult,
};
use log::{debug, trace};
use std::ptr::NonNull;

impl<const N: usize> Arena<N> {
    /// Allocate `size` payload bytes using first-fit in address order
    ///
    /// Returns `Ok(None)` for zero-byte requests without touching the arena.
    /// When no free block is large enough the arena is left unchanged and
    /// `OutOfMemory` is returned.
    pub fn allocate(&mut self, size: Size) -> MemoryResult<Option<NonNull<u8>>> {
        if size == 0 {
            trace!("Ignoring zero-byte allocation request");
            return Ok(None);
        }

        if !self.initialized {
            self.initialize();
        }

        let mut largest_free = 0;
        let mut found = None;
        for block in self.blocks() {
            let block = block?;
            if !block.free {
                continue;
            }
            if block.size >= size {
                found = Some(block);
                break;
            }
            largest_free = largest_free.max(block.size);
        }

        let Some(block) = found else {
            self.counters.failures += 1;
            debug!(
                "OOM: requested {} bytes, largest free block {} bytes ({} / {} bytes in use)",
                size, largest_free, self.in_use, N
            );
            return Err(MemoryError::OutOfMemory {
                requested: size,
                largest_free,
                capacity: N,
            });
        };

        let granted = self.carve(block, size);
        self.in_use += granted;
        self.counters.allocations += 1;
        self.track_pressure();

        trace!(
            "Allocated {} bytes at offset {} (requested {})",
            granted,
            block.payload_offset(),
            size
        );
        Ok(Some(self.payload_ptr(block.offset)))
    }

    /// Mark `block` used, splitting off the slack when it can hold a header
    /// plus at least one payload byte. Returns the payload size granted.
    fn carve(&mut self, block: BlockInfo, size: Size) -> Size {
        let slack = block.size - size;

        if slack > HEADER_SIZE {
            let remainder_offset = block.payload_offset() + size;
            debug_assert!(remainder_offset + HEADER_SIZE < N);

            self.write_header(remainder_offset, BlockHeader::free(slack - HEADER_SIZE));
            self.write_header(block.offset, BlockHeader::used(size));
            self.block_count += 1;

            trace!(
                "Split block at offset {}: keeping {} bytes, {} bytes free at offset {}",
                block.offset,
                size,
                slack - HEADER_SIZE,
                remainder_offset
            );
            size
        } else {
            // Too little room for a remainder header, the block absorbs the slack
            self.write_header(block.offset, BlockHeader::used(block.size));
            block.size
        }
    }

    /// Release a block and merge adjacent free blocks
    ///
    /// The pointer is validated before it is trusted; any failure is returned
    /// without modifying the arena.
    pub fn release(&mut self, ptr: *const u8) -> MemoryResult<()> {
        let block = match self.find_block(ptr) {
            Ok(block) if block.free => Err(FreeFault::DoubleFree.into()),
            other => other,
        };
        let block = match block {
            Ok(block) => block,
            Err(err) => {
                if !err.is_fatal() {
                    self.counters.failures += 1;
                }
                debug!("Rejected release of {:p}: {}", ptr, err);
                return Err(err);
            }
        };

        self.write_header(block.offset, BlockHeader::free(block.size));
        self.in_use = self.in_use.saturating_sub(block.size);
        self.counters.releases += 1;

        let merged = self.coalesce()?;
        self.track_pressure();

        trace!(
            "Released {} bytes at offset {}, merged {} neighbouring blocks",
            block.size,
            block.payload_offset(),
            merged
        );
        Ok(())
    }

    /// Check if a pointer names a currently allocated block
    pub fn is_valid(&self, ptr: *const u8) -> bool {
        matches!(self.find_block(ptr), Ok(block) if !block.free)
    }

    /// Get the payload size of an allocated block
    ///
    /// This is the size recorded in the header, which exceeds the requested
    /// size when the block absorbed slack.
    pub fn block_size(&self, ptr: *const u8) -> Option<Size> {
        match self.find_block(ptr) {
            Ok(block) if !block.free => Some(block.size),
            _ => None,
        }
    }

    /// Resolve a caller pointer to the block whose payload starts there
    ///
    /// Checks, in order: null, arena range, exact payload start of a block
    /// reachable from offset 0. Free blocks are returned as-is.
    pub(super) fn find_block(&self, ptr: *const u8) -> MemoryResult<BlockInfo> {
        if ptr.is_null() {
            return Err(FreeFault::Null.into());
        }

        let payload_offset = self.offset_of(ptr).ok_or(FreeFault::OutOfRange)?;

        for block in self.blocks() {
            let block = block?;
            if block.payload_offset() == payload_offset {
                return Ok(block);
            }
            if block.payload_offset() > payload_offset {
                break;
            }
        }

        Err(FreeFault::ForeignPointer.into())
    }

    fn track_pressure(&mut self) {
        let pressure = MemoryPressure::from_usage(self.in_use, N);
        if pressure != self.pressure {
            debug!(
                "Memory pressure {} -> {} ({} / {} bytes in use)",
                self.pressure, pressure, self.in_use, N
            );
            self.pressure = pressure;
        }
    }
}
