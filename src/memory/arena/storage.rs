/*!
 * Payload Storage Operations
 * Bounds-checked reads and writes into allocated blocks
 */

use super::Arena;
use crate::core::types::{Address, Offset, Size};
use crate::memory::types::{BlockInfo, MemoryError, MemoryResult};
use log::trace;
use std::ptr;

impl<const N: usize> Arena<N> {
    /// Write bytes into an allocated block, starting `offset` bytes into its payload
    pub fn write_bytes(&mut self, block: *const u8, offset: Offset, data: &[u8]) -> MemoryResult<()> {
        let info = self.allocated_block(block)?;
        Self::check_bounds(&info, offset, data.len())?;

        // SAFETY: the range lies within the payload of an allocated block
        unsafe {
            ptr::copy_nonoverlapping(
                data.as_ptr(),
                self.base.as_ptr().add(info.payload_offset() + offset),
                data.len(),
            );
        }

        trace!(
            "Wrote {} bytes at offset {} in block at offset {}",
            data.len(),
            offset,
            info.offset
        );
        Ok(())
    }

    /// Read bytes from an allocated block, starting `offset` bytes into its payload
    pub fn read_bytes(&self, block: *const u8, offset: Offset, len: Size) -> MemoryResult<Vec<u8>> {
        let info = self.allocated_block(block)?;
        Self::check_bounds(&info, offset, len)?;

        let mut data = vec![0u8; len];
        // SAFETY: the range lies within the payload of an allocated block
        unsafe {
            ptr::copy_nonoverlapping(
                self.base.as_ptr().add(info.payload_offset() + offset),
                data.as_mut_ptr(),
                len,
            );
        }
        Ok(data)
    }

    fn allocated_block(&self, block: *const u8) -> MemoryResult<BlockInfo> {
        match self.find_block(block) {
            Ok(info) if !info.free => Ok(info),
            Err(err) if err.is_fatal() => Err(err),
            _ => Err(MemoryError::InvalidAddress(block as Address)),
        }
    }

    fn check_bounds(info: &BlockInfo, offset: Offset, len: Size) -> MemoryResult<()> {
        match offset.checked_add(len) {
            Some(end) if end <= info.size => Ok(()),
            _ => Err(MemoryError::AccessOutOfBounds {
                offset,
                len,
                size: info.size,
            }),
        }
    }
}
