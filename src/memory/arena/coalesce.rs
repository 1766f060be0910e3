/*!
 * Coalescing
 * Single left-to-right sweep merging runs of adjacent free blocks
 */

use super::header::BlockHeader;
use super::Arena;
use crate::core::limits::HEADER_SIZE;
use crate::memory::types::MemoryResult;

impl<const N: usize> Arena<N> {
    /// Merge every free block with the free blocks immediately after it
    ///
    /// Afterwards no two adjacent blocks are both free. Returns the number of
    /// headers absorbed.
    pub(super) fn coalesce(&mut self) -> MemoryResult<usize> {
        let mut offset = 0;
        let mut merged = 0;

        while offset < N {
            let mut header = self.read_header(offset);

            if header.is_free() {
                loop {
                    let next = self.next_offset(offset, header)?;
                    if next == N {
                        break;
                    }
                    let following = self.read_header(next);
                    if !following.is_free() {
                        break;
                    }
                    header = BlockHeader::free(header.size() + HEADER_SIZE + following.size());
                    merged += 1;
                }
                self.write_header(offset, header);
            }

            offset = self.next_offset(offset, header)?;
        }

        self.block_count -= merged;
        Ok(merged)
    }
}
