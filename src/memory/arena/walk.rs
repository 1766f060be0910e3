/*!
 * Header Chain Walk
 * Address-order traversal of the implicit block list
 */

use super::header::BlockHeader;
use super::Arena;
use crate::core::limits::HEADER_SIZE;
use crate::core::types::Offset;
use crate::memory::types::{BlockInfo, MemoryError, MemoryResult};
use log::error;

/// Iterator over the blocks of an arena in address order
///
/// Yields `Err(CorruptionDetected)` once and stops if a header would walk
/// past the arena boundary.
pub struct Blocks<'a, const N: usize> {
    arena: &'a Arena<N>,
    offset: Offset,
    done: bool,
}

impl<'a, const N: usize> Iterator for Blocks<'a, N> {
    type Item = MemoryResult<BlockInfo>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || !self.arena.initialized || self.offset >= N {
            return None;
        }

        let header = self.arena.read_header(self.offset);
        match self.arena.next_offset(self.offset, header) {
            Ok(next) => {
                let block = BlockInfo {
                    offset: self.offset,
                    size: header.size(),
                    free: header.is_free(),
                };
                self.offset = next;
                Some(Ok(block))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<const N: usize> Arena<N> {
    /// Walk the block chain in address order
    pub fn blocks(&self) -> Blocks<'_, N> {
        Blocks {
            arena: self,
            offset: 0,
            done: false,
        }
    }

    /// Collect the block chain, failing on corruption
    pub fn layout(&self) -> MemoryResult<Vec<BlockInfo>> {
        self.blocks().collect()
    }

    /// Verify that the chain tiles the arena exactly
    pub fn check(&self) -> MemoryResult<()> {
        self.blocks().try_for_each(|block| block.map(|_| ()))
    }

    /// Offset of the header following `header` at `offset`
    ///
    /// The result is either exactly `N` or leaves room for a full header.
    pub(super) fn next_offset(&self, offset: Offset, header: BlockHeader) -> MemoryResult<Offset> {
        let next = offset + HEADER_SIZE + header.size();
        if next == N || next + HEADER_SIZE <= N {
            return Ok(next);
        }

        error!(
            "Header chain overruns arena: block at offset {} claims {} bytes (capacity {})",
            offset,
            header.size(),
            N
        );
        Err(MemoryError::CorruptionDetected {
            offset,
            size: header.size(),
        })
    }
}
