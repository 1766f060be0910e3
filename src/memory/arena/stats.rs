/*!
 * Arena Statistics
 * Usage summaries derived from the block chain and lifetime counters
 */

use super::Arena;
use crate::core::limits::HEADER_SIZE;
use crate::core::types::Size;
use crate::memory::types::{MemoryPressure, MemoryResult, MemoryStats};
use crate::memory::MemoryInfo;

impl<const N: usize> Arena<N> {
    /// Walk the block chain and summarize it
    ///
    /// Before the first allocation the arena reports the single free block it
    /// will be initialized with.
    pub fn stats(&self) -> MemoryResult<MemoryStats> {
        let mut stats = MemoryStats {
            capacity: N,
            used_memory: 0,
            free_memory: 0,
            overhead: 0,
            usage_percentage: 0.0,
            allocated_blocks: 0,
            free_blocks: 0,
            largest_free_block: 0,
            allocations: self.counters.allocations,
            releases: self.counters.releases,
            failures: self.counters.failures,
        };

        if !self.initialized {
            stats.free_memory = N - HEADER_SIZE;
            stats.overhead = HEADER_SIZE;
            stats.free_blocks = 1;
            stats.largest_free_block = N - HEADER_SIZE;
            return Ok(stats);
        }

        for block in self.blocks() {
            let block = block?;
            stats.overhead += HEADER_SIZE;
            if block.free {
                stats.free_memory += block.size;
                stats.free_blocks += 1;
                stats.largest_free_block = stats.largest_free_block.max(block.size);
            } else {
                stats.used_memory += block.size;
                stats.allocated_blocks += 1;
            }
        }
        stats.usage_percentage = (stats.used_memory as f64 / N as f64) * 100.0;

        Ok(stats)
    }

    /// Get memory info as (total, used, available) without walking the chain
    pub fn info(&self) -> (Size, Size, Size) {
        let headers = if self.initialized { self.block_count } else { 1 };
        let available = N - self.in_use - headers * HEADER_SIZE;
        (N, self.in_use, available)
    }
}

impl<const N: usize> MemoryInfo for Arena<N> {
    fn stats(&self) -> MemoryResult<MemoryStats> {
        Arena::stats(self)
    }

    fn info(&self) -> (Size, Size, Size) {
        Arena::info(self)
    }

    /// Level recorded by the last allocate or release
    fn pressure(&self) -> MemoryPressure {
        self.pressure
    }
}
