/*!
 * memgrind Workloads
 * Allocation patterns used to time and stress an allocator
 */

use crate::core::limits::{HEADER_SIZE, LARGE_CHUNKS, RANDOM_STEPS, SMALL_CHUNKS, SMALL_OPS};
use crate::core::types::Size;
use crate::memory::{Allocator, MemoryResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ptr;

/// The memgrind workloads, run in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Workload {
    /// Allocate one byte and release it immediately, 120 times
    A,
    /// Allocate 120 one-byte blocks, then release them all
    B,
    /// Randomly interleave one-byte allocations and releases
    C,
    /// Tile the arena with large chunks, then swap each for small ones
    D,
    /// Release one-byte blocks outwards from the middle, then take the whole arena
    E,
}

impl Workload {
    pub const ALL: [Workload; 5] = [
        Workload::A,
        Workload::B,
        Workload::C,
        Workload::D,
        Workload::E,
    ];

    pub fn label(&self) -> char {
        match self {
            Workload::A => 'A',
            Workload::B => 'B',
            Workload::C => 'C',
            Workload::D => 'D',
            Workload::E => 'E',
        }
    }

    /// Run the workload once; every block it allocates is released before returning
    pub fn run<A, R>(self, heap: &mut A, rng: &mut R) -> MemoryResult<()>
    where
        A: Allocator + ?Sized,
        R: Rng,
    {
        match self {
            Workload::A => workload_a(heap),
            Workload::B => workload_b(heap),
            Workload::C => workload_c(heap, rng),
            Workload::D => workload_d(heap),
            Workload::E => workload_e(heap),
        }
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Workload_{}", self.label())
    }
}

/// Allocate a block the workload hands back later
fn take<A: Allocator + ?Sized>(heap: &mut A, size: Size) -> MemoryResult<*const u8> {
    Ok(heap
        .allocate(size)?
        .map_or(ptr::null(), |block| block.as_ptr().cast_const()))
}

fn workload_a<A: Allocator + ?Sized>(heap: &mut A) -> MemoryResult<()> {
    for _ in 0..SMALL_OPS {
        let block = take(heap, 1)?;
        heap.release(block)?;
    }
    Ok(())
}

fn workload_b<A: Allocator + ?Sized>(heap: &mut A) -> MemoryResult<()> {
    let mut blocks = Vec::with_capacity(SMALL_OPS);
    for _ in 0..SMALL_OPS {
        blocks.push(take(heap, 1)?);
    }
    for block in blocks {
        heap.release(block)?;
    }
    Ok(())
}

/// A draw below 50 (out of 1..=100) allocates, anything else releases the
/// newest live block. Falls back to the other action when one is impossible.
fn workload_c<A, R>(heap: &mut A, rng: &mut R) -> MemoryResult<()>
where
    A: Allocator + ?Sized,
    R: Rng,
{
    let max_allocations = RANDOM_STEPS / 2;
    let mut live: Vec<*const u8> = Vec::with_capacity(max_allocations);
    let mut allocations = 0;

    for _ in 0..RANDOM_STEPS {
        let can_allocate = allocations < max_allocations;
        let wants_allocate = rng.gen_range(1..=100) < 50;

        if (wants_allocate && can_allocate) || (live.is_empty() && can_allocate) {
            live.push(take(heap, 1)?);
            allocations += 1;
        } else if let Some(block) = live.pop() {
            heap.release(block)?;
        }
    }

    while let Some(block) = live.pop() {
        heap.release(block)?;
    }
    Ok(())
}

fn workload_d<A: Allocator + ?Sized>(heap: &mut A) -> MemoryResult<()> {
    let capacity = heap.capacity();
    let large_size = (capacity / LARGE_CHUNKS).saturating_sub(HEADER_SIZE).max(1);
    let small_size = (capacity / SMALL_CHUNKS).saturating_sub(HEADER_SIZE).max(1);
    let per_large = SMALL_CHUNKS / LARGE_CHUNKS;

    let mut large = Vec::with_capacity(LARGE_CHUNKS);
    for _ in 0..LARGE_CHUNKS {
        large.push(take(heap, large_size)?);
    }

    let mut small = Vec::with_capacity(SMALL_CHUNKS);
    while let Some(block) = large.pop() {
        heap.release(block)?;
        for _ in 0..per_large {
            small.push(take(heap, small_size)?);
        }
    }

    for block in small {
        heap.release(block)?;
    }
    Ok(())
}

fn workload_e<A: Allocator + ?Sized>(heap: &mut A) -> MemoryResult<()> {
    let mut blocks = Vec::with_capacity(SMALL_OPS);
    for _ in 0..SMALL_OPS {
        blocks.push(take(heap, 1)?);
    }

    // Pairs (59, 60), (58, 61), ... (0, 119)
    let middle = SMALL_OPS / 2;
    for step in 0..middle {
        heap.release(blocks[middle - 1 - step])?;
        heap.release(blocks[middle + step])?;
    }

    // Only succeeds if every released block was merged back together
    let whole_arena = heap.capacity() - HEADER_SIZE;
    let whole = take(heap, whole_arena)?;
    heap.release(whole)
}
