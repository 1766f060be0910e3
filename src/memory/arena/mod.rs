/*!
 * Arena Allocator
 *
 * Fixed-size, single-buffer heap with an implicit free list.
 *
 * ## Layout
 *
 * Every block starts with a 2-byte in-band header (payload size and a free
 * flag) followed by its payload. Blocks tile the buffer with no gaps, so
 * walking `offset += HEADER_SIZE + size` from offset 0 visits every block in
 * address order and lands exactly on the capacity. There is no separate
 * free-list structure: adjacency in the buffer is the data structure.
 *
 * ## Operations
 *
 * - **Allocate**: first-fit scan in address order, splitting off a trailing
 *   free block when the slack can hold a header plus at least one byte
 * - **Release**: validates the pointer (null, range, block start, double
 *   free) before trusting it, then runs a single coalescing sweep
 * - **Corruption**: a header that would walk past the boundary is reported
 *   as `CorruptionDetected`, distinct from every caller error
 *
 * The arena performs no locking; see `memory::global` for the serialized
 * process-wide heap.
 */

mod allocator;
mod coalesce;
mod header;
mod stats;
mod storage;
mod walk;

pub use walk::Blocks;

use crate::core::limits::{HEADER_SIZE, HEAP_SIZE, MAX_ARENA_SIZE};
use crate::core::types::{Address, Offset, Size};
use header::BlockHeader;
use log::info;
use std::ptr::{self, NonNull};

use super::types::{MemoryPressure, MemoryResult};
use super::Allocator;

/// Lifetime counters, kept outside the arena bytes
#[derive(Debug, Clone, Copy, Default)]
struct ArenaCounters {
    allocations: u64,
    releases: u64,
    failures: u64,
}

/// Fixed-capacity heap arena
///
/// `N` is the total capacity in bytes, headers included.
pub struct Arena<const N: usize = HEAP_SIZE> {
    base: NonNull<u8>,
    initialized: bool,
    // Payload bytes of allocated blocks and number of headers in the chain
    in_use: Size,
    block_count: usize,
    pressure: MemoryPressure,
    counters: ArenaCounters,
}

// The arena exclusively owns its buffer; the raw base pointer is never shared
// outside of `&mut self` mutation.
unsafe impl<const N: usize> Send for Arena<N> {}

impl<const N: usize> Arena<N> {
    /// Create a zeroed arena
    ///
    /// The block chain is laid down lazily by the first non-zero allocation.
    pub fn new() -> Self {
        const {
            assert!(N > HEADER_SIZE, "arena must hold at least one header");
            assert!(N <= MAX_ARENA_SIZE, "arena too large for 15-bit block sizes");
        }

        let buffer: Box<[u8]> = vec![0u8; N].into_boxed_slice();
        let base = NonNull::from(Box::leak(buffer)).cast::<u8>();

        Self {
            base,
            initialized: false,
            in_use: 0,
            block_count: 0,
            pressure: MemoryPressure::Low,
            counters: ArenaCounters::default(),
        }
    }

    /// Total capacity in bytes, headers included
    pub const fn capacity(&self) -> Size {
        N
    }

    /// Whether the first allocation has laid down the block chain
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Address of the first arena byte
    pub fn start(&self) -> Address {
        self.base.as_ptr() as Address
    }

    /// Check if an address falls inside `[start, start + capacity)`
    pub fn contains(&self, address: Address) -> bool {
        address >= self.start() && address - self.start() < N
    }

    /// Offset of a payload pointer from the arena start
    pub fn offset_of(&self, ptr: *const u8) -> Option<Offset> {
        let address = ptr as Address;
        self.contains(address).then(|| address - self.start())
    }

    /// Copy of the raw arena bytes, headers included
    pub fn snapshot(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; N];
        // SAFETY: the buffer is N bytes long and does not overlap the new Vec
        unsafe { ptr::copy_nonoverlapping(self.base.as_ptr(), bytes.as_mut_ptr(), N) };
        bytes
    }

    fn initialize(&mut self) {
        self.write_header(0, BlockHeader::free(N - HEADER_SIZE));
        self.initialized = true;
        self.block_count = 1;
        info!(
            "Arena initialized: {} bytes, one free block of {} bytes",
            N,
            N - HEADER_SIZE
        );
    }

    #[inline]
    fn read_header(&self, offset: Offset) -> BlockHeader {
        debug_assert!(offset + HEADER_SIZE <= N);
        // SAFETY: callers only pass offsets whose header fits inside the buffer;
        // [u8; 2] has alignment 1
        let bytes = unsafe {
            ptr::read(self.base.as_ptr().add(offset).cast::<[u8; HEADER_SIZE]>())
        };
        BlockHeader::decode(bytes)
    }

    #[inline]
    fn write_header(&mut self, offset: Offset, header: BlockHeader) {
        debug_assert!(offset + HEADER_SIZE <= N);
        // SAFETY: same bounds as read_header, and we hold &mut self
        unsafe {
            ptr::write(
                self.base.as_ptr().add(offset).cast::<[u8; HEADER_SIZE]>(),
                header.encode(),
            )
        };
    }

    fn payload_ptr(&self, header_offset: Offset) -> NonNull<u8> {
        debug_assert!(header_offset + HEADER_SIZE < N);
        // SAFETY: the payload of an allocated block lies inside the buffer, and
        // an offset into a non-null allocation is non-null
        unsafe { NonNull::new_unchecked(self.base.as_ptr().add(header_offset + HEADER_SIZE)) }
    }
}

impl<const N: usize> Default for Arena<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Drop for Arena<N> {
    fn drop(&mut self) {
        // SAFETY: base came from Box::leak of an N-byte boxed slice in new()
        unsafe {
            drop(Box::from_raw(ptr::slice_from_raw_parts_mut(
                self.base.as_ptr(),
                N,
            )));
        }
    }
}

impl<const N: usize> std::fmt::Debug for Arena<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("capacity", &N)
            .field("initialized", &self.initialized)
            .field("in_use", &self.in_use)
            .field("block_count", &self.block_count)
            .finish()
    }
}

// Implement trait interfaces
impl<const N: usize> Allocator for Arena<N> {
    fn allocate(&mut self, size: Size) -> MemoryResult<Option<NonNull<u8>>> {
        Arena::allocate(self, size)
    }

    fn release(&mut self, ptr: *const u8) -> MemoryResult<()> {
        Arena::release(self, ptr)
    }

    fn is_valid(&self, ptr: *const u8) -> bool {
        Arena::is_valid(self, ptr)
    }

    fn block_size(&self, ptr: *const u8) -> Option<Size> {
        Arena::block_size(self, ptr)
    }

    fn capacity(&self) -> Size {
        N
    }
}
