/*!
 * Process-Wide Heap
 *
 * A single `HEAP_SIZE` arena shared by the whole process. Every call takes
 * one mutex around the entire arena, so allocate and release are serialized.
 *
 * `malloc` and `free` are the reporting facade: failures are classified by
 * the arena and routed, together with the caller's file and line, to the
 * diagnostic sink. Caller errors come back as `None` or are dropped after
 * reporting; corruption is reported and then panics.
 */

use super::arena::Arena;
use super::diagnostics::{self, Diagnostic};
use super::traits::{Allocator, MemoryInfo};
use super::types::{MemoryPressure, MemoryResult, MemoryStats};
use crate::core::limits::HEAP_SIZE;
use crate::core::types::Size;
use log::info;
use parking_lot::Mutex;
use std::panic::Location;
use std::ptr::NonNull;
use std::sync::LazyLock;

static HEAP: LazyLock<Mutex<Arena>> = LazyLock::new(|| {
    info!("Process heap created with {} bytes", HEAP_SIZE);
    Mutex::new(Arena::new())
});

/// Allocate from the process-wide heap
///
/// Returns `None` for zero-byte requests and, after reporting a diagnostic,
/// when the heap is out of memory.
#[track_caller]
pub fn malloc(size: Size) -> Option<NonNull<u8>> {
    let result = HEAP.lock().allocate(size);
    match result {
        Ok(ptr) => ptr,
        Err(error) => {
            diagnostics::report(Diagnostic::new(error, Location::caller()));
            None
        }
    }
}

/// Release a pointer to the process-wide heap
///
/// Invalid pointers are reported and otherwise ignored.
#[track_caller]
pub fn free(ptr: *const u8) {
    let result = HEAP.lock().release(ptr);
    if let Err(error) = result {
        diagnostics::report(Diagnostic::new(error, Location::caller()));
    }
}

/// Run `f` with exclusive access to the process-wide arena
pub fn with_heap<R>(f: impl FnOnce(&mut Arena) -> R) -> R {
    f(&mut HEAP.lock())
}

/// Handle to the process-wide heap that returns errors instead of reporting them
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalHeap;

impl Allocator for GlobalHeap {
    fn allocate(&mut self, size: Size) -> MemoryResult<Option<NonNull<u8>>> {
        HEAP.lock().allocate(size)
    }

    fn release(&mut self, ptr: *const u8) -> MemoryResult<()> {
        HEAP.lock().release(ptr)
    }

    fn is_valid(&self, ptr: *const u8) -> bool {
        HEAP.lock().is_valid(ptr)
    }

    fn block_size(&self, ptr: *const u8) -> Option<Size> {
        HEAP.lock().block_size(ptr)
    }

    fn capacity(&self) -> Size {
        HEAP_SIZE
    }
}

impl MemoryInfo for GlobalHeap {
    fn stats(&self) -> MemoryResult<MemoryStats> {
        HEAP.lock().stats()
    }

    fn info(&self) -> (Size, Size, Size) {
        HEAP.lock().info()
    }

    fn pressure(&self) -> MemoryPressure {
        MemoryInfo::pressure(&*HEAP.lock())
    }
}
