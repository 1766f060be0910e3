/*!
 * Arena Tests
 * Allocation, release validation, coalescing, and corruption handling
 */

use arena_heap::memory::{Arena, BlockInfo, FreeFault, MemoryError};
use arena_heap::{HEADER_SIZE, HEAP_SIZE};
use pretty_assertions::assert_eq;
use std::ptr;

fn offset_of(arena: &Arena, ptr: *const u8) -> usize {
    arena.offset_of(ptr).unwrap()
}

#[test]
fn test_first_allocation_lands_after_first_header() {
    let mut arena: Arena = Arena::new();
    let ptr = arena.allocate(100).unwrap().unwrap();

    assert_eq!(offset_of(&arena, ptr.as_ptr()), HEADER_SIZE);
    assert_eq!(arena.block_size(ptr.as_ptr()), Some(100));
    assert_eq!(
        arena.layout().unwrap(),
        vec![
            BlockInfo { offset: 0, size: 100, free: false },
            BlockInfo { offset: 102, size: HEAP_SIZE - 104, free: true },
        ]
    );
}

#[test]
fn test_release_merges_neighbours() {
    let mut arena: Arena = Arena::new();
    let a = arena.allocate(100).unwrap().unwrap();
    let b = arena.allocate(100).unwrap().unwrap();
    let c = arena.allocate(100).unwrap().unwrap();

    let headers: Vec<usize> = arena.blocks().map(|block| block.unwrap().offset).collect();
    assert_eq!(headers, vec![0, 102, 204, 306]);

    arena.release(b.as_ptr()).unwrap();
    arena.release(a.as_ptr()).unwrap();
    assert_eq!(
        arena.layout().unwrap(),
        vec![
            BlockInfo { offset: 0, size: 202, free: true },
            BlockInfo { offset: 204, size: 100, free: false },
            BlockInfo { offset: 306, size: HEAP_SIZE - 308, free: true },
        ]
    );

    arena.release(c.as_ptr()).unwrap();
    assert_eq!(
        arena.layout().unwrap(),
        vec![BlockInfo { offset: 0, size: HEAP_SIZE - HEADER_SIZE, free: true }]
    );
}

#[test]
fn test_first_fit_reuses_lowest_hole() {
    let mut arena: Arena = Arena::new();
    let a = arena.allocate(50).unwrap().unwrap();
    let _b = arena.allocate(50).unwrap().unwrap();
    arena.release(a.as_ptr()).unwrap();

    let again = arena.allocate(20).unwrap().unwrap();
    assert_eq!(again, a);
    // 30 bytes of slack: split into a 28-byte free block
    assert_eq!(
        arena.layout().unwrap()[1],
        BlockInfo { offset: 22, size: 28, free: true }
    );
}

#[test]
fn test_release_then_allocate_returns_same_block() {
    let mut arena: Arena = Arena::new();
    let _before = arena.allocate(24).unwrap().unwrap();
    let p = arena.allocate(40).unwrap().unwrap();
    let _after = arena.allocate(24).unwrap().unwrap();

    arena.release(p.as_ptr()).unwrap();
    let q = arena.allocate(40).unwrap().unwrap();
    assert_eq!(offset_of(&arena, q.as_ptr()), offset_of(&arena, p.as_ptr()));
}

#[test]
fn test_whole_arena_round_trip() {
    let mut arena: Arena = Arena::new();
    let whole = arena.allocate(HEAP_SIZE - HEADER_SIZE).unwrap().unwrap();
    assert_eq!(arena.info(), (HEAP_SIZE, HEAP_SIZE - HEADER_SIZE, 0));

    assert_eq!(
        arena.allocate(1),
        Err(MemoryError::OutOfMemory {
            requested: 1,
            largest_free: 0,
            capacity: HEAP_SIZE
        })
    );

    arena.release(whole.as_ptr()).unwrap();
    assert_eq!(arena.stats().unwrap().largest_free_block, HEAP_SIZE - HEADER_SIZE);
}

#[test]
fn test_request_larger_than_arena() {
    let mut arena: Arena = Arena::new();
    let err = arena.allocate(HEAP_SIZE).unwrap_err();
    assert!(matches!(err, MemoryError::OutOfMemory { requested, .. } if requested == HEAP_SIZE));
    assert_eq!(arena.stats().unwrap().failures, 1);
}

#[test]
fn test_zero_size_leaves_bytes_identical() {
    let mut arena: Arena = Arena::new();
    arena.allocate(10).unwrap();
    let before = arena.snapshot();

    assert_eq!(arena.allocate(0), Ok(None));
    assert_eq!(arena.snapshot(), before);
}

#[test]
fn test_double_free_is_rejected() {
    let mut arena: Arena = Arena::new();
    let a = arena.allocate(8).unwrap().unwrap();
    let _keep = arena.allocate(8).unwrap().unwrap();
    arena.release(a.as_ptr()).unwrap();
    let before = arena.snapshot();

    let err = arena.release(a.as_ptr()).unwrap_err();
    assert_eq!(err.free_fault(), Some(FreeFault::DoubleFree));
    assert_eq!(arena.snapshot(), before);
}

#[test]
fn test_double_free_of_merged_block_is_foreign() {
    let mut arena: Arena = Arena::new();
    let a = arena.allocate(100).unwrap().unwrap();
    let b = arena.allocate(100).unwrap().unwrap();
    let _c = arena.allocate(100).unwrap().unwrap();

    arena.release(a.as_ptr()).unwrap();
    arena.release(b.as_ptr()).unwrap();
    let before = arena.snapshot();

    // B's header was absorbed into the free block at offset 0
    assert_eq!(
        arena.release(b.as_ptr()),
        Err(MemoryError::InvalidFree(FreeFault::ForeignPointer))
    );
    assert_eq!(arena.snapshot(), before);
    assert_eq!(
        arena.layout().unwrap()[0],
        BlockInfo { offset: 0, size: 202, free: true }
    );
}

#[test]
fn test_interior_pointer_is_rejected() {
    let mut arena: Arena = Arena::new();
    let a = arena.allocate(16).unwrap().unwrap();
    let before = arena.snapshot();

    let interior = a.as_ptr().wrapping_add(4).cast_const();
    assert_eq!(
        arena.release(interior),
        Err(MemoryError::InvalidFree(FreeFault::ForeignPointer))
    );
    assert_eq!(arena.snapshot(), before);
    assert!(arena.is_valid(a.as_ptr()));
}

#[test]
fn test_pointer_outside_arena_is_rejected() {
    let mut arena: Arena = Arena::new();
    arena.allocate(16).unwrap();
    let outside = [0u8; 4];

    assert_eq!(
        arena.release(outside.as_ptr()),
        Err(MemoryError::InvalidFree(FreeFault::OutOfRange))
    );
    let end = (arena.start() + HEAP_SIZE) as *const u8;
    assert_eq!(
        arena.release(end),
        Err(MemoryError::InvalidFree(FreeFault::OutOfRange))
    );
}

#[test]
fn test_null_is_rejected() {
    let mut arena: Arena = Arena::new();
    assert_eq!(
        arena.release(ptr::null()),
        Err(MemoryError::InvalidFree(FreeFault::Null))
    );
}

#[test]
fn test_exhaustion_with_one_byte_blocks() {
    let mut arena: Arena<64> = Arena::new();
    let mut blocks = Vec::new();
    while let Ok(Some(block)) = arena.allocate(1) {
        blocks.push(block);
    }

    // 3 bytes per block; the last one absorbs what is left
    assert_eq!(blocks.len(), 21);
    assert_eq!(arena.block_size(blocks[20].as_ptr()), Some(2));
    arena.check().unwrap();

    for block in blocks.into_iter().rev() {
        arena.release(block.as_ptr()).unwrap();
    }
    assert_eq!(arena.blocks().count(), 1);
}

#[test]
fn test_payload_round_trip() {
    let mut arena: Arena = Arena::new();
    let a = arena.allocate(8).unwrap().unwrap();
    let b = arena.allocate(8).unwrap().unwrap();

    arena.write_bytes(a.as_ptr(), 0, b"arena!!!").unwrap();
    arena.write_bytes(b.as_ptr(), 2, b"hi").unwrap();

    assert_eq!(arena.read_bytes(a.as_ptr(), 0, 8).unwrap(), b"arena!!!");
    assert_eq!(arena.read_bytes(b.as_ptr(), 2, 2).unwrap(), b"hi");
    arena.check().unwrap();

    assert!(matches!(
        arena.write_bytes(a.as_ptr(), 4, b"overflow"),
        Err(MemoryError::AccessOutOfBounds { .. })
    ));
}

#[test]
fn test_overwritten_header_is_corruption() {
    let mut arena: Arena = Arena::new();
    let a = arena.allocate(16).unwrap().unwrap();
    let b = arena.allocate(16).unwrap().unwrap();

    // Claim the maximum size for the first block
    unsafe {
        let header = a.as_ptr().sub(HEADER_SIZE);
        ptr::write(header, 0xff);
        ptr::write(header.add(1), 0x7f);
    }

    let err = arena.release(b.as_ptr()).unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(err, MemoryError::CorruptionDetected { offset: 0, .. }));
    assert!(arena.check().is_err());
    assert!(arena.stats().is_err());
    assert!(arena.allocate(1).unwrap_err().is_fatal());
}
