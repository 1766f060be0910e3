/*!
 * Process-Wide Heap Tests
 * malloc/free through the shared arena and caller-tagged diagnostics
 */

use arena_heap::memory::{
    free, malloc, set_diagnostic_sink, with_heap, Allocator, Diagnostic, DiagnosticSink,
    FreeFault, GlobalHeap, MemoryError, MemoryInfo,
};
use arena_heap::{HEADER_SIZE, HEAP_SIZE};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::ptr;
use std::sync::Arc;

#[derive(Clone, Default)]
struct RecordingSink {
    seen: Arc<Mutex<Vec<Diagnostic>>>,
}

impl DiagnosticSink for RecordingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        self.seen.lock().push(diagnostic.clone());
    }
}

/// Install a recording sink for the duration of `f` and return what it saw
fn record(f: impl FnOnce()) -> Vec<Diagnostic> {
    let sink = RecordingSink::default();
    let previous = set_diagnostic_sink(Arc::new(sink.clone()));
    f();
    set_diagnostic_sink(previous);
    let seen = sink.seen.lock().clone();
    seen
}

fn assert_heap_empty() {
    let stats = GlobalHeap.stats().unwrap();
    assert_eq!(stats.allocated_blocks, 0);
    assert_eq!(stats.largest_free_block, HEAP_SIZE - HEADER_SIZE);
}

#[test]
#[serial]
fn test_malloc_free_round_trip() {
    let a = malloc(32).unwrap();
    let b = malloc(64).unwrap();
    assert_ne!(a, b);
    assert!(GlobalHeap.is_valid(a.as_ptr()));
    assert_eq!(GlobalHeap.block_size(b.as_ptr()), Some(64));

    free(b.as_ptr());
    free(a.as_ptr());
    assert_heap_empty();
}

#[test]
#[serial]
fn test_malloc_zero_is_none_and_silent() {
    let seen = record(|| assert!(malloc(0).is_none()));
    assert!(seen.is_empty());
}

#[test]
#[serial]
fn test_double_free_reports_call_site() {
    let a = malloc(8).unwrap();
    free(a.as_ptr());

    let seen = record(|| free(a.as_ptr()));
    let line = line!() - 1;

    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].error, MemoryError::InvalidFree(FreeFault::DoubleFree));
    assert_eq!(seen[0].file, file!());
    assert_eq!(seen[0].line, line);
    assert_eq!(
        seen[0].to_string(),
        format!("::[File: {} : Line: {}] Error: Invalid free: double free", file!(), line)
    );
    assert_heap_empty();
}

#[test]
#[serial]
fn test_invalid_frees_are_classified() {
    let a = malloc(16).unwrap();
    let outside = [0u8; 1];

    let seen = record(|| {
        free(ptr::null());
        free(outside.as_ptr());
        free(a.as_ptr().wrapping_add(1));
    });

    let faults: Vec<_> = seen.iter().filter_map(|d| d.error.free_fault()).collect();
    assert_eq!(
        faults,
        vec![FreeFault::Null, FreeFault::OutOfRange, FreeFault::ForeignPointer]
    );
    assert!(GlobalHeap.is_valid(a.as_ptr()));

    free(a.as_ptr());
    assert_heap_empty();
}

#[test]
#[serial]
fn test_out_of_memory_reports_and_returns_none() {
    let whole = malloc(HEAP_SIZE - HEADER_SIZE).unwrap();

    let seen = record(|| assert!(malloc(1).is_none()));
    assert_eq!(seen.len(), 1);
    assert!(matches!(seen[0].error, MemoryError::OutOfMemory { requested: 1, .. }));

    free(whole.as_ptr());
    assert_heap_empty();
}

#[test]
#[serial]
fn test_with_heap_exposes_the_arena() {
    let a = malloc(10).unwrap();
    let offset = with_heap(|arena| {
        arena.check().unwrap();
        arena.offset_of(a.as_ptr()).unwrap()
    });
    assert!(offset >= HEADER_SIZE);
    assert!(offset < HEAP_SIZE);

    free(a.as_ptr());
    assert_heap_empty();
}

/// Hands the process-wide sink over to `next` on its first report
struct HandOffSink {
    next: Mutex<Option<Arc<dyn DiagnosticSink>>>,
}

impl DiagnosticSink for HandOffSink {
    fn report(&self, _diagnostic: &Diagnostic) {
        if let Some(next) = self.next.lock().take() {
            set_diagnostic_sink(next);
        }
    }
}

#[test]
#[serial]
fn test_sink_may_replace_itself_while_reporting() {
    let recorder = RecordingSink::default();
    let next: Arc<dyn DiagnosticSink> = Arc::new(recorder.clone());
    let hand_off = HandOffSink {
        next: Mutex::new(Some(next)),
    };
    let previous = set_diagnostic_sink(Arc::new(hand_off));

    free(ptr::null());
    free(ptr::null());
    set_diagnostic_sink(previous);

    let seen = recorder.seen.lock().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].error.free_fault(), Some(FreeFault::Null));
}
