/*!
 * Allocator Diagnostics
 * Classified failures tagged with the caller's source location
 */

use super::types::MemoryError;
use log::{error, warn};
use parking_lot::RwLock;
use std::fmt;
use std::panic::Location;
use std::sync::{Arc, LazyLock};

/// A failed allocator call and where it was made from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub error: MemoryError,
    pub file: &'static str,
    pub line: u32,
}

impl Diagnostic {
    pub fn new(error: MemoryError, location: &'static Location<'static>) -> Self {
        Self {
            error,
            file: location.file(),
            line: location.line(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.error.is_fatal()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "::[File: {} : Line: {}] Error: {}",
            self.file, self.line, self.error
        )
    }
}

/// Destination for allocator diagnostics
///
/// The sink runs without any crate lock held, so it may replace the
/// process-wide sink or trigger further reports.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: &Diagnostic);
}

/// Default sink: forwards diagnostics to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, diagnostic: &Diagnostic) {
        if diagnostic.is_fatal() {
            error!("{}", diagnostic);
        } else {
            warn!("{}", diagnostic);
        }
    }
}

static SINK: LazyLock<RwLock<Arc<dyn DiagnosticSink>>> =
    LazyLock::new(|| RwLock::new(Arc::new(LogSink)));

/// Replace the process-wide diagnostic sink, returning the previous one
pub fn set_diagnostic_sink(sink: Arc<dyn DiagnosticSink>) -> Arc<dyn DiagnosticSink> {
    std::mem::replace(&mut *SINK.write(), sink)
}

/// Route a diagnostic to the current sink
///
/// Fatal diagnostics panic after they have been reported.
pub(crate) fn report(diagnostic: Diagnostic) {
    let sink = SINK.read().clone();
    sink.report(&diagnostic);
    if diagnostic.is_fatal() {
        panic!("{}", diagnostic);
    }
}
