/*!
 * Structured Tracing
 * Subscriber setup and timed spans using the tracing crate
 *
 * Features:
 * - `RUST_LOG` filtering with an `info` default
 * - JSON-formatted output for structured parsing
 * - `log` records from the allocator bridged into the same subscriber
 * - Per-run spans carrying elapsed time and outcome
 */

use crate::grind::Workload;
use crate::memory::MemoryResult;
use std::time::{Duration, Instant};
use tracing::{debug, info, span, warn, Level, Span};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Runs slower than this are reported at warn level
const SLOW_RUN: Duration = Duration::from_millis(10);

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - MEMGRIND_TRACE_JSON: Enable JSON output (default: false)
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("MEMGRIND_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .init();
        info!("Structured tracing initialized with JSON output");
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .compact(),
            )
            .init();
        info!("Structured tracing initialized");
    }
}

/// Span for one timed workload run
pub struct WorkloadSpan {
    span: Span,
    start: Instant,
    workload: Workload,
    round: usize,
}

impl WorkloadSpan {
    pub fn start(workload: Workload, round: usize) -> Self {
        let span = span!(
            Level::DEBUG,
            "workload",
            workload = %workload,
            round = round,
            duration_us = tracing::field::Empty,
            result = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            workload,
            round,
        }
    }

    /// Enter the span context
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }

    /// Close the run, recording its outcome, and return the elapsed time
    pub fn finish(self, result: &MemoryResult<()>) -> Duration {
        let elapsed = self.start.elapsed();
        let _entered = self.span.enter();

        self.span.record("duration_us", elapsed.as_micros() as u64);
        match result {
            Ok(()) => self.span.record("result", "success"),
            Err(e) => self.span.record("result", tracing::field::display(e)),
        };

        if elapsed > SLOW_RUN {
            warn!(
                workload = %self.workload,
                round = self.round,
                duration_ms = elapsed.as_millis() as u64,
                slow = true,
                "slow workload run"
            );
        } else {
            debug!(
                workload = %self.workload,
                round = self.round,
                duration_us = elapsed.as_micros() as u64,
                "workload run completed"
            );
        }

        elapsed
    }
}
