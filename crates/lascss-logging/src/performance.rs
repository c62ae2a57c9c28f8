// ABOUTME: Timing spans for catalog loads and completion requests
// ABOUTME: PerfTimer warns on slow operations; PerfStats totals completions per session

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{Level, Span, field, span, warn};

/// Create a performance monitoring span for timing operations
#[macro_export]
macro_rules! perf_span {
    ($name:expr) => {
        $crate::span!($crate::Level::DEBUG, "perf", operation = $name, elapsed_ms = $crate::field::Empty)
    };
    ($name:expr, $($field:tt)*) => {
        $crate::span!($crate::Level::DEBUG, "perf", operation = $name, elapsed_ms = $crate::field::Empty, $($field)*)
    };
}

/// Timer guard that records elapsed time when dropped
pub struct PerfTimer {
    span: Span,
    start: Instant,
    operation: String,
    warn_threshold: Option<Duration>,
}

impl PerfTimer {
    pub fn new(operation: &str) -> Self {
        let span =
            span!(Level::DEBUG, "perf_timer", operation = %operation, elapsed_ms = field::Empty);

        Self {
            span,
            start: Instant::now(),
            operation: operation.to_string(),
            warn_threshold: None,
        }
    }

    /// Operations taking longer than this will log a warning
    pub fn with_warn_threshold(mut self, threshold: Duration) -> Self {
        self.warn_threshold = Some(threshold);
        self
    }

    #[cfg(test)]
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for PerfTimer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        #[allow(clippy::cast_precision_loss)]
        let elapsed_ms = elapsed.as_millis() as f64;

        self.span.record("elapsed_ms", elapsed_ms);

        if let Some(threshold) = self.warn_threshold {
            if elapsed > threshold {
                #[allow(clippy::cast_precision_loss)]
                let threshold_ms = threshold.as_millis() as f64;
                warn!(
                    operation = %self.operation,
                    elapsed_ms = elapsed_ms,
                    threshold_ms = threshold_ms,
                    "Slow operation detected"
                );
            }
        }
    }
}

/// Performance statistics aggregator
#[derive(Debug, Default)]
pub struct PerfStats {
    operation_counts: HashMap<String, u64>,
    total_time: HashMap<String, Duration>,
}

impl PerfStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_operation(&mut self, operation: &str, duration: Duration) {
        *self
            .operation_counts
            .entry(operation.to_string())
            .or_insert(0) += 1;
        *self
            .total_time
            .entry(operation.to_string())
            .or_insert(Duration::ZERO) += duration;
    }

    /// Returns (count, total, average) for an operation
    pub fn get_stats(&self, operation: &str) -> Option<(u64, Duration, Duration)> {
        let count = *self.operation_counts.get(operation)?;
        let total = *self.total_time.get(operation)?;
        let average = total / u32::try_from(count).unwrap_or(u32::MAX);
        Some((count, total, average))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use tracing_mock::{expect, subscriber};

    #[test]
    fn test_perf_timer() {
        let timer = PerfTimer::new("generate_catalog");
        thread::sleep(Duration::from_millis(10));
        assert!(timer.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn test_perf_stats() {
        let mut stats = PerfStats::new();
        stats.record_operation("completion", Duration::from_millis(100));
        stats.record_operation("completion", Duration::from_millis(200));

        let (count, total, average) = stats.get_stats("completion").unwrap();
        assert_eq!(count, 2);
        assert_eq!(total, Duration::from_millis(300));
        assert_eq!(average, Duration::from_millis(150));
        assert!(stats.get_stats("hover").is_none());
    }

    #[test]
    fn test_perf_timer_span_creation() {
        let (subscriber, handle) = subscriber::mock()
            .new_span(expect::span().named("perf_timer"))
            .drop_span(expect::span().named("perf_timer"))
            .only()
            .run_with_handle();

        tracing::subscriber::with_default(subscriber, || {
            let timer = PerfTimer::new("load_catalog");
            drop(timer);
        });

        handle.assert_finished();
    }

    #[test]
    fn test_perf_timer_with_warn_threshold() {
        let (subscriber, handle) = subscriber::mock()
            .new_span(expect::span().named("perf_timer"))
            .event(expect::event().with_fields(expect::msg("Slow operation detected")))
            .drop_span(expect::span().named("perf_timer"))
            .only()
            .run_with_handle();

        tracing::subscriber::with_default(subscriber, || {
            let timer =
                PerfTimer::new("slow_generation").with_warn_threshold(Duration::from_millis(1));
            thread::sleep(Duration::from_millis(10));
            drop(timer);
        });

        handle.assert_finished();
    }

    #[test]
    fn test_perf_span_macro_with_fields() {
        let (subscriber, handle) = subscriber::mock()
            .new_span(
                expect::span().named("perf").with_fields(
                    expect::field("operation")
                        .with_value(&"completion")
                        .and(expect::field("items").with_value(&42)),
                ),
            )
            .only()
            .run_with_handle();

        tracing::subscriber::with_default(subscriber, || {
            let _span = perf_span!("completion", items = 42);
        });

        handle.assert_finished();
    }
}
