use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use autofill::AutofillError;

pub struct Metrics {
    // Counters
    total_requests: AtomicUsize,
    successful_requests: AtomicUsize,
    failed_requests: AtomicUsize,

    // Failures by kind
    configuration_errors: AtomicUsize,
    format_errors: AtomicUsize,
    internal_errors: AtomicUsize,

    // Timing (in microseconds)
    total_autofill_time_us: AtomicU64,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            total_requests: AtomicUsize::new(0),
            successful_requests: AtomicUsize::new(0),
            failed_requests: AtomicUsize::new(0),
            configuration_errors: AtomicUsize::new(0),
            format_errors: AtomicUsize::new(0),
            internal_errors: AtomicUsize::new(0),
            total_autofill_time_us: AtomicU64::new(0),
        })
    }

    pub fn record_autofill(&self, duration: Duration, error: Option<&AutofillError>) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_autofill_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);

        let Some(error) = error else {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
            return;
        };

        self.failed_requests.fetch_add(1, Ordering::Relaxed);
        let counter = match error {
            AutofillError::Configuration(_) => &self.configuration_errors,
            AutofillError::ResponseFormat => &self.format_errors,
            AutofillError::Internal(_) => &self.internal_errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let total_us = self.total_autofill_time_us.load(Ordering::Relaxed) as f64;

        MetricsSnapshot {
            total_requests,
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            configuration_errors: self.configuration_errors.load(Ordering::Relaxed),
            format_errors: self.format_errors.load(Ordering::Relaxed),
            internal_errors: self.internal_errors.load(Ordering::Relaxed),
            avg_autofill_time_ms: if total_requests > 0 {
                total_us / total_requests as f64 / 1000.0 // Convert to ms
            } else {
                0.0
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub configuration_errors: usize,
    pub format_errors: usize,
    pub internal_errors: usize,
    pub avg_autofill_time_ms: f64,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
