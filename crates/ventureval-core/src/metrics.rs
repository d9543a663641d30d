//! Global atomic counters for pipeline observability.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. at the end of a CLI invocation).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters. No allocation or locking.
pub struct Metrics {
    tasks_executed: AtomicU64,
    tasks_failed: AtomicU64,
    pipelines_completed: AtomicU64,
    reports_built: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            tasks_executed: AtomicU64::new(0),
            tasks_failed: AtomicU64::new(0),
            pipelines_completed: AtomicU64::new(0),
            reports_built: AtomicU64::new(0),
        }
    }

    /// Record one evaluator invocation and whether it failed.
    pub fn record_task(&self, failed: bool) {
        self.tasks_executed.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.tasks_failed.fetch_add(1, Ordering::Relaxed);
        }
        tracing::trace!(metric = "tasks_executed", failed, "counter incremented");
    }

    pub fn inc_pipelines(&self) {
        self.pipelines_completed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "pipelines_completed", "counter incremented");
    }

    pub fn inc_reports(&self) {
        self.reports_built.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "reports_built", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            tasks_executed = self.tasks_executed(),
            tasks_failed = self.tasks_failed(),
            pipelines_completed = self.pipelines_completed(),
            reports_built = self.reports_built(),
        );
    }

    pub fn tasks_executed(&self) -> u64 {
        self.tasks_executed.load(Ordering::Relaxed)
    }

    pub fn tasks_failed(&self) -> u64 {
        self.tasks_failed.load(Ordering::Relaxed)
    }

    pub fn pipelines_completed(&self) -> u64 {
        self.pipelines_completed.load(Ordering::Relaxed)
    }

    pub fn reports_built(&self) -> u64 {
        self.reports_built.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.tasks_executed.store(0, Ordering::Relaxed);
        self.tasks_failed.store(0, Ordering::Relaxed);
        self.pipelines_completed.store(0, Ordering::Relaxed);
        self.reports_built.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment() {
        let m = Metrics::new();
        m.record_task(false);
        m.record_task(true);
        m.record_task(false);
        assert_eq!(m.tasks_executed(), 3);
        assert_eq!(m.tasks_failed(), 1);

        m.inc_pipelines();
        assert_eq!(m.pipelines_completed(), 1);

        m.inc_reports();
        m.inc_reports();
        assert_eq!(m.reports_built(), 2);
    }

    #[test]
    fn reset_zeroes_all() {
        let m = Metrics::new();
        m.record_task(true);
        m.inc_pipelines();
        m.inc_reports();
        m.reset();
        assert_eq!(m.tasks_executed(), 0);
        assert_eq!(m.tasks_failed(), 0);
        assert_eq!(m.pipelines_completed(), 0);
        assert_eq!(m.reports_built(), 0);
    }
}
