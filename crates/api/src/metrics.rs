use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

pub struct Metrics {
    // Counters
    total_requests: AtomicUsize,
    successful_requests: AtomicUsize,
    failed_requests: AtomicUsize,
    gate_bypasses: AtomicUsize,
    failed_evaluations: AtomicUsize,

    // Timing (in microseconds)
    total_rank_time_us: AtomicU64,

    // Counts
    total_candidates_ranked: AtomicUsize,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            total_requests: AtomicUsize::new(0),
            successful_requests: AtomicUsize::new(0),
            failed_requests: AtomicUsize::new(0),
            gate_bypasses: AtomicUsize::new(0),
            failed_evaluations: AtomicUsize::new(0),
            total_rank_time_us: AtomicU64::new(0),
            total_candidates_ranked: AtomicUsize::new(0),
        })
    }

    pub fn record_failure(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_success(
        &self,
        duration: std::time::Duration,
        candidates: usize,
        failed_evaluations: usize,
        gate_bypassed: bool,
    ) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.successful_requests.fetch_add(1, Ordering::Relaxed);
        self.total_rank_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.total_candidates_ranked
            .fetch_add(candidates, Ordering::Relaxed);
        self.failed_evaluations
            .fetch_add(failed_evaluations, Ordering::Relaxed);
        if gate_bypassed {
            self.gate_bypasses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let total = self.total_requests.load(Ordering::Relaxed);
        let total_time_us = self.total_rank_time_us.load(Ordering::Relaxed) as f64;
        MetricsSnapshot {
            total_requests: total,
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            gate_bypasses: self.gate_bypasses.load(Ordering::Relaxed),
            failed_evaluations: self.failed_evaluations.load(Ordering::Relaxed),
            avg_rank_time_ms: if total > 0 {
                total_time_us / total as f64 / 1000.0
            } else {
                0.0
            },
            total_candidates_ranked: self.total_candidates_ranked.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub gate_bypasses: usize,
    pub failed_evaluations: usize,
    pub avg_rank_time_ms: f64,
    pub total_candidates_ranked: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn snapshot_reflects_recorded_requests() {
        let metrics = Metrics::new();
        metrics.record_success(Duration::from_millis(10), 5, 1, true);
        metrics.record_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_requests, 2);
        assert_eq!(snapshot.successful_requests, 1);
        assert_eq!(snapshot.failed_requests, 1);
        assert_eq!(snapshot.gate_bypasses, 1);
        assert_eq!(snapshot.failed_evaluations, 1);
        assert_eq!(snapshot.total_candidates_ranked, 5);
        assert!(snapshot.avg_rank_time_ms > 0.0);
    }
}
