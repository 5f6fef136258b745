use dashmap::DashMap;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Ring buffer capacity for latency samples
const RING_BUFFER_CAPACITY: usize = 3600;

/// Samples older than this are dropped by `cleanup_old_samples`
const MAX_SAMPLE_AGE: Duration = Duration::from_secs(15 * 60);

/// Per-route counters
#[derive(Debug, Default)]
pub struct RouteStats {
    pub request_count: AtomicU64,
    pub error_count: AtomicU64,
    pub total_latency_ms: AtomicU64,
}

impl RouteStats {
    fn record(&self, latency_ms: f64, is_error: bool) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms
            .fetch_add(latency_ms as u64, Ordering::Relaxed);
        if is_error {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn avg_latency_ms(&self) -> f64 {
        let count = self.request_count.load(Ordering::Relaxed);
        if count == 0 {
            return 0.0;
        }
        self.total_latency_ms.load(Ordering::Relaxed) as f64 / count as f64
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteSnapshot {
    pub requests: u64,
    pub errors: u64,
    pub avg_latency_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub active_requests: u64,
    pub total_requests: u64,
    pub total_errors: u64,
    pub error_rate_percent: f64,
    pub latency_ms: LatencySnapshot,
    pub errors_by_status: BTreeMap<u16, u64>,
    pub routes: BTreeMap<String, RouteSnapshot>,
    pub openai: OpenAiSnapshot,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LatencySnapshot {
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OpenAiSnapshot {
    pub calls: u64,
    pub failures: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// Counters for HTTP traffic and upstream completion calls
pub struct RequestMetrics {
    active_requests: AtomicU64,
    total_requests: AtomicU64,
    total_errors: AtomicU64,

    /// Error responses keyed by status code
    errors_by_status: DashMap<u16, AtomicU64>,

    /// (time, latency_ms) ring buffer
    latency_samples: Mutex<VecDeque<(Instant, f64)>>,

    /// Keyed by matched route template, e.g. `/api/health-chat/rooms/:room_id`
    per_route_stats: DashMap<String, RouteStats>,

    openai_calls: AtomicU64,
    openai_failures: AtomicU64,
    prompt_tokens: AtomicU64,
    completion_tokens: AtomicU64,
}

impl RequestMetrics {
    pub fn new() -> Self {
        Self {
            active_requests: AtomicU64::new(0),
            total_requests: AtomicU64::new(0),
            total_errors: AtomicU64::new(0),
            errors_by_status: DashMap::new(),
            latency_samples: Mutex::new(VecDeque::with_capacity(RING_BUFFER_CAPACITY)),
            per_route_stats: DashMap::new(),
            openai_calls: AtomicU64::new(0),
            openai_failures: AtomicU64::new(0),
            prompt_tokens: AtomicU64::new(0),
            completion_tokens: AtomicU64::new(0),
        }
    }

    pub fn record_request_start(&self) {
        self.active_requests.fetch_add(1, Ordering::Relaxed);
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a finished request; 4xx and 5xx count as errors
    pub fn record_request_end(&self, route: &str, status: u16, latency_ms: f64) {
        self.active_requests.fetch_sub(1, Ordering::Relaxed);

        let is_error = status >= 400;
        if is_error {
            self.total_errors.fetch_add(1, Ordering::Relaxed);
            self.errors_by_status
                .entry(status)
                .or_insert_with(|| AtomicU64::new(0))
                .fetch_add(1, Ordering::Relaxed);
        }

        if let Ok(mut samples) = self.latency_samples.lock() {
            if samples.len() >= RING_BUFFER_CAPACITY {
                samples.pop_front();
            }
            samples.push_back((Instant::now(), latency_ms));
        }

        self.per_route_stats
            .entry(route.to_string())
            .or_default()
            .record(latency_ms, is_error);
    }

    /// Record one upstream completion call
    pub fn record_openai_call(&self, success: bool, prompt_tokens: u64, completion_tokens: u64) {
        self.openai_calls.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.openai_failures.fetch_add(1, Ordering::Relaxed);
        }
        self.prompt_tokens.fetch_add(prompt_tokens, Ordering::Relaxed);
        self.completion_tokens
            .fetch_add(completion_tokens, Ordering::Relaxed);
    }

    pub fn active_requests(&self) -> u64 {
        self.active_requests.load(Ordering::Relaxed)
    }

    /// Latency percentiles (p50, p95, p99)
    pub fn latency_percentiles(&self) -> (f64, f64, f64) {
        let samples = match self.latency_samples.lock() {
            Ok(s) => s,
            Err(_) => return (0.0, 0.0, 0.0),
        };

        if samples.is_empty() {
            return (0.0, 0.0, 0.0);
        }

        let mut latencies: Vec<f64> = samples.iter().map(|(_, lat)| *lat).collect();
        latencies.sort_by(|a, b| a.total_cmp(b));

        let len = latencies.len();
        let at = |q: f64| latencies[((len as f64 * q) as usize).min(len - 1)];
        (at(0.50), at(0.95), at(0.99))
    }

    /// Errors as a percentage of all requests
    pub fn error_rate(&self) -> f64 {
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        if total_requests == 0 {
            return 0.0;
        }
        self.total_errors.load(Ordering::Relaxed) as f64 / total_requests as f64 * 100.0
    }

    pub fn cleanup_old_samples(&self) {
        let Some(cutoff) = Instant::now().checked_sub(MAX_SAMPLE_AGE) else {
            return;
        };
        if let Ok(mut samples) = self.latency_samples.lock() {
            samples.retain(|(time, _)| *time >= cutoff);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let (p50, p95, p99) = self.latency_percentiles();

        MetricsSnapshot {
            active_requests: self.active_requests(),
            total_requests: self.total_requests.load(Ordering::Relaxed),
            total_errors: self.total_errors.load(Ordering::Relaxed),
            error_rate_percent: self.error_rate(),
            latency_ms: LatencySnapshot { p50, p95, p99 },
            errors_by_status: self
                .errors_by_status
                .iter()
                .map(|e| (*e.key(), e.value().load(Ordering::Relaxed)))
                .collect(),
            routes: self
                .per_route_stats
                .iter()
                .map(|e| {
                    let stats = e.value();
                    (
                        e.key().clone(),
                        RouteSnapshot {
                            requests: stats.request_count.load(Ordering::Relaxed),
                            errors: stats.error_count.load(Ordering::Relaxed),
                            avg_latency_ms: stats.avg_latency_ms(),
                        },
                    )
                })
                .collect(),
            openai: OpenAiSnapshot {
                calls: self.openai_calls.load(Ordering::Relaxed),
                failures: self.openai_failures.load(Ordering::Relaxed),
                prompt_tokens: self.prompt_tokens.load(Ordering::Relaxed),
                completion_tokens: self.completion_tokens.load(Ordering::Relaxed),
            },
        }
    }
}

impl Default for RequestMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_metrics_are_empty() {
        let metrics = RequestMetrics::new();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.active_requests, 0);
        assert_eq!(snapshot.total_requests, 0);
        assert_eq!(snapshot.error_rate_percent, 0.0);
        assert!(snapshot.routes.is_empty());
    }

    #[test]
    fn test_request_lifecycle() {
        let metrics = RequestMetrics::new();

        metrics.record_request_start();
        assert_eq!(metrics.active_requests(), 1);

        metrics.record_request_end("/api/search/", 200, 12.0);
        assert_eq!(metrics.active_requests(), 0);

        let route = &metrics.snapshot().routes["/api/search/"];
        assert_eq!(route.requests, 1);
        assert_eq!(route.errors, 0);
    }

    #[test]
    fn test_errors_by_status() {
        let metrics = RequestMetrics::new();
        for status in [200, 404, 404, 500] {
            metrics.record_request_start();
            metrics.record_request_end("/x", status, 1.0);
        }

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_errors, 3);
        assert_eq!(snapshot.errors_by_status[&404], 2);
        assert_eq!(snapshot.errors_by_status[&500], 1);
        assert_eq!(snapshot.error_rate_percent, 75.0);
    }

    #[test]
    fn test_latency_percentiles() {
        let metrics = RequestMetrics::new();
        for i in 1..=100 {
            metrics.record_request_start();
            metrics.record_request_end("/x", 200, i as f64);
        }

        let (p50, p95, p99) = metrics.latency_percentiles();
        assert!(p50 > 0.0 && p50 <= 100.0);
        assert!(p95 > p50);
        assert!(p99 > p95);
    }

    #[test]
    fn test_ring_buffer_capacity() {
        let metrics = RequestMetrics::new();
        for i in 0..(RING_BUFFER_CAPACITY + 100) {
            metrics.record_request_start();
            metrics.record_request_end("/x", 200, i as f64);
        }
        assert!(metrics.latency_samples.lock().unwrap().len() <= RING_BUFFER_CAPACITY);
    }

    #[test]
    fn test_openai_counters() {
        let metrics = RequestMetrics::new();
        metrics.record_openai_call(true, 120, 80);
        metrics.record_openai_call(false, 0, 0);

        let openai = metrics.snapshot().openai;
        assert_eq!(openai.calls, 2);
        assert_eq!(openai.failures, 1);
        assert_eq!(openai.prompt_tokens, 120);
        assert_eq!(openai.completion_tokens, 80);
    }
}
