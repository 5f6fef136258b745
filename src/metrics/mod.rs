// Request metrics exposed on /debug/metrics

pub mod collector;

pub use collector::{MetricsSnapshot, RequestMetrics};
