//! Capability interfaces for the external collaborators named in spec §6.
//! None of these are implemented by the core beyond a no-op default: the
//! cache store, databases, health sidecar, task runner, and AI bridge are
//! deliberately out of scope (spec §1).

use std::time::Duration;

/// Content-addressed cache capability. The core tolerates a no-op cache.
pub trait Cache: Send + Sync {
    fn get(&self, key: &str) -> Option<Vec<u8>>;
    fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpCache;

impl Cache for NoOpCache {
    fn get(&self, _key: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Option<Duration>) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Leveled logging sink. Internally every crate logs through `tracing`;
/// this trait is the seam an embedder can use to also receive events
/// structurally instead of (or in addition to) a `tracing` subscriber.
pub trait Logger: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!("{message}"),
            LogLevel::Info => tracing::info!("{message}"),
            LogLevel::Warn => tracing::warn!("{message}"),
            LogLevel::Error => tracing::error!("{message}"),
        }
    }
}

/// Receives periodic `PatternPerformanceMetrics` snapshots.
pub trait MetricsSink: Send + Sync {
    fn record_snapshot(&self, pattern_name: &str, success_rate: f64, hits: u64, errors: u64);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpMetricsSink;

impl MetricsSink for NoOpMetricsSink {
    fn record_snapshot(&self, _pattern_name: &str, _success_rate: f64, _hits: u64, _errors: u64) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Receives `(component, status, details)` transitions.
pub trait HealthReporter: Send + Sync {
    fn report(&self, component: &str, status: ComponentStatus, details: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHealthReporter;

impl HealthReporter for NoOpHealthReporter {
    fn report(&self, _component: &str, _status: ComponentStatus, _details: &str) {}
}
