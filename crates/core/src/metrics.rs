use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Per-pattern performance counters. All updates are atomic or
/// lock-protected so reads never block writers; per spec §5 "reads may be
/// slightly stale" is an accepted tradeoff.
#[derive(Debug, Default)]
pub struct PatternPerformanceMetrics {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub errors: AtomicU64,
    pub cache_hits: AtomicU64,
    pub cache_misses: AtomicU64,
    pub exceeded_match_limit: AtomicU64,
    pub exceeded_time_limit: AtomicU64,
    pub execution_time_micros: AtomicU64,
    pub memory_usage_bytes: AtomicU64,
    samples: Mutex<RollingSamples>,
}

const ROLLING_WINDOW: usize = 64;

#[derive(Debug, Default)]
struct RollingSamples {
    query_compilation_time_micros: VecDeque<u64>,
    node_count: VecDeque<u64>,
    capture_count: VecDeque<u64>,
}

impl PatternPerformanceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self, execution_time_micros: u64) {
        self.hits.fetch_add(1, Ordering::AcqRel);
        self.execution_time_micros
            .fetch_add(execution_time_micros, Ordering::AcqRel);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::AcqRel);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::AcqRel);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::AcqRel);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::AcqRel);
    }

    pub fn record_limit_exceeded(&self, matches: bool, time: bool) {
        if matches {
            self.exceeded_match_limit.fetch_add(1, Ordering::AcqRel);
        }
        if time {
            self.exceeded_time_limit.fetch_add(1, Ordering::AcqRel);
        }
    }

    pub fn push_sample(&self, compilation_time_micros: u64, node_count: u64, capture_count: u64) {
        let mut samples = self.samples.lock().expect("metrics mutex poisoned");
        push_bounded(&mut samples.query_compilation_time_micros, compilation_time_micros);
        push_bounded(&mut samples.node_count, node_count);
        push_bounded(&mut samples.capture_count, capture_count);
    }

    pub fn success_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Acquire) as f64;
        let misses = self.misses.load(Ordering::Acquire) as f64;
        let errors = self.errors.load(Ordering::Acquire) as f64;
        let total = hits + misses + errors;
        if total == 0.0 {
            0.0
        } else {
            hits / total
        }
    }

    pub fn avg_node_count(&self) -> f64 {
        let samples = self.samples.lock().expect("metrics mutex poisoned");
        average(&samples.node_count)
    }

    pub fn avg_capture_count(&self) -> f64 {
        let samples = self.samples.lock().expect("metrics mutex poisoned");
        average(&samples.capture_count)
    }

    pub fn avg_compilation_time_micros(&self) -> f64 {
        let samples = self.samples.lock().expect("metrics mutex poisoned");
        average(&samples.query_compilation_time_micros)
    }
}

fn push_bounded(deque: &mut VecDeque<u64>, value: u64) {
    if deque.len() == ROLLING_WINDOW {
        deque.pop_front();
    }
    deque.push_back(value);
}

fn average(deque: &VecDeque<u64>) -> f64 {
    if deque.is_empty() {
        0.0
    } else {
        deque.iter().sum::<u64>() as f64 / deque.len() as f64
    }
}

/// Per-strategy recovery statistics for resilient patterns.
#[derive(Debug, Default)]
pub struct RecoveryMetrics {
    pub attempts: AtomicU64,
    pub successes: AtomicU64,
    total_recovery_time_micros: AtomicU64,
    fallback_pattern_successes: AtomicU64,
    regex_successes: AtomicU64,
    partial_match_successes: AtomicU64,
}

impl RecoveryMetrics {
    /// Records the outcome of one recovery attempt. `strategy` is the
    /// strategy that produced matches; ignored when `succeeded` is false.
    pub fn record_attempt(&self, succeeded: bool, time_micros: u64, strategy: Option<crate::pattern::MatchStrategy>) {
        self.attempts.fetch_add(1, Ordering::AcqRel);
        if succeeded {
            self.successes.fetch_add(1, Ordering::AcqRel);
            match strategy {
                Some(crate::pattern::MatchStrategy::FallbackPattern) => {
                    self.fallback_pattern_successes.fetch_add(1, Ordering::AcqRel);
                }
                Some(crate::pattern::MatchStrategy::Regex) => {
                    self.regex_successes.fetch_add(1, Ordering::AcqRel);
                }
                Some(crate::pattern::MatchStrategy::PartialMatch) => {
                    self.partial_match_successes.fetch_add(1, Ordering::AcqRel);
                }
                _ => {}
            }
        }
        self.total_recovery_time_micros
            .fetch_add(time_micros, Ordering::AcqRel);
    }

    pub fn avg_recovery_time_micros(&self) -> f64 {
        let attempts = self.attempts.load(Ordering::Acquire);
        if attempts == 0 {
            0.0
        } else {
            self.total_recovery_time_micros.load(Ordering::Acquire) as f64 / attempts as f64
        }
    }

    /// Successes attributed to one specific recovery strategy (spec §8:
    /// `sum(strategies[i].successes) <= successes`).
    pub fn strategy_successes(&self, strategy: crate::pattern::MatchStrategy) -> u64 {
        match strategy {
            crate::pattern::MatchStrategy::FallbackPattern => self.fallback_pattern_successes.load(Ordering::Acquire),
            crate::pattern::MatchStrategy::Regex => self.regex_successes.load(Ordering::Acquire),
            crate::pattern::MatchStrategy::PartialMatch => self.partial_match_successes.load(Ordering::Acquire),
            _ => 0,
        }
    }
}
