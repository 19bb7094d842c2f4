//! Metrics collection using Prometheus
//!
//! This module provides metrics for the contest pipeline: matchup issuance,
//! task outcomes, recorded matches and the size of the contestant pool.

use anyhow::Result;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Why a task did not produce a recorded match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFailureKind {
    /// The issuer refused the task
    Issue,
    /// The worker side reported a failure
    Failed,
    /// No answer before the task timeout
    Timeout,
    /// The answer could not be read
    InvalidAnswer,
    /// The answer was read but failed the acceptance check
    Rejected,
}

impl TaskFailureKind {
    fn as_label(&self) -> &'static str {
        match self {
            TaskFailureKind::Issue => "issue",
            TaskFailureKind::Failed => "failed",
            TaskFailureKind::Timeout => "timeout",
            TaskFailureKind::InvalidAnswer => "invalid_answer",
            TaskFailureKind::Rejected => "rejected",
        }
    }
}

/// Main metrics collector for the contest pipeline
#[derive(Clone)]
pub struct ArenaMetrics {
    /// Prometheus registry
    registry: Arc<Registry>,

    pub matchups_generated_total: IntCounter,
    pub tasks_issued_total: IntCounter,
    pub tasks_completed_total: IntCounter,
    /// Failed tasks by failure kind
    pub tasks_failed_total: IntCounterVec,
    pub matches_recorded_total: IntCounter,

    /// Contestants currently registered
    pub pool_size: IntGauge,

    /// Time from issuing a task to its final status
    pub task_latency_seconds: Histogram,

    /// Match quality of recorded matches
    pub match_quality: Histogram,
}

impl ArenaMetrics {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self> {
        Self::with_registry(Arc::new(Registry::new()))
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let matchups_generated_total = IntCounter::new(
            "crowd_arena_matchups_generated_total",
            "Total matchups generated",
        )?;
        registry.register(Box::new(matchups_generated_total.clone()))?;

        let tasks_issued_total =
            IntCounter::new("crowd_arena_tasks_issued_total", "Total tasks issued")?;
        registry.register(Box::new(tasks_issued_total.clone()))?;

        let tasks_completed_total = IntCounter::new(
            "crowd_arena_tasks_completed_total",
            "Total tasks completed with a usable answer",
        )?;
        registry.register(Box::new(tasks_completed_total.clone()))?;

        let tasks_failed_total = IntCounterVec::new(
            Opts::new("crowd_arena_tasks_failed_total", "Total tasks skipped"),
            &["kind"],
        )?;
        registry.register(Box::new(tasks_failed_total.clone()))?;

        let matches_recorded_total = IntCounter::new(
            "crowd_arena_matches_recorded_total",
            "Total matches recorded by the engine",
        )?;
        registry.register(Box::new(matches_recorded_total.clone()))?;

        let pool_size = IntGauge::new("crowd_arena_pool_size", "Registered contestants")?;
        registry.register(Box::new(pool_size.clone()))?;

        let task_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "crowd_arena_task_latency_seconds",
                "Time from issue to final task status",
            )
            .buckets(vec![
                0.01, 0.1, 1.0, 10.0, 60.0, 600.0, 3600.0, 21600.0, 86400.0, 259200.0,
            ]),
        )?;
        registry.register(Box::new(task_latency_seconds.clone()))?;

        let match_quality = Histogram::with_opts(
            HistogramOpts::new(
                "crowd_arena_match_quality",
                "Predicted closeness of recorded matches",
            )
            .buckets(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0]),
        )?;
        registry.register(Box::new(match_quality.clone()))?;

        Ok(Self {
            registry,
            matchups_generated_total,
            tasks_issued_total,
            tasks_completed_total,
            tasks_failed_total,
            matches_recorded_total,
            pool_size,
            task_latency_seconds,
            match_quality,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn record_matchups_generated(&self, count: usize) {
        self.matchups_generated_total.inc_by(count as u64);
    }

    pub fn record_task_issued(&self) {
        self.tasks_issued_total.inc();
    }

    /// Record a task that produced a usable answer
    pub fn record_task_completed(&self, latency: Duration) {
        self.tasks_completed_total.inc();
        self.task_latency_seconds.observe(latency.as_secs_f64());
    }

    pub fn record_task_failed(&self, kind: TaskFailureKind) {
        self.tasks_failed_total
            .with_label_values(&[kind.as_label()])
            .inc();
    }

    pub fn record_match(&self, quality: f64) {
        self.matches_recorded_total.inc();
        self.match_quality.observe(quality);
    }

    pub fn set_pool_size(&self, size: usize) {
        self.pool_size.set(size as i64);
    }

    /// Render every registered metric in the Prometheus text format
    pub fn gather_text(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Create a timer for measuring task latency
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
#[derive(Debug, Clone, Copy)]
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
