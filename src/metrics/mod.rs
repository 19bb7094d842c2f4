//! Metrics for the contest pipeline
//!
//! This module provides Prometheus counters, gauges and histograms covering
//! task issuance, task outcomes and recorded matches.

pub mod collector;

pub use collector::{ArenaMetrics, MetricsTimer, TaskFailureKind};
