//! Crowd Arena - skill rating for crowd-judged contests
//!
//! This crate ranks candidates from small-group comparisons judged by human
//! workers: a Gaussian skill engine with matchup generation, and a task
//! pipeline that collects submissions from a crowd, issues matchups over
//! them and folds the answers back in.

pub mod competition;
pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod rating;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{ArenaError, Result};
pub use types::*;

// Re-export key components
pub use competition::Competition;
pub use pipeline::{
    CollectionStage, ContestRunner, ContestStore, InMemoryContestStore, SimulatedCrowd, StageChain,
    TaskIssuer,
};
pub use rating::SkillCalculator;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
