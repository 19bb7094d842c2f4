//! Rating engine for pools of crowd-judged candidates
//!
//! This module provides the competition (contestant pool, matchup generation,
//! match recording and leaderboard) built on the rating calculators.

pub mod engine;
pub mod matchups;

// Re-export commonly used types
pub use engine::Competition;
pub use matchups::{combinations, schedule};
