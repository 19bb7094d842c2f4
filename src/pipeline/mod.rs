//! Crowd task pipeline
//!
//! This module drives a competition with human judgements: matchups are
//! issued as ranking tasks through a `TaskIssuer`, answers are parsed into
//! rankings and recorded, and the pool is saved to a `ContestStore` after
//! every round. A collection stage can gather the candidates first, as
//! free-text submissions from the same crowd.

pub mod answers;
pub mod runner;
pub mod simulated;
pub mod stage;
pub mod store;
pub mod task;

// Re-export commonly used types
pub use answers::{free_text_answer, parse_ranking, ranking_answers};
pub use runner::{ContestRunner, RoundSummary};
pub use simulated::SimulatedCrowd;
pub use stage::{ChainOutcome, CollectionReport, CollectionStage, StageChain};
pub use store::{ContestStore, InMemoryContestStore, StoredRun};
pub use task::TaskIssuer;
