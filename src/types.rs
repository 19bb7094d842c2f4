//! Common types used throughout the contest engine and pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skillratings::trueskill::TrueSkillRating;
use skillratings::weng_lin::WengLinRating;
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for contestants
pub type ContestantId = String;

/// Unique identifier for pipeline runs
pub type RunId = Uuid;

/// Unique identifier for issued tasks
pub type TaskId = Uuid;

/// A proposed group of contestants, not yet evaluated
pub type Matchup = Vec<ContestantId>;

/// Raw answer fields returned by a worker, keyed by question identifier
pub type Answers = HashMap<String, String>;

/// Gaussian belief about a contestant's skill
///
/// Treated as an immutable value: updates produce a new estimate that
/// replaces the stored one wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillEstimate {
    pub mean: f64,
    pub uncertainty: f64,
}

impl SkillEstimate {
    pub fn new(mean: f64, uncertainty: f64) -> Self {
        Self { mean, uncertainty }
    }

    /// Conservative scalar used for ranking
    pub fn exposed(&self, exposure_factor: f64) -> f64 {
        self.mean - exposure_factor * self.uncertainty
    }

    pub fn variance(&self) -> f64 {
        self.uncertainty * self.uncertainty
    }
}

impl Default for SkillEstimate {
    fn default() -> Self {
        Self {
            mean: 25.0,
            uncertainty: 25.0 / 3.0,
        }
    }
}

impl From<WengLinRating> for SkillEstimate {
    fn from(rating: WengLinRating) -> Self {
        Self {
            mean: rating.rating,
            uncertainty: rating.uncertainty,
        }
    }
}

impl From<SkillEstimate> for WengLinRating {
    fn from(estimate: SkillEstimate) -> Self {
        Self {
            rating: estimate.mean,
            uncertainty: estimate.uncertainty,
        }
    }
}

impl From<TrueSkillRating> for SkillEstimate {
    fn from(rating: TrueSkillRating) -> Self {
        Self {
            mean: rating.rating,
            uncertainty: rating.uncertainty,
        }
    }
}

impl From<SkillEstimate> for TrueSkillRating {
    fn from(estimate: SkillEstimate) -> Self {
        Self {
            rating: estimate.mean,
            uncertainty: estimate.uncertainty,
        }
    }
}

/// A candidate tracked by a competition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contestant {
    pub id: ContestantId,
    pub skill: SkillEstimate,
    pub payload: Option<serde_json::Value>,
    /// Number of recorded matches this contestant took part in
    pub matches_played: u64,
}

impl Contestant {
    pub fn new(id: ContestantId, skill: SkillEstimate, payload: Option<serde_json::Value>) -> Self {
        Self {
            id,
            skill,
            payload,
            matches_played: 0,
        }
    }
}

/// Plain data a host can persist to rebuild a competition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContestantSnapshot {
    pub id: ContestantId,
    pub mean: f64,
    pub uncertainty: f64,
    pub matches_played: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl From<&Contestant> for ContestantSnapshot {
    fn from(contestant: &Contestant) -> Self {
        Self {
            id: contestant.id.clone(),
            mean: contestant.skill.mean,
            uncertainty: contestant.skill.uncertainty,
            matches_played: contestant.matches_played,
            payload: contestant.payload.clone(),
        }
    }
}

impl From<ContestantSnapshot> for Contestant {
    fn from(snapshot: ContestantSnapshot) -> Self {
        Self {
            id: snapshot.id,
            skill: SkillEstimate::new(snapshot.mean, snapshot.uncertainty),
            payload: snapshot.payload,
            matches_played: snapshot.matches_played,
        }
    }
}

/// Skill change of one distinct contestant after a recorded match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillChange {
    pub contestant_id: ContestantId,
    pub old_skill: SkillEstimate,
    pub new_skill: SkillEstimate,
    /// How many positions of the match this contestant occupied
    pub occurrences: usize,
    /// Best (lowest) placement among its occurrences
    pub best_rank: u32,
}

/// Outcome of `Competition::record_match`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    /// One entry per distinct contestant, in order of first appearance
    pub changes: Vec<SkillChange>,
    /// Quality of the match before it was played (0.0 to 1.0, higher is closer)
    pub match_quality: f64,
}

/// One row of a leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    /// Zero-based leaderboard position
    pub position: usize,
    pub contestant_id: ContestantId,
    pub exposed_skill: f64,
    pub mean: f64,
    pub uncertainty: f64,
    pub matches_played: u64,
}

/// A comparison task sent to a task issuer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingTask {
    pub task_id: TaskId,
    pub run_id: RunId,
    /// Contestants in the order shown to the worker
    pub contestant_ids: Matchup,
    /// Payloads aligned with `contestant_ids`
    pub payloads: Vec<Option<serde_json::Value>>,
    pub created_at: DateTime<Utc>,
}

/// A free-text task: one worker writes one submission for a prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionTask {
    pub task_id: TaskId,
    pub run_id: RunId,
    /// Instructions shown to the worker
    pub prompt: String,
    /// Answer field the worker fills in
    pub answer_field: String,
    pub created_at: DateTime<Utc>,
}

/// Handle returned by a task issuer for later polling
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskHandle {
    pub task_id: TaskId,
    /// Identifier assigned by the marketplace
    pub external_id: String,
}

/// Polling state of an issued task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    Completed(Answers),
    Failed(String),
}
