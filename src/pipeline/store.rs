//! Contest state persistence
//!
//! The runner saves a snapshot of every contestant after each round so an
//! interrupted run can be resumed. Stores deal in plain snapshot data and
//! know nothing about the rating model.

use crate::error::ArenaError;
use crate::types::{ContestantSnapshot, RunId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// Saved state of one contest run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRun {
    pub run_id: RunId,
    pub snapshots: Vec<ContestantSnapshot>,
    /// Number of saves so far
    pub revision: u64,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl StoredRun {
    pub fn new(run_id: RunId, snapshots: Vec<ContestantSnapshot>) -> Self {
        let now = Utc::now();
        Self {
            run_id,
            snapshots,
            revision: 1,
            created_at: now,
            last_updated: now,
        }
    }

    /// Replace the snapshots and bump the revision
    pub fn update(&mut self, snapshots: Vec<ContestantSnapshot>) {
        self.snapshots = snapshots;
        self.revision += 1;
        self.last_updated = Utc::now();
    }
}

/// Trait for contest storage operations
pub trait ContestStore: Send + Sync {
    /// Store the contestants of a run, replacing any earlier save
    fn save(&self, run_id: RunId, snapshots: Vec<ContestantSnapshot>) -> crate::error::Result<()>;

    /// Latest saved contestants of a run
    fn load(&self, run_id: RunId) -> crate::error::Result<Option<Vec<ContestantSnapshot>>>;

    /// Every run with saved state
    fn run_ids(&self) -> crate::error::Result<Vec<RunId>>;
}

/// In-memory contest storage implementation
#[derive(Debug, Default)]
pub struct InMemoryContestStore {
    runs: RwLock<HashMap<RunId, StoredRun>>,
}

impl InMemoryContestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full saved record of a run
    pub fn stored_run(&self, run_id: RunId) -> crate::error::Result<Option<StoredRun>> {
        let runs = self.runs.read().map_err(|_| ArenaError::Storage {
            message: "Failed to acquire runs read lock".to_string(),
        })?;

        Ok(runs.get(&run_id).cloned())
    }
}

impl ContestStore for InMemoryContestStore {
    fn save(&self, run_id: RunId, snapshots: Vec<ContestantSnapshot>) -> crate::error::Result<()> {
        let mut runs = self.runs.write().map_err(|_| ArenaError::Storage {
            message: "Failed to acquire runs write lock".to_string(),
        })?;

        match runs.get_mut(&run_id) {
            Some(run) => run.update(snapshots),
            None => {
                runs.insert(run_id, StoredRun::new(run_id, snapshots));
            }
        }
        Ok(())
    }

    fn load(&self, run_id: RunId) -> crate::error::Result<Option<Vec<ContestantSnapshot>>> {
        Ok(self.stored_run(run_id)?.map(|run| run.snapshots))
    }

    fn run_ids(&self) -> crate::error::Result<Vec<RunId>> {
        let runs = self.runs.read().map_err(|_| ArenaError::Storage {
            message: "Failed to acquire runs read lock".to_string(),
        })?;

        let mut ids: Vec<(DateTime<Utc>, RunId)> =
            runs.values().map(|run| (run.created_at, run.run_id)).collect();
        ids.sort();
        Ok(ids.into_iter().map(|(_, id)| id).collect())
    }
}
