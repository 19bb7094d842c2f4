//! Test fixtures for integration testing

use async_trait::async_trait;
use crowd_arena::error::{ArenaError, Result};
use crowd_arena::pipeline::ranking_answers;
use crowd_arena::types::{CollectionTask, RankingTask, TaskHandle, TaskStatus};
use crowd_arena::TaskIssuer;
use std::collections::HashMap;
use std::sync::Mutex;

/// Task issuer whose workers always agree on a fixed preference order
///
/// Candidates earlier in the preference list place higher; candidates not
/// in the list tie for last. Every `fail_every`-th ranking task is reported
/// as failed by the worker. Collection tasks are answered with the scripted
/// submissions in order.
#[derive(Debug, Default)]
pub struct PreferenceIssuer {
    preference: Vec<String>,
    submissions: Vec<String>,
    fail_every: Option<usize>,
    issued: Mutex<Vec<RankingTask>>,
    collections: Mutex<Vec<CollectionTask>>,
    approved: Mutex<Vec<String>>,
    rejected: Mutex<Vec<String>>,
}

impl PreferenceIssuer {
    pub fn new(preference: &[&str]) -> Self {
        Self {
            preference: preference.iter().map(|id| id.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn failing_every(mut self, n: usize) -> Self {
        self.fail_every = Some(n);
        self
    }

    pub fn with_submissions(mut self, submissions: &[&str]) -> Self {
        self.submissions = submissions.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected.lock().map(|r| r.len()).unwrap_or_default()
    }

    pub fn issued_tasks(&self) -> Vec<RankingTask> {
        self.issued.lock().map(|t| t.clone()).unwrap_or_default()
    }

    pub fn approved_count(&self) -> usize {
        self.approved.lock().map(|a| a.len()).unwrap_or_default()
    }

    fn place_of(&self, id: &str) -> u32 {
        self.preference
            .iter()
            .position(|p| p == id)
            .unwrap_or(self.preference.len()) as u32
    }

    fn task_index(&self, handle: &TaskHandle) -> Result<usize> {
        handle
            .external_id
            .strip_prefix("pref-")
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| {
                ArenaError::TaskFailed {
                    task_id: handle.task_id.to_string(),
                    reason: "unknown handle".to_string(),
                }
                .into()
            })
    }
}

#[async_trait]
impl TaskIssuer for PreferenceIssuer {
    async fn issue(&self, task: RankingTask) -> Result<TaskHandle> {
        let mut issued = self.issued.lock().map_err(|_| ArenaError::Internal {
            message: "issued lock poisoned".to_string(),
        })?;
        let handle = TaskHandle {
            task_id: task.task_id,
            external_id: format!("pref-{}", issued.len()),
        };
        issued.push(task);
        Ok(handle)
    }

    async fn issue_collection(&self, task: CollectionTask) -> Result<TaskHandle> {
        let mut collections = self.collections.lock().map_err(|_| ArenaError::Internal {
            message: "collections lock poisoned".to_string(),
        })?;
        let handle = TaskHandle {
            task_id: task.task_id,
            external_id: format!("text-{}", collections.len()),
        };
        collections.push(task);
        Ok(handle)
    }

    async fn poll(&self, handle: &TaskHandle) -> Result<TaskStatus> {
        if let Some(n) = handle.external_id.strip_prefix("text-") {
            let index: usize = n.parse().unwrap_or_default();
            let collections = self.collections.lock().map_err(|_| ArenaError::Internal {
                message: "collections lock poisoned".to_string(),
            })?;
            return Ok(match (collections.get(index), self.submissions.get(index)) {
                (Some(task), Some(text)) => TaskStatus::Completed(answers(&[(
                    task.answer_field.as_str(),
                    text.as_str(),
                )])),
                _ => TaskStatus::Failed("no submission scripted".to_string()),
            });
        }

        let index = self.task_index(handle)?;
        if let Some(n) = self.fail_every {
            if (index + 1) % n == 0 {
                return Ok(TaskStatus::Failed("worker returned the task".to_string()));
            }
        }

        let issued = self.issued.lock().map_err(|_| ArenaError::Internal {
            message: "issued lock poisoned".to_string(),
        })?;
        let task = issued.get(index).ok_or_else(|| ArenaError::TaskFailed {
            task_id: handle.task_id.to_string(),
            reason: "task was never issued".to_string(),
        })?;

        // Dense places from the preference order
        let places: Vec<u32> = task.contestant_ids.iter().map(|id| self.place_of(id)).collect();
        let ranks: Vec<u32> = places
            .iter()
            .map(|place| places.iter().filter(|other| *other < place).count() as u32)
            .collect();
        Ok(TaskStatus::Completed(ranking_answers(&ranks)))
    }

    async fn approve(&self, handle: &TaskHandle) -> Result<()> {
        self.approved
            .lock()
            .map_err(|_| ArenaError::Internal {
                message: "approved lock poisoned".to_string(),
            })?
            .push(handle.external_id.clone());
        Ok(())
    }

    async fn reject(&self, handle: &TaskHandle, _feedback: &str) -> Result<()> {
        self.rejected
            .lock()
            .map_err(|_| ArenaError::Internal {
                message: "rejected lock poisoned".to_string(),
            })?
            .push(handle.external_id.clone());
        Ok(())
    }
}

/// Answers keyed the way workers submit them
pub fn answers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
