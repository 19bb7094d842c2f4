//! Simulated crowd for dry runs and tests
//!
//! Every candidate has a hidden quality. A simulated worker ranks a matchup
//! by quality plus Gaussian noise, and the task reports completion after a
//! configurable number of polls. Collection tasks hand out scripted
//! submissions first, then generated ones with a random hidden quality.

use crate::error::ArenaError;
use crate::pipeline::answers::ranking_answers;
use crate::pipeline::task::TaskIssuer;
use crate::types::{Answers, CollectionTask, ContestantId, RankingTask, TaskHandle, TaskStatus};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;
use std::sync::Mutex;
use tracing::trace;

/// Payload key read when a candidate has no registered quality
pub const QUALITY_KEY: &str = "quality";

#[derive(Debug)]
struct SimulatedTask {
    polls_remaining: u32,
    answers: Answers,
}

#[derive(Debug)]
struct CrowdState {
    rng: StdRng,
    tasks: HashMap<String, SimulatedTask>,
    approved: HashSet<String>,
    rejected: HashMap<String, String>,
    issued: u64,
    collected: usize,
    /// Hidden quality of generated submissions
    generated: HashMap<ContestantId, f64>,
}

/// Task issuer backed by simulated workers
#[derive(Debug)]
pub struct SimulatedCrowd {
    qualities: HashMap<ContestantId, f64>,
    submissions: Vec<String>,
    noise: f64,
    polls_to_complete: u32,
    state: Mutex<CrowdState>,
}

impl SimulatedCrowd {
    /// Create a crowd with a fixed seed and unit noise that answers on the first poll
    pub fn new(seed: u64) -> Self {
        Self {
            qualities: HashMap::new(),
            submissions: Vec::new(),
            noise: 1.0,
            polls_to_complete: 0,
            state: Mutex::new(CrowdState {
                rng: StdRng::seed_from_u64(seed),
                tasks: HashMap::new(),
                approved: HashSet::new(),
                rejected: HashMap::new(),
                issued: 0,
                collected: 0,
                generated: HashMap::new(),
            }),
        }
    }

    /// Hidden quality of a candidate
    pub fn with_quality(mut self, id: impl Into<ContestantId>, quality: f64) -> Self {
        self.qualities.insert(id.into(), quality);
        self
    }

    /// Text handed out by the next unanswered collection task, with its hidden quality
    pub fn with_submission(mut self, text: impl Into<String>, quality: f64) -> Self {
        let text = text.into();
        self.qualities.insert(text.clone(), quality);
        self.submissions.push(text);
        self
    }

    /// Standard deviation of the noise added to each judgement
    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise.max(0.0);
        self
    }

    /// Number of `Pending` polls before a task completes
    pub fn with_poll_delay(mut self, polls: u32) -> Self {
        self.polls_to_complete = polls;
        self
    }

    pub fn issued_count(&self) -> crate::error::Result<u64> {
        Ok(self.lock_state()?.issued)
    }

    pub fn approved_count(&self) -> crate::error::Result<usize> {
        Ok(self.lock_state()?.approved.len())
    }

    /// Feedback given for every rejected task, by external id
    pub fn rejections(&self) -> crate::error::Result<HashMap<String, String>> {
        Ok(self.lock_state()?.rejected.clone())
    }

    fn lock_state(&self) -> crate::error::Result<std::sync::MutexGuard<'_, CrowdState>> {
        self.state.lock().map_err(|_| {
            ArenaError::Internal {
                message: "Failed to acquire simulated crowd lock".to_string(),
            }
            .into()
        })
    }

    fn quality_of(&self, state: &CrowdState, task: &RankingTask, position: usize) -> f64 {
        let id = &task.contestant_ids[position];
        let known = self
            .qualities
            .get(id)
            .or_else(|| state.generated.get(id))
            .copied();
        known.unwrap_or_else(|| {
            task.payloads
                .get(position)
                .and_then(|payload| payload.as_ref())
                .and_then(|payload| payload.get(QUALITY_KEY))
                .and_then(serde_json::Value::as_f64)
                .unwrap_or(0.0)
        })
    }
}

/// Standard normal sample (Box-Muller)
fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// 0-based ranks from scores, higher score first, equal scores tied
fn ranks_from_scores(scores: &[f64]) -> Vec<u32> {
    scores
        .iter()
        .map(|score| scores.iter().filter(|other| *other > score).count() as u32)
        .collect()
}

#[async_trait]
impl TaskIssuer for SimulatedCrowd {
    async fn issue(&self, task: RankingTask) -> crate::error::Result<TaskHandle> {
        let mut state = self.lock_state()?;

        let qualities: Vec<f64> = (0..task.contestant_ids.len())
            .map(|position| self.quality_of(&state, &task, position))
            .collect();
        let scores: Vec<f64> = qualities
            .iter()
            .map(|quality| quality + self.noise * standard_normal(&mut state.rng))
            .collect();
        let ranks = ranks_from_scores(&scores);

        state.issued += 1;
        let external_id = format!("sim-{}", state.issued);
        trace!(external_id = %external_id, ?ranks, "Simulated worker ranked matchup");

        state.tasks.insert(
            external_id.clone(),
            SimulatedTask {
                polls_remaining: self.polls_to_complete,
                answers: ranking_answers(&ranks),
            },
        );

        Ok(TaskHandle {
            task_id: task.task_id,
            external_id,
        })
    }

    async fn issue_collection(&self, task: CollectionTask) -> crate::error::Result<TaskHandle> {
        let mut state = self.lock_state()?;

        let text = match self.submissions.get(state.collected) {
            Some(text) => text.clone(),
            None => {
                let text = format!("submission {}", state.collected + 1);
                let quality = 10.0 * standard_normal(&mut state.rng);
                state.generated.insert(text.clone(), quality);
                text
            }
        };
        state.collected += 1;

        state.issued += 1;
        let external_id = format!("sim-{}", state.issued);
        trace!(external_id = %external_id, text = %text, "Simulated worker wrote submission");

        let mut answers = Answers::new();
        answers.insert(task.answer_field, text);
        state.tasks.insert(
            external_id.clone(),
            SimulatedTask {
                polls_remaining: self.polls_to_complete,
                answers,
            },
        );

        Ok(TaskHandle {
            task_id: task.task_id,
            external_id,
        })
    }

    async fn poll(&self, handle: &TaskHandle) -> crate::error::Result<TaskStatus> {
        let mut state = self.lock_state()?;
        let task = state
            .tasks
            .get_mut(&handle.external_id)
            .ok_or_else(|| ArenaError::TaskFailed {
                task_id: handle.task_id.to_string(),
                reason: format!("unknown task {}", handle.external_id),
            })?;

        if task.polls_remaining > 0 {
            task.polls_remaining -= 1;
            return Ok(TaskStatus::Pending);
        }
        Ok(TaskStatus::Completed(task.answers.clone()))
    }

    async fn approve(&self, handle: &TaskHandle) -> crate::error::Result<()> {
        let mut state = self.lock_state()?;
        if !state.tasks.contains_key(&handle.external_id) {
            return Err(ArenaError::TaskFailed {
                task_id: handle.task_id.to_string(),
                reason: format!("cannot approve unknown task {}", handle.external_id),
            }
            .into());
        }
        state.approved.insert(handle.external_id.clone());
        Ok(())
    }

    async fn reject(&self, handle: &TaskHandle, feedback: &str) -> crate::error::Result<()> {
        let mut state = self.lock_state()?;
        if !state.tasks.contains_key(&handle.external_id) {
            return Err(ArenaError::TaskFailed {
                task_id: handle.task_id.to_string(),
                reason: format!("cannot reject unknown task {}", handle.external_id),
            }
            .into());
        }
        state
            .rejected
            .insert(handle.external_id.clone(), feedback.to_string());
        Ok(())
    }
}
