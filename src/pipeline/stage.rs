//! Chained pipeline stages
//!
//! A collection stage asks workers for free-text submissions and keeps the
//! acceptable ones. Once every collection task has reached a final state the
//! accepted submissions become candidates of a contest, which rates them
//! with ranking tasks until a winner is found.

use crate::competition::Competition;
use crate::config::app::PipelineSettings;
use crate::config::rating::RatingConfig;
use crate::error::{ArenaError, Result};
use crate::metrics::{ArenaMetrics, TaskFailureKind};
use crate::pipeline::answers::free_text_answer;
use crate::pipeline::runner::ContestRunner;
use crate::pipeline::store::ContestStore;
use crate::pipeline::task::{await_answers, PollOutcome, TaskIssuer};
use crate::types::{CollectionTask, RunId, Standing, TaskHandle};
use crate::utils::{current_timestamp, generate_run_id, generate_task_id};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Payload key holding a submission's text
pub const TEXT_KEY: &str = "text";

/// Default answer field of collection tasks
pub const DEFAULT_ANSWER_FIELD: &str = "submission";

type Acceptance = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// What a collection stage produced
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionReport {
    pub tasks_issued: usize,
    /// Distinct accepted submissions, in order of issue
    pub accepted: Vec<String>,
    /// Submissions that failed the acceptance check
    pub rejected: usize,
    /// Readable answers repeating an earlier accepted submission
    pub duplicates: usize,
    /// Tasks that could not be issued, failed or came back unreadable
    pub tasks_failed: usize,
    /// Tasks with no answer before the timeout
    pub tasks_pending: usize,
}

impl CollectionReport {
    /// Every issued task reached a final state
    pub fn is_complete(&self) -> bool {
        self.tasks_pending == 0
    }
}

/// Free-text collection stage
pub struct CollectionStage {
    prompt: String,
    answer_field: String,
    submissions: usize,
    acceptance: Option<(Acceptance, String)>,
}

impl std::fmt::Debug for CollectionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionStage")
            .field("prompt", &self.prompt)
            .field("answer_field", &self.answer_field)
            .field("submissions", &self.submissions)
            .field("filtered", &self.acceptance.is_some())
            .finish()
    }
}

impl CollectionStage {
    /// Ask `submissions` workers to answer `prompt`
    pub fn new(prompt: impl Into<String>, submissions: usize) -> Self {
        Self {
            prompt: prompt.into(),
            answer_field: DEFAULT_ANSWER_FIELD.to_string(),
            submissions,
            acceptance: None,
        }
    }

    pub fn with_answer_field(mut self, field: impl Into<String>) -> Self {
        self.answer_field = field.into();
        self
    }

    /// Keep only submissions passing `predicate`; others are rejected with `feedback`
    pub fn with_acceptance<F>(mut self, predicate: F, feedback: impl Into<String>) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.acceptance = Some((Box::new(predicate), feedback.into()));
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    fn accepts(&self, text: &str) -> bool {
        self.acceptance
            .as_ref()
            .map_or(true, |(predicate, _)| predicate(text))
    }

    /// Issue the collection tasks and wait for every one of them
    pub async fn run(
        &self,
        run_id: RunId,
        issuer: &dyn TaskIssuer,
        settings: &PipelineSettings,
        metrics: &ArenaMetrics,
    ) -> Result<CollectionReport> {
        if self.submissions == 0 {
            return Err(ArenaError::validation("A collection stage needs at least 1 submission").into());
        }

        let tasks: Vec<CollectionTask> = (0..self.submissions)
            .map(|_| CollectionTask {
                task_id: generate_task_id(),
                run_id,
                prompt: self.prompt.clone(),
                answer_field: self.answer_field.clone(),
                created_at: current_timestamp(),
            })
            .collect();
        let task_ids: Vec<_> = tasks.iter().map(|t| t.task_id).collect();
        let timer = metrics.start_timer();

        let issue_results =
            join_all(tasks.into_iter().map(|task| issuer.issue_collection(task))).await;

        let mut report = CollectionReport::default();
        let mut handles: Vec<TaskHandle> = Vec::with_capacity(self.submissions);
        for (task_id, result) in task_ids.into_iter().zip(issue_results) {
            match result {
                Ok(handle) => {
                    metrics.record_task_issued();
                    handles.push(handle);
                }
                Err(error) => {
                    warn!(task_id = %task_id, error = %error, "Failed to issue collection task");
                    metrics.record_task_failed(TaskFailureKind::Issue);
                    report.tasks_failed += 1;
                }
            }
        }
        report.tasks_issued = handles.len();

        let poll_interval = settings.poll_interval();
        let timeout = settings.task_timeout();
        let outcomes = join_all(
            handles
                .iter()
                .map(|handle| await_answers(issuer, handle, poll_interval, timeout)),
        )
        .await;

        for (handle, outcome) in handles.iter().zip(outcomes) {
            let answers = match outcome {
                PollOutcome::Answered(answers) => answers,
                PollOutcome::Skipped(kind, error) => {
                    warn!(
                        external_id = %handle.external_id,
                        ?kind,
                        error = %error,
                        "Skipping collection task"
                    );
                    metrics.record_task_failed(kind);
                    if kind == TaskFailureKind::Timeout {
                        report.tasks_pending += 1;
                    } else {
                        report.tasks_failed += 1;
                    }
                    continue;
                }
            };

            let text = match free_text_answer(&answers, &self.answer_field) {
                Ok(text) => text,
                Err(error) => {
                    warn!(external_id = %handle.external_id, error = %error, "Unreadable submission");
                    metrics.record_task_failed(TaskFailureKind::InvalidAnswer);
                    report.tasks_failed += 1;
                    continue;
                }
            };

            if !self.accepts(&text) {
                let feedback = self
                    .acceptance
                    .as_ref()
                    .map(|(_, feedback)| feedback.as_str())
                    .unwrap_or_default();
                debug!(external_id = %handle.external_id, text = %text, "Rejected submission");
                metrics.record_task_failed(TaskFailureKind::Rejected);
                report.rejected += 1;
                if let Err(error) = issuer.reject(handle, feedback).await {
                    warn!(external_id = %handle.external_id, error = %error, "Failed to reject task");
                }
                continue;
            }

            metrics.record_task_completed(timer.elapsed());
            if let Err(error) = issuer.approve(handle).await {
                warn!(external_id = %handle.external_id, error = %error, "Failed to approve task");
            }

            if report.accepted.contains(&text) {
                report.duplicates += 1;
            } else {
                report.accepted.push(text);
            }
        }

        info!(
            run_id = %run_id,
            issued = report.tasks_issued,
            accepted = report.accepted.len(),
            rejected = report.rejected,
            failed = report.tasks_failed,
            pending = report.tasks_pending,
            "Collection stage finished"
        );
        Ok(report)
    }
}

/// Result of a collection stage followed by a contest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainOutcome {
    pub run_id: RunId,
    pub collection: CollectionReport,
    pub winner: Standing,
}

/// A collection stage feeding a contest over its accepted submissions
pub struct StageChain {
    collection: CollectionStage,
    rating: RatingConfig,
    settings: PipelineSettings,
    issuer: Arc<dyn TaskIssuer>,
    store: Arc<dyn ContestStore>,
    metrics: Arc<ArenaMetrics>,
}

impl StageChain {
    pub fn new(
        collection: CollectionStage,
        rating: RatingConfig,
        settings: PipelineSettings,
        issuer: Arc<dyn TaskIssuer>,
        store: Arc<dyn ContestStore>,
    ) -> Result<Self> {
        rating.validate()?;

        Ok(Self {
            collection,
            rating,
            settings,
            issuer,
            store,
            metrics: Arc::new(ArenaMetrics::new()?),
        })
    }

    /// Use a shared metrics collector
    pub fn with_metrics(mut self, metrics: Arc<ArenaMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> Arc<ArenaMetrics> {
        self.metrics.clone()
    }

    /// Run the collection stage, then the contest once the stage is complete
    ///
    /// The contest only starts when no collection task is still pending and
    /// at least one full group of submissions was accepted.
    pub async fn run(&self) -> Result<ChainOutcome> {
        let run_id = generate_run_id();
        info!(run_id = %run_id, prompt = %self.collection.prompt(), "Starting stage chain");

        let collection = self
            .collection
            .run(run_id, self.issuer.as_ref(), &self.settings, &self.metrics)
            .await?;

        if !collection.is_complete() {
            return Err(ArenaError::StageIncomplete {
                stage: "collection".to_string(),
                reason: format!("{} tasks still pending", collection.tasks_pending),
            }
            .into());
        }

        let required = self.rating.group_size;
        if collection.accepted.len() < required {
            return Err(ArenaError::StageIncomplete {
                stage: "collection".to_string(),
                reason: format!(
                    "{} submissions accepted, contest needs {}",
                    collection.accepted.len(),
                    required
                ),
            }
            .into());
        }

        let competition = Competition::new(self.rating.clone())?;
        let mut runner = ContestRunner::new(
            competition,
            self.issuer.clone(),
            self.store.clone(),
            self.settings.clone(),
        )?
        .with_run_id(run_id)
        .with_metrics(self.metrics.clone());

        runner.add_candidates(collection.accepted.iter().map(|text| {
            (
                text.clone(),
                Some(serde_json::json!({ TEXT_KEY: text })),
            )
        }));

        let winner = runner.run().await?;
        Ok(ChainOutcome {
            run_id,
            collection,
            winner,
        })
    }
}
