//! Task issuer interface
//!
//! A task issuer shows work to human workers and reports back their answers:
//! ranking tasks for matchups and free-text collection tasks for new
//! submissions. The pipeline only talks to this trait, so a crowd
//! marketplace, a scripted fixture and the simulated crowd are
//! interchangeable.

use crate::error::ArenaError;
use crate::metrics::TaskFailureKind;
use crate::types::{Answers, CollectionTask, RankingTask, TaskHandle, TaskStatus};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Trait for issuing tasks and collecting their answers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskIssuer: Send + Sync {
    /// Publish a ranking task and return a handle for polling
    async fn issue(&self, task: RankingTask) -> crate::error::Result<TaskHandle>;

    /// Publish a free-text collection task and return a handle for polling
    async fn issue_collection(&self, task: CollectionTask) -> crate::error::Result<TaskHandle>;

    /// Current status of a previously issued task
    async fn poll(&self, handle: &TaskHandle) -> crate::error::Result<TaskStatus>;

    /// Accept the worker's submission once its answer has been used
    async fn approve(&self, handle: &TaskHandle) -> crate::error::Result<()>;

    /// Turn down a submission, with feedback for the worker
    async fn reject(&self, handle: &TaskHandle, feedback: &str) -> crate::error::Result<()>;
}

/// Final state of a polled task
pub(crate) enum PollOutcome {
    Answered(Answers),
    Skipped(TaskFailureKind, anyhow::Error),
}

/// Poll a task until it completes, fails or the timeout passes
pub(crate) async fn await_answers(
    issuer: &dyn TaskIssuer,
    handle: &TaskHandle,
    poll_interval: Duration,
    timeout: Duration,
) -> PollOutcome {
    let deadline = Instant::now() + timeout;

    loop {
        let status = match issuer.poll(handle).await {
            Ok(status) => status,
            Err(error) => return PollOutcome::Skipped(TaskFailureKind::Failed, error),
        };

        match status {
            TaskStatus::Completed(answers) => return PollOutcome::Answered(answers),
            TaskStatus::Failed(reason) => {
                return PollOutcome::Skipped(
                    TaskFailureKind::Failed,
                    ArenaError::TaskFailed {
                        task_id: handle.task_id.to_string(),
                        reason,
                    }
                    .into(),
                );
            }
            TaskStatus::Pending => {
                let now = Instant::now();
                if now >= deadline {
                    return PollOutcome::Skipped(
                        TaskFailureKind::Timeout,
                        ArenaError::TaskFailed {
                            task_id: handle.task_id.to_string(),
                            reason: format!("no answer within {:?}", timeout),
                        }
                        .into(),
                    );
                }
                sleep(poll_interval.min(deadline - now)).await;
            }
        }
    }
}
