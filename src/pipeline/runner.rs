//! Contest runner
//!
//! Drives a competition through rounds of crowd judgements: generate
//! matchups, issue them as tasks, wait for the answers, record the rankings
//! and persist the pool after every round.

use crate::competition::Competition;
use crate::config::app::PipelineSettings;
use crate::config::rating::RatingConfig;
use crate::error::{ArenaError, Result};
use crate::metrics::{ArenaMetrics, MetricsTimer, TaskFailureKind};
use crate::pipeline::answers::parse_ranking;
use crate::pipeline::store::ContestStore;
use crate::pipeline::task::{await_answers, PollOutcome, TaskIssuer};
use crate::types::{ContestantId, Matchup, RankingTask, RunId, Standing, TaskHandle};
use crate::utils::{current_timestamp, generate_run_id, generate_task_id};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// What happened during one round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundSummary {
    /// 1-based round number within this runner
    pub round: usize,
    pub matchups_issued: usize,
    pub matches_recorded: usize,
    pub tasks_failed: usize,
    /// Leaderboard top after the round
    pub leader: Option<Standing>,
}

enum TaskOutcome {
    Ranked(Vec<u32>),
    Skipped(TaskFailureKind, anyhow::Error),
}

/// Runs a competition against a task issuer
pub struct ContestRunner {
    run_id: RunId,
    competition: Competition,
    issuer: Arc<dyn TaskIssuer>,
    store: Arc<dyn ContestStore>,
    settings: PipelineSettings,
    metrics: Arc<ArenaMetrics>,
    rounds_completed: usize,
    matches_recorded: usize,
}

impl ContestRunner {
    /// Create a runner for a fresh run
    pub fn new(
        competition: Competition,
        issuer: Arc<dyn TaskIssuer>,
        store: Arc<dyn ContestStore>,
        settings: PipelineSettings,
    ) -> Result<Self> {
        Ok(Self {
            run_id: generate_run_id(),
            competition,
            issuer,
            store,
            settings,
            metrics: Arc::new(ArenaMetrics::new()?),
            rounds_completed: 0,
            matches_recorded: 0,
        })
    }

    /// Continue a run from the state saved in `store`
    ///
    /// Round and match counters start from zero for the resumed session.
    pub fn resume(
        run_id: RunId,
        config: RatingConfig,
        issuer: Arc<dyn TaskIssuer>,
        store: Arc<dyn ContestStore>,
        settings: PipelineSettings,
    ) -> Result<Self> {
        let snapshots = store.load(run_id)?.ok_or_else(|| {
            anyhow::Error::from(ArenaError::Storage {
                message: format!("No saved state for run {}", run_id),
            })
        })?;

        let competition = Competition::restore(config, snapshots)?;
        info!(
            run_id = %run_id,
            contestants = competition.len(),
            "Resuming contest run"
        );

        let runner = Self::new(competition, issuer, store, settings)?.with_run_id(run_id);
        runner.metrics.set_pool_size(runner.competition.len());
        Ok(runner)
    }

    /// Record under an existing run id, e.g. one shared with earlier stages
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = run_id;
        self
    }

    /// Use a shared metrics collector
    pub fn with_metrics(mut self, metrics: Arc<ArenaMetrics>) -> Self {
        metrics.set_pool_size(self.competition.len());
        self.metrics = metrics;
        self
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn competition(&self) -> &Competition {
        &self.competition
    }

    pub fn metrics(&self) -> Arc<ArenaMetrics> {
        self.metrics.clone()
    }

    pub fn rounds_completed(&self) -> usize {
        self.rounds_completed
    }

    /// Register candidates with their payloads; returns how many were new
    pub fn add_candidates<I, S>(&mut self, candidates: I) -> usize
    where
        I: IntoIterator<Item = (S, Option<serde_json::Value>)>,
        S: Into<ContestantId>,
    {
        let added = candidates
            .into_iter()
            .map(|(id, payload)| self.competition.add_contestant(id, payload))
            .filter(|added| *added)
            .count();

        self.metrics.set_pool_size(self.competition.len());
        debug!(added, total = self.competition.len(), "Added candidates");
        added
    }

    /// Issue one round of matchups and fold the answers into the ratings
    ///
    /// Tasks that fail, time out or come back with an unreadable answer are
    /// skipped and counted in the summary. The round itself only fails when
    /// no matchups can be generated or the snapshot cannot be saved.
    pub async fn run_round(&mut self) -> Result<RoundSummary> {
        let round = self.rounds_completed + 1;
        let matchups = self
            .competition
            .generate_matchups(self.settings.matchups_per_round)?;
        self.metrics.record_matchups_generated(matchups.len());

        let tasks: Vec<RankingTask> = matchups.iter().map(|m| self.build_task(m)).collect();
        let task_ids: Vec<_> = tasks.iter().map(|t| t.task_id).collect();
        let timer = self.metrics.start_timer();

        let issue_results = join_all(tasks.into_iter().map(|task| self.issuer.issue(task))).await;

        let mut tasks_failed = 0;
        let mut issued: Vec<(TaskHandle, Matchup)> = Vec::with_capacity(matchups.len());
        for ((task_id, matchup), result) in task_ids.into_iter().zip(matchups).zip(issue_results) {
            match result {
                Ok(handle) => {
                    self.metrics.record_task_issued();
                    issued.push((handle, matchup));
                }
                Err(error) => {
                    warn!(task_id = %task_id, error = %error, "Failed to issue task");
                    self.metrics.record_task_failed(TaskFailureKind::Issue);
                    tasks_failed += 1;
                }
            }
        }
        let matchups_issued = issued.len();

        let outcomes = {
            let issuer = self.issuer.as_ref();
            let poll_interval = self.settings.poll_interval();
            let timeout = self.settings.task_timeout();
            join_all(issued.iter().map(|(handle, matchup)| {
                await_ranking(issuer, handle, matchup.len(), poll_interval, timeout, timer)
            }))
            .await
        };

        let mut matches_recorded = 0;
        for ((handle, matchup), (outcome, latency)) in issued.iter().zip(outcomes) {
            let (kind, error) = match outcome {
                TaskOutcome::Ranked(ranks) => match self.competition.record_match(matchup, &ranks) {
                    Ok(report) => {
                        self.metrics.record_task_completed(latency);
                        self.metrics.record_match(report.match_quality);
                        matches_recorded += 1;

                        if let Err(error) = self.issuer.approve(handle).await {
                            warn!(
                                external_id = %handle.external_id,
                                error = %error,
                                "Failed to approve task"
                            );
                        }
                        continue;
                    }
                    Err(error) => (TaskFailureKind::InvalidAnswer, error),
                },
                TaskOutcome::Skipped(kind, error) => (kind, error),
            };

            warn!(
                task_id = %handle.task_id,
                external_id = %handle.external_id,
                ?kind,
                error = %error,
                "Skipping task"
            );
            self.metrics.record_task_failed(kind);
            tasks_failed += 1;
        }

        self.store.save(self.run_id, self.competition.snapshot())?;
        self.metrics.set_pool_size(self.competition.len());
        self.rounds_completed = round;
        self.matches_recorded += matches_recorded;

        let leader = self.competition.best().ok();
        info!(
            run_id = %self.run_id,
            round,
            matchups_issued,
            matches_recorded,
            tasks_failed,
            leader = leader.as_ref().map(|s| s.contestant_id.as_str()).unwrap_or("-"),
            "Round complete"
        );

        Ok(RoundSummary {
            round,
            matchups_issued,
            matches_recorded,
            tasks_failed,
            leader,
        })
    }

    /// Run rounds until enough matches are recorded or the round limit is
    /// reached, then return the winner
    pub async fn run(&mut self) -> Result<Standing> {
        info!(
            run_id = %self.run_id,
            contestants = self.competition.len(),
            max_rounds = self.settings.max_rounds,
            min_matches = self.settings.min_matches_for_winner,
            "Starting contest run"
        );

        let mut rounds = 0;
        while rounds < self.settings.max_rounds
            && self.matches_recorded < self.settings.min_matches_for_winner
        {
            self.run_round().await?;
            rounds += 1;
        }

        if self.matches_recorded < self.settings.min_matches_for_winner {
            warn!(
                matches_recorded = self.matches_recorded,
                required = self.settings.min_matches_for_winner,
                "Round limit reached before enough matches were recorded"
            );
        }

        let winner = self.competition.best()?;
        info!(
            run_id = %self.run_id,
            winner = %winner.contestant_id,
            exposed_skill = winner.exposed_skill,
            matches_played = winner.matches_played,
            "Contest finished"
        );
        Ok(winner)
    }

    fn build_task(&self, matchup: &Matchup) -> RankingTask {
        let payloads = matchup
            .iter()
            .map(|id| {
                self.competition
                    .contestant(id)
                    .and_then(|c| c.payload.clone())
            })
            .collect();

        RankingTask {
            task_id: generate_task_id(),
            run_id: self.run_id,
            contestant_ids: matchup.clone(),
            payloads,
            created_at: current_timestamp(),
        }
    }
}

/// Poll a task and read its answer as a ranking of `len` positions
async fn await_ranking(
    issuer: &dyn TaskIssuer,
    handle: &TaskHandle,
    len: usize,
    poll_interval: Duration,
    timeout: Duration,
    timer: MetricsTimer,
) -> (TaskOutcome, Duration) {
    let outcome = match await_answers(issuer, handle, poll_interval, timeout).await {
        PollOutcome::Answered(answers) => match parse_ranking(&answers, len) {
            Ok(ranks) => TaskOutcome::Ranked(ranks),
            Err(error) => TaskOutcome::Skipped(TaskFailureKind::InvalidAnswer, error),
        },
        PollOutcome::Skipped(kind, error) => TaskOutcome::Skipped(kind, error),
    };

    (outcome, timer.elapsed())
}
