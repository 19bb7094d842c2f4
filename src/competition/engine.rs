//! The competition: a pool of contestants rated from group rankings
//!
//! A `Competition` owns every contestant's skill estimate, proposes the next
//! comparison groups and folds observed rankings back into the estimates.

use crate::competition::matchups::{combinations, schedule};
use crate::config::rating::RatingConfig;
use crate::error::{ArenaError, Result};
use crate::rating::calculator::{build_calculator, fuse_posteriors, validate_match, SkillCalculator};
use crate::types::{
    Contestant, ContestantId, ContestantSnapshot, MatchReport, Matchup, SkillChange, Standing,
};
use crate::utils::n_choose_k;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use tracing::debug;

/// Rating engine for one pool of candidates
///
/// Not internally thread-safe: one instance must be owned by a single logical
/// flow of control at a time, or synchronized externally. All operations run
/// to completion in memory and never retry.
#[derive(Debug)]
pub struct Competition {
    config: RatingConfig,
    calculator: Box<dyn SkillCalculator>,
    contestants: HashMap<ContestantId, Contestant>,
    /// Registration order; drives listing and matchup enumeration
    order: Vec<ContestantId>,
    rng: StdRng,
    matches_recorded: u64,
}

impl Competition {
    /// Create an empty competition with the calculator selected by `config`
    pub fn new(config: RatingConfig) -> Result<Self> {
        let calculator = build_calculator(&config)?;
        Self::with_calculator(config, calculator)
    }

    /// Create an empty competition with an explicit calculator
    pub fn with_calculator(
        config: RatingConfig,
        calculator: Box<dyn SkillCalculator>,
    ) -> Result<Self> {
        config.validate()?;

        let rng = match config.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            config,
            calculator,
            contestants: HashMap::new(),
            order: Vec::new(),
            rng,
            matches_recorded: 0,
        })
    }

    /// Rebuild a competition from persisted contestant data
    pub fn restore(config: RatingConfig, snapshots: Vec<ContestantSnapshot>) -> Result<Self> {
        let mut competition = Self::new(config)?;

        for snapshot in snapshots {
            if competition.contestants.contains_key(&snapshot.id) {
                return Err(ArenaError::validation(format!(
                    "Duplicate contestant in snapshot: {}",
                    snapshot.id
                ))
                .into());
            }
            if !snapshot.mean.is_finite()
                || !snapshot.uncertainty.is_finite()
                || snapshot.uncertainty <= 0.0
            {
                return Err(ArenaError::validation(format!(
                    "Invalid skill estimate for {}: mean {}, uncertainty {}",
                    snapshot.id, snapshot.mean, snapshot.uncertainty
                ))
                .into());
            }

            competition.order.push(snapshot.id.clone());
            competition
                .contestants
                .insert(snapshot.id.clone(), Contestant::from(snapshot));
        }

        debug!(
            contestants = competition.order.len(),
            "Restored competition from snapshot"
        );
        Ok(competition)
    }

    /// Export every contestant as plain data, in registration order
    pub fn snapshot(&self) -> Vec<ContestantSnapshot> {
        self.contestants().map(ContestantSnapshot::from).collect()
    }

    pub fn config(&self) -> &RatingConfig {
        &self.config
    }

    pub fn calculator(&self) -> &dyn SkillCalculator {
        self.calculator.as_ref()
    }

    /// Register a contestant with the prior estimate
    ///
    /// Returns `false` and leaves the existing entry untouched when the
    /// identifier is already registered.
    pub fn add_contestant(
        &mut self,
        id: impl Into<ContestantId>,
        payload: Option<serde_json::Value>,
    ) -> bool {
        let id = id.into();
        if self.contestants.contains_key(&id) {
            return false;
        }

        let contestant = Contestant::new(id.clone(), self.calculator.initial_estimate(), payload);
        self.order.push(id.clone());
        self.contestants.insert(id, contestant);
        true
    }

    /// Register several contestants without payloads; returns how many were new
    pub fn add_contestants<I, S>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<ContestantId>,
    {
        ids.into_iter()
            .map(|id| self.add_contestant(id, None))
            .filter(|added| *added)
            .count()
    }

    pub fn contestant(&self, id: &str) -> Option<&Contestant> {
        self.contestants.get(id)
    }

    /// Contestants in registration order
    pub fn contestants(&self) -> impl Iterator<Item = &Contestant> {
        self.order.iter().filter_map(|id| self.contestants.get(id))
    }

    /// Identifiers in registration order
    pub fn contestant_ids(&self) -> Vec<ContestantId> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn matches_recorded(&self) -> u64 {
        self.matches_recorded
    }

    /// Number of distinct groups of `group_size` contestants in the pool
    pub fn count_possible_matchups(&self) -> u64 {
        n_choose_k(self.len(), self.config.group_size)
    }

    /// Every distinct group of `group_size` contestants, in registration order
    pub fn ideal_matchups(&self) -> Vec<Matchup> {
        combinations(&self.order, self.config.group_size)
    }

    /// Propose `count` comparison groups
    ///
    /// Cycles through all combinations of the pool, reshuffling at the start
    /// of every pass.
    pub fn generate_matchups(&mut self, count: usize) -> Result<Vec<Matchup>> {
        self.ensure_pool(self.config.group_size)?;

        if count == 0 {
            return Ok(Vec::new());
        }

        let mut ideal = self.ideal_matchups();
        let matchups = schedule(&mut ideal, count, &mut self.rng);

        debug!(
            requested = count,
            possible = ideal.len(),
            group_size = self.config.group_size,
            "Generated matchups"
        );
        Ok(matchups)
    }

    /// Fold an observed ranking into the participants' skill estimates
    ///
    /// `ranks[i]` is the placement of `participants[i]`; lower is better and
    /// equal values are ties. Unregistered identifiers are rated from the
    /// prior and registered once the update succeeds; a failed update leaves
    /// the pool unchanged. An identifier that occupies several positions is rated
    /// from its pre-match estimate at every position and updated once with
    /// the combined evidence.
    pub fn record_match<S: AsRef<str>>(
        &mut self,
        participants: &[S],
        ranks: &[u32],
    ) -> Result<MatchReport> {
        validate_match(participants.len(), ranks)?;

        // Pre-match snapshot of every position; unknown ids start from the prior
        let prior = self.calculator.initial_estimate();
        let mut unknown: Vec<&str> = Vec::new();
        let group: Vec<_> = participants
            .iter()
            .map(|id| {
                let id = id.as_ref();
                match self.contestants.get(id) {
                    Some(contestant) => contestant.skill,
                    None => {
                        if !unknown.contains(&id) {
                            unknown.push(id);
                        }
                        prior
                    }
                }
            })
            .collect();

        let match_quality = self.calculator.match_quality(&group);
        let posteriors = self.calculator.rate(&group, ranks)?;

        // Registered only once the match has been rated
        for id in unknown {
            if self.add_contestant(id, None) {
                debug!(contestant_id = id, "Registered unknown contestant from match");
            }
        }

        // Distinct identifiers in order of first appearance
        let mut positions: Vec<(&str, Vec<usize>)> = Vec::new();
        for (position, id) in participants.iter().enumerate() {
            let id = id.as_ref();
            match positions.iter().position(|(seen, _)| *seen == id) {
                Some(index) => positions[index].1.push(position),
                None => positions.push((id, vec![position])),
            }
        }

        let mut changes = Vec::with_capacity(positions.len());
        for (id, held) in positions {
            let old_skill = group[held[0]];
            let held_posteriors: Vec<_> = held.iter().map(|&p| posteriors[p]).collect();
            let new_skill = fuse_posteriors(old_skill, &held_posteriors);
            let best_rank = held.iter().map(|&p| ranks[p]).min().unwrap_or_default();

            let contestant = self.contestants.get_mut(id).ok_or_else(|| {
                anyhow::Error::from(ArenaError::UnknownContestant {
                    contestant_id: id.to_string(),
                })
            })?;
            contestant.skill = new_skill;
            contestant.matches_played += 1;

            changes.push(SkillChange {
                contestant_id: id.to_string(),
                old_skill,
                new_skill,
                occurrences: held.len(),
                best_rank,
            });
        }

        self.matches_recorded += 1;
        debug!(
            participants = participants.len(),
            distinct = changes.len(),
            match_quality,
            "Recorded match"
        );

        Ok(MatchReport {
            changes,
            match_quality,
        })
    }

    /// Conservative skill used for ranking
    pub fn exposed_skill(&self, id: &str) -> Result<f64> {
        Ok(self.skill_of(id)?.exposed(self.config.exposure_factor))
    }

    /// Probability that `a` outperforms `b` under current beliefs
    pub fn win_probability(&self, a: &str, b: &str) -> Result<f64> {
        let a = self.skill_of(a)?;
        let b = self.skill_of(b)?;
        Ok(self.calculator.win_probability(&a, &b))
    }

    /// All contestants by descending exposed skill, ties broken by identifier
    pub fn leaderboard(&self) -> Vec<Standing> {
        let factor = self.config.exposure_factor;
        let mut standings: Vec<Standing> = self
            .contestants()
            .map(|c| Standing {
                position: 0,
                contestant_id: c.id.clone(),
                exposed_skill: c.skill.exposed(factor),
                mean: c.skill.mean,
                uncertainty: c.skill.uncertainty,
                matches_played: c.matches_played,
            })
            .collect();

        standings.sort_by(|a, b| {
            b.exposed_skill
                .total_cmp(&a.exposed_skill)
                .then_with(|| a.contestant_id.cmp(&b.contestant_id))
        });
        for (position, standing) in standings.iter_mut().enumerate() {
            standing.position = position;
        }
        standings
    }

    /// Top of the leaderboard
    pub fn best(&self) -> Result<Standing> {
        self.ensure_pool(1)?;
        self.leaderboard().into_iter().next().ok_or_else(|| {
            ArenaError::EmptyPool {
                required: 1,
                available: 0,
            }
            .into()
        })
    }

    pub fn best_id(&self) -> Result<ContestantId> {
        Ok(self.best()?.contestant_id)
    }

    fn skill_of(&self, id: &str) -> Result<crate::types::SkillEstimate> {
        self.contestants
            .get(id)
            .map(|c| c.skill)
            .ok_or_else(|| {
                ArenaError::UnknownContestant {
                    contestant_id: id.to_string(),
                }
                .into()
            })
    }

    fn ensure_pool(&self, required: usize) -> Result<()> {
        if self.len() < required {
            return Err(ArenaError::EmptyPool {
                required,
                available: self.len(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::rating::SkillModel;
    use crate::types::SkillEstimate;
    use std::collections::{BTreeSet, HashMap};

    fn competition(group_size: usize) -> Competition {
        Competition::new(RatingConfig {
            group_size,
            shuffle_seed: Some(1234),
            ..RatingConfig::default()
        })
        .unwrap()
    }

    fn error_of(err: &anyhow::Error) -> &ArenaError {
        err.downcast_ref::<ArenaError>().expect("typed arena error")
    }

    #[test]
    fn test_zero_group_size_rejected() {
        let err = Competition::new(RatingConfig::with_group_size(0)).unwrap_err();
        assert!(matches!(error_of(&err), ArenaError::Validation { .. }));
    }

    #[test]
    fn test_add_contestant_is_idempotent() {
        let mut once = competition(2);
        once.add_contestant("a", Some(serde_json::json!("first")));

        let mut twice = competition(2);
        assert!(twice.add_contestant("a", Some(serde_json::json!("first"))));
        assert!(!twice.add_contestant("a", Some(serde_json::json!("second"))));

        assert_eq!(twice.len(), 1);
        assert_eq!(twice.contestant("a").unwrap().skill, once.contestant("a").unwrap().skill);
        assert_eq!(
            twice.contestant("a").unwrap().payload,
            Some(serde_json::json!("first"))
        );
    }

    #[test]
    fn test_add_does_not_reset_rated_contestant() {
        let mut comp = competition(2);
        comp.add_contestants(["a", "b"]);
        comp.record_match(&["a", "b"], &[0, 1]).unwrap();
        let rated = comp.contestant("a").unwrap().skill;

        assert_eq!(comp.add_contestants(["a", "c"]), 1);
        assert_eq!(comp.contestant("a").unwrap().skill, rated);
        assert_eq!(comp.contestant_ids(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_count_possible_matchups() {
        for (n, k, expected) in [(5, 3, 10), (4, 2, 6), (7, 3, 35), (2, 3, 0), (0, 2, 0), (3, 1, 3)] {
            let mut comp = competition(k);
            comp.add_contestants((0..n).map(|i| i.to_string()));
            assert_eq!(comp.count_possible_matchups(), expected, "n={} k={}", n, k);
        }
    }

    #[test]
    fn test_generate_matchups_covers_all_combinations() {
        for n in 4..=7 {
            for k in [2, 3] {
                let mut comp = competition(k);
                comp.add_contestants((0..n).map(|i| format!("c{}", i)));
                let total = comp.count_possible_matchups() as usize;

                let matchups = comp.generate_matchups(total).unwrap();
                let generated: BTreeSet<BTreeSet<String>> = matchups
                    .iter()
                    .map(|m| m.iter().cloned().collect())
                    .collect();
                let expected: BTreeSet<BTreeSet<String>> = comp
                    .ideal_matchups()
                    .iter()
                    .map(|m| m.iter().cloned().collect())
                    .collect();

                assert_eq!(matchups.len(), total);
                assert_eq!(generated, expected, "n={} k={}", n, k);
                assert!(matchups.iter().all(|m| m.len() == k));
            }
        }
    }

    #[test]
    fn test_generate_twice_the_combinations() {
        let mut comp = competition(3);
        comp.add_contestants(["a", "b", "c", "d", "e", "f"]);
        let total = comp.count_possible_matchups() as usize;

        let matchups = comp.generate_matchups(2 * total).unwrap();
        let mut counts: HashMap<Vec<String>, usize> = HashMap::new();
        for matchup in matchups {
            let mut key = matchup.clone();
            key.sort();
            *counts.entry(key).or_default() += 1;
        }

        assert_eq!(counts.len(), total);
        assert!(counts.values().all(|&c| c == 2));
    }

    #[test]
    fn test_generate_matchups_small_pool() {
        let mut comp = competition(3);
        let err = comp.generate_matchups(2).unwrap_err();
        assert!(matches!(
            error_of(&err),
            ArenaError::EmptyPool {
                required: 3,
                available: 0
            }
        ));

        comp.add_contestants(["a", "b"]);
        assert!(comp.generate_matchups(1).is_err());

        comp.add_contestant("c", None);
        assert!(comp.generate_matchups(0).unwrap().is_empty());
        assert_eq!(comp.generate_matchups(4).unwrap().len(), 4);
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible() {
        let mut first = competition(2);
        let mut second = competition(2);
        for comp in [&mut first, &mut second] {
            comp.add_contestants(["a", "b", "c", "d", "e"]);
        }
        assert_eq!(
            first.generate_matchups(15).unwrap(),
            second.generate_matchups(15).unwrap()
        );
    }

    #[test]
    fn test_winner_ranks_above_loser() {
        let mut comp = competition(2);
        comp.add_contestants(["A", "B"]);

        let report = comp.record_match(&["A", "B"], &[0, 1]).unwrap();
        assert_eq!(report.changes.len(), 2);
        assert!(comp.exposed_skill("A").unwrap() > comp.exposed_skill("B").unwrap());
        assert_eq!(comp.best_id().unwrap(), "A");
        assert_eq!(comp.contestant("A").unwrap().matches_played, 1);
        assert_eq!(comp.matches_recorded(), 1);
    }

    #[test]
    fn test_record_match_length_mismatch() {
        let mut comp = competition(2);
        comp.add_contestants(["A", "B"]);
        let before = comp.snapshot();

        let err = comp.record_match(&["A", "B"], &[0]).unwrap_err();
        assert!(matches!(error_of(&err), ArenaError::Validation { .. }));
        assert_eq!(comp.snapshot(), before);
    }

    #[test]
    fn test_record_match_registers_unknown_contestants() {
        let mut comp = competition(2);
        comp.record_match(&["new-1", "new-2"], &[1, 0]).unwrap();

        assert_eq!(comp.len(), 2);
        assert_eq!(comp.best_id().unwrap(), "new-2");
    }

    /// Calculator that rejects every match
    #[derive(Debug)]
    struct RejectingCalculator;

    impl SkillCalculator for RejectingCalculator {
        fn rate(&self, _group: &[SkillEstimate], _ranks: &[u32]) -> Result<Vec<SkillEstimate>> {
            Err(ArenaError::Internal {
                message: "rating backend unavailable".to_string(),
            }
            .into())
        }

        fn initial_estimate(&self) -> SkillEstimate {
            SkillEstimate::default()
        }

        fn win_probability(&self, _a: &SkillEstimate, _b: &SkillEstimate) -> f64 {
            0.5
        }

        fn model(&self) -> SkillModel {
            SkillModel::TrueSkill
        }
    }

    #[test]
    fn test_failed_rating_leaves_pool_unchanged() {
        let mut comp =
            Competition::with_calculator(RatingConfig::default(), Box::new(RejectingCalculator))
                .unwrap();
        comp.add_contestant("known", None);
        let before = comp.snapshot();

        let err = comp
            .record_match(&["known", "stranger", "stranger"], &[0, 1, 2])
            .unwrap_err();
        assert!(matches!(error_of(&err), ArenaError::Internal { .. }));

        assert_eq!(comp.len(), 1);
        assert!(comp.contestant("stranger").is_none());
        assert_eq!(comp.snapshot(), before);
        assert_eq!(comp.matches_recorded(), 0);
    }

    #[test]
    fn test_draw_narrows_gap_without_reordering() {
        let mut comp = Competition::restore(
            RatingConfig::default(),
            vec![
                ContestantSnapshot {
                    id: "A".to_string(),
                    mean: 35.0,
                    uncertainty: 3.0,
                    matches_played: 20,
                    payload: None,
                },
                ContestantSnapshot {
                    id: "B".to_string(),
                    mean: 20.0,
                    uncertainty: 3.0,
                    matches_played: 20,
                    payload: None,
                },
            ],
        )
        .unwrap();

        let gap_before = comp.exposed_skill("A").unwrap() - comp.exposed_skill("B").unwrap();
        comp.record_match(&["A", "B"], &[0, 0]).unwrap();
        let gap_after = comp.exposed_skill("A").unwrap() - comp.exposed_skill("B").unwrap();

        assert!(gap_after < gap_before);
        assert!(gap_after > 0.0);
        assert_eq!(comp.best_id().unwrap(), "A");
        assert!(comp.contestant("A").unwrap().skill.uncertainty < 3.0);
        assert!(comp.contestant("B").unwrap().skill.uncertainty < 3.0);
    }

    #[test]
    fn test_repeated_contestant_updated_once() {
        let mut comp = competition(3);
        comp.add_contestants(["A", "B"]);
        let prior = comp.contestant("A").unwrap().skill;

        let report = comp.record_match(&["A", "A", "B"], &[0, 1, 2]).unwrap();

        assert_eq!(comp.len(), 2);
        assert_eq!(report.changes.len(), 2);
        let change_a = &report.changes[0];
        assert_eq!(change_a.contestant_id, "A");
        assert_eq!(change_a.occurrences, 2);
        assert_eq!(change_a.best_rank, 0);
        assert_eq!(change_a.old_skill, prior);
        assert_eq!(comp.contestant("A").unwrap().matches_played, 1);

        // Combined evidence of both positions, rated against the same snapshot
        let posteriors = comp
            .calculator()
            .rate(&[prior, prior, prior], &[0, 1, 2])
            .unwrap();
        let expected = fuse_posteriors(prior, &posteriors[..2]);
        assert_eq!(comp.contestant("A").unwrap().skill, expected);
        assert!(comp.exposed_skill("A").unwrap() > comp.exposed_skill("B").unwrap());
    }

    #[test]
    fn test_repeated_contestant_order_independent() {
        let mut forward = competition(3);
        let mut backward = competition(3);
        forward.record_match(&["A", "A", "B"], &[0, 2, 1]).unwrap();
        backward.record_match(&["A", "B", "A"], &[2, 1, 0]).unwrap();

        let a = forward.contestant("A").unwrap().skill;
        let b = backward.contestant("A").unwrap().skill;
        assert!((a.mean - b.mean).abs() < 1e-9);
        assert!((a.uncertainty - b.uncertainty).abs() < 1e-9);
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut comp = competition(3);
        comp.add_contestants(["a", "b", "c", "d", "e"]);

        comp.record_match(&["a", "a", "c"], &[0, 1, 2]).unwrap();
        comp.record_match(&["a", "a", "b"], &[1, 0, 2]).unwrap();
        comp.record_match(&["a", "a", "e"], &[1, 2, 0]).unwrap();

        let leaderboard = comp.leaderboard();
        assert_eq!(leaderboard.len(), 5);
        assert_eq!(leaderboard[0].contestant_id, "a");
        assert_eq!(comp.best_id().unwrap(), "a");
        assert_eq!(comp.contestant("a").unwrap().matches_played, 3);
    }

    #[test]
    fn test_leaderboard_tie_break_by_id() {
        let mut comp = competition(2);
        comp.add_contestants(["zeta", "alpha", "mid"]);

        let ids: Vec<_> = comp
            .leaderboard()
            .into_iter()
            .map(|s| s.contestant_id)
            .collect();
        assert_eq!(ids, vec!["alpha", "mid", "zeta"]);
        assert_eq!(comp.leaderboard()[2].position, 2);
    }

    #[test]
    fn test_best_on_empty_pool() {
        let comp = competition(2);
        let err = comp.best().unwrap_err();
        assert!(matches!(error_of(&err), ArenaError::EmptyPool { .. }));
        assert!(comp.best_id().is_err());
        assert!(comp.leaderboard().is_empty());
    }

    #[test]
    fn test_unknown_contestant_queries() {
        let comp = competition(2);
        let err = comp.exposed_skill("ghost").unwrap_err();
        assert!(matches!(error_of(&err), ArenaError::UnknownContestant { .. }));
        assert!(comp.win_probability("ghost", "other").is_err());
    }

    #[test]
    fn test_snapshot_restore_preserves_state() {
        let mut comp = competition(2);
        comp.add_contestant("a", Some(serde_json::json!({"title": "First"})));
        comp.add_contestants(["b", "c"]);
        comp.record_match(&["a", "b"], &[0, 1]).unwrap();

        let snapshot = comp.snapshot();
        let restored = Competition::restore(comp.config().clone(), snapshot.clone()).unwrap();

        assert_eq!(restored.contestant_ids(), comp.contestant_ids());
        assert_eq!(restored.snapshot(), snapshot);
        assert_eq!(restored.leaderboard(), comp.leaderboard());
    }

    #[test]
    fn test_restore_rejects_bad_snapshots() {
        let entry = ContestantSnapshot {
            id: "a".to_string(),
            mean: 25.0,
            uncertainty: 8.0,
            matches_played: 0,
            payload: None,
        };
        assert!(Competition::restore(RatingConfig::default(), vec![entry.clone(), entry.clone()]).is_err());

        let broken = ContestantSnapshot {
            uncertainty: -1.0,
            ..entry
        };
        assert!(Competition::restore(RatingConfig::default(), vec![broken]).is_err());
    }

    #[test]
    fn test_weng_lin_model_competition() {
        let mut comp = Competition::new(RatingConfig {
            model: SkillModel::WengLin,
            group_size: 3,
            ..RatingConfig::default()
        })
        .unwrap();
        comp.add_contestants(["x", "y", "z"]);
        comp.record_match(&["x", "y", "z"], &[0, 1, 2]).unwrap();
        comp.record_match(&["x", "x", "z"], &[0, 1, 2]).unwrap();

        assert_eq!(comp.best_id().unwrap(), "x");
        assert_eq!(comp.len(), 3);
    }

    #[test]
    fn test_shared_first_place_competition() {
        let mut comp = Competition::new(RatingConfig {
            group_size: 3,
            draw_probability: 0.1,
            ..RatingConfig::default()
        })
        .unwrap();
        comp.record_match(&["p", "q", "r"], &[0, 0, 1]).unwrap();

        assert!(comp.exposed_skill("r").unwrap() < comp.exposed_skill("p").unwrap());
        assert!(comp.win_probability("p", "r").unwrap() > 0.5);
    }

    #[test]
    fn test_custom_calculator_injection() {
        let config = RatingConfig {
            initial_mean: 100.0,
            ..RatingConfig::default()
        };
        let calculator = build_calculator(&config).unwrap();
        let mut comp = Competition::with_calculator(config, calculator).unwrap();
        comp.add_contestant("solo", None);
        assert_eq!(comp.contestant("solo").unwrap().skill, SkillEstimate::new(100.0, 25.0 / 3.0));
    }
}
