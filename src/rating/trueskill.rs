//! TrueSkill skill calculator
//!
//! Delegates to the factor-graph implementation of the skillratings crate,
//! with every position of a match treated as a one-contestant team. Ranks
//! are chained in sorted order and equal ranks are scored as draws inside
//! the configured draw margin.

use crate::config::rating::{RatingConfig, SkillModel};
use crate::error::{ArenaError, Result};
use crate::rating::calculator::{validate_match, SkillCalculator};
use crate::types::SkillEstimate;
use skillratings::trueskill::{
    expected_score, match_quality_multi_team, trueskill_multi_team, TrueSkillConfig,
    TrueSkillRating,
};
use skillratings::MultiTeamOutcome;
use tracing::trace;

/// Smallest draw probability used when a ranking contains ties
///
/// A zero draw margin turns a tie into a point constraint the factor graph
/// cannot divide through.
const MIN_TIE_DRAW_PROBABILITY: f64 = 0.01;

/// TrueSkill calculator implementation
#[derive(Debug)]
pub struct TrueSkillCalculator {
    trueskill_config: TrueSkillConfig,
    initial: SkillEstimate,
}

impl TrueSkillCalculator {
    /// Create a new calculator from a rating configuration
    pub fn new(config: &RatingConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            trueskill_config: TrueSkillConfig {
                draw_probability: config.draw_probability,
                beta: config.beta,
                default_dynamics: config.initial_uncertainty / 100.0,
            },
            initial: SkillEstimate::new(config.initial_mean, config.initial_uncertainty),
        })
    }

    pub fn trueskill_config(&self) -> &TrueSkillConfig {
        &self.trueskill_config
    }

    /// Configuration used for one match; ties need a non-zero draw margin
    fn config_for(&self, ranks: &[u32]) -> TrueSkillConfig {
        let mut sorted = ranks.to_vec();
        sorted.sort_unstable();
        let has_ties = sorted.windows(2).any(|pair| pair[0] == pair[1]);

        if has_ties && self.trueskill_config.draw_probability < MIN_TIE_DRAW_PROBABILITY {
            TrueSkillConfig {
                draw_probability: MIN_TIE_DRAW_PROBABILITY,
                ..self.trueskill_config
            }
        } else {
            self.trueskill_config
        }
    }
}

impl SkillCalculator for TrueSkillCalculator {
    fn rate(&self, group: &[SkillEstimate], ranks: &[u32]) -> Result<Vec<SkillEstimate>> {
        validate_match(group.len(), ranks)?;

        if let Some(bad) = group
            .iter()
            .find(|e| !e.mean.is_finite() || !(e.uncertainty > 0.0) || !e.uncertainty.is_finite())
        {
            return Err(ArenaError::validation(format!(
                "Cannot rate estimate with mean {} and uncertainty {}",
                bad.mean, bad.uncertainty
            ))
            .into());
        }

        // One single-contestant team per position, ranked 1 = first place
        let teams: Vec<[TrueSkillRating; 1]> = group.iter().map(|e| [(*e).into()]).collect();
        let teams_and_ranks: Vec<(&[TrueSkillRating], MultiTeamOutcome)> = teams
            .iter()
            .zip(ranks)
            .map(|(team, &rank)| (team.as_slice(), MultiTeamOutcome::new(rank as usize + 1)))
            .collect();

        let config = self.config_for(ranks);
        let new_ratings = trueskill_multi_team(&teams_and_ranks, &config);

        if new_ratings.len() != group.len() {
            return Err(ArenaError::Internal {
                message: format!(
                    "TrueSkill returned {} teams for {} positions",
                    new_ratings.len(),
                    group.len()
                ),
            }
            .into());
        }

        let posteriors = new_ratings
            .into_iter()
            .map(|team| {
                team.first()
                    .copied()
                    .map(SkillEstimate::from)
                    .ok_or_else(|| {
                        anyhow::Error::from(ArenaError::Internal {
                            message: "TrueSkill returned an empty team".to_string(),
                        })
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        if posteriors
            .iter()
            .any(|p| !p.mean.is_finite() || !p.uncertainty.is_finite())
        {
            return Err(ArenaError::Internal {
                message: "TrueSkill update produced a non-finite estimate".to_string(),
            }
            .into());
        }

        trace!(
            positions = group.len(),
            draw_probability = config.draw_probability,
            "Applied TrueSkill update"
        );
        Ok(posteriors)
    }

    fn initial_estimate(&self) -> SkillEstimate {
        self.initial
    }

    fn win_probability(&self, a: &SkillEstimate, b: &SkillEstimate) -> f64 {
        let (expected_a, _expected_b) =
            expected_score(&(*a).into(), &(*b).into(), &self.trueskill_config);
        expected_a
    }

    fn model(&self) -> SkillModel {
        SkillModel::TrueSkill
    }

    fn match_quality(&self, group: &[SkillEstimate]) -> f64 {
        if group.len() < 2 {
            return 0.0;
        }

        let teams: Vec<[TrueSkillRating; 1]> = group.iter().map(|e| [(*e).into()]).collect();
        let team_refs: Vec<&[TrueSkillRating]> = teams.iter().map(|t| t.as_slice()).collect();
        match_quality_multi_team(&team_refs, &self.trueskill_config)
    }
}
