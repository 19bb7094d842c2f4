//! Weng-Lin (OpenSkill) skill calculator
//!
//! This module provides a concrete implementation of the skill calculator
//! using the Weng-Lin algorithm from the skillratings crate, with every
//! position of a match treated as a one-contestant team.

use crate::config::rating::{RatingConfig, SkillModel};
use crate::error::{ArenaError, Result};
use crate::rating::calculator::{validate_match, SkillCalculator};
use crate::types::SkillEstimate;
use skillratings::weng_lin::{weng_lin_multi_team, WengLinConfig, WengLinRating};
use skillratings::MultiTeamOutcome;
use tracing::warn;

/// Weng-Lin skill calculator implementation
#[derive(Debug)]
pub struct WengLinCalculator {
    weng_lin_config: WengLinConfig,
    initial: SkillEstimate,
}

impl WengLinCalculator {
    /// Create a new Weng-Lin calculator
    ///
    /// The draw probability of the configuration is not used: the model
    /// scores tied positions as half a win on its own.
    pub fn new(config: &RatingConfig) -> Result<Self> {
        config.validate()?;

        if config.draw_probability > 0.0 {
            warn!(
                draw_probability = config.draw_probability,
                "Weng-Lin model ignores the configured draw probability"
            );
        }

        Ok(Self {
            weng_lin_config: WengLinConfig {
                beta: config.beta,
                uncertainty_tolerance: 0.000_001,
            },
            initial: SkillEstimate::new(config.initial_mean, config.initial_uncertainty),
        })
    }
}

impl SkillCalculator for WengLinCalculator {
    fn rate(&self, group: &[SkillEstimate], ranks: &[u32]) -> Result<Vec<SkillEstimate>> {
        validate_match(group.len(), ranks)?;

        // One single-contestant team per position, ranked 1 = first place
        let teams: Vec<[WengLinRating; 1]> = group.iter().map(|e| [(*e).into()]).collect();
        let teams_and_ranks: Vec<(&[WengLinRating], MultiTeamOutcome)> = teams
            .iter()
            .zip(ranks)
            .map(|(team, &rank)| {
                (
                    team.as_slice(),
                    MultiTeamOutcome::new(rank as usize + 1),
                )
            })
            .collect();

        let new_ratings = weng_lin_multi_team(&teams_and_ranks, &self.weng_lin_config);

        if new_ratings.len() != group.len() {
            return Err(ArenaError::Internal {
                message: format!(
                    "Weng-Lin returned {} teams for {} positions",
                    new_ratings.len(),
                    group.len()
                ),
            }
            .into());
        }

        new_ratings
            .into_iter()
            .map(|team| {
                team.first()
                    .copied()
                    .map(SkillEstimate::from)
                    .ok_or_else(|| {
                        anyhow::Error::from(ArenaError::Internal {
                            message: "Weng-Lin returned an empty team".to_string(),
                        })
                    })
            })
            .collect()
    }

    fn initial_estimate(&self) -> SkillEstimate {
        self.initial
    }

    fn win_probability(&self, a: &SkillEstimate, b: &SkillEstimate) -> f64 {
        let (expected_a, _expected_b) = skillratings::weng_lin::expected_score(
            &(*a).into(),
            &(*b).into(),
            &self.weng_lin_config,
        );
        expected_a
    }

    fn model(&self) -> SkillModel {
        SkillModel::WengLin
    }
}
