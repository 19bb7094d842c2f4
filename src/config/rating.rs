//! Rating engine configuration

use crate::error::{ArenaError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Skill update algorithm used by a competition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillModel {
    /// TrueSkill factor-graph updates with a draw margin
    TrueSkill,
    /// Weng-Lin (OpenSkill) updates from the skillratings crate
    WengLin,
}

impl fmt::Display for SkillModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkillModel::TrueSkill => write!(f, "true_skill"),
            SkillModel::WengLin => write!(f, "weng_lin"),
        }
    }
}

impl FromStr for SkillModel {
    type Err = ArenaError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "true_skill" | "trueskill" | "true-skill" => Ok(SkillModel::TrueSkill),
            "weng_lin" | "weng-lin" | "openskill" => Ok(SkillModel::WengLin),
            other => Err(ArenaError::configuration(format!(
                "Unknown skill model: {}",
                other
            ))),
        }
    }
}

/// Configuration of one competition (one pool of candidates)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Number of contestants per generated matchup
    pub group_size: usize,
    /// Probability that two equally skilled contestants are judged a tie
    pub draw_probability: f64,
    pub model: SkillModel,
    /// Prior mean for new contestants
    pub initial_mean: f64,
    /// Prior uncertainty (standard deviation) for new contestants
    pub initial_uncertainty: f64,
    /// Performance noise: skill distance giving roughly 76% win chance
    pub beta: f64,
    /// Multiple of uncertainty subtracted from the mean for ranking
    pub exposure_factor: f64,
    /// Seed for matchup shuffling; entropy when absent
    pub shuffle_seed: Option<u64>,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            group_size: 2,
            draw_probability: 0.0,
            model: SkillModel::TrueSkill,
            initial_mean: 25.0,
            initial_uncertainty: 25.0 / 3.0,
            beta: 25.0 / 6.0,
            exposure_factor: 3.0,
            shuffle_seed: None,
        }
    }
}

impl RatingConfig {
    /// Default configuration with the given group size
    pub fn with_group_size(group_size: usize) -> Self {
        Self {
            group_size,
            ..Self::default()
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.group_size == 0 {
            return Err(ArenaError::validation("Group size must be at least 1").into());
        }

        if !(0.0..1.0).contains(&self.draw_probability) {
            return Err(ArenaError::validation(format!(
                "Draw probability must be in [0, 1), got {}",
                self.draw_probability
            ))
            .into());
        }

        if !(self.initial_uncertainty > 0.0) {
            return Err(
                ArenaError::configuration("Initial uncertainty must be positive").into(),
            );
        }

        if !(self.beta > 0.0) {
            return Err(ArenaError::configuration("Beta must be positive").into());
        }

        if !self.initial_mean.is_finite() {
            return Err(ArenaError::configuration("Initial mean must be finite").into());
        }

        if !(self.exposure_factor >= 0.0) {
            return Err(
                ArenaError::configuration("Exposure factor must be non-negative").into(),
            );
        }

        Ok(())
    }
}
