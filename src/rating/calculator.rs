//! Skill calculator trait and shared update helpers
//!
//! This module defines the interface every skill update algorithm implements
//! and the posterior fusion used when one contestant fills several positions
//! of the same match.

use crate::config::rating::{RatingConfig, SkillModel};
use crate::error::{ArenaError, Result};
use crate::rating::trueskill::TrueSkillCalculator;
use crate::rating::weng_lin::WengLinCalculator;
use crate::types::SkillEstimate;

/// Trait for updating skill estimates from an observed group ranking
pub trait SkillCalculator: Send + Sync + std::fmt::Debug {
    /// Compute posterior estimates for every position of a match
    ///
    /// # Arguments
    /// * `group` - Pre-match estimate of each position
    /// * `ranks` - Placement of each position, lower is better, equal values tie
    ///
    /// # Returns
    /// One posterior per position, aligned with `group`
    fn rate(&self, group: &[SkillEstimate], ranks: &[u32]) -> Result<Vec<SkillEstimate>>;

    /// Prior estimate for a contestant with no recorded matches
    fn initial_estimate(&self) -> SkillEstimate;

    /// Probability that `a` outperforms `b` under current beliefs
    fn win_probability(&self, a: &SkillEstimate, b: &SkillEstimate) -> f64;

    /// Algorithm implemented by this calculator
    fn model(&self) -> SkillModel;

    /// Quality of a prospective match (0.0 to 1.0, higher means closer contests)
    fn match_quality(&self, group: &[SkillEstimate]) -> f64 {
        if group.len() < 2 {
            return 0.0;
        }

        let mut total = 0.0;
        let mut pairs = 0usize;
        for i in 0..group.len() {
            for j in (i + 1)..group.len() {
                let p = self.win_probability(&group[i], &group[j]);
                total += 1.0 - (2.0 * p - 1.0).abs();
                pairs += 1;
            }
        }

        total / pairs as f64
    }
}

/// Build the calculator selected by a rating configuration
pub fn build_calculator(config: &RatingConfig) -> Result<Box<dyn SkillCalculator>> {
    config.validate()?;

    Ok(match config.model {
        SkillModel::TrueSkill => Box::new(TrueSkillCalculator::new(config)?),
        SkillModel::WengLin => Box::new(WengLinCalculator::new(config)?),
    })
}

/// Check the shape of a match before handing it to a calculator
pub fn validate_match(group_len: usize, ranks: &[u32]) -> Result<()> {
    if group_len != ranks.len() {
        return Err(ArenaError::validation(format!(
            "{} ranks given for {} participants",
            ranks.len(),
            group_len
        ))
        .into());
    }

    if group_len < 2 {
        return Err(ArenaError::validation(format!(
            "A match needs at least 2 participants, got {}",
            group_len
        ))
        .into());
    }

    Ok(())
}

/// Combine the posteriors of several positions held by one contestant
///
/// Each posterior is the prior conditioned on one position's outcome. Their
/// evidence is merged by adding each position's gain in precision and
/// precision-weighted mean to the prior, so the result does not depend on the
/// order of the positions.
pub fn fuse_posteriors(prior: SkillEstimate, posteriors: &[SkillEstimate]) -> SkillEstimate {
    match posteriors {
        [] => prior,
        [single] => *single,
        _ => {
            let prior_precision = 1.0 / prior.variance();
            let prior_weighted_mean = prior.mean * prior_precision;

            let mut precision = prior_precision;
            let mut weighted_mean = prior_weighted_mean;
            for posterior in posteriors {
                let posterior_precision = 1.0 / posterior.variance();
                precision += posterior_precision - prior_precision;
                weighted_mean += posterior.mean * posterior_precision - prior_weighted_mean;
            }

            if precision.is_finite() && precision > 0.0 && weighted_mean.is_finite() {
                SkillEstimate::new(weighted_mean / precision, precision.recip().sqrt())
            } else {
                // Posteriors that widened the belief; average instead of inverting
                let n = posteriors.len() as f64;
                SkillEstimate::new(
                    posteriors.iter().map(|p| p.mean).sum::<f64>() / n,
                    posteriors
                        .iter()
                        .map(|p| p.uncertainty)
                        .fold(f64::INFINITY, f64::min),
                )
            }
        }
    }
}
