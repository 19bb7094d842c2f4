//! Skill rating algorithms
//!
//! This module provides skill estimate updates from observed group rankings:
//! TrueSkill and Weng-Lin from the skillratings crate, behind one calculator
//! trait.

pub mod calculator;
pub mod trueskill;
pub mod weng_lin;

// Re-export commonly used types
pub use calculator::{build_calculator, fuse_posteriors, SkillCalculator};
pub use trueskill::TrueSkillCalculator;
pub use weng_lin::WengLinCalculator;
