//! Configuration management for crowd-arena
//!
//! This module handles configuration loading from TOML files and environment
//! variables, validation, and default values for the engine and pipeline.

pub mod app;
pub mod rating;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, PipelineSettings, ServiceSettings};
pub use rating::{RatingConfig, SkillModel};
