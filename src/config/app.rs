//! Main application configuration
//!
//! This module defines the primary configuration structures for crowd-arena,
//! including TOML file loading, environment variable overrides and validation.

use crate::config::rating::RatingConfig;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub rating: RatingConfig,
    pub pipeline: PipelineSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Settings for the task pipeline driving a competition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Matchups issued as tasks per round
    pub matchups_per_round: usize,
    /// Upper bound on rounds before a winner is declared anyway
    pub max_rounds: usize,
    /// Recorded matches required before a winner is selected
    pub min_matches_for_winner: usize,
    /// Time a task may stay pending before it is abandoned
    pub task_timeout_seconds: u64,
    /// Delay between polls of pending tasks
    pub poll_interval_ms: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "crowd-arena".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            matchups_per_round: 10,
            max_rounds: 5,
            min_matches_for_winner: 10,
            task_timeout_seconds: 3 * 24 * 60 * 60, // 3 days
            poll_interval_ms: 30_000,
        }
    }
}

impl PipelineSettings {
    /// Get task timeout as Duration
    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_seconds)
    }

    /// Get poll interval as Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| anyhow!("Invalid {} value: {}", name, value))
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Rating settings
        if let Ok(group_size) = env::var("GROUP_SIZE") {
            self.rating.group_size = parse_var("GROUP_SIZE", &group_size)?;
        }
        if let Ok(draw) = env::var("DRAW_PROBABILITY") {
            self.rating.draw_probability = parse_var("DRAW_PROBABILITY", &draw)?;
        }
        if let Ok(model) = env::var("SKILL_MODEL") {
            self.rating.model = model.parse()?;
        }
        if let Ok(seed) = env::var("SHUFFLE_SEED") {
            self.rating.shuffle_seed = Some(parse_var("SHUFFLE_SEED", &seed)?);
        }

        // Pipeline settings
        if let Ok(matchups) = env::var("MATCHUPS_PER_ROUND") {
            self.pipeline.matchups_per_round = parse_var("MATCHUPS_PER_ROUND", &matchups)?;
        }
        if let Ok(rounds) = env::var("MAX_ROUNDS") {
            self.pipeline.max_rounds = parse_var("MAX_ROUNDS", &rounds)?;
        }
        if let Ok(min_matches) = env::var("MIN_MATCHES_FOR_WINNER") {
            self.pipeline.min_matches_for_winner =
                parse_var("MIN_MATCHES_FOR_WINNER", &min_matches)?;
        }
        if let Ok(timeout) = env::var("TASK_TIMEOUT_SECONDS") {
            self.pipeline.task_timeout_seconds = parse_var("TASK_TIMEOUT_SECONDS", &timeout)?;
        }
        if let Ok(interval) = env::var("POLL_INTERVAL_MS") {
            self.pipeline.poll_interval_ms = parse_var("POLL_INTERVAL_MS", &interval)?;
        }

        Ok(())
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    config.rating.validate()?;

    // Validate pipeline settings
    if config.pipeline.matchups_per_round == 0 {
        return Err(anyhow!("Matchups per round must be greater than 0"));
    }
    if config.pipeline.max_rounds == 0 {
        return Err(anyhow!("Max rounds must be greater than 0"));
    }
    if config.pipeline.task_timeout_seconds == 0 {
        return Err(anyhow!("Task timeout must be greater than 0"));
    }
    if config.pipeline.poll_interval_ms == 0 {
        return Err(anyhow!("Poll interval must be greater than 0"));
    }

    Ok(())
}
