//! Command line entry point for crowd-arena
//!
//! Runs a contest between generated candidates against a simulated crowd
//! and prints the final leaderboard. With `--collect` the candidates are
//! first gathered from the crowd as free-text submissions. Useful for trying
//! rating settings before spending money on a real marketplace.

use anyhow::Result;
use clap::Parser;
use crowd_arena::config::AppConfig;
use crowd_arena::config::validate_config;
use crowd_arena::pipeline::simulated::QUALITY_KEY;
use crowd_arena::{
    CollectionStage, Competition, ContestRunner, InMemoryContestStore, SimulatedCrowd, StageChain,
    Standing,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

/// Crowd Arena - rank candidates from crowd-judged comparisons
#[derive(Parser)]
#[command(
    name = "crowd-arena",
    version,
    about = "Rank candidates from small-group comparisons judged by a crowd",
    long_about = "Crowd Arena keeps a Gaussian skill estimate per candidate, proposes balanced \
                 comparison groups and updates the estimates from the rankings workers return. \
                 This binary runs a contest against a simulated crowd."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(long, help = "Validate configuration and exit without running a contest")]
    dry_run: bool,

    /// Number of simulated candidates
    #[arg(long, value_name = "N", default_value_t = 8)]
    candidates: usize,

    /// Seed for candidate qualities, worker noise and matchup shuffling
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Maximum number of rounds override
    #[arg(long, value_name = "N")]
    rounds: Option<usize>,

    /// Standard deviation of simulated worker noise
    #[arg(long, value_name = "SIGMA", default_value_t = 10.0)]
    noise: f64,

    /// Collect the candidates from the crowd with this prompt first
    #[arg(long, value_name = "PROMPT")]
    collect: Option<String>,

    /// Longest submission the collection stage accepts
    #[arg(long, value_name = "CHARS", default_value_t = 100)]
    max_length: usize,

    /// Print Prometheus metrics after the run
    #[arg(long)]
    metrics: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Display startup banner with contest settings
fn display_startup_banner(config: &AppConfig, args: &Args) {
    info!("Crowd Arena {}", crowd_arena::VERSION);
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!("   Model: {}", config.rating.model);
    info!("   Group size: {}", config.rating.group_size);
    info!("   Draw probability: {}", config.rating.draw_probability);
    info!(
        "   Rounds: up to {} x {} matchups",
        config.pipeline.max_rounds, config.pipeline.matchups_per_round
    );
    info!("   Candidates: {}", args.candidates);
    if let Some(prompt) = &args.collect {
        info!("   Collection prompt: {}", prompt);
    }
}

/// Load configuration and apply command line overrides
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(rounds) = args.rounds {
        config.pipeline.max_rounds = rounds;
    }

    if let Some(seed) = args.seed {
        config.rating.shuffle_seed = Some(seed);
    }

    validate_config(&config)?;
    Ok(config)
}

fn print_leaderboard(standings: &[Standing], runner: &ContestRunner) {
    println!(
        "{:>4}  {:<16} {:>9} {:>9} {:>9} {:>8} {:>9}",
        "#", "candidate", "exposed", "mean", "sigma", "matches", "quality"
    );
    for standing in standings {
        let quality = runner
            .competition()
            .contestant(&standing.contestant_id)
            .and_then(|c| c.payload.as_ref())
            .and_then(|p| p.get(QUALITY_KEY))
            .and_then(|q| q.as_f64())
            .map(|q| format!("{:.1}", q))
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:>4}  {:<16} {:>9.3} {:>9.3} {:>9.3} {:>8} {:>9}",
            standing.position + 1,
            standing.contestant_id,
            standing.exposed_skill,
            standing.mean,
            standing.uncertainty,
            standing.matches_played,
            quality
        );
    }
}

async fn run_contest(config: AppConfig, args: &Args) -> Result<()> {
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    info!(seed, "Generating simulated candidates");

    let candidates: Vec<_> = (1..=args.candidates)
        .map(|i| {
            let quality: f64 = rng.gen_range(0.0..100.0);
            let mut payload = json!({ "text": format!("Candidate {}", i) });
            payload[QUALITY_KEY] = json!(quality);
            (format!("candidate-{:02}", i), Some(payload))
        })
        .collect();

    let crowd = Arc::new(SimulatedCrowd::new(seed).with_noise(args.noise));
    let store = Arc::new(InMemoryContestStore::new());
    let competition = Competition::new(config.rating.clone())?;

    let mut runner = ContestRunner::new(competition, crowd, store, config.pipeline.clone())?;
    runner.add_candidates(candidates);
    let run_id = runner.run_id();

    let outcome = tokio::select! {
        result = runner.run() => result,
        _ = signal::ctrl_c() => {
            warn!(run_id = %run_id, "Interrupted, stopping after the last saved round");
            return Ok(());
        }
    };

    let winner = outcome?;
    info!(
        winner = %winner.contestant_id,
        exposed_skill = winner.exposed_skill,
        "Winner selected"
    );

    print_leaderboard(&runner.competition().leaderboard(), &runner);

    if args.metrics {
        println!();
        print!("{}", runner.metrics().gather_text()?);
    }
    Ok(())
}

async fn run_chain(config: AppConfig, args: &Args, prompt: &str) -> Result<()> {
    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, "Collecting simulated submissions");

    let max_length = args.max_length;
    let stage = CollectionStage::new(prompt, args.candidates).with_acceptance(
        move |text| text.len() <= max_length,
        format!("Submissions must be at most {} characters", max_length),
    );
    let crowd = Arc::new(SimulatedCrowd::new(seed).with_noise(args.noise));
    let store = Arc::new(InMemoryContestStore::new());
    let chain = StageChain::new(stage, config.rating, config.pipeline, crowd, store)?;

    let outcome = tokio::select! {
        result = chain.run() => result,
        _ = signal::ctrl_c() => {
            warn!("Interrupted, stopping the stage chain");
            return Ok(());
        }
    };

    let outcome = outcome?;
    println!(
        "run {}: {} accepted, {} rejected, {} failed",
        outcome.run_id,
        outcome.collection.accepted.len(),
        outcome.collection.rejected,
        outcome.collection.tasks_failed
    );
    println!(
        "winner: {} (exposed {:.3}, {} matches)",
        outcome.winner.contestant_id, outcome.winner.exposed_skill, outcome.winner.matches_played
    );

    if args.metrics {
        println!();
        print!("{}", chain.metrics().gather_text()?);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    display_startup_banner(&config, &args);

    if args.dry_run {
        info!("Dry run completed - configuration is valid");
        return Ok(());
    }

    let result = match args.collect.clone() {
        Some(prompt) => run_chain(config, &args, &prompt).await,
        None => run_contest(config, &args).await,
    };
    if let Err(e) = result {
        error!("Contest failed: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
