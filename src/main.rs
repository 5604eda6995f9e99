//! Headless match runner
//!
//! Loads the knowledge base, a scenario and an engine config, plays a full
//! match with random agents for every party, and prints the final status as
//! JSON.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use weimar_engine::agent::{MatchDriver, MatchSummary};
use weimar_engine::core::config::EngineConfig;
use weimar_engine::core::error::Result;
use weimar_engine::engine::{GameEngine, StatusSnapshot};
use weimar_engine::knowledge::load_knowledge_dir;
use weimar_engine::scenario::Scenario;

/// Weimar engine - headless match with random agents
#[derive(Parser, Debug)]
#[command(name = "weimar-engine")]
#[command(about = "Play a headless match with random agents and print the final status as JSON")]
struct Args {
    /// Directory holding parties.json, cities.json, units.json and threats.json
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Scenario file
    #[arg(long, default_value = "data/scenarios/main_scenario.json")]
    scenario: PathBuf,

    /// Engine config (TOML)
    #[arg(long, default_value = "data/engine.toml")]
    config: PathBuf,

    /// Ignore --config and use the built-in defaults
    #[arg(long)]
    builtin_config: bool,

    /// Seed for scenario randomness and agents; overrides the config
    #[arg(long)]
    seed: Option<u64>,

    /// Driver steps before giving up
    #[arg(long, default_value_t = 100_000)]
    max_steps: usize,

    /// Log at debug level
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct RunReport {
    seed: u64,
    summary: MatchSummary,
    abort_cause: Option<String>,
    status: StatusSnapshot,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "weimar_engine=debug"
    } else {
        "weimar_engine=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with_writer(std::io::stderr)
        .init();

    let mut config = if args.builtin_config {
        EngineConfig::default()
    } else {
        EngineConfig::load(&args.config)?
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    let seed = config.seed;

    let knowledge = Arc::new(load_knowledge_dir(&args.data_dir)?);
    let scenario = Scenario::load(&args.scenario)?;
    let mut engine = GameEngine::new(knowledge, &scenario, config)?;

    let summary = MatchDriver::with_random_agents(&mut engine, seed)
        .with_max_steps(args.max_steps)
        .run();
    let summary = match summary {
        Ok(summary) => summary,
        Err(err) => {
            tracing::error!("match failed: {}", err);
            return Err(err);
        }
    };

    tracing::info!(
        "match ended after {} steps in round {}: {:?}",
        summary.steps,
        summary.round,
        summary.end
    );

    let report = RunReport {
        seed,
        summary,
        abort_cause: engine.abort_cause().map(str::to_string),
        status: engine.status(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
