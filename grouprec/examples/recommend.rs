use anyhow::Result;
use clap::Parser;
use grouprec::{store::JsonFileStore, JobOutcome, RecommendationEngine, ServiceContext};
use grouprec_candle_agent::Device;
use grouprec_env::RecEnvConfig;
use log::info;
use std::path::Path;

/// Generate group and event recommendations from a JSON snapshot of the store
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON file with users, groups, memberships, events and user interests
    #[arg(long)]
    snapshot: String,

    /// JSON file where recommendations are written
    #[arg(long, default_value = "recommendations.json")]
    output: String,

    /// Directory of the trained model
    #[arg(long, default_value = "./model/dqn")]
    model_dir: String,

    /// Seed of the environment used in training
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of group recommendations per user
    #[arg(long, default_value_t = 8)]
    top_k: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let env_config = RecEnvConfig::load(Path::new(&args.model_dir).join("env_config.yaml"))?;
    let engine = RecommendationEngine::new(&env_config, args.seed, &args.model_dir, Device::Cpu)?;
    let ctx = ServiceContext::new(engine);
    let mut store = JsonFileStore::open(&args.snapshot, &args.output)?;

    // Separate handle for reading, the sink is borrowed mutably.
    let source = JsonFileStore::open(&args.snapshot, &args.output)?;
    let outcome = ctx.run_job(&source, &mut store, args.top_k);
    info!("{}", serde_json::to_string_pretty(&ctx.status())?);

    match outcome {
        JobOutcome::Failed(msg) => anyhow::bail!(msg),
        _ => Ok(()),
    }
}
