use anyhow::Result;
use clap::Parser;
use grouprec_core::{DefaultEvaluator, Env, Evaluator, RandomPolicy};
use grouprec_env::{RecEnv, RecEnvConfig};
use log::info;

/// Evaluate the uniformly random policy on the simulated recommendation environment
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of episodes
    #[arg(long, default_value_t = 300)]
    num_episodes: usize,

    /// Seed of the environment
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Seed of the policy
    #[arg(long, default_value_t = 0)]
    policy_seed: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let env_config = RecEnvConfig::default()
        .num_groups(50)
        .num_users(200)
        .embed_dim(8)
        .seq_len(5)
        .max_steps(20);
    let env = RecEnv::build(&env_config, Some(args.seed))?;
    let encoder = env.encoder();
    let mut policy = RandomPolicy::new(env_config.num_groups, args.policy_seed);
    let record = DefaultEvaluator::new(env, encoder, args.num_episodes)?.evaluate(&mut policy)?;

    info!(
        "Random policy, average reward over {} episodes: {:.2}",
        args.num_episodes,
        record.get_scalar("episode_return")?
    );
    Ok(())
}
