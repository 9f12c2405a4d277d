use anyhow::Result;
use clap::Parser;
use grouprec_candle_agent::{
    dqn::{Dqn, DqnConfig},
    mlp::Mlp,
};
use grouprec_core::{
    record::{AggregateRecorder, NullRecorder},
    replay_buffer::SimpleStepProcessor,
    Agent, Configurable, DefaultEvaluator, Env, Evaluator, Trainer, TrainerConfig,
};
use grouprec_env::{RecEnv, RecEnvConfig, SeqStateEncoder};
use grouprec_tensorboard::TensorboardRecorder;
use log::info;
use std::{fs::File, io::BufWriter, path::Path};

const NUM_GROUPS: usize = 50;
const NUM_USERS: usize = 200;
const EMBED_DIM: usize = 8;
const SEQ_LEN: usize = 5;
const MAX_STEPS: usize = 20;
const N_EPISODES_PER_EVAL: usize = 20;

type StepProc = SimpleStepProcessor<RecEnv, SeqStateEncoder>;

/// Train a DQN agent on the simulated recommendation environment
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of training episodes
    #[arg(long, default_value_t = 300)]
    num_episodes: usize,

    /// Directory where the model and the configurations are saved
    #[arg(long, default_value = "./model/dqn")]
    model_dir: String,

    /// Seed of the environment and the agent
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Write metrics for tensorboard in the model directory
    #[arg(long, default_value_t = false)]
    tensorboard: bool,
}

fn env_config() -> RecEnvConfig {
    RecEnvConfig::default()
        .num_groups(NUM_GROUPS)
        .num_users(NUM_USERS)
        .embed_dim(EMBED_DIM)
        .seq_len(SEQ_LEN)
        .max_steps(MAX_STEPS)
}

fn create_recorder(args: &Args) -> Box<dyn AggregateRecorder> {
    match args.tensorboard {
        true => Box::new(TensorboardRecorder::new(&args.model_dir)),
        false => Box::new(NullRecorder::new()),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let model_dir = Path::new(&args.model_dir);
    std::fs::create_dir_all(model_dir)?;

    let env_config = env_config();
    let agent_config = DqnConfig::<Mlp>::mlp(env_config.state_dim(), env_config.num_groups)
        .seed(args.seed);
    let trainer_config = TrainerConfig::default()
        .num_episodes(args.num_episodes)
        .model_dir(args.model_dir.clone())
        .env_seed(Some(args.seed));
    env_config.save(model_dir.join("env_config.yaml"))?;
    agent_config.save(model_dir.join("agent_config.yaml"))?;
    trainer_config.save(model_dir.join("trainer_config.yaml"))?;

    let encoder = RecEnv::build(&env_config, Some(args.seed))?.encoder();
    let mut agent = Dqn::<RecEnv, Mlp>::build(agent_config)?;
    let mut recorder = create_recorder(&args);
    let mut trainer = Trainer::<RecEnv, StepProc>::build(trainer_config, env_config.clone(), encoder);
    let summary = trainer.train(&mut agent, recorder.as_mut())?;
    serde_json::to_writer_pretty(
        BufWriter::new(File::create(model_dir.join("summary.json"))?),
        &summary,
    )?;
    info!("Final average reward: {:.2}", summary.final_avg_reward);

    agent.eval();
    let env = RecEnv::build(&env_config, Some(args.seed))?;
    let encoder = env.encoder();
    let record = DefaultEvaluator::new(env, encoder, N_EPISODES_PER_EVAL)?.evaluate(&mut agent)?;
    info!(
        "Greedy policy, average reward over {} episodes: {:.2}",
        N_EPISODES_PER_EVAL,
        record.get_scalar("episode_return")?
    );

    Ok(())
}
