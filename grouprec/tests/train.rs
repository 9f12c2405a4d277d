mod common;
use anyhow::Result;
use common::*;
use grouprec::RecommendationEngine;
use grouprec_candle_agent::{dqn::QNET_FILE, Device};
use grouprec_core::{
    record::BufferedRecorder, replay_buffer::SimpleStepProcessor, Agent, DefaultEvaluator, Env,
    Evaluator, RandomPolicy, Trainer, TrainerConfig,
};
use grouprec_env::{RecEnv, SeqStateEncoder};
use tempdir::TempDir;

type StepProc = SimpleStepProcessor<RecEnv, SeqStateEncoder>;

#[test]
fn test_train_and_serve() -> Result<()> {
    let dir = TempDir::new("train")?;
    let model_dir = dir.path().join("model");
    let env_config = env_config();
    let encoder = RecEnv::build(&env_config, Some(ENV_SEED))?.encoder();
    let trainer_config = TrainerConfig::default()
        .num_episodes(6)
        .avg_window(3)
        .model_dir(model_dir.to_string_lossy())
        .env_seed(Some(ENV_SEED));

    let mut agent = agent(&env_config)?;
    let mut recorder = BufferedRecorder::new();
    let mut trainer = Trainer::<RecEnv, StepProc>::build(trainer_config, env_config.clone(), encoder);
    let summary = trainer.train(&mut agent, &mut recorder)?;

    assert_eq!(summary.episode_rewards.len(), 6);
    for r in summary.episode_rewards.iter() {
        assert!((0.0..=2.0 * 5.0).contains(r));
        assert_eq!((r * 2.0).fract(), 0.0);
    }
    let last3: f32 = summary.episode_rewards[3..].iter().sum::<f32>() / 3.0;
    assert!((summary.final_avg_reward - last3).abs() < 1e-5);

    // 6 episodes of 5 steps with batch size 8
    assert_eq!(agent.step_count(), 30 - 8 + 1);
    assert!(agent.epsilon() < 1.0);
    assert_eq!(recorder.len(), 6);
    let last = recorder.iter().last().unwrap();
    assert_eq!(last.get_scalar("step")?, 6.0);
    assert!(last.get_scalar("loss").is_ok());

    assert!(model_dir.join(QNET_FILE).is_file());
    let engine = RecommendationEngine::new(&env_config, ENV_SEED, &model_dir, Device::Cpu)?;
    let state = engine.user_state(&["music"], &[2, 5])?;
    assert_eq!(engine.q_values(&state)?, agent.q_values(&state)?);
    Ok(())
}

#[test]
fn test_evaluation_is_reproducible() -> Result<()> {
    let env_config = env_config();
    let evaluate = |seed: u64| -> Result<f32> {
        let env = RecEnv::build(&env_config, Some(ENV_SEED))?;
        let encoder = env.encoder();
        let mut evaluator = DefaultEvaluator::new(env, encoder, 4)?;
        let mut policy = RandomPolicy::new(env_config.num_groups, seed);
        Ok(evaluator.evaluate(&mut policy)?.get_scalar("episode_return")?)
    };

    let r = evaluate(3)?;
    assert_eq!(r, evaluate(3)?);
    assert!((0.0..=10.0).contains(&r));

    let mut agent = agent(&env_config)?;
    agent.eval();
    let env = RecEnv::build(&env_config, Some(ENV_SEED))?;
    let encoder = env.encoder();
    let mut evaluator = DefaultEvaluator::new(env, encoder, 2)?;
    let r1 = evaluator.evaluate(&mut agent)?.get_scalar("episode_return")?;
    let r2 = evaluator.evaluate(&mut agent)?.get_scalar("episode_return")?;
    assert_eq!(r1, r2);
    Ok(())
}
