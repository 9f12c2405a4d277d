//! Train [`Agent`].
mod config;
use crate::{
    record::{AggregateRecorder, Record, RecordValue::Scalar},
    Agent, Env, StepProcessor, Transition,
};
use anyhow::{anyhow, Result};
pub use config::TrainerConfig;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Returns of the training episodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    /// Return of each episode, in order.
    pub episode_rewards: Vec<f32>,

    /// Trailing mean of the returns at the final episode.
    pub final_avg_reward: f32,
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages the episodic training loop.
///
/// # Training loop
///
/// For each of `num_episodes` episodes:
///
/// 1. Reset [`Env`] and the [`StepProcessor`] with the initial observation.
/// 2. The agent samples an action on the encoded state.
/// 3. The environment performs the action, and the resulting [`Step`] is turned
///    into a [`Transition`] by the [`StepProcessor`].
/// 4. The transition is pushed into the agent, which then performs an
///    optimization step with [`Agent::opt`]. The agent may skip the step, for
///    example while its replay buffer holds fewer transitions than a batch.
/// 5. Back to 2 until the episode terminates.
/// 6. The episode return and the trailing mean of the last `avg_window`
///    returns are logged and stored in the recorder, together with the record
///    of the last optimization step. Records are flushed every
///    `record_interval` episodes.
///
/// After the final episode, the parameters of the agent are saved in
/// `model_dir` if given.
///
/// ```mermaid
/// graph LR
///     A[Agent]-->|action|B[Env]
///     B -->|"Step&lt;E: Env&gt;"|C[StepProcessor]
///     C -->|Transition|A
///     C -->|state|A
/// ```
///
/// [`Step`]: crate::Step
pub struct Trainer<E, P>
where
    E: Env,
    P: StepProcessor<E, Output = Transition>,
{
    /// Configuration of the environment for training.
    env_config: E::Config,

    /// Configuration of the step processor.
    step_proc_config: P::Config,

    /// Seed of the environment.
    env_seed: Option<u64>,

    /// The number of training episodes.
    num_episodes: usize,

    /// Window of the trailing mean of returns.
    avg_window: usize,

    /// Where to save the trained model.
    model_dir: Option<String>,

    /// Interval of flushing records in episodes.
    record_interval: usize,
}

impl<E, P> Trainer<E, P>
where
    E: Env,
    P: StepProcessor<E, Output = Transition>,
{
    /// Constructs a trainer.
    pub fn build(config: TrainerConfig, env_config: E::Config, step_proc_config: P::Config) -> Self {
        Self {
            env_config,
            step_proc_config,
            env_seed: config.env_seed,
            num_episodes: config.num_episodes,
            avg_window: config.avg_window.max(1),
            model_dir: config.model_dir,
            record_interval: config.record_interval.max(1),
        }
    }

    fn trailing_mean(&self, rewards: &[f32]) -> f32 {
        let n = rewards.len().min(self.avg_window);
        if n == 0 {
            return 0.0;
        }
        rewards[rewards.len() - n..].iter().sum::<f32>() / n as f32
    }

    /// Runs a single episode and returns its return and the record of the
    /// last optimization step, if any.
    fn run_episode<A: Agent<E>>(
        env: &mut E,
        processor: &mut P,
        agent: &mut A,
    ) -> Result<(f32, Option<Record>)> {
        let init_obs = env.reset(None)?;
        processor.reset(&init_obs)?;
        let mut episode_reward = 0f32;
        let mut last_opt = None;

        loop {
            let state = processor
                .state()
                .ok_or_else(|| anyhow!("State is not available before reset"))?;
            let act = agent.sample(state)?;
            let (step, _) = env.step(act)?;
            let transition = processor.process(&step)?;
            agent.push(transition)?;
            if let Some(record) = agent.opt()? {
                last_opt = Some(record);
            }
            episode_reward += step.reward;

            if step.is_done() {
                break;
            }
        }

        Ok((episode_reward, last_opt))
    }

    /// Trains the agent.
    pub fn train<A: Agent<E>>(
        &mut self,
        agent: &mut A,
        recorder: &mut dyn AggregateRecorder,
    ) -> Result<TrainingSummary> {
        let mut env = E::build(&self.env_config, self.env_seed)?;
        let mut processor = P::build(&self.step_proc_config);
        let mut episode_rewards = Vec::with_capacity(self.num_episodes);
        agent.train();

        for ep in 0..self.num_episodes {
            let (episode_reward, last_opt) = Self::run_episode(&mut env, &mut processor, agent)?;
            episode_rewards.push(episode_reward);
            let avg_reward = self.trailing_mean(&episode_rewards);
            info!(
                "Episode {}, Reward: {:.2}, Avg({}): {:.2}",
                ep + 1,
                episode_reward,
                self.avg_window,
                avg_reward
            );

            let mut record = Record::from_slice(&[
                ("episode", Scalar((ep + 1) as f32)),
                ("episode_reward", Scalar(episode_reward)),
                ("avg_reward", Scalar(avg_reward)),
            ]);
            match last_opt {
                Some(r) => record.merge_inplace(r),
                None => debug!("No optimization step in episode {}", ep + 1),
            }
            recorder.store(record);

            if (ep + 1) % self.record_interval == 0 {
                recorder.flush((ep + 1) as i64);
            }
        }
        if self.num_episodes % self.record_interval != 0 {
            recorder.flush(self.num_episodes as i64);
        }

        if let Some(model_dir) = &self.model_dir {
            agent.save_params(Path::new(model_dir))?;
            info!("Saved the model in {:?}", model_dir);
        }

        let final_avg_reward = self.trailing_mean(&episode_rewards);
        Ok(TrainingSummary {
            episode_rewards,
            final_avg_reward,
        })
    }
}
