//! DQN agent implemented with candle.
use super::{config::DqnConfig, explorer::EpsilonGreedy, model::DqnModel};
use crate::{
    model::SubModel1,
    util::{hard_update, stable_argmax, OutDim},
};
use anyhow::{bail, Result};
use candle_core::{shape::D, Device, Tensor};
use candle_nn::loss::mse;
use grouprec_core::{
    record::{Record, RecordValue},
    replay_buffer::{ReplayBufferError, SimpleReplayBuffer, TransitionBatch},
    Agent, Configurable, Env, ExperienceBufferBase, Policy, ReplayBufferBase, Transition,
};
use log::{debug, info, warn};
use rand::{rngs::SmallRng, SeedableRng};
use serde::{de::DeserializeOwned, Serialize};
use std::{fmt::Debug, fs, marker::PhantomData, path::Path};

/// File name of the online network in a model directory.
pub const QNET_FILE: &str = "qnet.safetensors";

#[cfg_attr(doc, aquamarine::aquamarine)]
/// DQN agent implemented with candle.
///
/// The agent owns an online network, a frozen target network and a replay
/// buffer. Each call of [`Agent::opt`] samples a batch and regresses
/// `Q(s, a)` toward `r + gamma * max_a' Q_target(s', a') * (1 - terminal)`.
///
/// ```mermaid
/// graph LR
///     T[Transition]-->|push|B[SimpleReplayBuffer]
///     B -->|TransitionBatch|Q[Online network]
///     B -->|next states|G[Target network]
///     G -->|detached target|Q
///     Q -->|"every target_update_freq steps"|G
/// ```
pub struct Dqn<E, Q>
where
    E: Env,
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Debug + PartialEq + Clone,
{
    qnet: DqnModel<Q>,
    qnet_tgt: DqnModel<Q>,
    buffer: SimpleReplayBuffer,
    batch_size: usize,
    discount_factor: f64,
    target_update_freq: usize,
    explorer: EpsilonGreedy,
    n_actions: usize,
    n_opts: usize,
    train: bool,
    device: Device,
    rng: SmallRng,
    phantom: PhantomData<E>,
}

impl<E, Q> Dqn<E, Q>
where
    E: Env,
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Debug + PartialEq + Clone,
{
    fn update_critic(&mut self, batch: TransitionBatch) -> Result<f32> {
        let n = batch.len();
        let dim = batch.state_dim;
        let state = Tensor::from_vec(batch.state, (n, dim), &self.device)?;
        let next_state = Tensor::from_vec(batch.next_state, (n, dim), &self.device)?;
        let act = {
            let act: Vec<u32> = batch.action.iter().map(|&a| a as u32).collect();
            Tensor::from_vec(act, (n, 1), &self.device)?
        };
        let reward = Tensor::from_vec(batch.reward, n, &self.device)?;
        let is_not_done = {
            let is_not_done: Vec<f32> = batch
                .is_terminated
                .iter()
                .map(|&v| (1 - v) as f32)
                .collect();
            Tensor::from_vec(is_not_done, n, &self.device)?
        };

        let pred = self
            .qnet
            .forward(&state)?
            .gather(&act, D::Minus1)?
            .squeeze(D::Minus1)?;

        let tgt = {
            let q = self.qnet_tgt.forward(&next_state)?.max(D::Minus1)?;
            let q = is_not_done.mul(&q)?.affine(self.discount_factor, 0.0)?;
            reward.add(&q)?
        }
        .detach();

        let loss = mse(&pred, &tgt)?;
        self.qnet.backward_step(&loss)?;

        Ok(loss.to_scalar::<f32>()?)
    }

    fn sync_target(&mut self) -> Result<()> {
        hard_update(self.qnet_tgt.varmap(), self.qnet.varmap())
    }

    /// Action values of the online network for a single state.
    pub fn q_values(&self, state: &[f32]) -> Result<Vec<f32>> {
        let xs = Tensor::from_slice(state, (1, state.len()), &self.device)?;
        let q = self.qnet.forward(&xs)?.detach();
        Ok(q.squeeze(0)?.to_vec1::<f32>()?)
    }

    /// The greedy action, ties broken toward the lowest index.
    pub fn greedy_action(&self, state: &[f32]) -> Result<usize> {
        match stable_argmax(&self.q_values(state)?) {
            Some(a) => Ok(a),
            None => bail!("Q-network has no output"),
        }
    }

    /// Current value of epsilon.
    pub fn epsilon(&self) -> f64 {
        self.explorer.epsilon()
    }

    /// The number of optimization steps performed so far.
    pub fn step_count(&self) -> usize {
        self.n_opts
    }

    /// The replay buffer.
    pub fn buffer(&self) -> &SimpleReplayBuffer {
        &self.buffer
    }

    /// The online network.
    pub fn qnet(&self) -> &DqnModel<Q> {
        &self.qnet
    }

    /// The target network.
    pub fn qnet_tgt(&self) -> &DqnModel<Q> {
        &self.qnet_tgt
    }
}

impl<E, Q> Configurable for Dqn<E, Q>
where
    E: Env,
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Debug + PartialEq + Clone,
{
    type Config = DqnConfig<Q>;

    /// Constructs DQN agent.
    ///
    /// The target network starts as a copy of the online network.
    fn build(config: Self::Config) -> Result<Self> {
        if config.batch_size == 0 {
            bail!("batch_size must be positive");
        }
        if config.target_update_freq == 0 {
            bail!("target_update_freq must be positive");
        }
        let device: Device = config.device.try_into()?;
        let qnet = DqnModel::build(config.model_config.clone(), device.clone())?;
        let qnet_tgt = DqnModel::build_frozen(config.model_config, device.clone())?;
        hard_update(qnet_tgt.varmap(), qnet.varmap())?;
        let n_actions = qnet.out_dim();
        info!("Built DQN agent with {} actions on {:?}", n_actions, device);

        Ok(Dqn {
            qnet,
            qnet_tgt,
            buffer: SimpleReplayBuffer::build(&config.replay_buffer_config),
            batch_size: config.batch_size,
            discount_factor: config.discount_factor,
            target_update_freq: config.target_update_freq,
            explorer: config.explorer,
            n_actions,
            n_opts: 0,
            train: true,
            device,
            rng: SmallRng::seed_from_u64(config.seed),
            phantom: PhantomData,
        })
    }
}

impl<E, Q> Policy<E> for Dqn<E, Q>
where
    E: Env,
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Debug + PartialEq + Clone,
{
    /// Epsilon-greedy in training mode, greedy in evaluation mode.
    fn sample(&mut self, state: &[f32]) -> Result<usize> {
        if self.train {
            if let Some(a) = self.explorer.explore(self.n_actions, &mut self.rng) {
                return Ok(a);
            }
        }
        self.greedy_action(state)
    }
}

impl<E, Q> Agent<E> for Dqn<E, Q>
where
    E: Env,
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Debug + PartialEq + Clone,
{
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn push(&mut self, transition: Transition) -> Result<()> {
        self.buffer.push(transition)
    }

    fn opt(&mut self) -> Result<Option<Record>> {
        if self.buffer.len() < self.batch_size {
            return Ok(None);
        }
        let batch = match self.buffer.batch(self.batch_size) {
            Ok(batch) => batch,
            Err(e) => match e.downcast_ref::<ReplayBufferError>() {
                Some(ReplayBufferError::InsufficientData { .. }) => {
                    debug!("Skip optimization: {}", e);
                    return Ok(None);
                }
                _ => return Err(e),
            },
        };

        let loss = self.update_critic(batch)?;
        if !loss.is_finite() {
            warn!("Non-finite loss {} at optimization step {}", loss, self.n_opts + 1);
        }
        self.explorer.decay();
        self.n_opts += 1;

        if self.n_opts % self.target_update_freq == 0 {
            self.sync_target()?;
            debug!("Synchronized target network at step {}", self.n_opts);
        }

        Ok(Some(Record::from_slice(&[
            ("loss", RecordValue::Scalar(loss)),
            ("epsilon", RecordValue::Scalar(self.explorer.epsilon() as f32)),
            ("step_count", RecordValue::Scalar(self.n_opts as f32)),
        ])))
    }

    /// Saves the online network in `path/qnet.safetensors`.
    fn save_params(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        self.qnet.save(path.join(QNET_FILE))
    }

    /// Loads the online network and copies it into the target network.
    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.qnet.load(path.join(QNET_FILE))?;
        self.sync_target()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mlp::Mlp, ModelError};
    use grouprec_core::{replay_buffer::SimpleReplayBufferConfig, Step};
    use tempdir::TempDir;

    struct NullEnv;

    impl Env for NullEnv {
        type Config = ();
        type Obs = ();
        type Info = ();

        fn build(_config: &(), _seed: Option<u64>) -> Result<Self> {
            Ok(Self)
        }

        fn reset(&mut self, _seed: Option<u64>) -> Result<()> {
            Ok(())
        }

        fn step(&mut self, act: usize) -> Result<(Step<Self>, Record)> {
            Ok((Step::new((), act, 0.0, true, ()), Record::empty()))
        }

        fn num_actions(&self) -> usize {
            4
        }
    }

    type TestDqn = Dqn<NullEnv, Mlp>;

    const STATE_DIM: usize = 6;

    fn config(n_actions: usize) -> DqnConfig<Mlp> {
        DqnConfig::<Mlp>::mlp(STATE_DIM, n_actions)
            .batch_size(4)
            .replay_buffer_config(SimpleReplayBufferConfig::default().capacity(100))
    }

    fn transition(i: usize) -> Transition {
        Transition {
            state: (0..STATE_DIM).map(|j| ((i + j) % 5) as f32 * 0.2).collect(),
            action: i % 4,
            reward: [0.0, 0.5, 2.0][i % 3],
            next_state: (0..STATE_DIM).map(|j| ((i + j + 1) % 5) as f32 * 0.2).collect(),
            is_terminated: i % 10 == 9,
        }
    }

    #[test]
    fn test_skip_during_warmup() -> Result<()> {
        let mut agent = TestDqn::build(config(4))?;
        for i in 0..3 {
            agent.push(transition(i))?;
            assert!(agent.opt()?.is_none());
        }
        assert_eq!(agent.step_count(), 0);
        assert_eq!(agent.epsilon(), 1.0);

        agent.push(transition(3))?;
        let record = agent.opt()?.unwrap();
        assert_eq!(record.get_scalar("step_count")?, 1.0);
        assert_eq!(agent.step_count(), 1);
        Ok(())
    }

    #[test]
    fn test_epsilon_non_increasing_and_bounded() -> Result<()> {
        let config = config(4).explorer(EpsilonGreedy::new(1.0, 0.1, 0.5));
        let mut agent = TestDqn::build(config)?;
        for i in 0..8 {
            agent.push(transition(i))?;
        }

        let mut prev = agent.epsilon();
        for _ in 0..10 {
            let record = agent.opt()?.unwrap();
            let eps = agent.epsilon();
            assert!(eps <= prev);
            assert!(eps >= 0.1);
            assert_eq!(record.get_scalar("epsilon")?, eps as f32);
            prev = eps;
        }
        assert_eq!(agent.epsilon(), 0.1);
        Ok(())
    }

    #[test]
    fn test_target_sync_interval() -> Result<()> {
        let mut agent = TestDqn::build(config(4).target_update_freq(3))?;
        for i in 0..20 {
            agent.push(transition(i))?;
        }
        assert!(agent.qnet_tgt().params()?.bitwise_eq(&agent.qnet().params()?)?);
        let initial_tgt = agent.qnet_tgt().params()?;

        for step in 1..=6 {
            agent.opt()?;
            let tgt = agent.qnet_tgt().params()?;
            let online = agent.qnet().params()?;
            if step % 3 == 0 {
                assert!(tgt.bitwise_eq(&online)?);
            } else {
                assert!(!tgt.bitwise_eq(&online)?);
                if step < 3 {
                    assert!(tgt.bitwise_eq(&initial_tgt)?);
                }
            }
        }
        assert!(agent.qnet_tgt().is_frozen());
        Ok(())
    }

    #[test]
    fn test_eval_mode_is_greedy() -> Result<()> {
        let mut agent = TestDqn::build(config(4))?;
        let state = transition(2).state;
        let greedy = stable_argmax(&agent.q_values(&state)?).unwrap();

        agent.eval();
        for _ in 0..20 {
            assert_eq!(agent.sample(&state)?, greedy);
        }

        agent.train();
        let actions: Vec<usize> = (0..20).map(|_| agent.sample(&state)).collect::<Result<_>>()?;
        assert!(actions.iter().all(|&a| a < 4));
        Ok(())
    }

    #[test]
    fn test_checkpoint_round_trip() -> Result<()> {
        let dir = TempDir::new("dqn")?;
        let mut agent = TestDqn::build(config(4))?;
        for i in 0..8 {
            agent.push(transition(i))?;
        }
        for _ in 0..5 {
            agent.opt()?;
        }
        agent.save_params(dir.path())?;

        let mut restored = TestDqn::build(config(4))?;
        restored.load_params(dir.path())?;
        for i in 0..5 {
            let state = transition(i).state;
            assert_eq!(agent.q_values(&state)?, restored.q_values(&state)?);
        }
        assert!(restored.qnet_tgt().params()?.bitwise_eq(&restored.qnet().params()?)?);
        Ok(())
    }

    #[test]
    fn test_load_shape_mismatch() -> Result<()> {
        let dir = TempDir::new("dqn_mismatch")?;
        TestDqn::build(config(4))?.save_params(dir.path())?;

        let mut other = TestDqn::build(config(5))?;
        let err = other.load_params(dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ModelError>(),
            Some(ModelError::ShapeMismatch { .. })
        ));

        let err = other.load_params(&dir.path().join("nothing")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ModelError>(),
            Some(ModelError::MissingCheckpoint(_))
        ));
        Ok(())
    }
}
