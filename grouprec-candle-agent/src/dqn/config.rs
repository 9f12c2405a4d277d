//! Configuration of DQN agent.
use super::{explorer::EpsilonGreedy, DqnModelConfig};
use crate::{
    mlp::{Mlp, MlpConfig},
    model::SubModel1,
    util::OutDim,
    Device,
};
use anyhow::Result;
use candle_core::Tensor;
use grouprec_core::replay_buffer::SimpleReplayBufferConfig;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fmt::Debug,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Dqn`](super::Dqn) agent.
#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct DqnConfig<Q>
where
    Q: SubModel1<Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Debug + PartialEq + Clone,
{
    /// Configuration of the action-value function and its optimizer.
    pub model_config: DqnModelConfig<Q::Config>,

    /// Batch size for training.
    pub batch_size: usize,

    /// Discount factor.
    pub discount_factor: f64,

    /// Exploration strategy.
    pub explorer: EpsilonGreedy,

    /// Interval of copying the online parameters into the target network,
    /// in optimization steps.
    pub target_update_freq: usize,

    /// Configuration of the replay buffer owned by the agent.
    pub replay_buffer_config: SimpleReplayBufferConfig,

    /// Seed of the random number generator used for exploration.
    pub seed: u64,

    /// Device used for the networks.
    pub device: Device,
}

impl<Q> Clone for DqnConfig<Q>
where
    Q: SubModel1<Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Debug + PartialEq + Clone,
{
    fn clone(&self) -> Self {
        Self {
            model_config: self.model_config.clone(),
            batch_size: self.batch_size,
            discount_factor: self.discount_factor,
            explorer: self.explorer.clone(),
            target_update_freq: self.target_update_freq,
            replay_buffer_config: self.replay_buffer_config.clone(),
            seed: self.seed,
            device: self.device,
        }
    }
}

impl<Q> Default for DqnConfig<Q>
where
    Q: SubModel1<Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Debug + PartialEq + Clone,
{
    fn default() -> Self {
        Self {
            model_config: Default::default(),
            batch_size: 64,
            discount_factor: 0.99,
            explorer: EpsilonGreedy::default(),
            target_update_freq: 100,
            replay_buffer_config: SimpleReplayBufferConfig::default(),
            seed: 42,
            device: Device::Cpu,
        }
    }
}

impl<Q> DqnConfig<Q>
where
    Q: SubModel1<Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Debug + PartialEq + Clone,
{
    /// Sets the configuration of the model.
    pub fn model_config(mut self, model_config: DqnModelConfig<Q::Config>) -> Self {
        self.model_config = model_config;
        self
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the discount factor.
    pub fn discount_factor(mut self, v: f64) -> Self {
        self.discount_factor = v;
        self
    }

    /// Sets the explorer.
    pub fn explorer(mut self, v: EpsilonGreedy) -> Self {
        self.explorer = v;
        self
    }

    /// Sets the interval of target network synchronization.
    pub fn target_update_freq(mut self, v: usize) -> Self {
        self.target_update_freq = v;
        self
    }

    /// Sets the configuration of the replay buffer.
    pub fn replay_buffer_config(mut self, v: SimpleReplayBufferConfig) -> Self {
        self.replay_buffer_config = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Constructs [`DqnConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`DqnConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

impl DqnConfig<Mlp> {
    /// Configuration with an MLP of two hidden layers of 128 units.
    pub fn mlp(state_dim: usize, num_actions: usize) -> Self {
        let q_config = MlpConfig::new(state_dim, vec![128, 128], num_actions, false);
        Self::default().model_config(DqnModelConfig::default().q_config(q_config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opt::OptimizerConfig;
    use tempdir::TempDir;

    #[test]
    fn test_serde_dqn_config() -> Result<()> {
        let config = DqnConfig::<Mlp>::mlp(16, 10)
            .batch_size(32)
            .explorer(EpsilonGreedy::new(0.5, 0.01, 0.99))
            .target_update_freq(50);
        let config = config.clone().model_config(
            config
                .model_config
                .clone()
                .opt_config(OptimizerConfig::default().learning_rate(5e-4)),
        );

        let dir = TempDir::new("dqn_config")?;
        let path = dir.path().join("dqn_config.yaml");
        config.save(&path)?;
        let config_ = DqnConfig::<Mlp>::load(&path)?;
        assert_eq!(config.model_config, config_.model_config);
        assert_eq!(config.explorer, config_.explorer);
        assert_eq!(config.batch_size, 32);
        assert_eq!(config_.batch_size, 32);
        assert_eq!(config_.target_update_freq, 50);
        assert_eq!(config_.device, Device::Cpu);
        Ok(())
    }
}
