//! Configuration of [`Trainer`](super::Trainer).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrainerConfig {
    /// The number of training episodes.
    pub num_episodes: usize,

    /// Window of the trailing mean of episode returns, for reporting only.
    pub avg_window: usize,

    /// Where to save the trained model after the final episode.
    pub model_dir: Option<String>,

    /// Interval of flushing records in episodes.
    pub record_interval: usize,

    /// Seed of the training environment. `None` seeds from the OS.
    pub env_seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            num_episodes: 300,
            avg_window: 20,
            model_dir: None,
            record_interval: 1,
            env_seed: Some(42),
        }
    }
}

impl TrainerConfig {
    /// Sets the number of training episodes.
    pub fn num_episodes(mut self, v: usize) -> Self {
        self.num_episodes = v;
        self
    }

    /// Sets the window of the trailing mean of episode returns.
    pub fn avg_window(mut self, v: usize) -> Self {
        self.avg_window = v;
        self
    }

    /// Sets the directory where the trained model is saved.
    pub fn model_dir(mut self, model_dir: impl Into<String>) -> Self {
        self.model_dir = Some(model_dir.into());
        self
    }

    /// Sets the interval of flushing records in episodes.
    pub fn record_interval(mut self, v: usize) -> Self {
        self.record_interval = v;
        self
    }

    /// Sets the seed of the training environment.
    pub fn env_seed(mut self, v: Option<u64>) -> Self {
        self.env_seed = v;
        self
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        log::info!("Load config of trainer from {}", path_.to_str().unwrap_or("?"));
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        log::info!("Save config of trainer into {}", path_.to_str().unwrap_or("?"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_trainer_config() -> Result<()> {
        let config = TrainerConfig::default()
            .num_episodes(10)
            .avg_window(5)
            .model_dir("some/directory")
            .record_interval(2);

        let dir = TempDir::new("trainer_config")?;
        let path = dir.path().join("trainer_config.yaml");
        config.save(&path)?;
        let config_ = TrainerConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }
}
