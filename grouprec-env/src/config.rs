//! Configuration of [`RecEnv`](crate::RecEnv).
use crate::RecEnvError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`RecEnv`](crate::RecEnv).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct RecEnvConfig {
    /// The number of groups, which is also the number of actions.
    pub num_groups: usize,

    /// The number of simulated users.
    pub num_users: usize,

    /// Dimension of user and group embeddings.
    pub embed_dim: usize,

    /// Length of the window of recent recommendations in observations.
    pub seq_len: usize,

    /// Length of an episode.
    pub max_steps: usize,

    /// Scale of the click probability.
    pub click_prob_scale: f32,

    /// Scale of the join probability.
    pub join_prob_scale: f32,
}

impl Default for RecEnvConfig {
    fn default() -> Self {
        Self {
            num_groups: 50,
            num_users: 200,
            embed_dim: 16,
            seq_len: 5,
            max_steps: 20,
            click_prob_scale: 1.0,
            join_prob_scale: 1.0,
        }
    }
}

impl RecEnvConfig {
    /// Sets the number of groups.
    pub fn num_groups(mut self, v: usize) -> Self {
        self.num_groups = v;
        self
    }

    /// Sets the number of users.
    pub fn num_users(mut self, v: usize) -> Self {
        self.num_users = v;
        self
    }

    /// Sets the embedding dimension.
    pub fn embed_dim(mut self, v: usize) -> Self {
        self.embed_dim = v;
        self
    }

    /// Sets the length of the window of recent recommendations.
    pub fn seq_len(mut self, v: usize) -> Self {
        self.seq_len = v;
        self
    }

    /// Sets the episode length.
    pub fn max_steps(mut self, v: usize) -> Self {
        self.max_steps = v;
        self
    }

    /// Sets the scale of the click probability.
    pub fn click_prob_scale(mut self, v: f32) -> Self {
        self.click_prob_scale = v;
        self
    }

    /// Sets the scale of the join probability.
    pub fn join_prob_scale(mut self, v: f32) -> Self {
        self.join_prob_scale = v;
        self
    }

    /// Dimension of the encoded state, `2 * embed_dim`.
    pub fn state_dim(&self) -> usize {
        2 * self.embed_dim
    }

    /// Checks that every size is non-zero and scales are finite.
    pub fn validate(&self) -> Result<(), RecEnvError> {
        let sizes = [
            ("num_groups", self.num_groups),
            ("num_users", self.num_users),
            ("embed_dim", self.embed_dim),
            ("seq_len", self.seq_len),
            ("max_steps", self.max_steps),
        ];
        if let Some((name, _)) = sizes.iter().find(|(_, v)| *v == 0) {
            return Err(RecEnvError::InvalidConfig(format!("{} must be positive", name)));
        }
        if !self.click_prob_scale.is_finite() || !self.join_prob_scale.is_finite() {
            return Err(RecEnvError::InvalidConfig(
                "probability scales must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// Loads the configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves the configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_rec_env_config() -> Result<()> {
        let config = RecEnvConfig::default()
            .num_groups(20)
            .embed_dim(8)
            .join_prob_scale(0.5);
        let dir = TempDir::new("rec_env_config")?;
        let path = dir.path().join("rec_env_config.yaml");
        config.save(&path)?;
        assert_eq!(config, RecEnvConfig::load(&path)?);
        Ok(())
    }

    #[test]
    fn test_validate() {
        assert!(RecEnvConfig::default().validate().is_ok());
        assert_eq!(
            RecEnvConfig::default().seq_len(0).validate(),
            Err(RecEnvError::InvalidConfig("seq_len must be positive".to_string()))
        );
        assert!(RecEnvConfig::default()
            .click_prob_scale(f32::NAN)
            .validate()
            .is_err());
    }
}
