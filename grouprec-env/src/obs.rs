//! Observation of [`RecEnv`](crate::RecEnv).
use crate::RecEnvError;

/// Observation of [`RecEnv`](crate::RecEnv).
#[derive(Debug, Clone, PartialEq)]
pub struct RecObs {
    /// Current interest vector of the user.
    pub user_embed: Vec<f32>,

    /// Most recently recommended group indices, oldest first.
    pub last_seq: Vec<usize>,
}

impl RecObs {
    /// The flat form `user_embed ++ last_seq`, with indices cast to `f32`.
    pub fn to_raw(&self) -> Vec<f32> {
        self.user_embed
            .iter()
            .copied()
            .chain(self.last_seq.iter().map(|&i| i as f32))
            .collect()
    }

    /// Splits a flat observation after `embed_dim` entries.
    ///
    /// Sequence entries are truncated toward zero; negative values become `0`.
    pub fn from_raw(raw: &[f32], embed_dim: usize) -> Result<Self, RecEnvError> {
        if raw.len() <= embed_dim {
            return Err(RecEnvError::ObsDimension {
                expected: embed_dim + 1,
                got: raw.len(),
            });
        }
        let (user, seq) = raw.split_at(embed_dim);
        Ok(Self {
            user_embed: user.to_vec(),
            last_seq: seq.iter().map(|&v| v as usize).collect(),
        })
    }
}
