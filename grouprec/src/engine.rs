//! Group recommendations from a trained Q-network.
use crate::{
    embedding::{embed_hobbies, DEFAULT_HOBBIES},
    store::{GroupRow, MembershipRow, UserRow},
    EntityType, RecommendationMetadata, RecommendationRecord,
};
use anyhow::{bail, Result};
use candle_core::Tensor;
use chrono::Utc;
use grouprec_candle_agent::{
    dqn::{DqnConfig, DqnModel, QNET_FILE},
    mlp::Mlp,
    Device,
};
use grouprec_core::Env;
use grouprec_env::{RecEnv, RecEnvConfig, SeqStateEncoder};
use log::info;
use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

/// Q-value given to groups the user already joined.
pub const MASKED_Q_VALUE: f32 = -1e9;

/// Ranks groups for users with a Q-network trained on [`RecEnv`].
///
/// The state of a user is built with the same [`SeqStateEncoder`] as in
/// training: the embedding of the user's hobbies concatenated with the mean
/// embedding of the last groups the user joined.
pub struct RecommendationEngine {
    encoder: SeqStateEncoder,
    qnet: DqnModel<Mlp>,
}

impl RecommendationEngine {
    /// Loads the Q-network saved in `model_dir`.
    ///
    /// `env_config` and `env_seed` must be the ones used in training, as the
    /// group embeddings are drawn from them.
    ///
    /// # Errors
    ///
    /// Fails if the checkpoint is missing or its shapes differ from the
    /// network implied by `env_config`.
    pub fn new(
        env_config: &RecEnvConfig,
        env_seed: u64,
        model_dir: impl AsRef<Path>,
        device: Device,
    ) -> Result<Self> {
        let path = model_dir.as_ref().join(QNET_FILE);
        info!("Loading DQN model from {:?}", path);

        let encoder = RecEnv::build(env_config, Some(env_seed))?.encoder();
        let state_dim = env_config.state_dim();
        let num_groups = env_config.num_groups;
        let model_config = DqnConfig::<Mlp>::mlp(state_dim, num_groups).model_config;
        let mut qnet = DqnModel::<Mlp>::build_frozen(model_config, device.try_into()?)?;
        qnet.load(&path)?;
        info!(
            "Model loaded (state_dim={}, num_groups={})",
            state_dim, num_groups
        );

        Ok(Self { encoder, qnet })
    }

    /// The state encoder.
    pub fn encoder(&self) -> &SeqStateEncoder {
        &self.encoder
    }

    /// Builds the state of a user.
    ///
    /// `joined` holds the ids of the groups the user joined, oldest first.
    /// The last `seq_len` of them are left-padded with zeros; ids are used as
    /// item indices, clipped into the range of groups.
    pub fn user_state<S: AsRef<str>>(&self, hobbies: &[S], joined: &[i64]) -> Result<Vec<f32>> {
        let embed_dim = self.encoder.embed_dim();
        let user_embed = match hobbies.is_empty() {
            true => embed_hobbies(&DEFAULT_HOBBIES, embed_dim),
            false => embed_hobbies(hobbies, embed_dim),
        };

        let seq_len = self.encoder.seq_len();
        let max_ix = self.encoder.num_groups().saturating_sub(1) as i64;
        let recent = &joined[joined.len().saturating_sub(seq_len)..];
        let seq: Vec<usize> = std::iter::repeat(0)
            .take(seq_len - recent.len())
            .chain(recent.iter().map(|&g| g.clamp(0, max_ix) as usize))
            .collect();

        Ok(self.encoder.encode_parts(&user_embed, &seq)?)
    }

    /// Q-values of all groups for a state.
    pub fn q_values(&self, state: &[f32]) -> Result<Vec<f32>> {
        let xs = Tensor::from_slice(state, (1, state.len()), self.qnet.device())?;
        Ok(self.qnet.forward(&xs)?.squeeze(0)?.to_vec1::<f32>()?)
    }

    /// Generates up to `top_k` group recommendations for each user.
    ///
    /// Groups the user already joined are never recommended. Group `id` is
    /// scored by output `id - 1` of the network. Ranks are 1-based.
    pub fn generate_recommendations(
        &self,
        users: &[UserRow],
        groups: &[GroupRow],
        memberships: &[MembershipRow],
        interests: &HashMap<String, Vec<String>>,
        top_k: usize,
    ) -> Result<Vec<RecommendationRecord>> {
        info!(
            "Generating recommendations for {} users, {} groups, {} memberships",
            users.len(),
            groups.len(),
            memberships.len()
        );
        let mut joined_by_user: HashMap<&str, Vec<i64>> = HashMap::new();
        for m in memberships.iter() {
            joined_by_user
                .entry(m.user_id.as_str())
                .or_default()
                .push(m.group_id);
        }

        let no_hobbies: Vec<String> = vec![];
        let mut recommendations = vec![];
        for (i, user) in users.iter().enumerate() {
            let hobbies = interests.get(&user.id).unwrap_or(&no_hobbies);
            let joined = joined_by_user
                .get(user.id.as_str())
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let state = self.user_state(hobbies, joined)?;
            let mut q = self.q_values(&state)?;
            if q.len() != self.encoder.num_groups() {
                bail!(
                    "Q-network outputs {} values for {} groups",
                    q.len(),
                    self.encoder.num_groups()
                );
            }

            let mut masked = HashSet::new();
            for &g in joined.iter() {
                let ix = g - 1;
                if 0 <= ix && (ix as usize) < q.len() {
                    q[ix as usize] = MASKED_Q_VALUE;
                    masked.insert(ix as usize);
                }
            }

            let mut ranked: Vec<usize> = (0..q.len()).filter(|ix| !masked.contains(ix)).collect();
            ranked.sort_by(|&a, &b| q[b].total_cmp(&q[a]));

            let metadata = RecommendationMetadata::dqn(Utc::now());
            recommendations.extend(ranked.into_iter().take(top_k).enumerate().map(|(rank, ix)| {
                RecommendationRecord {
                    user_id: user.id.clone(),
                    entity_type: EntityType::Group,
                    entity_id: (ix + 1).to_string(),
                    score: q[ix],
                    rank: Some(rank + 1),
                    metadata: Some(metadata.clone()),
                }
            }));

            if (i + 1) % 10 == 0 {
                info!("Processed {}/{} users", i + 1, users.len());
            }
        }
        info!("Generated {} recommendations", recommendations.len());

        Ok(recommendations)
    }
}
