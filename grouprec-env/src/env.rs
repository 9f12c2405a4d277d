//! Sequential recommendation environment.
use crate::{Outcome, RecEnvConfig, RecEnvError, RecObs, SeqStateEncoder, StepInfo};
use anyhow::Result;
use grouprec_core::{record::Record, Env, Step};
use log::{debug, info};
use ndarray::{Array1, Array2, ArrayView1};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;
use std::sync::Arc;

/// Standard deviation of the drift noise added to the user vector.
const DRIFT_NOISE_STD: f32 = 0.01;

/// State of the running episode.
#[derive(Debug, Clone)]
struct Episode {
    user_id: usize,
    user_embed: Array1<f32>,
    last_seq: Vec<usize>,
    step_count: usize,
}

/// Simulated users interacting with recommended groups.
///
/// The embedding tables are sampled once at construction, groups first, then
/// users. They are immutable and shared with [`SeqStateEncoder`]s created by
/// [`RecEnv::encoder`]. Each episode works on a private copy of the user vector.
pub struct RecEnv {
    config: RecEnvConfig,
    group_embeddings: Arc<Array2<f32>>,
    user_embeddings: Arc<Array2<f32>>,
    rng: StdRng,
    episode: Option<Episode>,
}

fn standard_normal(rng: &mut StdRng, shape: (usize, usize)) -> Array2<f32> {
    Array2::from_shape_fn(shape, |_| rng.sample::<f32, _>(StandardNormal))
}

fn cosine(u: ArrayView1<f32>, g: ArrayView1<f32>) -> f32 {
    let norm_u = u.dot(&u).sqrt();
    let norm_g = g.dot(&g).sqrt();
    u.dot(&g) / (norm_u * norm_g + 1e-8)
}

impl RecEnv {
    /// The configuration.
    pub fn config(&self) -> &RecEnvConfig {
        &self.config
    }

    /// Group embedding table, `num_groups x embed_dim`.
    pub fn group_embeddings(&self) -> &Arc<Array2<f32>> {
        &self.group_embeddings
    }

    /// User embedding table, `num_users x embed_dim`.
    pub fn user_embeddings(&self) -> &Arc<Array2<f32>> {
        &self.user_embeddings
    }

    /// A state encoder sharing the group embedding table of this environment.
    pub fn encoder(&self) -> SeqStateEncoder {
        SeqStateEncoder::new(self.group_embeddings.clone(), self.config.seq_len)
    }

    /// Id of the user of the current episode.
    pub fn current_user(&self) -> Option<usize> {
        self.episode.as_ref().map(|e| e.user_id)
    }

    /// One-line description of the current state.
    pub fn render(&self) -> String {
        match &self.episode {
            Some(e) => format!(
                "User {} step {} last_seq={:?}",
                e.user_id, e.step_count, e.last_seq
            ),
            None => "Not reset".to_string(),
        }
    }

    fn obs(episode: &Episode) -> RecObs {
        RecObs {
            user_embed: episode.user_embed.to_vec(),
            last_seq: episode.last_seq.clone(),
        }
    }

    fn drift(
        &mut self,
        user: &Array1<f32>,
        group: ArrayView1<f32>,
        user_weight: f32,
        group_weight: f32,
    ) -> Array1<f32> {
        let rng = &mut self.rng;
        let noise =
            Array1::from_shape_fn(user.len(), |_| DRIFT_NOISE_STD * rng.sample::<f32, _>(StandardNormal));
        user * user_weight + &group * group_weight + noise
    }
}

impl Env for RecEnv {
    type Config = RecEnvConfig;
    type Obs = RecObs;
    type Info = StepInfo;

    fn build(config: &Self::Config, seed: Option<u64>) -> Result<Self> {
        config.validate()?;
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let group_embeddings = standard_normal(&mut rng, (config.num_groups, config.embed_dim));
        let user_embeddings = standard_normal(&mut rng, (config.num_users, config.embed_dim));
        info!(
            "Built RecEnv with {} groups, {} users, embed_dim {}",
            config.num_groups, config.num_users, config.embed_dim
        );

        Ok(Self {
            config: config.clone(),
            group_embeddings: Arc::new(group_embeddings),
            user_embeddings: Arc::new(user_embeddings),
            rng,
            episode: None,
        })
    }

    fn reset(&mut self, seed: Option<u64>) -> Result<RecObs> {
        if let Some(seed) = seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        let user_id = self.rng.gen_range(0..self.config.num_users);
        let episode = Episode {
            user_id,
            user_embed: self.user_embeddings.row(user_id).to_owned(),
            last_seq: vec![0; self.config.seq_len],
            step_count: 0,
        };
        let obs = Self::obs(&episode);
        self.episode = Some(episode);
        Ok(obs)
    }

    fn step(&mut self, act: usize) -> Result<(Step<Self>, Record)> {
        let num_actions = self.config.num_groups;
        if act >= num_actions {
            return Err(RecEnvError::InvalidAction {
                action: act,
                num_actions,
            }
            .into());
        }
        let mut episode = self.episode.take().ok_or(RecEnvError::NotReset)?;
        episode.step_count += 1;

        let groups = self.group_embeddings.clone();
        let group = groups.row(act);
        let sim = cosine(episode.user_embed.view(), group);
        let base_prob = (sim + 1.0) / 2.0;
        let click_prob = 0.5 * (base_prob * self.config.click_prob_scale + 0.1);
        let join_prob = 0.2 * (base_prob * self.config.join_prob_scale + 0.05);

        let x: f32 = self.rng.gen();
        let outcome = if x < join_prob {
            episode.user_embed = self.drift(&episode.user_embed, group, 0.9, 0.1);
            Outcome::Join
        } else if x < join_prob + click_prob {
            episode.user_embed = self.drift(&episode.user_embed, group, 0.98, 0.02);
            Outcome::Click
        } else {
            Outcome::Ignore
        };

        episode.last_seq.rotate_left(1);
        if let Some(last) = episode.last_seq.last_mut() {
            *last = act;
        }

        let is_terminated = episode.step_count >= self.config.max_steps;
        let info = StepInfo {
            sim,
            click_prob,
            join_prob,
            outcome,
        };
        let record = Record::from(&info);
        let obs = Self::obs(&episode);
        self.episode = Some(episode);
        debug!("{} outcome={}", self.render(), outcome);

        let step = Step::new(obs, act, outcome.reward(), is_terminated, info);
        Ok((step, record))
    }

    fn num_actions(&self) -> usize {
        self.config.num_groups
    }
}
