//! Uniform random policy.
use crate::{Env, Policy};
use anyhow::Result;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Samples actions uniformly at random, ignoring the state.
///
/// Used as a baseline for trained agents.
pub struct RandomPolicy {
    num_actions: usize,
    rng: StdRng,
}

impl RandomPolicy {
    /// Constructs a policy over `num_actions` actions.
    pub fn new(num_actions: usize, seed: u64) -> Self {
        Self {
            num_actions,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<E: Env> Policy<E> for RandomPolicy {
    fn sample(&mut self, _state: &[f32]) -> Result<usize> {
        if self.num_actions == 0 {
            anyhow::bail!("No action to sample");
        }
        Ok(self.rng.gen_range(0..self.num_actions))
    }
}
