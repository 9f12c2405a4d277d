//! Default implementation of [`Evaluator`].
use super::Evaluator;
use crate::{record::Record, Env, Policy, StateEncoder};
use anyhow::Result;

/// Runs a fixed number of episodes and returns the average return.
///
/// Episode `i` is started with seed `i`, so that different policies are
/// compared on the same sequence of users.
///
/// ```ignore
/// let mut evaluator = DefaultEvaluator::new(env, encoder, 10)?;
/// let record = evaluator.evaluate(&mut policy)?;
/// println!("Average return: {}", record.get_scalar("episode_return")?);
/// ```
pub struct DefaultEvaluator<E: Env, C: StateEncoder<E>> {
    n_episodes: usize,
    env: E,
    encoder: C,
}

impl<E: Env, C: StateEncoder<E>> Evaluator<E> for DefaultEvaluator<E, C> {
    fn evaluate<P: Policy<E>>(&mut self, policy: &mut P) -> Result<Record> {
        let mut r_total = 0f32;

        for ix in 0..self.n_episodes {
            let mut state = self.encoder.encode(&self.env.reset(Some(ix as u64))?)?;

            loop {
                let act = policy.sample(&state)?;
                let (step, _) = self.env.step(act)?;
                r_total += step.reward;
                if step.is_done() {
                    break;
                }
                state = self.encoder.encode(&step.obs)?;
            }
        }

        let n = self.n_episodes.max(1) as f32;
        Ok(Record::from_scalar("episode_return", r_total / n))
    }
}

impl<E: Env, C: StateEncoder<E>> DefaultEvaluator<E, C> {
    /// Constructs a new [`DefaultEvaluator`].
    ///
    /// `encoder` must be consistent with `env`, typically derived from it.
    pub fn new(env: E, encoder: C, n_episodes: usize) -> Result<Self> {
        Ok(Self {
            n_episodes,
            env,
            encoder,
        })
    }
}
