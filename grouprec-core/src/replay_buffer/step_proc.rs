//! Conversion of environment steps into transitions.
use crate::{Env, StateEncoder, Step, StepProcessor, Transition};
use anyhow::{bail, Result};
use std::marker::PhantomData;

/// Builds [`Transition`]s from consecutive [`Step`]s of a single environment.
///
/// Observations are encoded with the state encoder `C`, which is also the
/// configuration of this processor. The encoded state of the latest
/// observation is kept so that the agent can act on it.
pub struct SimpleStepProcessor<E, C> {
    encoder: C,
    prev_state: Option<Vec<f32>>,
    phantom: PhantomData<E>,
}

impl<E, C> SimpleStepProcessor<E, C>
where
    E: Env,
    C: StateEncoder<E> + Clone,
{
    /// The state encoder.
    pub fn encoder(&self) -> &C {
        &self.encoder
    }
}

impl<E, C> StepProcessor<E> for SimpleStepProcessor<E, C>
where
    E: Env,
    C: StateEncoder<E> + Clone,
{
    type Config = C;
    type Output = Transition;

    fn build(config: &Self::Config) -> Self {
        Self {
            encoder: config.clone(),
            prev_state: None,
            phantom: PhantomData,
        }
    }

    fn reset(&mut self, init_obs: &E::Obs) -> Result<()> {
        self.prev_state = Some(self.encoder.encode(init_obs)?);
        Ok(())
    }

    fn state(&self) -> Option<&[f32]> {
        self.prev_state.as_deref()
    }

    /// Encodes the observation of `step` and pairs it with the previous state.
    ///
    /// # Errors
    ///
    /// Fails if [`StepProcessor::reset`] has not been called before.
    fn process(&mut self, step: &Step<E>) -> Result<Self::Output> {
        if self.prev_state.is_none() {
            bail!("prev_state is not set. Forgot to call reset()?");
        }
        let next_state = self.encoder.encode(&step.obs)?;
        let state = self.prev_state.replace(next_state.clone()).unwrap_or_default();

        Ok(Transition {
            state,
            action: step.act,
            reward: step.reward,
            next_state,
            is_terminated: step.is_terminated,
        })
    }
}
