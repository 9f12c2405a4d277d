//! Environment.
use super::Step;
use crate::record::Record;
use anyhow::Result;
use std::fmt::Debug;

/// Represents an environment, typically an MDP with a discrete action space.
///
/// Actions are indices in `[0, num_actions())`.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Clone + Debug;

    /// Information in the [`Step`] object.
    type Info: Clone + Debug;

    /// Builds an environment with a given random seed.
    ///
    /// If `seed` is `None`, the random source is seeded from the operating system.
    fn build(config: &Self::Config, seed: Option<u64>) -> Result<Self>
    where
        Self: Sized;

    /// Starts a new episode and returns its initial observation.
    ///
    /// If `seed` is given, the random source of the environment is reseeded
    /// before the episode is sampled.
    fn reset(&mut self, seed: Option<u64>) -> Result<Self::Obs>;

    /// Performes an environment step.
    ///
    /// Calling this method before [`Env::reset`] or with an action out of range
    /// is a precondition violation and returns an error.
    fn step(&mut self, act: usize) -> Result<(Step<Self>, Record)>
    where
        Self: Sized;

    /// The number of actions.
    fn num_actions(&self) -> usize;
}
