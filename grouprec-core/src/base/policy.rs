//! Policy.
use super::Env;
use anyhow::Result;
use serde::de::DeserializeOwned;

/// A policy on an environment.
///
/// Policy is a mapping from an encoded state to an action index.
/// The mapping can be either of deterministic or stochastic.
pub trait Policy<E: Env> {
    /// Sample an action given an encoded state.
    fn sample(&mut self, state: &[f32]) -> Result<usize>;
}

/// A configurable object, having type parameter.
pub trait Configurable {
    /// Configuration.
    type Config: Clone + DeserializeOwned;

    /// Builds the object.
    fn build(config: Self::Config) -> Result<Self>
    where
        Self: Sized;
}
