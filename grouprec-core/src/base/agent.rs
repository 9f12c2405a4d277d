//! Agent.
use super::{Env, Policy, Transition};
use crate::record::Record;
use anyhow::Result;
use std::path::Path;

/// Represents a trainable policy on an environment.
///
/// The agent owns its replay buffer: transitions are pushed into it with
/// [`Agent::push`] and consumed by [`Agent::opt`].
pub trait Agent<E: Env>: Policy<E> {
    /// Set the policy to training mode.
    fn train(&mut self);

    /// Set the policy to evaluation mode.
    fn eval(&mut self);

    /// Return if it is in training mode.
    fn is_train(&self) -> bool;

    /// Stores a transition for later updates.
    fn push(&mut self, transition: Transition) -> Result<()>;

    /// Performs an optimization step.
    ///
    /// Returns `Ok(None)` if the step was skipped, for example during the
    /// warm-up period of the replay buffer.
    fn opt(&mut self) -> Result<Option<Record>>;

    /// Save the parameters of the agent in the given directory.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Load the parameters of the agent from the given directory.
    fn load_params(&mut self, path: &Path) -> Result<()>;
}
