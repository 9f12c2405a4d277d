//! Environment step and transitions.
use super::Env;
use anyhow::Result;

/// Represents an action, observation and reward tuple `(a_t, o_t+1, r_t)`
/// with some additional information.
///
/// An environment emits [`Step`] object at every interaction steps.
/// This object is used to create transitions `(s_t, a_t, r_t, s_t+1)`.
pub struct Step<E: Env> {
    /// Action.
    pub act: usize,

    /// Observation.
    pub obs: E::Obs,

    /// Reward.
    pub reward: f32,

    /// Flag denoting if episode is terminated.
    pub is_terminated: bool,

    /// Information defined by the environment.
    pub info: E::Info,
}

impl<E: Env> Step<E> {
    /// Constructs a [`Step`] object.
    pub fn new(obs: E::Obs, act: usize, reward: f32, is_terminated: bool, info: E::Info) -> Self {
        Step {
            act,
            obs,
            reward,
            is_terminated,
            info,
        }
    }

    #[inline]
    /// Returns `true` if the episode ended with this step.
    pub fn is_done(&self) -> bool {
        self.is_terminated
    }
}

/// A transition `(s_t, a_t, r_t, s_t+1, terminal)` stored in a replay buffer.
///
/// `state` and `next_state` are encoded state vectors, not raw observations.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    /// Encoded state before the action.
    pub state: Vec<f32>,

    /// Index of the action taken.
    pub action: usize,

    /// Reward received.
    pub reward: f32,

    /// Encoded state after the action.
    pub next_state: Vec<f32>,

    /// `true` iff the episode ended after this transition.
    pub is_terminated: bool,
}

/// Process [`Step`] and output an item [`Self::Output`].
///
/// This trait is used in [`Trainer`](crate::Trainer). [`Step`] object is transformed to
/// [`Self::Output`], which will be pushed into a replay buffer implementing
/// [`ExperienceBufferBase`](crate::ExperienceBufferBase).
///
/// [`Self::Output`]: StepProcessor::Output
pub trait StepProcessor<E: Env> {
    /// Configuration.
    type Config: Clone;

    /// The type of transitions produced by this trait.
    type Output;

    /// Build a producer.
    fn build(config: &Self::Config) -> Self;

    /// Resets the object with the initial observation of an episode.
    fn reset(&mut self, init_obs: &E::Obs) -> Result<()>;

    /// The encoded state of the latest observation, if any.
    fn state(&self) -> Option<&[f32]>;

    /// Processes a [`Step`] object.
    fn process(&mut self, step: &Step<E>) -> Result<Self::Output>;
}
