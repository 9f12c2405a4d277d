#![warn(missing_docs)]
//! Core components of the grouprec reinforcement learning recommender.
//!
//! This crate is backend agnostic. It defines the interfaces connecting an
//! environment, an agent and a replay buffer, together with the training loop
//! and the record system used for logging metrics.
//!
//! * [`Env`] - an MDP emitting [`Step`] objects.
//! * [`StateEncoder`] - maps raw observations into fixed-size state vectors.
//! * [`Policy`] and [`Agent`] - action selection and parameter updates.
//! * [`replay_buffer::SimpleReplayBuffer`] - fixed-capacity FIFO store of [`Transition`]s.
//! * [`Trainer`] - episodic training loop.
//! * [`record`] - key-value records and recorders.
pub mod error;
pub mod record;
pub mod replay_buffer;

mod base;
pub use base::{
    Agent, Configurable, Env, ExperienceBufferBase, Policy, ReplayBufferBase, StateEncoder, Step,
    StepProcessor, Transition,
};

mod evaluator;
pub use evaluator::{DefaultEvaluator, Evaluator};

mod random_policy;
pub use random_policy::RandomPolicy;

mod trainer;
pub use trainer::{Trainer, TrainerConfig, TrainingSummary};
