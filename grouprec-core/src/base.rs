//! Core functionalities.
mod agent;
mod encoder;
mod env;
mod policy;
mod replay_buffer;
mod step;
pub use agent::Agent;
pub use encoder::StateEncoder;
pub use env::Env;
pub use policy::{Configurable, Policy};
pub use replay_buffer::{ExperienceBufferBase, ReplayBufferBase};
pub use step::{Step, StepProcessor, Transition};
