//! Replay buffer of [`Transition`](crate::Transition)s.
//!
//! # Key Components
//!
//! - [`SimpleReplayBuffer`]: a fixed-capacity ring buffer with uniform sampling
//! - [`TransitionBatch`]: a batch of transitions with row-aligned fields
//! - [`SimpleStepProcessor`]: converts environment steps into transitions
//!
//! # Examples
//!
//! ```rust
//! use grouprec_core::{
//!     replay_buffer::{SimpleReplayBuffer, SimpleReplayBufferConfig},
//!     ExperienceBufferBase, ReplayBufferBase, Transition,
//! };
//!
//! let config = SimpleReplayBufferConfig::default().capacity(2).seed(7);
//! let mut buffer = SimpleReplayBuffer::build(&config);
//! for action in 0..3 {
//!     buffer.push(Transition {
//!         state: vec![0.0; 4],
//!         action,
//!         reward: 0.5,
//!         next_state: vec![1.0; 4],
//!         is_terminated: false,
//!     }).unwrap();
//! }
//! assert_eq!(buffer.len(), 2);
//! assert!(buffer.batch(3).is_err());
//! assert_eq!(buffer.batch(2).unwrap().len(), 2);
//! ```
mod base;
mod batch;
mod config;
mod step_proc;
pub use base::{ReplayBufferError, SimpleReplayBuffer};
pub use batch::TransitionBatch;
pub use config::SimpleReplayBufferConfig;
pub use step_proc::SimpleStepProcessor;
