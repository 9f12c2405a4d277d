#![warn(missing_docs)]
//! Simulated sequential recommendation environment.
//!
//! Users and groups (items) are latent vectors drawn from a standard normal
//! distribution. At every step the agent recommends a group; the simulated
//! user joins, clicks or ignores it with probabilities derived from the cosine
//! similarity between the user and the group. Joining and clicking move the
//! user's interest vector slightly toward the group.
//!
//! ```rust
//! use grouprec_core::{Env, StateEncoder};
//! use grouprec_env::{RecEnv, RecEnvConfig};
//!
//! let config = RecEnvConfig::default().num_groups(10).embed_dim(4);
//! let mut env = RecEnv::build(&config, Some(42)).unwrap();
//! let encoder = env.encoder();
//! let obs = env.reset(None).unwrap();
//! let state = encoder.encode(&obs).unwrap();
//! assert_eq!(state.len(), 8);
//!
//! let (step, _) = env.step(3).unwrap();
//! assert!([0.0, 0.5, 2.0].contains(&step.reward));
//! ```
mod config;
mod encoder;
mod env;
mod error;
mod info;
mod obs;
pub use config::RecEnvConfig;
pub use encoder::SeqStateEncoder;
pub use env::RecEnv;
pub use error::RecEnvError;
pub use info::{Outcome, StepInfo};
pub use obs::RecObs;
