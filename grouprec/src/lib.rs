#![warn(missing_docs)]
//! Group recommendations for a social platform.
//!
//! A DQN agent from [`grouprec_candle_agent`] is trained on the simulated
//! environment of [`grouprec_env`] with the training loop of
//! [`grouprec_core`]. This crate serves the trained network:
//!
//! * [`embed_hobbies`] - deterministic user embeddings from interest names.
//! * [`RecommendationEngine`] - ranks groups for users from store rows.
//! * [`synthesize_event_recommendations`] - derives event recommendations
//!   from group recommendations.
//! * [`store`] - traits to read rows and write recommendations, with an
//!   in-memory and a JSON file implementation.
//! * [`ServiceContext`] - runs the recommendation job, one at a time.
mod embedding;
mod engine;
mod events;
mod record;
mod service;
pub mod store;
pub use embedding::{embed_hobbies, DEFAULT_HOBBIES};
pub use engine::{RecommendationEngine, MASKED_Q_VALUE};
pub use events::{synthesize_event_recommendations, DECAY_DAYS, TOP_GROUPS_PER_USER};
pub use record::{EntityType, RecommendationMetadata, RecommendationRecord};
pub use service::{JobOutcome, ServiceContext, ServiceStatus};
