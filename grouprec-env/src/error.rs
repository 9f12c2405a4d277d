//! Errors of the environment.
use thiserror::Error;

/// Errors raised by [`RecEnv`](crate::RecEnv) and
/// [`SeqStateEncoder`](crate::SeqStateEncoder).
#[derive(Error, Debug, PartialEq)]
pub enum RecEnvError {
    /// The action is not a valid group index.
    #[error("Invalid action {action}: expected an index in [0, {num_actions})")]
    InvalidAction {
        /// The given action.
        action: usize,
        /// The number of actions.
        num_actions: usize,
    },

    /// A step was taken before the first reset.
    #[error("Environment must be reset before stepping")]
    NotReset,

    /// The configuration is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An observation or a part of it has an unexpected length.
    #[error("Invalid observation dimension: expected {expected}, got {got}")]
    ObsDimension {
        /// Expected length.
        expected: usize,
        /// Given length.
        got: usize,
    },
}
