use std::path::PathBuf;
use thiserror::Error;

/// Errors on function approximators and their checkpoints.
#[derive(Error, Debug, PartialEq)]
pub enum ModelError {
    /// The checkpoint file does not exist.
    #[error("Checkpoint not found: {0:?}")]
    MissingCheckpoint(PathBuf),

    /// A parameter of the model is missing in the source.
    #[error("Missing tensor: {0}")]
    MissingTensor(String),

    /// A parameter has a different shape in the source.
    #[error("Shape mismatch of {name}: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Name of the parameter.
        name: String,
        /// Shape in the model.
        expected: Vec<usize>,
        /// Shape in the source.
        got: Vec<usize>,
    },

    /// Optimization was requested on a model built without optimizer.
    #[error("Model is frozen and cannot be optimized")]
    Frozen,
}
