//! State encoding.
use super::Env;
use anyhow::Result;

/// Maps a raw observation of an environment into the fixed-size state vector
/// consumed by function approximators.
///
/// Every component feeding an approximator, during training or serving, must
/// go through the same encoder so that states are reproduced bit-for-bit.
pub trait StateEncoder<E: Env> {
    /// Dimension of the encoded state.
    fn state_dim(&self) -> usize;

    /// Encodes an observation.
    fn encode(&self, obs: &E::Obs) -> Result<Vec<f32>>;
}
