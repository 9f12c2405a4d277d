//! Batch of transitions sampled from a replay buffer.
use crate::Transition;

/// A batch of transitions.
///
/// Row `i` of every field belongs to the same transition. States are stored
/// row-major in flat vectors of length `len() * state_dim`, so they can be
/// turned into `[batch_size, state_dim]` tensors without copying rows.
#[derive(Clone, Debug, Default)]
pub struct TransitionBatch {
    /// Encoded states.
    pub state: Vec<f32>,

    /// Action indices.
    pub action: Vec<usize>,

    /// Rewards.
    pub reward: Vec<f32>,

    /// Encoded next states.
    pub next_state: Vec<f32>,

    /// Termination flags, `1` for terminal transitions.
    pub is_terminated: Vec<i8>,

    /// Indices of the sampled transitions in the replay buffer.
    pub ix_sample: Vec<usize>,

    /// Dimension of a single state.
    pub state_dim: usize,
}

impl TransitionBatch {
    pub(crate) fn with_capacity(capacity: usize, state_dim: usize) -> Self {
        Self {
            state: Vec::with_capacity(capacity * state_dim),
            action: Vec::with_capacity(capacity),
            reward: Vec::with_capacity(capacity),
            next_state: Vec::with_capacity(capacity * state_dim),
            is_terminated: Vec::with_capacity(capacity),
            ix_sample: Vec::with_capacity(capacity),
            state_dim,
        }
    }

    pub(crate) fn push(&mut self, tr: &Transition) {
        self.state.extend_from_slice(&tr.state);
        self.action.push(tr.action);
        self.reward.push(tr.reward);
        self.next_state.extend_from_slice(&tr.next_state);
        self.is_terminated.push(tr.is_terminated as i8);
    }

    /// Number of transitions in the batch.
    pub fn len(&self) -> usize {
        self.action.len()
    }

    /// Returns `true` if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.action.is_empty()
    }

    /// State of the `i`-th transition.
    pub fn state_row(&self, i: usize) -> &[f32] {
        &self.state[i * self.state_dim..(i + 1) * self.state_dim]
    }

    /// Next state of the `i`-th transition.
    pub fn next_state_row(&self, i: usize) -> &[f32] {
        &self.next_state[i * self.state_dim..(i + 1) * self.state_dim]
    }
}
