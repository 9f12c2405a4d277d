//! Ring buffer implementation of the replay buffer.
use super::{SimpleReplayBufferConfig, TransitionBatch};
use crate::{ExperienceBufferBase, ReplayBufferBase, Transition};
use anyhow::Result;
use rand::{rngs::StdRng, seq::index, SeedableRng};
use thiserror::Error;

/// Errors raised by [`SimpleReplayBuffer`].
#[derive(Error, Debug, PartialEq)]
pub enum ReplayBufferError {
    /// More transitions were requested than the buffer holds.
    ///
    /// This is recoverable: the caller should skip the update.
    #[error("Insufficient data: requested {requested} transitions, buffer holds {available}")]
    InsufficientData {
        /// Requested batch size.
        requested: usize,
        /// Number of stored transitions.
        available: usize,
    },

    /// A transition has a state dimension different from the stored ones.
    #[error("State dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Dimension of the transitions already stored.
        expected: usize,
        /// Dimension of the rejected transition.
        got: usize,
    },
}

/// A fixed-capacity replay buffer with FIFO eviction and uniform sampling.
///
/// Transitions are stored in a ring. Once the buffer is full, each push
/// overwrites the oldest transition.
pub struct SimpleReplayBuffer {
    /// Maximum number of transitions that can be stored.
    capacity: usize,

    /// Index where the next transition is written.
    i: usize,

    /// Stored transitions.
    data: Vec<Transition>,

    /// Dimension shared by all stored states, fixed by the first push.
    state_dim: Option<usize>,

    /// Random number generator for sampling.
    rng: StdRng,
}

impl SimpleReplayBuffer {
    /// Returns the capacity of the buffer.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the dimension of stored states, if any transition was pushed.
    pub fn state_dim(&self) -> Option<usize> {
        self.state_dim
    }

    /// Iterates over the stored transitions from the oldest to the newest.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        let (newer, older) = if self.data.len() < self.capacity {
            self.data.split_at(self.data.len())
        } else {
            self.data.split_at(self.i)
        };
        older.iter().chain(newer.iter())
    }

    fn check_dim(&mut self, tr: &Transition) -> Result<(), ReplayBufferError> {
        let got = tr.state.len();
        if tr.next_state.len() != got {
            return Err(ReplayBufferError::DimensionMismatch {
                expected: got,
                got: tr.next_state.len(),
            });
        }
        match self.state_dim {
            Some(expected) if expected != got => {
                Err(ReplayBufferError::DimensionMismatch { expected, got })
            }
            Some(_) => Ok(()),
            None => {
                self.state_dim = Some(got);
                Ok(())
            }
        }
    }
}

impl ExperienceBufferBase for SimpleReplayBuffer {
    type Item = Transition;

    fn len(&self) -> usize {
        self.data.len()
    }

    /// Adds a transition, evicting the oldest one if the buffer is full.
    ///
    /// # Errors
    ///
    /// Fails with [`ReplayBufferError::DimensionMismatch`] if the state
    /// dimension differs from the transitions already stored.
    fn push(&mut self, tr: Self::Item) -> Result<()> {
        self.check_dim(&tr)?;

        if self.data.len() < self.capacity {
            self.data.push(tr);
        } else {
            self.data[self.i] = tr;
        }
        self.i = (self.i + 1) % self.capacity;

        Ok(())
    }
}

impl ReplayBufferBase for SimpleReplayBuffer {
    type Config = SimpleReplayBufferConfig;
    type Batch = TransitionBatch;

    /// Creates an empty replay buffer.
    ///
    /// # Panics
    ///
    /// Panics if `config.capacity == 0`.
    fn build(config: &Self::Config) -> Self {
        assert!(config.capacity > 0, "Capacity of replay buffer must be positive");
        Self {
            capacity: config.capacity,
            i: 0,
            data: Vec::with_capacity(config.capacity),
            state_dim: None,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    /// Samples `size` distinct transitions uniformly at random.
    ///
    /// # Errors
    ///
    /// Fails with [`ReplayBufferError::InsufficientData`] if `size` exceeds
    /// the number of stored transitions. Nothing is padded or partially sampled.
    fn batch(&mut self, size: usize) -> Result<Self::Batch> {
        let available = self.data.len();
        if size > available {
            return Err(ReplayBufferError::InsufficientData {
                requested: size,
                available,
            }
            .into());
        }

        let ixs = index::sample(&mut self.rng, available, size).into_vec();
        let state_dim = self.state_dim.unwrap_or(0);
        let mut batch = TransitionBatch::with_capacity(size, state_dim);
        for &ix in ixs.iter() {
            batch.push(&self.data[ix]);
        }
        batch.ix_sample = ixs;

        Ok(batch)
    }
}
