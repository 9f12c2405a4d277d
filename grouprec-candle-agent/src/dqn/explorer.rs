//! Exploration strategy of DQN.
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Epsilon-greedy explorer with multiplicative decay.
///
/// Epsilon starts at `eps_start` and is multiplied by `eps_decay` after each
/// optimization step, never going below `eps_end`.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpsilonGreedy {
    /// Initial value of epsilon.
    pub eps_start: f64,

    /// Lower bound of epsilon.
    pub eps_end: f64,

    /// Decay factor applied per optimization step.
    pub eps_decay: f64,

    #[serde(skip)]
    eps: Option<f64>,
}

impl Default for EpsilonGreedy {
    fn default() -> Self {
        Self {
            eps_start: 1.0,
            eps_end: 0.05,
            eps_decay: 0.995,
            eps: None,
        }
    }
}

impl EpsilonGreedy {
    /// Constructs epsilon-greedy explorer.
    pub fn new(eps_start: f64, eps_end: f64, eps_decay: f64) -> Self {
        Self {
            eps_start,
            eps_end,
            eps_decay,
            eps: None,
        }
    }

    /// Current value of epsilon.
    pub fn epsilon(&self) -> f64 {
        self.eps.unwrap_or(self.eps_start)
    }

    /// Applies one step of decay.
    pub fn decay(&mut self) {
        self.eps = Some((self.epsilon() * self.eps_decay).max(self.eps_end));
    }

    /// Returns a uniformly random action with probability epsilon, `None`
    /// when the greedy action should be taken.
    pub fn explore(&self, n_actions: usize, rng: &mut impl Rng) -> Option<usize> {
        if n_actions > 0 && rng.gen::<f64>() < self.epsilon() {
            Some(rng.gen_range(0..n_actions))
        } else {
            None
        }
    }
}
