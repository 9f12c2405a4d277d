//! Per-step information.
use grouprec_core::record::{Record, RecordValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Response of the simulated user to a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The user joined the group.
    Join,
    /// The user clicked the group.
    Click,
    /// The user ignored the group.
    Ignore,
}

impl Outcome {
    /// Reward of the outcome.
    pub fn reward(&self) -> f32 {
        match self {
            Self::Join => 2.0,
            Self::Click => 0.5,
            Self::Ignore => 0.0,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Join => "join",
            Self::Click => "click",
            Self::Ignore => "ignore",
        };
        write!(f, "{}", s)
    }
}

/// Quantities computed in a step of [`RecEnv`](crate::RecEnv).
#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    /// Cosine similarity between the user and the recommended group.
    pub sim: f32,

    /// Click probability.
    pub click_prob: f32,

    /// Join probability.
    pub join_prob: f32,

    /// Sampled response of the user.
    pub outcome: Outcome,
}

impl From<&StepInfo> for Record {
    fn from(info: &StepInfo) -> Self {
        Record::from_slice(&[
            ("sim", RecordValue::Scalar(info.sim)),
            ("click_prob", RecordValue::Scalar(info.click_prob)),
            ("join_prob", RecordValue::Scalar(info.join_prob)),
            ("outcome", RecordValue::String(info.outcome.to_string())),
        ])
    }
}
