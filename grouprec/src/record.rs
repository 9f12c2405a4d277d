//! Recommendation records written to the store.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of the recommended entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    /// A group.
    Group,

    /// An event of a group.
    Event,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group => write!(f, "group"),
            Self::Event => write!(f, "event"),
        }
    }
}

/// Provenance of a recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationMetadata {
    /// Name of the model.
    pub model: String,

    /// Version of the model.
    pub version: String,

    /// Generation time in RFC 3339.
    pub generated_at: String,
}

impl RecommendationMetadata {
    /// Metadata of the DQN model at the given time.
    pub fn dqn(generated_at: DateTime<Utc>) -> Self {
        Self {
            model: "dqn".to_string(),
            version: "1.0".to_string(),
            generated_at: generated_at.to_rfc3339(),
        }
    }
}

/// A scored recommendation of an entity for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    /// Identifier of the user.
    pub user_id: String,

    /// Kind of the entity.
    pub entity_type: EntityType,

    /// Identifier of the entity.
    pub entity_id: String,

    /// Score, higher is better.
    pub score: f32,

    /// 1-based rank among the recommendations of the same user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<usize>,

    /// Provenance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RecommendationMetadata>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serde_entity_type() -> anyhow::Result<()> {
        let record = RecommendationRecord {
            user_id: "u1".to_string(),
            entity_type: EntityType::Event,
            entity_id: "e1".to_string(),
            score: 0.5,
            rank: None,
            metadata: None,
        };
        let value = serde_json::to_value(&record)?;
        assert_eq!(
            value,
            json!({"user_id": "u1", "entity_type": "event", "entity_id": "e1", "score": 0.5})
        );
        let record_: RecommendationRecord = serde_json::from_value(value)?;
        assert_eq!(record, record_);
        Ok(())
    }
}
