mod common;
use anyhow::Result;
use common::*;
use grouprec::{EntityType, RecommendationEngine, DEFAULT_HOBBIES};
use grouprec_candle_agent::{Device, ModelError};
use std::collections::HashSet;
use tempdir::TempDir;

#[test]
fn test_joined_groups_are_never_recommended() -> Result<()> {
    let dir = TempDir::new("recommend")?;
    let config = env_config();
    save_checkpoint(&config, dir.path())?;
    let engine = RecommendationEngine::new(&config, ENV_SEED, dir.path(), Device::Cpu)?;

    let snapshot = snapshot(config.num_groups);
    let interests = snapshot.interests_by_user();
    let recs = engine.generate_recommendations(
        &snapshot.users,
        &snapshot.groups,
        &snapshot.memberships,
        &interests,
        8,
    )?;
    assert_eq!(recs.len(), 3 * 8);

    for user_id in ["u1", "u2", "u3"] {
        let user_recs: Vec<_> = recs.iter().filter(|r| r.user_id == user_id).collect();
        let ranks: Vec<_> = user_recs.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, (1..=8usize).map(Some).collect::<Vec<_>>());
        assert!(user_recs.windows(2).all(|w| w[0].score >= w[1].score));

        let ids: HashSet<i64> = user_recs
            .iter()
            .map(|r| r.entity_id.parse::<i64>())
            .collect::<Result<_, _>>()?;
        assert_eq!(ids.len(), 8);
        assert!(ids.iter().all(|&id| (1..=12).contains(&id)));
        if user_id == "u1" {
            assert!(ids.is_disjoint(&HashSet::from([1, 2, 3])));
        }
    }

    for r in recs.iter() {
        assert_eq!(r.entity_type, EntityType::Group);
        let metadata = r.metadata.as_ref().unwrap();
        assert_eq!(metadata.model, "dqn");
        assert_eq!(metadata.version, "1.0");
    }
    Ok(())
}

#[test]
fn test_top_k_larger_than_candidates() -> Result<()> {
    let dir = TempDir::new("recommend_top_k")?;
    let config = env_config();
    save_checkpoint(&config, dir.path())?;
    let engine = RecommendationEngine::new(&config, ENV_SEED, dir.path(), Device::Cpu)?;

    let snapshot = snapshot(config.num_groups);
    let recs = engine.generate_recommendations(
        &snapshot.users[..1],
        &snapshot.groups,
        &snapshot.memberships,
        &snapshot.interests_by_user(),
        100,
    )?;
    assert_eq!(recs.len(), 12 - 3);
    assert_eq!(recs.last().unwrap().rank, Some(9));
    Ok(())
}

#[test]
fn test_engine_matches_agent() -> Result<()> {
    let dir = TempDir::new("recommend_agent")?;
    let config = env_config();
    let agent = save_checkpoint(&config, dir.path())?;
    let engine = RecommendationEngine::new(&config, ENV_SEED, dir.path(), Device::Cpu)?;

    let no_hobbies: [&str; 0] = [];
    let state = engine.user_state(&no_hobbies, &[4, 9])?;
    assert_eq!(state, engine.user_state(&DEFAULT_HOBBIES, &[0, 4, 9])?);
    assert_eq!(state.len(), config.state_dim());
    assert_eq!(engine.q_values(&state)?, agent.q_values(&state)?);
    Ok(())
}

#[test]
fn test_missing_checkpoint() -> Result<()> {
    let dir = TempDir::new("recommend_missing")?;
    let err = RecommendationEngine::new(&env_config(), ENV_SEED, dir.path(), Device::Cpu)
        .err()
        .unwrap();
    assert!(matches!(
        err.downcast_ref::<ModelError>(),
        Some(ModelError::MissingCheckpoint(_))
    ));
    Ok(())
}

#[test]
fn test_checkpoint_shape_mismatch() -> Result<()> {
    let dir = TempDir::new("recommend_mismatch")?;
    save_checkpoint(&env_config(), dir.path())?;

    let config = env_config().num_groups(13);
    let err = RecommendationEngine::new(&config, ENV_SEED, dir.path(), Device::Cpu)
        .err()
        .unwrap();
    assert!(matches!(
        err.downcast_ref::<ModelError>(),
        Some(ModelError::ShapeMismatch { .. })
    ));
    Ok(())
}
