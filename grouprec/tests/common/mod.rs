#![allow(dead_code)]
use anyhow::Result;
use grouprec::store::{EventRow, GroupRow, InterestRow, MembershipRow, StoreSnapshot, UserRow};
use grouprec_candle_agent::{
    dqn::{Dqn, DqnConfig},
    mlp::Mlp,
};
use grouprec_core::{Agent, Configurable};
use grouprec_env::{RecEnv, RecEnvConfig};
use std::path::Path;

pub const ENV_SEED: u64 = 7;

pub fn env_config() -> RecEnvConfig {
    RecEnvConfig::default()
        .num_groups(12)
        .num_users(10)
        .embed_dim(4)
        .seq_len(3)
        .max_steps(5)
}

pub fn agent(config: &RecEnvConfig) -> Result<Dqn<RecEnv, Mlp>> {
    let agent_config = DqnConfig::<Mlp>::mlp(config.state_dim(), config.num_groups).batch_size(8);
    Dqn::build(agent_config)
}

/// Saves an untrained agent for `config` in `dir`.
pub fn save_checkpoint(config: &RecEnvConfig, dir: &Path) -> Result<Dqn<RecEnv, Mlp>> {
    let agent = agent(config)?;
    agent.save_params(dir)?;
    Ok(agent)
}

pub fn user(id: &str) -> UserRow {
    UserRow {
        id: id.to_string(),
        auth_user_id: None,
    }
}

pub fn membership(user_id: &str, group_id: i64) -> MembershipRow {
    MembershipRow {
        user_id: user_id.to_string(),
        group_id,
    }
}

pub fn snapshot(num_groups: usize) -> StoreSnapshot {
    StoreSnapshot {
        users: vec![user("u1"), user("u2"), user("u3")],
        groups: (1..=num_groups as i64)
            .map(|id| GroupRow {
                id,
                name: format!("Group {}", id),
                kind: None,
            })
            .collect(),
        memberships: vec![membership("u1", 1), membership("u1", 2), membership("u1", 3)],
        events: (1..=num_groups as i64)
            .map(|group_id| EventRow {
                id: format!("event-{}", group_id),
                group_id,
                time: Some("2999-01-01T00:00:00Z".to_string()),
                title: None,
            })
            .collect(),
        user_interests: vec![InterestRow {
            user_id: "u2".to_string(),
            name: Some("music".to_string()),
        }],
    }
}
