mod common;
use anyhow::{bail, Result};
use common::*;
use grouprec::{
    store::{
        DataSource, EventRow, GroupRow, MemoryStore, MembershipRow, RecommendationSink, UserRow,
    },
    EntityType, JobOutcome, RecommendationEngine, RecommendationRecord, ServiceContext,
};
use grouprec_candle_agent::Device;
use std::{collections::HashMap, sync::Mutex};
use tempdir::TempDir;

fn context(dir: &TempDir) -> Result<ServiceContext> {
    let config = env_config();
    save_checkpoint(&config, dir.path())?;
    let engine = RecommendationEngine::new(&config, ENV_SEED, dir.path(), Device::Cpu)?;
    Ok(ServiceContext::new(engine))
}

/// Starts a nested job while the rows of the outer job are fetched.
struct ReentrantSource<'a> {
    ctx: &'a ServiceContext,
    inner: MemoryStore,
    nested: Mutex<Option<JobOutcome>>,
}

impl DataSource for ReentrantSource<'_> {
    fn users(&self) -> Result<Vec<UserRow>> {
        let mut sink = MemoryStore::default();
        let outcome = self.ctx.run_job(&self.inner, &mut sink, 3);
        *self.nested.lock().unwrap() = Some(outcome);
        self.inner.users()
    }

    fn groups(&self) -> Result<Vec<GroupRow>> {
        self.inner.groups()
    }

    fn memberships(&self) -> Result<Vec<MembershipRow>> {
        self.inner.memberships()
    }

    fn events(&self) -> Result<Vec<EventRow>> {
        self.inner.events()
    }

    fn user_interests(&self) -> Result<HashMap<String, Vec<String>>> {
        self.inner.user_interests()
    }
}

struct BrokenSource;

impl DataSource for BrokenSource {
    fn users(&self) -> Result<Vec<UserRow>> {
        bail!("connection refused")
    }

    fn groups(&self) -> Result<Vec<GroupRow>> {
        Ok(vec![])
    }

    fn memberships(&self) -> Result<Vec<MembershipRow>> {
        Ok(vec![])
    }

    fn events(&self) -> Result<Vec<EventRow>> {
        Ok(vec![])
    }

    fn user_interests(&self) -> Result<HashMap<String, Vec<String>>> {
        Ok(HashMap::new())
    }
}

#[test]
fn test_run_job_replaces_recommendations() -> Result<()> {
    let dir = TempDir::new("service")?;
    let ctx = context(&dir)?;
    assert_eq!(ctx.status().last_run_status, "never");
    assert_eq!(ctx.status().last_run, None);

    let mut store = MemoryStore::new(snapshot(12));
    store.insert(&[RecommendationRecord {
        user_id: "u1".to_string(),
        entity_type: EntityType::Group,
        entity_id: "1".to_string(),
        score: 100.0,
        rank: Some(1),
        metadata: None,
    }])?;

    let source = store.clone();
    let outcome = ctx.run_job(&source, &mut store, 4);
    assert_eq!(
        outcome,
        JobOutcome::Completed {
            n_group_recs: 12,
            n_event_recs: 12,
        }
    );

    let records = store.records();
    assert_eq!(records.len(), 24);
    assert!(!records.iter().any(|r| r.score == 100.0));
    for user_id in ["u1", "u2", "u3"] {
        let n_events = records
            .iter()
            .filter(|r| r.user_id == user_id && r.entity_type == EntityType::Event)
            .count();
        assert_eq!(n_events, 4);
    }

    let status = ctx.status();
    assert!(status.last_run_status.starts_with("success"));
    assert!(status.last_run.is_some());
    assert!(!status.is_running);
    assert!(status.model_loaded);
    Ok(())
}

#[test]
fn test_overlapping_job_is_rejected() -> Result<()> {
    let dir = TempDir::new("service_guard")?;
    let ctx = context(&dir)?;
    let source = ReentrantSource {
        ctx: &ctx,
        inner: MemoryStore::new(snapshot(12)),
        nested: Mutex::new(None),
    };

    let mut sink = MemoryStore::default();
    let outcome = ctx.run_job(&source, &mut sink, 2);
    assert!(matches!(outcome, JobOutcome::Completed { .. }));
    assert_eq!(*source.nested.lock().unwrap(), Some(JobOutcome::AlreadyRunning));
    assert!(!ctx.is_running());

    let outcome = ctx.run_job(&source, &mut sink, 2);
    assert!(matches!(outcome, JobOutcome::Completed { .. }));
    Ok(())
}

#[test]
fn test_failed_job_releases_guard() -> Result<()> {
    let dir = TempDir::new("service_failed")?;
    let ctx = context(&dir)?;

    let mut sink = MemoryStore::default();
    let outcome = ctx.run_job(&BrokenSource, &mut sink, 8);
    assert_eq!(outcome, JobOutcome::Failed("connection refused".to_string()));
    assert_eq!(ctx.status().last_run_status, "failed: connection refused");
    assert!(sink.records().is_empty());
    assert!(!ctx.is_running());

    let source = MemoryStore::new(snapshot(12));
    assert!(matches!(
        ctx.run_job(&source, &mut sink, 8),
        JobOutcome::Completed { .. }
    ));
    Ok(())
}
