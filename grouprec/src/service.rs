//! Running the recommendation job against a store.
use crate::{
    events::synthesize_event_recommendations,
    store::{DataSource, RecommendationSink},
    RecommendationEngine,
};
use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeSet,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
    time::Instant,
};

/// Result of [`ServiceContext::run_job`].
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// The recommendations were replaced.
    Completed {
        /// Number of group recommendations.
        n_group_recs: usize,

        /// Number of event recommendations.
        n_event_recs: usize,
    },

    /// Another job was in flight, nothing was done.
    AlreadyRunning,

    /// The job failed with the given message.
    Failed(String),
}

/// Snapshot of the state of a [`ServiceContext`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    /// `true` if a model is loaded.
    pub model_loaded: bool,

    /// End time of the last job in RFC 3339.
    pub last_run: Option<String>,

    /// `never`, `success (took ..s)` or `failed: ..`.
    pub last_run_status: String,

    /// `true` while a job is in flight.
    pub is_running: bool,

    /// Time of the snapshot in RFC 3339.
    pub timestamp: String,
}

struct LastRun {
    at: Option<DateTime<Utc>>,
    status: String,
}

/// Clears the in-flight flag when dropped.
struct RunningGuard<'a>(&'a AtomicBool);

impl<'a> RunningGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the recommendation engine and the state of the recommendation job.
///
/// At most one job runs at a time; [`ServiceContext::run_job`] returns
/// [`JobOutcome::AlreadyRunning`] instead of waiting. The context can be
/// shared between threads.
pub struct ServiceContext {
    engine: RecommendationEngine,
    running: AtomicBool,
    last_run: Mutex<LastRun>,
}

impl ServiceContext {
    /// Constructs a context with no job run yet.
    pub fn new(engine: RecommendationEngine) -> Self {
        Self {
            engine,
            running: AtomicBool::new(false),
            last_run: Mutex::new(LastRun {
                at: None,
                status: "never".to_string(),
            }),
        }
    }

    /// The recommendation engine.
    pub fn engine(&self) -> &RecommendationEngine {
        &self.engine
    }

    /// Returns `true` while a job is in flight.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Generates up to `top_k` group recommendations per user and the
    /// derived event recommendations from `source`, and replaces the
    /// recommendations of those users in `sink`.
    pub fn run_job(
        &self,
        source: &dyn DataSource,
        sink: &mut dyn RecommendationSink,
        top_k: usize,
    ) -> JobOutcome {
        let Some(_guard) = RunningGuard::acquire(&self.running) else {
            warn!("Job already running, skipping");
            return JobOutcome::AlreadyRunning;
        };

        let start = Instant::now();
        info!("Starting recommendation job");
        let result = self.run(source, sink, top_k);
        let secs = start.elapsed().as_secs_f64();

        let (outcome, status) = match result {
            Ok((n_group_recs, n_event_recs)) => {
                info!("Job completed in {:.2}s", secs);
                let outcome = JobOutcome::Completed {
                    n_group_recs,
                    n_event_recs,
                };
                (outcome, format!("success (took {:.2}s)", secs))
            }
            Err(e) => {
                error!("Job failed after {:.2}s: {:#}", secs, e);
                (JobOutcome::Failed(format!("{:#}", e)), format!("failed: {:#}", e))
            }
        };

        let mut last_run = self.last_run.lock().unwrap_or_else(|e| e.into_inner());
        last_run.at = Some(Utc::now());
        last_run.status = status;
        outcome
    }

    fn run(
        &self,
        source: &dyn DataSource,
        sink: &mut dyn RecommendationSink,
        top_k: usize,
    ) -> Result<(usize, usize)> {
        let users = source.users()?;
        let groups = source.groups()?;
        let memberships = source.memberships()?;
        let events = source.events()?;
        let interests = source.user_interests()?;

        let group_recs = self.engine.generate_recommendations(
            &users,
            &groups,
            &memberships,
            &interests,
            top_k,
        )?;
        let event_recs = synthesize_event_recommendations(&group_recs, &events, Utc::now());
        let (n_group_recs, n_event_recs) = (group_recs.len(), event_recs.len());

        let mut combined = group_recs;
        combined.extend(event_recs);
        let user_ids: Vec<String> = combined
            .iter()
            .map(|r| r.user_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        sink.replace(&user_ids, &combined)?;

        Ok((n_group_recs, n_event_recs))
    }

    /// Current status.
    pub fn status(&self) -> ServiceStatus {
        let last_run = self.last_run.lock().unwrap_or_else(|e| e.into_inner());
        ServiceStatus {
            model_loaded: true,
            last_run: last_run.at.map(|t| t.to_rfc3339()),
            last_run_status: last_run.status.clone(),
            is_running: self.is_running(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}
