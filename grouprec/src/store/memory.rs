use super::{
    DataSource, EventRow, GroupRow, MembershipRow, RecommendationSink, StoreSnapshot, UserRow,
};
use crate::RecommendationRecord;
use anyhow::Result;
use std::collections::{HashMap, HashSet};

/// A store kept in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: StoreSnapshot,
    records: Vec<RecommendationRecord>,
    n_inserts: usize,
}

impl MemoryStore {
    /// Constructs a store with the given rows and no recommendation.
    pub fn new(snapshot: StoreSnapshot) -> Self {
        Self {
            snapshot,
            ..Default::default()
        }
    }

    /// Stored recommendations.
    pub fn records(&self) -> &[RecommendationRecord] {
        &self.records
    }

    /// Number of insert calls so far.
    pub fn n_inserts(&self) -> usize {
        self.n_inserts
    }
}

impl DataSource for MemoryStore {
    fn users(&self) -> Result<Vec<UserRow>> {
        Ok(self.snapshot.users.clone())
    }

    fn groups(&self) -> Result<Vec<GroupRow>> {
        Ok(self.snapshot.groups.clone())
    }

    fn memberships(&self) -> Result<Vec<MembershipRow>> {
        Ok(self.snapshot.memberships.clone())
    }

    fn events(&self) -> Result<Vec<EventRow>> {
        Ok(self.snapshot.events.clone())
    }

    fn user_interests(&self) -> Result<HashMap<String, Vec<String>>> {
        Ok(self.snapshot.interests_by_user())
    }
}

impl RecommendationSink for MemoryStore {
    fn delete_for_users(&mut self, user_ids: &[String]) -> Result<()> {
        let user_ids: HashSet<&String> = user_ids.iter().collect();
        self.records.retain(|r| !user_ids.contains(&r.user_id));
        Ok(())
    }

    fn insert(&mut self, records: &[RecommendationRecord]) -> Result<()> {
        self.records.extend_from_slice(records);
        self.n_inserts += 1;
        Ok(())
    }
}
