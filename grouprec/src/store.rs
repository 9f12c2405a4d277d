//! Access to the relational store holding users, groups and recommendations.
//!
//! [`DataSource`] reads the rows needed to generate recommendations and
//! [`RecommendationSink`] replaces the recommendations of a set of users.
mod json_file;
mod memory;
mod rows;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use rows::{EventRow, GroupRow, InterestRow, MembershipRow, StoreSnapshot, UserRow};

use crate::RecommendationRecord;
use anyhow::Result;
use log::info;
use std::collections::HashMap;

/// Number of records inserted at once by [`RecommendationSink::replace`].
pub const INSERT_BATCH_SIZE: usize = 100;

/// Source of the rows used to generate recommendations.
pub trait DataSource {
    /// All users.
    fn users(&self) -> Result<Vec<UserRow>>;

    /// All groups.
    fn groups(&self) -> Result<Vec<GroupRow>>;

    /// All group memberships, in the order they were created.
    fn memberships(&self) -> Result<Vec<MembershipRow>>;

    /// All events.
    fn events(&self) -> Result<Vec<EventRow>>;

    /// Names of the interests of each user.
    fn user_interests(&self) -> Result<HashMap<String, Vec<String>>>;
}

/// Destination of recommendation records.
pub trait RecommendationSink {
    /// Deletes all records of the given users.
    fn delete_for_users(&mut self, user_ids: &[String]) -> Result<()>;

    /// Inserts a batch of records.
    fn insert(&mut self, records: &[RecommendationRecord]) -> Result<()>;

    /// Replaces the records of `user_ids` with `records`.
    ///
    /// Records are inserted in batches of [`INSERT_BATCH_SIZE`].
    fn replace(&mut self, user_ids: &[String], records: &[RecommendationRecord]) -> Result<()> {
        info!("Clearing old recommendations for {} users", user_ids.len());
        self.delete_for_users(user_ids)?;

        let n_batches = records.len().div_ceil(INSERT_BATCH_SIZE);
        for (i, batch) in records.chunks(INSERT_BATCH_SIZE).enumerate() {
            self.insert(batch)?;
            info!("Inserted batch {}/{}", i + 1, n_batches);
        }
        info!("Pushed {} recommendations", records.len());
        Ok(())
    }
}
