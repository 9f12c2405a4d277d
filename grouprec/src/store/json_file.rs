use super::{
    DataSource, EventRow, GroupRow, MembershipRow, RecommendationSink, StoreSnapshot, UserRow,
};
use crate::RecommendationRecord;
use anyhow::{Context, Result};
use log::info;
use std::{
    collections::{HashMap, HashSet},
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

/// A store backed by JSON files.
///
/// Rows are read from a [`StoreSnapshot`] file. Recommendations are kept in a
/// separate file holding a JSON array, rewritten on every change.
pub struct JsonFileStore {
    snapshot: StoreSnapshot,
    output_path: PathBuf,
    records: Vec<RecommendationRecord>,
}

impl JsonFileStore {
    /// Opens the store.
    ///
    /// Existing recommendations in `output_path` are kept until replaced.
    pub fn open(snapshot_path: impl AsRef<Path>, output_path: impl AsRef<Path>) -> Result<Self> {
        let snapshot_path = snapshot_path.as_ref();
        let snapshot: StoreSnapshot = read_json(snapshot_path)
            .with_context(|| format!("Failed to read snapshot {:?}", snapshot_path))?;
        info!(
            "Loaded {} users, {} groups, {} memberships and {} events from {:?}",
            snapshot.users.len(),
            snapshot.groups.len(),
            snapshot.memberships.len(),
            snapshot.events.len(),
            snapshot_path
        );

        let output_path = output_path.as_ref().to_path_buf();
        let records = match output_path.is_file() {
            true => read_json(&output_path)?,
            false => vec![],
        };

        Ok(Self {
            snapshot,
            output_path,
            records,
        })
    }

    /// Stored recommendations.
    pub fn records(&self) -> &[RecommendationRecord] {
        &self.records
    }

    fn write(&self) -> Result<()> {
        let file = File::create(&self.output_path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &self.records)?;
        Ok(())
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)?;
    let rdr = BufReader::new(file);
    Ok(serde_json::from_reader(rdr)?)
}

impl DataSource for JsonFileStore {
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

impl RecommendationSink for JsonFileStore {
    fn delete_for_users(&mut self, user_ids: &[String]) -> Result<()> {
        let user_ids: HashSet<&String> = user_ids.iter().collect();
        self.records.retain(|r| !user_ids.contains(&r.user_id));
        self.write()
    }

    fn insert(&mut self, records: &[RecommendationRecord]) -> Result<()> {
        self.records.extend_from_slice(records);
        self.write()
    }
}
