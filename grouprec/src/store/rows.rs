use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A row of the `users` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRow {
    /// Identifier of the user.
    pub id: String,

    /// Identifier in the authentication service.
    #[serde(default)]
    pub auth_user_id: Option<String>,
}

/// A row of the `groups` table.
///
/// Group ids are 1-based and contiguous: group `id` is action `id - 1` of
/// the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRow {
    /// Identifier of the group.
    pub id: i64,

    /// Name of the group.
    #[serde(default)]
    pub name: String,

    /// Category of the group.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// A row of the `group_members` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipRow {
    /// Identifier of the user.
    pub user_id: String,

    /// Identifier of the group.
    pub group_id: i64,
}

/// A row of the `events` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRow {
    /// Identifier of the event.
    pub id: String,

    /// Group hosting the event.
    pub group_id: i64,

    /// Start time in RFC 3339.
    #[serde(default)]
    pub time: Option<String>,

    /// Title of the event.
    #[serde(default)]
    pub title: Option<String>,
}

/// A row of the `user_interests` table joined with the interest name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestRow {
    /// Identifier of the user.
    pub user_id: String,

    /// Name of the interest, missing if the interest was deleted.
    #[serde(default)]
    pub name: Option<String>,
}

/// Contents of all tables read by [`DataSource`](super::DataSource).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Users.
    #[serde(default)]
    pub users: Vec<UserRow>,

    /// Groups.
    #[serde(default)]
    pub groups: Vec<GroupRow>,

    /// Memberships.
    #[serde(default)]
    pub memberships: Vec<MembershipRow>,

    /// Events.
    #[serde(default)]
    pub events: Vec<EventRow>,

    /// User interests.
    #[serde(default)]
    pub user_interests: Vec<InterestRow>,
}

impl StoreSnapshot {
    /// Interest names grouped by user, rows without a name are skipped.
    pub fn interests_by_user(&self) -> HashMap<String, Vec<String>> {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        for row in self.user_interests.iter() {
            if let Some(name) = &row.name {
                map.entry(row.user_id.clone()).or_default().push(name.clone());
            }
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interests_by_user() {
        let snapshot = StoreSnapshot {
            user_interests: vec![
                InterestRow {
                    user_id: "a".to_string(),
                    name: Some("music".to_string()),
                },
                InterestRow {
                    user_id: "a".to_string(),
                    name: None,
                },
                InterestRow {
                    user_id: "a".to_string(),
                    name: Some("hiking".to_string()),
                },
            ],
            ..Default::default()
        };
        let map = snapshot.interests_by_user();
        assert_eq!(map.len(), 1);
        assert_eq!(map["a"], vec!["music".to_string(), "hiking".to_string()]);
    }
}
