//! Event recommendations derived from group recommendations.
use crate::{store::EventRow, EntityType, RecommendationRecord};
use chrono::{DateTime, Utc};
use log::debug;
use std::collections::HashMap;

/// Number of top groups per user whose events are recommended.
pub const TOP_GROUPS_PER_USER: usize = 5;

/// Time constant of the score decay, in days.
pub const DECAY_DAYS: f64 = 30.0;

/// Recommends the upcoming events of the best recommended groups of each user.
///
/// For each user, events of the top [`TOP_GROUPS_PER_USER`] groups by score
/// that start at or after `now` are scored with
/// `group_score * exp(-days_until_event / DECAY_DAYS)`. An event reachable
/// through several groups keeps its maximal score. Events without a valid
/// RFC 3339 time are skipped.
pub fn synthesize_event_recommendations(
    group_recs: &[RecommendationRecord],
    events: &[EventRow],
    now: DateTime<Utc>,
) -> Vec<RecommendationRecord> {
    let mut users: Vec<&str> = vec![];
    let mut recs_by_user: HashMap<&str, Vec<&RecommendationRecord>> = HashMap::new();
    for r in group_recs.iter().filter(|r| r.entity_type == EntityType::Group) {
        let recs = recs_by_user.entry(r.user_id.as_str()).or_insert_with(|| {
            users.push(r.user_id.as_str());
            vec![]
        });
        recs.push(r);
    }

    let mut events_by_group: HashMap<i64, Vec<(&EventRow, DateTime<Utc>)>> = HashMap::new();
    for ev in events.iter() {
        let time = match ev.time.as_deref().map(DateTime::parse_from_rfc3339) {
            Some(Ok(t)) => t.with_timezone(&Utc),
            _ => {
                debug!("Skip event {} without a valid time", ev.id);
                continue;
            }
        };
        if time >= now {
            events_by_group.entry(ev.group_id).or_default().push((ev, time));
        }
    }

    let mut out: Vec<RecommendationRecord> = vec![];
    let mut ix_by_key: HashMap<(&str, &str), usize> = HashMap::new();
    for user_id in users {
        let mut recs = recs_by_user.remove(user_id).unwrap_or_default();
        recs.sort_by(|a, b| b.score.total_cmp(&a.score));

        for gr in recs.into_iter().take(TOP_GROUPS_PER_USER) {
            let Ok(group_id) = gr.entity_id.parse::<i64>() else {
                continue;
            };
            for &(ev, time) in events_by_group.get(&group_id).into_iter().flatten() {
                let days = (time - now).num_milliseconds() as f64 / 86_400_000.0;
                let score = gr.score * (-days / DECAY_DAYS).exp() as f32;
                match ix_by_key.get(&(user_id, ev.id.as_str())) {
                    Some(&ix) => {
                        if score > out[ix].score {
                            out[ix].score = score;
                        }
                    }
                    None => {
                        ix_by_key.insert((user_id, ev.id.as_str()), out.len());
                        out.push(RecommendationRecord {
                            user_id: user_id.to_string(),
                            entity_type: EntityType::Event,
                            entity_id: ev.id.clone(),
                            score,
                            rank: None,
                            metadata: None,
                        });
                    }
                }
            }
        }
    }

    out
}
