//! Aggregation into summary views.
//!
//! The three summaries are independent; none feeds another. Ordered maps
//! make every output deterministic: daily counts come back sorted by date
//! then event type, and most-active ties resolve to the smallest user id.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use tracing::debug;

use ep_common::{ActiveUserSummary, CleanedTable, DailyEventCount, MostActiveUser};

/// Events per type per UTC calendar day, ordered by date ascending then
/// event type ascending. Empty table yields an empty vector.
pub fn daily_event_counts(table: &CleanedTable) -> Vec<DailyEventCount> {
    let mut counts: BTreeMap<(NaiveDate, &str), u64> = BTreeMap::new();
    for row in &table.rows {
        *counts
            .entry((row.timestamp.date_naive(), row.event_type.as_str()))
            .or_insert(0) += 1;
    }
    let summary: Vec<DailyEventCount> = counts
        .into_iter()
        .map(|((event_date, event_type), event_count)| DailyEventCount {
            event_date,
            event_type: event_type.to_string(),
            event_count,
        })
        .collect();
    debug!(groups = summary.len(), "daily counts aggregated");
    summary
}

/// Count of distinct users with at least one event. Empty table yields zero.
pub fn total_active_users(table: &CleanedTable) -> ActiveUserSummary {
    let users: BTreeSet<&str> = table.rows.iter().map(|row| row.user_id.as_str()).collect();
    ActiveUserSummary {
        total_active_users: users.len() as u64,
    }
}

/// The user with the highest event count, or `None` on an empty table.
/// Ties go to the lexicographically smallest `user_id`.
pub fn most_active_user(table: &CleanedTable) -> Option<MostActiveUser> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for row in &table.rows {
        *counts.entry(row.user_id.as_str()).or_insert(0) += 1;
    }

    let mut best: Option<MostActiveUser> = None;
    for (user_id, event_count) in counts {
        // Ascending key order plus strictly-greater means the smallest
        // user id wins among equals.
        if best.as_ref().map_or(true, |b| event_count > b.event_count) {
            best = Some(MostActiveUser {
                user_id: user_id.to_string(),
                event_count,
            });
        }
    }
    best
}
