//! Rollups of meditation sessions by user and day.
//!
//! Nothing here is persisted; every read recomputes from the raw records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::SessionRecord;

pub const UNKNOWN_USER: &str = "Unknown User";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, utoipa::ToSchema)]
pub struct DailyTotal {
    pub count: u32,
    pub duration: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSessions {
    pub user_name: Option<String>,
    /// Keyed by YYYY-MM-DD
    pub days: BTreeMap<String, DailyTotal>,
}

impl UserSessions {
    pub fn display_name(&self) -> &str {
        self.user_name.as_deref().unwrap_or(UNKNOWN_USER)
    }
}

/// userId -> per-day totals
pub type SessionSummary = BTreeMap<String, UserSessions>;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDay {
    pub user_id: String,
    pub name: String,
    pub date: String,
    pub count: u32,
    pub duration: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub user_id: String,
    pub name: String,
    pub total_minutes: i64,
    pub total_sessions: u32,
    pub average_minutes: i64,
}

pub fn group_by_user_and_date(records: &[SessionRecord]) -> SessionSummary {
    let mut summary = SessionSummary::new();

    for record in records {
        let user = summary.entry(record.user_id.clone()).or_default();

        if user.user_name.is_none() {
            user.user_name = record.user_name.clone().filter(|n| !n.trim().is_empty());
        }

        let day = user.days.entry(record.date.clone()).or_default();
        day.count = day.count.saturating_add(1);
        day.duration = day.duration.saturating_add(record.duration);
    }

    summary
}

/// One entry per known user for `date`; users without sessions that day get zeros.
pub fn daily_breakdown(summary: &SessionSummary, date: &str) -> Vec<UserDay> {
    summary
        .iter()
        .map(|(user_id, user)| {
            let total = user.days.get(date).copied().unwrap_or_default();
            UserDay {
                user_id: user_id.clone(),
                name: user.display_name().to_string(),
                date: date.to_string(),
                count: total.count,
                duration: total.duration,
            }
        })
        .collect()
}

pub fn user_statistics(summary: &SessionSummary) -> Vec<UserStats> {
    summary
        .iter()
        .map(|(user_id, user)| {
            let total_minutes = user.days.values().fold(0i64, |acc, d| acc.saturating_add(d.duration));
            let total_sessions = user.days.values().fold(0u32, |acc, d| acc.saturating_add(d.count));

            UserStats {
                user_id: user_id.clone(),
                name: user.display_name().to_string(),
                total_minutes,
                total_sessions,
                average_minutes: average(total_minutes, total_sessions),
            }
        })
        .collect()
}

fn average(total_minutes: i64, sessions: u32) -> i64 {
    if sessions == 0 {
        return 0;
    }
    (total_minutes as f64 / sessions as f64).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user_id: &str, name: Option<&str>, date: &str, duration: i64) -> SessionRecord {
        SessionRecord {
            id: String::new(),
            user_id: user_id.to_string(),
            user_name: name.map(str::to_string),
            user_email: None,
            date: date.to_string(),
            duration,
            created_at: None,
        }
    }

    #[test]
    fn test_groups_and_sums_same_day() {
        let records = vec![
            record("u1", Some("Ana"), "2024-05-01", 10),
            record("u1", Some("Ana"), "2024-05-01", 15),
            record("u1", Some("Ana"), "2024-05-02", 20),
            record("u2", Some("Bob"), "2024-05-01", 5),
        ];

        let summary = group_by_user_and_date(&records);
        assert_eq!(summary.len(), 2);

        let ana = &summary["u1"];
        assert_eq!(ana.user_name.as_deref(), Some("Ana"));
        assert_eq!(ana.days["2024-05-01"], DailyTotal { count: 2, duration: 25 });
        assert_eq!(ana.days["2024-05-02"], DailyTotal { count: 1, duration: 20 });
        assert_eq!(summary["u2"].days.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        let summary = group_by_user_and_date(&[]);
        assert!(summary.is_empty());
        assert!(daily_breakdown(&summary, "2024-05-01").is_empty());
        assert!(user_statistics(&summary).is_empty());
    }

    #[test]
    fn test_daily_breakdown_reports_zero_for_idle_users() {
        let records = vec![
            record("u1", Some("Ana"), "2024-05-01", 10),
            record("u2", None, "2024-05-02", 30),
        ];
        let summary = group_by_user_and_date(&records);

        let day = daily_breakdown(&summary, "2024-05-02");
        assert_eq!(day.len(), 2);

        let ana = day.iter().find(|d| d.user_id == "u1").unwrap();
        assert_eq!((ana.count, ana.duration), (0, 0));
        assert_eq!(ana.name, "Ana");

        let unnamed = day.iter().find(|d| d.user_id == "u2").unwrap();
        assert_eq!((unnamed.count, unnamed.duration), (1, 30));
        assert_eq!(unnamed.name, UNKNOWN_USER);
    }

    #[test]
    fn test_user_statistics_totals_and_rounded_average() {
        let records = vec![
            record("u1", Some("Ana"), "2024-05-01", 10),
            record("u1", Some("Ana"), "2024-05-02", 15),
            record("u1", Some("Ana"), "2024-05-03", 20),
            record("u2", Some("Bob"), "2024-05-01", 7),
            record("u2", Some("Bob"), "2024-05-01", 8),
        ];
        let stats = user_statistics(&group_by_user_and_date(&records));

        let ana = stats.iter().find(|s| s.user_id == "u1").unwrap();
        assert_eq!(ana.total_minutes, 45);
        assert_eq!(ana.total_sessions, 3);
        assert_eq!(ana.average_minutes, 15);

        // 15 / 2 = 7.5 rounds up
        let bob = stats.iter().find(|s| s.user_id == "u2").unwrap();
        assert_eq!(bob.total_minutes, 15);
        assert_eq!(bob.average_minutes, 8);
    }

    #[test]
    fn test_average_guards_zero_sessions() {
        assert_eq!(average(0, 0), 0);
        assert_eq!(average(100, 0), 0);
        assert_eq!(average(10, 3), 3);
    }

    #[test]
    fn test_totals_saturate_on_corrupt_durations() {
        let records = vec![
            record("u1", Some("Ana"), "2024-05-01", i64::MAX),
            record("u1", Some("Ana"), "2024-05-01", 10),
            record("u1", Some("Ana"), "2024-05-02", i64::MAX),
        ];
        let summary = group_by_user_and_date(&records);
        assert_eq!(summary["u1"].days["2024-05-01"].duration, i64::MAX);

        let stats = user_statistics(&summary);
        assert_eq!(stats[0].total_minutes, i64::MAX);
        assert_eq!(stats[0].total_sessions, 3);
    }

    #[test]
    fn test_ownerless_sessions_group_as_unknown() {
        let records = vec![record("", None, "2023-11-05", 12), record("u1", Some("Ana"), "2024-05-01", 10)];
        let summary = group_by_user_and_date(&records);
        assert_eq!(summary[""].display_name(), UNKNOWN_USER);
        assert_eq!(summary[""].days["2023-11-05"], DailyTotal { count: 1, duration: 12 });
    }

    #[test]
    fn test_first_non_blank_name_wins() {
        let records = vec![
            record("u1", Some(" "), "2024-05-01", 10),
            record("u1", Some("Ana"), "2024-05-02", 10),
            record("u1", Some("Ana B."), "2024-05-03", 10),
        ];
        let summary = group_by_user_and_date(&records);
        assert_eq!(summary["u1"].display_name(), "Ana");
    }
}
