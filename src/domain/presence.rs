use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::BTreeMap;
use time::Date;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::db::models::presence::{Presence, RecordPresences};
use crate::db::repositories::presence_repository::PresenceRepository;
use crate::db::repositories::session_repository::SessionRepository;
use crate::domain::authorizer::RoleAuthorizer;
use crate::domain::role::{Capability, Principal};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "presence_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PresenceStatus {
    Present,
    Absent,
    Late,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionPresenceStats {
    pub total_recorded: u64,
    pub present_count: u64,
    pub absent_count: u64,
    pub late_count: u64,
    pub presence_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPresenceStats {
    pub year: i32,
    pub month: u8,
    pub total_recorded: u64,
    pub present_count: u64,
    pub absent_count: u64,
    pub late_count: u64,
    pub presence_rate: f64,
}

/// Fold presence statuses into per-session counts. An empty input is a
/// valid zero result with a rate of exactly 0.
pub fn session_stats<I>(statuses: I) -> SessionPresenceStats
where
    I: IntoIterator<Item = PresenceStatus>,
{
    let mut total = 0u64;
    let mut present = 0u64;
    let mut absent = 0u64;
    let mut late = 0u64;

    for status in statuses {
        total += 1;
        match status {
            PresenceStatus::Present => present += 1,
            PresenceStatus::Absent => absent += 1,
            PresenceStatus::Late => late += 1,
        }
    }

    let presence_rate = if total == 0 {
        0.0
    } else {
        present as f64 / total as f64
    };

    SessionPresenceStats {
        total_recorded: total,
        present_count: present,
        absent_count: absent,
        late_count: late,
        presence_rate,
    }
}

/// Group a trainer's presence records by calendar month, ascending.
pub fn trainer_stats(records: &[(Date, PresenceStatus)]) -> Vec<MonthlyPresenceStats> {
    let mut buckets: BTreeMap<(i32, u8), Vec<PresenceStatus>> = BTreeMap::new();
    for (date, status) in records {
        buckets
            .entry((date.year(), u8::from(date.month())))
            .or_default()
            .push(*status);
    }

    buckets
        .into_iter()
        .map(|((year, month), statuses)| {
            let stats = session_stats(statuses);
            MonthlyPresenceStats {
                year,
                month,
                total_recorded: stats.total_recorded,
                present_count: stats.present_count,
                absent_count: stats.absent_count,
                late_count: stats.late_count,
                presence_rate: stats.presence_rate,
            }
        })
        .collect()
}

/// Write and read paths for presence records.
pub struct PresenceAggregator;

impl PresenceAggregator {
    /// Record a batch of presences for one session day. All-or-nothing:
    /// the whole batch commits in a single transaction, and the session's
    /// cancellation status is re-read under lock immediately before the
    /// writes. Entries for participants outside the roster are committed
    /// with a warning only; roster enforcement is loose in this domain.
    pub async fn record_presences(
        pool: &PgPool,
        session_id: Uuid,
        request: &RecordPresences,
        principal: &Principal,
    ) -> AppResult<Vec<Presence>> {
        RoleAuthorizer::authorize(principal, Capability::MarkPresence)?;
        request.validate()?;

        let roster = PresenceRepository::roster(pool, session_id).await?;
        if !roster.is_empty() {
            for entry in &request.entries {
                if !roster.contains(&entry.participant_user_id) {
                    warn!(
                        session_id = %session_id,
                        participant = %entry.participant_user_id,
                        "Presence recorded for participant outside the session roster"
                    );
                }
            }
        }

        let committed =
            PresenceRepository::record_batch(pool, session_id, request.date, &request.entries)
                .await?;
        info!(
            session_id = %session_id,
            date = %request.date,
            entries = committed.len(),
            actor = %principal.user_id,
            "Presence batch recorded"
        );
        Ok(committed)
    }

    pub async fn session_stats_for(
        pool: &PgPool,
        session_id: Uuid,
    ) -> AppResult<SessionPresenceStats> {
        SessionRepository::find_by_id(pool, session_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("session {}", session_id)))?;

        let statuses = PresenceRepository::statuses_for_session(pool, session_id).await?;
        Ok(session_stats(statuses))
    }

    pub async fn trainer_stats_for(
        pool: &PgPool,
        trainer_user_id: Uuid,
        date_from: Option<Date>,
        date_to: Option<Date>,
    ) -> AppResult<Vec<MonthlyPresenceStats>> {
        let records =
            PresenceRepository::records_for_trainer(pool, trainer_user_id, date_from, date_to)
                .await?;
        Ok(trainer_stats(&records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn empty_input_yields_zero_rate() {
        let stats = session_stats([]);
        assert_eq!(stats.total_recorded, 0);
        assert_eq!(stats.presence_rate, 0.0);
        assert!(stats.presence_rate.is_finite());
    }

    #[test]
    fn four_of_five_present_is_eighty_percent() {
        let stats = session_stats([
            PresenceStatus::Present,
            PresenceStatus::Present,
            PresenceStatus::Present,
            PresenceStatus::Present,
            PresenceStatus::Absent,
        ]);
        assert_eq!(stats.total_recorded, 5);
        assert_eq!(stats.present_count, 4);
        assert_eq!(stats.absent_count, 1);
        assert_eq!(stats.late_count, 0);
        assert!((stats.presence_rate - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn late_counts_against_presence_rate() {
        let stats = session_stats([PresenceStatus::Present, PresenceStatus::Late]);
        assert_eq!(stats.late_count, 1);
        assert!((stats.presence_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn rate_is_always_within_unit_interval() {
        let inputs: Vec<Vec<PresenceStatus>> = vec![
            vec![],
            vec![PresenceStatus::Absent],
            vec![PresenceStatus::Present; 10],
            vec![PresenceStatus::Late, PresenceStatus::Absent],
        ];
        for input in inputs {
            let rate = session_stats(input).presence_rate;
            assert!((0.0..=1.0).contains(&rate));
        }
    }

    #[test]
    fn trainer_stats_groups_by_month_ascending() {
        let records = vec![
            (date!(2026 - 02 - 03), PresenceStatus::Present),
            (date!(2026 - 01 - 15), PresenceStatus::Absent),
            (date!(2026 - 01 - 16), PresenceStatus::Present),
            (date!(2025 - 12 - 01), PresenceStatus::Late),
        ];
        let monthly = trainer_stats(&records);
        assert_eq!(monthly.len(), 3);
        assert_eq!((monthly[0].year, monthly[0].month), (2025, 12));
        assert_eq!((monthly[1].year, monthly[1].month), (2026, 1));
        assert_eq!((monthly[2].year, monthly[2].month), (2026, 2));
        assert_eq!(monthly[1].total_recorded, 2);
        assert!((monthly[1].presence_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn trainer_stats_empty_input() {
        assert!(trainer_stats(&[]).is_empty());
    }
}
