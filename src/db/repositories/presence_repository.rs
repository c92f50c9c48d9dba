use std::collections::{BTreeMap, HashSet};

use sqlx::PgPool;
use time::Date;
use uuid::Uuid;

use crate::db::error::DatabaseError;
use crate::db::models::presence::{Presence, PresenceEntry};
use crate::domain::lifecycle::SessionStatus;
use crate::domain::presence::PresenceStatus;
use crate::error::{AppError, AppResult};

pub struct PresenceRepository;

impl PresenceRepository {
    /// Participants enrolled in a session. May be empty; the roster is
    /// advisory.
    pub async fn roster(
        pool: &PgPool,
        session_id: Uuid,
    ) -> Result<HashSet<Uuid>, DatabaseError> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT participant_user_id FROM session_enrollments WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_all(pool)
        .await?;

        Ok(ids.into_iter().collect())
    }

    /// Upsert a batch of presences in one transaction. The session status
    /// is re-read under lock first so a racing cancellation cannot slip a
    /// batch in; the whole batch commits or none of it does. Duplicate
    /// entries for the same participant collapse to the last one.
    pub async fn record_batch(
        pool: &PgPool,
        session_id: Uuid,
        date: Date,
        entries: &[PresenceEntry],
    ) -> AppResult<Vec<Presence>> {
        let mut tx = pool.begin().await?;

        let status: Option<SessionStatus> =
            sqlx::query_scalar("SELECT status FROM sessions WHERE id = $1 FOR UPDATE")
                .bind(session_id)
                .fetch_optional(&mut *tx)
                .await?;

        match status {
            None => return Err(AppError::NotFound(format!("session {}", session_id))),
            Some(SessionStatus::Cancelled) => {
                return Err(AppError::PreconditionFailed(
                    "presences cannot be recorded for a cancelled session".to_string(),
                ))
            }
            Some(_) => {}
        }

        let mut committed: BTreeMap<Uuid, Presence> = BTreeMap::new();
        for entry in entries {
            let presence = sqlx::query_as::<_, Presence>(
                r#"
                INSERT INTO presences (id, session_id, participant_user_id, date, status)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (session_id, participant_user_id, date)
                DO UPDATE SET status = EXCLUDED.status, updated_at = NOW()
                RETURNING *
                "#,
            )
            .bind(Uuid::now_v7())
            .bind(session_id)
            .bind(entry.participant_user_id)
            .bind(date)
            .bind(entry.status)
            .fetch_one(&mut *tx)
            .await?;
            committed.insert(presence.participant_user_id, presence);
        }

        tx.commit().await?;
        Ok(committed.into_values().collect())
    }

    pub async fn statuses_for_session(
        pool: &PgPool,
        session_id: Uuid,
    ) -> Result<Vec<PresenceStatus>, DatabaseError> {
        let statuses: Vec<PresenceStatus> =
            sqlx::query_scalar("SELECT status FROM presences WHERE session_id = $1")
                .bind(session_id)
                .fetch_all(pool)
                .await?;

        Ok(statuses)
    }

    /// Presence rows of every session hosted by the trainer, optionally
    /// bounded by date.
    pub async fn records_for_trainer(
        pool: &PgPool,
        trainer_user_id: Uuid,
        date_from: Option<Date>,
        date_to: Option<Date>,
    ) -> Result<Vec<(Date, PresenceStatus)>, DatabaseError> {
        let records: Vec<(Date, PresenceStatus)> = sqlx::query_as(
            r#"
            SELECT p.date, p.status
            FROM presences p
            JOIN sessions s ON s.id = p.session_id
            WHERE s.host_user_id = $1
              AND ($2::date IS NULL OR p.date >= $2)
              AND ($3::date IS NULL OR p.date <= $3)
            ORDER BY p.date
            "#,
        )
        .bind(trainer_user_id)
        .bind(date_from)
        .bind(date_to)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }
}
