use sqlx::PgPool;
use uuid::Uuid;

use crate::db::error::DatabaseError;
use crate::db::models::session::{NewSession, Session, UpdateSession};
use crate::domain::lifecycle::SessionStatus;

pub struct SessionRepository;

impl SessionRepository {
    pub async fn insert(pool: &PgPool, draft: &NewSession) -> Result<Session, DatabaseError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions
                (id, formation_id, title, category, date_start, date_end,
                 host_user_id, status, max_participants)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(draft.formation_id)
        .bind(&draft.title)
        .bind(&draft.category)
        .bind(draft.date_start)
        .bind(draft.date_end)
        .bind(draft.host_user_id)
        .bind(SessionStatus::Planned)
        .bind(draft.max_participants)
        .fetch_one(pool)
        .await?;

        Ok(session)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        session_id: Uuid,
    ) -> Result<Option<Session>, DatabaseError> {
        let session = sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1")
            .bind(session_id)
            .fetch_optional(pool)
            .await?;

        Ok(session)
    }

    /// Field patch. The status column is deliberately absent from the SET
    /// list; status only ever changes through `commit_transition`.
    pub async fn update_fields(
        pool: &PgPool,
        session_id: Uuid,
        patch: &UpdateSession,
    ) -> Result<Session, DatabaseError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            UPDATE sessions
            SET
                formation_id = COALESCE($2, formation_id),
                title = COALESCE($3, title),
                category = COALESCE($4, category),
                date_start = COALESCE($5, date_start),
                date_end = COALESCE($6, date_end),
                host_user_id = COALESCE($7, host_user_id),
                max_participants = COALESCE($8, max_participants),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(session_id)
        .bind(patch.formation_id)
        .bind(&patch.title)
        .bind(&patch.category)
        .bind(patch.date_start)
        .bind(patch.date_end)
        .bind(patch.host_user_id)
        .bind(patch.max_participants)
        .fetch_one(pool)
        .await?;

        Ok(session)
    }

    /// Compare-and-set status update. Returns `None` when the row no longer
    /// holds `expected`; the caller reports a conflict.
    pub async fn commit_transition(
        pool: &PgPool,
        session_id: Uuid,
        expected: SessionStatus,
        target: SessionStatus,
    ) -> Result<Option<Session>, DatabaseError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            UPDATE sessions
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(session_id)
        .bind(expected)
        .bind(target)
        .fetch_optional(pool)
        .await?;

        Ok(session)
    }
}
