use sqlx::PgPool;
use uuid::Uuid;

use crate::db::error::DatabaseError;
use crate::db::models::formation::{Formation, NewFormation, UpdateFormation};
use crate::domain::lifecycle::FormationStatus;

pub struct FormationRepository;

impl FormationRepository {
    pub async fn insert(
        pool: &PgPool,
        draft: &NewFormation,
        manager_user_id: Uuid,
    ) -> Result<Formation, DatabaseError> {
        let formation = sqlx::query_as::<_, Formation>(
            r#"
            INSERT INTO formations
                (id, title, description, date_start, date_end, location,
                 max_capacity, manager_user_id, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.date_start)
        .bind(draft.date_end)
        .bind(&draft.location)
        .bind(draft.max_capacity)
        .bind(manager_user_id)
        .bind(FormationStatus::Draft)
        .fetch_one(pool)
        .await?;

        Ok(formation)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        formation_id: Uuid,
    ) -> Result<Option<Formation>, DatabaseError> {
        let formation = sqlx::query_as::<_, Formation>("SELECT * FROM formations WHERE id = $1")
            .bind(formation_id)
            .fetch_optional(pool)
            .await?;

        Ok(formation)
    }

    /// Field patch; the status column only changes via `commit_transition`.
    pub async fn update_fields(
        pool: &PgPool,
        formation_id: Uuid,
        patch: &UpdateFormation,
    ) -> Result<Formation, DatabaseError> {
        let formation = sqlx::query_as::<_, Formation>(
            r#"
            UPDATE formations
            SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                date_start = COALESCE($4, date_start),
                date_end = COALESCE($5, date_end),
                location = COALESCE($6, location),
                max_capacity = COALESCE($7, max_capacity),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(formation_id)
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(patch.date_start)
        .bind(patch.date_end)
        .bind(&patch.location)
        .bind(patch.max_capacity)
        .fetch_one(pool)
        .await?;

        Ok(formation)
    }

    pub async fn commit_transition(
        pool: &PgPool,
        formation_id: Uuid,
        expected: FormationStatus,
        target: FormationStatus,
    ) -> Result<Option<Formation>, DatabaseError> {
        let formation = sqlx::query_as::<_, Formation>(
            r#"
            UPDATE formations
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(formation_id)
        .bind(expected)
        .bind(target)
        .fetch_optional(pool)
        .await?;

        Ok(formation)
    }
}
