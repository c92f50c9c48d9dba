use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::error::DatabaseError;
use crate::db::models::user::{NewUser, UpdateUser, User, UserStatus};
use crate::domain::role::{Principal, Role};

#[derive(Debug, sqlx::FromRow)]
struct PrincipalRow {
    user_id: Uuid,
    display_name: String,
    role: Role,
    status: UserStatus,
}

pub struct UserRepository;

impl UserRepository {
    /// Resolve an opaque bearer token into a Principal. Expired tokens and
    /// non-active users resolve to `None`; the caller answers 401.
    pub async fn resolve_principal(
        pool: &PgPool,
        token: &SecretString,
    ) -> Result<Option<Principal>, DatabaseError> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            r#"
            SELECT u.id AS user_id, u.display_name, u.role, u.status
            FROM access_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.token = $1 AND t.expires_at > NOW()
            "#,
        )
        .bind(token.expose_secret())
        .fetch_optional(pool)
        .await?;

        Ok(row.and_then(|row| {
            if row.status == UserStatus::Active {
                Some(Principal {
                    user_id: row.user_id,
                    display_name: row.display_name,
                    role: row.role,
                })
            } else {
                None
            }
        }))
    }

    pub async fn insert(pool: &PgPool, new_user: &NewUser) -> Result<User, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, display_name, role, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(new_user.email.to_lowercase())
        .bind(&new_user.display_name)
        .bind(new_user.role)
        .bind(UserStatus::Active)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<User>, DatabaseError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at")
            .fetch_all(pool)
            .await?;

        Ok(users)
    }

    pub async fn update(
        pool: &PgPool,
        user_id: Uuid,
        update: &UpdateUser,
    ) -> Result<User, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET
                display_name = COALESCE($2, display_name),
                role = COALESCE($3, role),
                status = COALESCE($4, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&update.display_name)
        .bind(update.role)
        .bind(&update.status)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }
}
