use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::{Date, OffsetDateTime};
use validator::Validate;

use crate::domain::lifecycle::SessionStatus;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub formation_id: Option<Uuid>,
    pub title: String,
    pub category: Option<String>,
    pub date_start: Date,
    pub date_end: Date,
    pub host_user_id: Uuid,
    pub status: SessionStatus,
    pub max_participants: Option<i32>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Creation payload. Carries no status field: every session starts out
/// `planned`.
#[derive(Debug, Deserialize, Validate)]
pub struct NewSession {
    pub formation_id: Option<Uuid>,
    #[validate(length(min = 1))]
    pub title: String,
    pub category: Option<String>,
    pub date_start: Date,
    pub date_end: Date,
    pub host_user_id: Uuid,
    #[validate(range(min = 1))]
    pub max_participants: Option<i32>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateSession {
    pub formation_id: Option<Uuid>,
    #[validate(length(min = 1))]
    pub title: Option<String>,
    pub category: Option<String>,
    pub date_start: Option<Date>,
    pub date_end: Option<Date>,
    pub host_user_id: Option<Uuid>,
    #[validate(range(min = 1))]
    pub max_participants: Option<i32>,
    pub status: Option<SessionStatus>,
}

impl UpdateSession {
    /// True when the patch carries anything besides a status change.
    pub fn has_field_changes(&self) -> bool {
        self.formation_id.is_some()
            || self.title.is_some()
            || self.category.is_some()
            || self.date_start.is_some()
            || self.date_end.is_some()
            || self.host_user_id.is_some()
            || self.max_participants.is_some()
    }
}
