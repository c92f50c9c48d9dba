use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::{Date, OffsetDateTime};
use validator::Validate;

use crate::domain::presence::PresenceStatus;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Presence {
    pub id: Uuid,
    pub session_id: Uuid,
    pub participant_user_id: Uuid,
    pub date: Date,
    pub status: PresenceStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceEntry {
    pub participant_user_id: Uuid,
    pub status: PresenceStatus,
}

/// One batch of presences for a single session day.
#[derive(Debug, Deserialize, Validate)]
pub struct RecordPresences {
    pub date: Date,
    #[validate(length(min = 1))]
    pub entries: Vec<PresenceEntry>,
}
