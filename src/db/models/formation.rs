use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::{Date, OffsetDateTime};
use validator::Validate;

use crate::domain::lifecycle::FormationStatus;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Formation {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub date_start: Date,
    pub date_end: Date,
    pub location: Option<String>,
    pub max_capacity: i32,
    pub manager_user_id: Uuid,
    pub status: FormationStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewFormation {
    #[validate(length(min = 1))]
    pub title: String,
    pub description: Option<String>,
    pub date_start: Date,
    pub date_end: Date,
    pub location: Option<String>,
    #[validate(range(min = 1))]
    pub max_capacity: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFormation {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub date_start: Option<Date>,
    pub date_end: Option<Date>,
    pub location: Option<String>,
    #[validate(range(min = 1))]
    pub max_capacity: Option<i32>,
    pub status: Option<FormationStatus>,
}

impl UpdateFormation {
    /// True when the patch carries anything besides a status change.
    pub fn has_field_changes(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.date_start.is_some()
            || self.date_end.is_some()
            || self.location.is_some()
            || self.max_capacity.is_some()
    }
}
