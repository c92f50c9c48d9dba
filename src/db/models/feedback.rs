use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::{Date, OffsetDateTime};
use validator::Validate;

use crate::domain::feedback::Sentiment;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Feedback {
    pub id: Uuid,
    pub session_id: Uuid,
    pub author_user_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
    pub sentiment: Sentiment,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Submission payload. One feedback per author per session; re-submitting
/// replaces the previous record.
#[derive(Debug, Deserialize, Validate)]
pub struct NewFeedback {
    pub session_id: Uuid,
    #[validate(range(min = 1, max = 5))]
    pub rating: i16,
    pub comment: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedbackQuery {
    pub session_id: Option<Uuid>,
    pub sentiment: Option<Sentiment>,
    pub date_from: Option<Date>,
    pub date_to: Option<Date>,
}
