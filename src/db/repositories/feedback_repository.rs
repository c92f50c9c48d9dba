use sqlx::PgPool;
use uuid::Uuid;

use crate::db::error::DatabaseError;
use crate::db::models::feedback::{Feedback, FeedbackQuery, NewFeedback};
use crate::domain::feedback::Sentiment;

pub struct FeedbackRepository;

impl FeedbackRepository {
    /// One feedback per (session, author); re-submission replaces the
    /// previous record, no history kept.
    pub async fn upsert(
        pool: &PgPool,
        author_user_id: Uuid,
        submission: &NewFeedback,
        sentiment: Sentiment,
    ) -> Result<Feedback, DatabaseError> {
        let feedback = sqlx::query_as::<_, Feedback>(
            r#"
            INSERT INTO feedback (id, session_id, author_user_id, rating, comment, sentiment)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (session_id, author_user_id)
            DO UPDATE SET
                rating = EXCLUDED.rating,
                comment = EXCLUDED.comment,
                sentiment = EXCLUDED.sentiment,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(submission.session_id)
        .bind(author_user_id)
        .bind(submission.rating)
        .bind(&submission.comment)
        .bind(sentiment)
        .fetch_one(pool)
        .await?;

        Ok(feedback)
    }

    pub async fn query(
        pool: &PgPool,
        filter: &FeedbackQuery,
    ) -> Result<Vec<Feedback>, DatabaseError> {
        let feedback = sqlx::query_as::<_, Feedback>(
            r#"
            SELECT *
            FROM feedback
            WHERE ($1::uuid IS NULL OR session_id = $1)
              AND ($2::feedback_sentiment IS NULL OR sentiment = $2)
              AND ($3::date IS NULL OR created_at::date >= $3)
              AND ($4::date IS NULL OR created_at::date <= $4)
            ORDER BY created_at DESC
            "#,
        )
        .bind(filter.session_id)
        .bind(filter.sentiment)
        .bind(filter.date_from)
        .bind(filter.date_to)
        .fetch_all(pool)
        .await?;

        Ok(feedback)
    }

    pub async fn ratings_for_session(
        pool: &PgPool,
        session_id: Uuid,
    ) -> Result<Vec<i16>, DatabaseError> {
        let ratings: Vec<i16> =
            sqlx::query_scalar("SELECT rating FROM feedback WHERE session_id = $1")
                .bind(session_id)
                .fetch_all(pool)
                .await?;

        Ok(ratings)
    }
}
