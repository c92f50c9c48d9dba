use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::models::feedback::{Feedback, FeedbackQuery, NewFeedback};
use crate::db::repositories::feedback_repository::FeedbackRepository;
use crate::db::repositories::session_repository::SessionRepository;
use crate::domain::authorizer::RoleAuthorizer;
use crate::domain::feedback::{aggregate, classify, FeedbackSummary};
use crate::domain::lifecycle::SessionStatus;
use crate::domain::role::{Capability, Principal, Role};
use crate::error::{AppError, AppResult};

pub async fn submit_feedback(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<NewFeedback>,
) -> AppResult<(StatusCode, Json<Feedback>)> {
    RoleAuthorizer::authorize(&principal, Capability::SubmitFeedback)?;
    payload.validate()?;

    let session = SessionRepository::find_by_id(&state.db, payload.session_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("session {}", payload.session_id)))?;
    if session.status == SessionStatus::Cancelled {
        return Err(AppError::PreconditionFailed(
            "feedback cannot be submitted for a cancelled session".to_string(),
        ));
    }

    let sentiment = classify(payload.rating);
    let feedback =
        FeedbackRepository::upsert(&state.db, principal.user_id, &payload, sentiment).await?;
    Ok((StatusCode::CREATED, Json(feedback)))
}

pub async fn list_feedback(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(filter): Query<FeedbackQuery>,
) -> AppResult<Json<Vec<Feedback>>> {
    authorize_read(&state, &principal, filter.session_id).await?;

    let feedback = FeedbackRepository::query(&state.db, &filter).await?;
    Ok(Json(feedback))
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub session_id: Uuid,
}

pub async fn feedback_summary(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<SummaryQuery>,
) -> AppResult<Json<FeedbackSummary>> {
    authorize_read(&state, &principal, Some(query.session_id)).await?;

    let ratings = FeedbackRepository::ratings_for_session(&state.db, query.session_id).await?;
    Ok(Json(aggregate(&ratings)))
}

/// The scope rule runs before any feedback is fetched: a session host must
/// name one of their own sessions; manager roles and admin read anything.
async fn authorize_read(
    state: &AppState,
    principal: &Principal,
    session_id: Option<Uuid>,
) -> AppResult<()> {
    match session_id {
        Some(session_id) => {
            let session = SessionRepository::find_by_id(&state.db, session_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("session {}", session_id)))?;
            RoleAuthorizer::authorize_feedback_scope(principal, session.host_user_id)
        }
        None => {
            RoleAuthorizer::authorize(principal, Capability::ReadFeedback)?;
            if principal.role == Role::SessionHost {
                return Err(AppError::Unauthorized(
                    "session hosts must scope feedback queries to one of their sessions"
                        .to_string(),
                ));
            }
            Ok(())
        }
    }
}
