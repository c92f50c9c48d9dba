use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::models::session::{NewSession, Session, UpdateSession};
use crate::db::repositories::session_repository::SessionRepository;
use crate::domain::lifecycle::SessionLifecycle;
use crate::domain::role::Principal;
use crate::error::{AppError, AppResult};

pub async fn create_session(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<NewSession>,
) -> AppResult<(StatusCode, Json<Session>)> {
    let session = SessionLifecycle::create(&state.db, &payload, &principal).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn get_session(
    State(state): State<AppState>,
    Extension(_principal): Extension<Principal>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<Session>> {
    let session = SessionRepository::find_by_id(&state.db, session_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("session {}", session_id)))?;
    Ok(Json(session))
}

/// Field patches and status changes arrive on the same PATCH; the
/// lifecycle routes any status change through its transition checks.
pub async fn patch_session(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<UpdateSession>,
) -> AppResult<Json<Session>> {
    let today = OffsetDateTime::now_utc().date();
    let session =
        SessionLifecycle::update(&state.db, session_id, &payload, &principal, today).await?;
    Ok(Json(session))
}
