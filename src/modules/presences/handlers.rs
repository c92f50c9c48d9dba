use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use time::Date;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::models::presence::{Presence, RecordPresences};
use crate::domain::presence::{MonthlyPresenceStats, PresenceAggregator, SessionPresenceStats};
use crate::domain::role::Principal;
use crate::error::AppResult;

pub async fn record_presences(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<RecordPresences>,
) -> AppResult<(StatusCode, Json<Vec<Presence>>)> {
    let committed =
        PresenceAggregator::record_presences(&state.db, session_id, &payload, &principal).await?;
    Ok((StatusCode::CREATED, Json(committed)))
}

pub async fn session_presence_stats(
    State(state): State<AppState>,
    Extension(_principal): Extension<Principal>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<SessionPresenceStats>> {
    let stats = PresenceAggregator::session_stats_for(&state.db, session_id).await?;
    Ok(Json(stats))
}

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    pub date_from: Option<Date>,
    pub date_to: Option<Date>,
}

pub async fn trainer_presence_stats(
    State(state): State<AppState>,
    Extension(_principal): Extension<Principal>,
    Path(trainer_user_id): Path<Uuid>,
    Query(range): Query<TrendQuery>,
) -> AppResult<Json<Vec<MonthlyPresenceStats>>> {
    let stats = PresenceAggregator::trainer_stats_for(
        &state.db,
        trainer_user_id,
        range.date_from,
        range.date_to,
    )
    .await?;
    Ok(Json(stats))
}
