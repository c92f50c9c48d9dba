use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::models::formation::{Formation, NewFormation, UpdateFormation};
use crate::db::repositories::formation_repository::FormationRepository;
use crate::domain::lifecycle::FormationLifecycle;
use crate::domain::role::Principal;
use crate::error::{AppError, AppResult};

pub async fn create_formation(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<NewFormation>,
) -> AppResult<(StatusCode, Json<Formation>)> {
    let formation = FormationLifecycle::create(&state.db, &payload, &principal).await?;
    Ok((StatusCode::CREATED, Json(formation)))
}

pub async fn get_formation(
    State(state): State<AppState>,
    Extension(_principal): Extension<Principal>,
    Path(formation_id): Path<Uuid>,
) -> AppResult<Json<Formation>> {
    let formation = FormationRepository::find_by_id(&state.db, formation_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("formation {}", formation_id)))?;
    Ok(Json(formation))
}

pub async fn patch_formation(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(formation_id): Path<Uuid>,
    Json(payload): Json<UpdateFormation>,
) -> AppResult<Json<Formation>> {
    let formation =
        FormationLifecycle::update(&state.db, formation_id, &payload, &principal).await?;
    Ok(Json(formation))
}
