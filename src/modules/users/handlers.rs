use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::models::user::{NewUser, UpdateUser, User};
use crate::db::repositories::user_repository::UserRepository;
use crate::domain::authorizer::RoleAuthorizer;
use crate::domain::role::{Capability, Principal, Role};
use crate::error::{AppError, AppResult};

pub async fn create_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<NewUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    RoleAuthorizer::authorize(&principal, Capability::ManageUsers)?;
    payload.validate()?;

    let user = UserRepository::insert(&state.db, &payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<User>> {
    RoleAuthorizer::authorize(&principal, Capability::ManageUsers)?;

    let user = UserRepository::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", user_id)))?;
    Ok(Json(user))
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> AppResult<Json<Vec<User>>> {
    RoleAuthorizer::authorize_any(&principal, &[Role::Admin])?;

    let users = UserRepository::list(&state.db).await?;
    Ok(Json(users))
}

/// Role reassignment is an administrative action; the normalized role
/// column is the only place a role ever changes.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateUser>,
) -> AppResult<Json<User>> {
    RoleAuthorizer::authorize(&principal, Capability::ManageUsers)?;
    payload.validate()?;

    UserRepository::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", user_id)))?;

    let user = UserRepository::update(&state.db, user_id, &payload).await?;
    Ok(Json(user))
}
