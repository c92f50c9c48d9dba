use super::handlers::{create_session, get_session, patch_session};
use crate::app_state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_session))
        .route("/:id", get(get_session).patch(patch_session))
}
