use super::handlers::{create_formation, get_formation, patch_formation};
use crate::app_state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn formation_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_formation))
        .route("/:id", get(get_formation).patch(patch_formation))
}
