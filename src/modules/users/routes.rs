use super::handlers::{create_user, get_user, list_users, update_user};
use crate::app_state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_user).get(list_users))
        .route("/:id", get(get_user).patch(update_user))
}
