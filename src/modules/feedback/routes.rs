use super::handlers::{feedback_summary, list_feedback, submit_feedback};
use crate::app_state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn feedback_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_feedback).get(list_feedback))
        .route("/summary", get(feedback_summary))
}
