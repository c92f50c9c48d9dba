use super::handlers::{record_presences, session_presence_stats, trainer_presence_stats};
use crate::app_state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

/// Presence routes that hang off /sessions.
pub fn session_presence_routes() -> Router<AppState> {
    Router::new()
        .route("/:id/presences", post(record_presences))
        .route("/:id/presences/stats", get(session_presence_stats))
}

/// Trainer-side trend routes, mounted under /trainers.
pub fn trainer_presence_routes() -> Router<AppState> {
    Router::new().route("/:id/presences/stats", get(trainer_presence_stats))
}
