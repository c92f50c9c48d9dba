use axum::{middleware, routing::get, Json, Router};
use serde_json::json;

use crate::{
    app_state::AppState,
    middleware::{auth::require_principal, tracing::observability_middleware},
    modules::{
        feedback::routes::feedback_routes,
        formations::routes::formation_routes,
        presences::routes::{session_presence_routes, trainer_presence_routes},
        sessions::routes::session_routes,
        users::routes::user_routes,
    },
};

pub fn create_router(state: AppState) -> Router {
    // Everything except the liveness probes sits behind principal resolution.
    let api = Router::new()
        .nest("/sessions", session_routes().merge(session_presence_routes()))
        .nest("/trainers", trainer_presence_routes())
        .nest("/feedback", feedback_routes())
        .nest("/formations", formation_routes())
        .nest("/users", user_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_principal,
        ));

    let static_dir = state.env.app.static_dir.to_string();

    Router::new()
        .route("/", get(hello))
        .route("/health", get(health_check))
        .merge(api)
        .nest_service("/static", tower_http::services::ServeDir::new(static_dir))
        .layer(middleware::from_fn(observability_middleware))
        .with_state(state)
}

async fn hello() -> &'static str {
    "TMS Backend says hello!\n"
}

async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<serde_json::Value> {
    let db_result = sqlx::query("SELECT 1").execute(&state.db).await;

    let db_status = match db_result {
        Ok(_) => "healthy",
        Err(e) => {
            tracing::info!("Database health check failed: {}", e);
            "unhealthy"
        }
    };

    let telemetry_health = crate::telemetry::telemetry_health_check();

    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "database": db_status,
            "telemetry": telemetry_health
        }
    }))
}
