use anyhow::Context;
use dotenv::dotenv;
use tracing::info;

use tms_backend::{app, app_state::AppState, config, db, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = config::init()?.clone();

    let telemetry_handles = telemetry::init_telemetry(None).await?;

    let pool = db::init_pool().await?;

    let state = AppState::new(pool, config.clone());
    let router = app::create_router(state);

    let addr = config.server_addr();
    info!("{} listening on {}", config.app.name, addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, router)
        .await
        .context("Failed to serve application")?;

    telemetry_handles.shutdown().await?;

    Ok(())
}
