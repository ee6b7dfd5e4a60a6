mod app;
mod attendance;
mod auth;
mod config;
mod error;
mod food;
mod profile;
mod records;
mod recovery;
mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "health_tracker=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = state::AppState::init().await?;

    sqlx::migrate!("./migrations").run(&app_state.db).await?;

    match auth::blacklist::purge_expired(&app_state.db).await {
        Ok(purged) => tracing::info!(purged, "expired blacklist entries removed"),
        Err(e) => tracing::warn!(error = %e, "blacklist purge failed; continuing"),
    }

    app::serve(app::build_app(app_state)).await
}
