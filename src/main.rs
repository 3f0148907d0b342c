mod admin;
mod app;
mod auth;
mod categories;
mod config;
mod db;
mod error;
mod extract;
mod meals;
mod orders;
mod providers;
mod response;
mod restaurants;
mod reviews;
mod slug;
mod state;
mod stats;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "foodhub=debug,axum=info,tower_http=info".to_string());
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

    let app_state = AppState::init().await?;

    if let Err(e) = sqlx::migrate!("./migrations").run(&app_state.db).await {
        tracing::warn!(error = %e, "migration failed; continuing");
    }

    if let Some(seed) = &app_state.config.admin {
        auth::services::ensure_admin(&app_state.db, seed).await?;
    }

    app::serve(app::build_app(app_state)).await
}
