use anyhow::Context;
use curriculum_api::{
    app,
    auth::JwtSessionProvider,
    config,
    database::{DatabaseManager, PgUserStore},
    AppState,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SESSION_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::config();
    tracing::info!("Starting Curriculum API in {:?} mode", config.environment);

    if config.security.session_secret.is_empty() {
        tracing::warn!("SESSION_SECRET is not set; every session lookup will fail");
    }

    let pool = DatabaseManager::connect(&config.database).context("failed to configure database pool")?;

    let state = AppState::new(
        JwtSessionProvider::new(
            config.security.session_secret.clone(),
            config.security.session_cookie.clone(),
        ),
        PgUserStore::from_config(pool.clone(), &config.database),
    );

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Curriculum API listening on http://{}", bind_addr);

    axum::serve(listener, app(state, config))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    DatabaseManager::close(&pool).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
