mod config;
mod db;
mod poll;
mod routes;
mod services;
mod state;

use config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    let port = config.port;

    let pool = match config.database_url.as_deref() {
        Some(url) => Some(db::init_pool(url, config.db_max_connections).await?),
        None => {
            tracing::warn!("DATABASE_URL not set; polls are kept in memory only");
            None
        }
    };
    let state = state::AppState::new(pool, config);

    services::persistence::hydrate_all(&state).await?;

    // Spawn background persistence task.
    let _persistence = services::persistence::spawn_persistence_task(state.clone());

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;

    tracing::info!(%port, "bether listening");
    axum::serve(listener, app).await?;
    Ok(())
}
