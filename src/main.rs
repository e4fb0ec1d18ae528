mod catalog;
mod config;
mod db;
mod frame;
mod routes;
mod services;
mod state;

use std::sync::Arc;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::AppConfig::from_env().expect("invalid configuration");
    let port = config.port;

    let catalog = catalog::HttpCatalog::new(&config.catalog).expect("map catalog client init failed");
    tracing::info!(base_url = %config.catalog.base_url, "map catalog configured");

    // Finished ceremonies are archived only when a database is configured.
    let persist_tx = match config.database_url.as_deref() {
        Some(url) => {
            let pool = db::init_pool(url, config.db_max_connections)
                .await
                .expect("database init failed");
            Some(services::persistence::spawn_ceremony_persistence_worker(pool, config.persist))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; finished ceremonies will not be archived");
            None
        }
    };

    tracing::info!(strategy = %config.strategy, toss_policy = ?config.toss_policy, "ceremony defaults");
    let state = state::AppState::new(config, Arc::new(catalog), persist_tx);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "stratbook listening");
    axum::serve(listener, app).await.expect("server failed");
}
