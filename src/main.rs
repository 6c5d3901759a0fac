use axum::Router;
use dotenvy::dotenv;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use portal_server::config::Config;
use portal_server::routes::create_routes;
use portal_server::state::AppState;
use portal_server::store::PgStore;

const DEFAULT_LOG_FILTER: &str = "info,portal_server=debug,tower_http=debug";

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = Config::from_env();

    let state = match &config.database {
        Some(database) => {
            let store = Arc::new(
                PgStore::connect(database)
                    .await
                    .expect("Failed to connect to database"),
            );
            AppState::new(store.clone(), store, &config)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory storage, data is lost on exit");
            AppState::in_memory(&config)
        }
    };

    let app: Router = create_routes(state, &config);

    let addr = config.bind_addr();
    tracing::info!("🚀 Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
