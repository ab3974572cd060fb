use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rwts_planner::config::Config;
use rwts_planner::db::Database;
use rwts_planner::db_storage::PgStore;
use rwts_planner::handlers::AppState;
use rwts_planner::routes;
use rwts_planner::storage::{MemoryStore, Storage};

/// Main entry point for the application.
///
/// Initializes tracing, loads configuration, picks the storage backing
/// (Postgres when `DATABASE_URL` is set, otherwise in-memory) and serves the
/// router.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rwts_planner=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let store: Arc<dyn Storage> = match config.database_url {
        Some(ref url) => {
            let db = Database::new(url).await?;
            tracing::info!("Database connection pool established");
            Arc::new(PgStore::new(db.pool))
        }
        None => {
            tracing::info!("In-memory store initialized");
            Arc::new(MemoryStore::new())
        }
    };

    let app_state = Arc::new(AppState::new(store, config.clone()));
    let app = routes::router(app_state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("RWTS planner listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
