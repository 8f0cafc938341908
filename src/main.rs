use carstat::{
    router, AppConfig, AppState, InMemoryRecordStore, PostgresRecordStore, RecordStore,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "carstat=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Carcassonne statistics server");
    let config = AppConfig::from_env()?;

    let store: Arc<dyn RecordStore> = match &config.database_url {
        Some(database_url) => {
            let pool = sqlx::PgPool::connect(database_url).await?;
            let store = PostgresRecordStore::new(pool);
            store.init_schema().await?;
            info!("Using PostgreSQL record store");
            Arc::new(store)
        }
        None => {
            info!("DATABASE_URL not set, using in-memory record store");
            Arc::new(InMemoryRecordStore::new())
        }
    };

    let app_state = AppState::new(store, config.preferences, config.backup_dir.clone());
    let app = router(app_state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Server running on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
