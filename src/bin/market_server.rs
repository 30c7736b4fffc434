use market_api::{ApiConfig, ApiServer};
use market_core::OrderStore;
use market_db::{DatabaseConfig, DatabasePool, PgOrderStore};
use market_store::MemoryOrderStore;
use std::sync::Arc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (ignore if not found)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(Level::INFO.into())
                .add_directive("market_api=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    let mut db_pool = None;
    let store: Arc<dyn OrderStore> = match DatabaseConfig::from_env() {
        Some(db_config) => {
            let pool = match DatabasePool::new(&db_config).await {
                Ok(pool) => pool,
                Err(e) => {
                    error!(error = %e, "Failed to connect to database");
                    std::process::exit(1);
                }
            };
            if let Err(e) = pool.migrate().await {
                error!(error = %e, "Failed to run database migrations");
                std::process::exit(1);
            }
            info!("Database connected and migrations applied");
            db_pool = Some(pool.clone());
            Arc::new(PgOrderStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set, orders are kept in memory and lost on restart");
            Arc::new(MemoryOrderStore::new())
        }
    };

    let metrics = match market_api::metrics::init() {
        Ok(handle) => handle,
        Err(e) => {
            error!(error = %e, "Failed to install metrics recorder");
            std::process::exit(1);
        }
    };

    let config = ApiConfig::from_env();
    let result = ApiServer::new(config, store).with_metrics(metrics).run().await;

    if let Some(pool) = db_pool {
        pool.close().await;
        info!("Database connections closed");
    }

    if let Err(e) = result {
        error!(error = %e, "API server stopped");
        std::process::exit(1);
    }

    Ok(())
}
