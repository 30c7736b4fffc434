use market_core::SyncConfig;
use market_sync::{HttpOrderGateway, HttpProbe, Reconciler};
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (ignore if not found)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(Level::INFO.into())
                .add_directive("market_sync=info".parse()?),
        )
        .init();

    let config = match SyncConfig::from_env() {
        Ok(config) => {
            info!(
                backend = %config.backend_url,
                seaport = ?config.seaport_contract,
                nft = ?config.nft_contract,
                from_block = config.from_block,
                chunk_size = config.chunk_size,
                "Seaport order sync starting"
            );
            config
        }
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    let gateway = HttpOrderGateway::new(&config.backend_url);
    let mut reconciler = match Reconciler::connect(&config, &HttpProbe, gateway).await {
        Ok(reconciler) => reconciler,
        Err(e) => {
            error!(error = %e, "No usable RPC endpoint");
            std::process::exit(1);
        }
    };

    match reconciler.run().await {
        Ok(report) => {
            info!(
                endpoint = reconciler.endpoint().unwrap_or_default(),
                fulfilled = report.totals.fulfilled,
                cancelled = report.totals.cancelled,
                rejected = report.rejected,
                skipped_chunks = report.skipped_chunks.len(),
                "Seaport order sync finished"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Seaport order sync failed");
            std::process::exit(1);
        }
    }
}
