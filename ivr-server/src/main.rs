use std::sync::Arc;

use clap::Parser;
use ivr_core::{CallStore, IvrConfig, XlsxStore};
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "ivr.toml")]
    config: String,

    /// Load the store once, report its status and exit
    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience — production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load config
    let config = match IvrConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // Init logging; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.service.log_level));
    fmt().with_env_filter(filter).init();

    let store: Arc<dyn CallStore> = Arc::new(XlsxStore::from_config(&config.store));

    if args.health {
        match store.load().await {
            Ok(table) => {
                println!("✅ Store readable: {}", store.describe());
                println!("✅ Call records: {}", table.len());
                return Ok(());
            }
            Err(e) => {
                println!("❌ Store check failed for {}: {}", store.describe(), e);
                std::process::exit(1);
            }
        }
    }

    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    tracing::info!("Serving call records from {}", store.describe());
    ivr_server::http::start_http_server(store, config, tx.subscribe()).await?;

    Ok(())
}
