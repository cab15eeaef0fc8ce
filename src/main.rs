//! Meridian Protocol Indexer
//!
//! Replays the decoded protocol event stream in chain order and maintains
//! derived aggregate state (rolling averages, candles, daily ledgers,
//! registry snapshots) in RocksDB.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use meridian_indexer::chain::RpcChainReader;
use meridian_indexer::config::IndexerConfig;
use meridian_indexer::database::{RocksDbStore, StoreManager};
use meridian_indexer::events::{EventSource, FileEventSource};
use meridian_indexer::processors::ProcessorRegistry;

#[derive(Parser)]
#[command(name = "meridian-indexer")]
#[command(about = "Meridian Protocol Indexer")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "indexer.toml")]
    config: String,

    /// Override log level
    #[arg(long)]
    log_level: Option<String>,

    /// Dry run mode (validate config and exit)
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = if std::path::Path::new(&cli.config).exists() {
        IndexerConfig::from_file(&cli.config)?
    } else {
        warn!("Config file not found, using defaults: {}", cli.config);
        IndexerConfig::default()
    };

    // Override log level if provided
    if let Some(log_level) = cli.log_level {
        config.monitoring.log_level = log_level;
    }

    // Initialize logging
    init_logging(&config)?;

    info!("Starting Meridian Protocol Indexer");
    info!("RPC endpoint: {}", config.chain.rpc_endpoint);
    info!("Events file: {}", config.intake.events_path.display());
    info!("RocksDB path: {:?}", config.storage.rocksdb.path);

    // Validate configuration and create directories
    config.validate()?;
    config.ensure_directories()?;
    info!("Configuration validated successfully");

    if cli.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        return Ok(());
    }

    // Initialize storage
    let store = StoreManager::new(Arc::new(RocksDbStore::open(&config.storage.rocksdb)?));

    // Initialize chain reader and processors
    let reader = Arc::new(RpcChainReader::new(config.chain.rpc_endpoint.clone()));
    let mut registry = ProcessorRegistry::new(store, reader, config.protocol_defaults());

    // Replay the event stream
    let mut source = FileEventSource::open(&config.intake.events_path)?;
    let log_every = config.intake.log_every;

    let intake_handle = tokio::spawn(async move {
        let mut processed: usize = 0;
        loop {
            let envelope = match source.next_event() {
                Ok(Some(envelope)) => envelope,
                Ok(None) => {
                    info!("Event stream exhausted after {} events", processed);
                    break;
                }
                Err(e) => {
                    error!("Event source error: {:#}", e);
                    break;
                }
            };

            if let Err(e) = registry.process_event(&envelope).await {
                error!(
                    "Aborting at block {} log {}: {}",
                    envelope.block_number, envelope.log_index, e
                );
                break;
            }

            processed += 1;
            if processed % log_every == 0 {
                let at = chrono::DateTime::from_timestamp(envelope.timestamp, 0)
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| envelope.timestamp.to_string());
                info!("Processed {} events, stream at {}", processed, at);
            }
        }
    });

    // Wait for shutdown signal or stream end
    info!("Indexer started successfully. Press Ctrl+C to shutdown.");
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
        result = intake_handle => {
            match result {
                Ok(_) => info!("Intake finished"),
                Err(e) => error!("Intake task error: {}", e),
            }
        }
    }

    info!("Shutting down Meridian Protocol Indexer");
    Ok(())
}

fn init_logging(config: &IndexerConfig) -> Result<()> {
    let log_level = config
        .monitoring
        .log_level
        .parse()
        .unwrap_or(tracing::Level::INFO);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("meridian_indexer={}", log_level).into());

    if config.monitoring.structured_logging {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    Ok(())
}
