use anyhow::Result;
use clap::{arg, command, Parser};
use std::sync::Arc;
use symbol_tx_aggregator::application::app::{App, Application};
use symbol_tx_aggregator::domain::models::TransferQuery;
use symbol_tx_aggregator::infrastructure::symbol_client::SymbolRestClient;
use symbol_tx_aggregator::service;
use tokio::signal;
use tokio::sync::broadcast;

#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "Symbol tagged-transfer aggregator with REST API"
)]
struct AggProgram {
    /// Symbol REST gateway endpoint
    #[arg(short, long, default_value = "https://01.symbol-blockchain.com:3001")]
    node_url: String,

    /// Account address whose confirmed transfers are scanned
    #[arg(short, long, default_value = "NDHD4RURCULDJ6EXEJ675MS3QHCMTTFTWFG5IDQ")]
    address: String,

    /// Mosaic id the transfers must carry
    #[arg(short, long, default_value = "606F8854012B0C0F")]
    mosaic_id: String,

    /// Transactions fetched per pass (single page, no pagination)
    #[arg(short, long, default_value_t = 100)]
    page_size: u16,

    /// Listen port REST API
    #[arg(short, long, default_value_t = 3000)]
    listen_port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let args = AggProgram::parse();

    // Create a shutdown channel
    let (shutdown_sender, _) = broadcast::channel(1);

    let app = Arc::new(
        App::builder()
            .client(SymbolRestClient::from_url(&args.node_url))
            .query(TransferQuery {
                address: args.address,
                mosaic_id: args.mosaic_id,
                page_size: args.page_size,
            })
            .build(),
    );

    // First load runs in the background; the API serves whatever has been
    // aggregated so far.
    let app_clone = app.clone();
    let refresh_handle = tokio::spawn(async move {
        if let Err(e) = app_clone.refresh().await {
            tracing::error!("Initial refresh error: {:?}", e);
        }
    });

    // Start the API server
    let server_handle = tokio::spawn(service::api::start_server(
        shutdown_sender.clone(),
        app.clone(),
        args.listen_port,
    ));

    // Wait for shutdown signal
    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::warn!("Received Ctrl+C, shutting down...");
        }
    }

    let _ = shutdown_sender.send(());

    // Wait for tasks to complete
    let _ = tokio::join!(refresh_handle, server_handle);

    tracing::info!("Shutdown complete");
    Ok(())
}
