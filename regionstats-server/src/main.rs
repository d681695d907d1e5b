use clap::Parser;
use regionstats_server::config::{ServerConfig, DEFAULT_ADDR, DEFAULT_DATA_PATH};
use regionstats_server::store::TelemetryStore;
use regionstats_server::Server;
use std::net::SocketAddr;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "regionstats-server")]
struct Args {
    /// Socket address to listen on.
    #[arg(long, default_value = DEFAULT_ADDR)]
    addr: SocketAddr,

    /// Path to the JSON array of telemetry records, relative to the deployment root.
    #[arg(long, env = "REGIONSTATS_DATA", default_value = DEFAULT_DATA_PATH)]
    data: std::path::PathBuf,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    // The listener must not start against a missing or partial dataset.
    let store = TelemetryStore::load(&args.data).inspect_err(|e| error!(error = %e, "startup failed"))?;
    info!(
        path = %args.data.display(),
        records = store.len(),
        regions = store.regions().len(),
        "telemetry loaded"
    );

    let config = ServerConfig { address: args.addr };

    let (ready_tx, ready_rx) = tokio::sync::oneshot::channel();

    tokio::spawn(async move {
        if let Ok(addr) = ready_rx.await {
            info!("Listening on {}", addr);
        }
    });

    Server::new(config, store).run(ready_tx).await?;
    Ok(())
}
