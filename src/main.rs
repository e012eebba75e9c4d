//! Prometheus probe exporter for Intinor Direkt units.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use prometheus::{IntGaugeVec, Opts};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use direkt_exporter::client::DeviceClient;
use direkt_exporter::config::{Credentials, ExporterConfig, LogFormat};
use direkt_exporter::http::create_router;

/// Prometheus probe exporter for Intinor Direkt units.
#[derive(Parser, Debug)]
#[command(name = "direkt-exporter")]
#[command(about = "Probe Intinor Direkt units and export Prometheus metrics")]
#[command(version)]
struct Args {
    /// Path to configuration file (JSON5 format).
    #[arg(short, long)]
    config: Option<String>,

    /// HTTP listen address (overrides config).
    #[arg(long)]
    listen: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Use human-readable console logs instead of JSON.
    #[arg(short = 'd', long, alias = "dev")]
    development: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        ExporterConfig::load_from_file(config_path)?
    } else {
        ExporterConfig::default()
    };

    // CLI overrides
    if let Some(listen) = args.listen {
        config.listen = listen;
    }
    if args.development {
        config.logging.format = LogFormat::Text;
    }

    // Initialize logging
    let log_level = args.log_level.parse().unwrap_or(Level::INFO);
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("direkt_exporter={}", log_level).parse()?)
        .add_directive(format!("tower_http={}", Level::WARN).parse()?);

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }

    info!("Starting exporter");

    let credentials = Credentials::from_env();
    if !credentials.is_configured() {
        info!(
            username = %credentials.username,
            "Username or password not set, authentication will not be used"
        );
    }
    let client = DeviceClient::new(&config.device, credentials)?;

    register_build_info()?;

    let listen_addr: SocketAddr = config
        .listen
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address: {}", e))?;

    let router = create_router(
        client,
        Duration::from_secs(config.device.probe_timeout_secs),
    );

    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", listen_addr, e))?;

    info!(addr = %listen_addr, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Exiting exporter");
    Ok(())
}

/// Register the exporter's own build information on the default registry.
fn register_build_info() -> Result<(), prometheus::Error> {
    let build_info = IntGaugeVec::new(
        Opts::new(
            "direkt_exporter_build_info",
            "Build information for the running exporter",
        ),
        &["version"],
    )?;
    build_info
        .with_label_values(&[env!("CARGO_PKG_VERSION")])
        .set(1);
    prometheus::default_registry().register(Box::new(build_info))
}

/// Resolve when the process receives SIGINT or SIGTERM, letting axum drain
/// in-flight requests.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    let terminate = async {
        #[cfg(unix)]
        {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(_) => std::future::pending::<()>().await,
            }
        }
        #[cfg(not(unix))]
        {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}
