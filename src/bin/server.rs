//! servctl Server Binary
//!
//! Accepts control connections and answers start/stop commands.

use clap::Parser;
use servctl::{Config, Server};
use tracing_subscriber::{fmt, EnvFilter};

/// servctl Server
#[derive(Parser, Debug)]
#[command(name = "servctl-server")]
#[command(about = "Remote-controlled server endpoint for servctl")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    listen: String,

    /// Password clients must send to authenticate
    #[arg(short, long, default_value = "password")]
    secret: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "64")]
    max_connections: usize,

    /// Seconds between diagnostic pushes
    #[arg(short = 'i', long, default_value = "5")]
    diagnostic_interval: u64,

    /// Seconds before the first diagnostic push on a connection
    #[arg(short = 'd', long, default_value = "20")]
    diagnostic_delay: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,servctl=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("servctl server v{}", servctl::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let config = Config::builder()
        .listen_addr(&args.listen)
        .secret(&args.secret)
        .max_connections(args.max_connections)
        .diagnostic_interval_ms(args.diagnostic_interval * 1000)
        .diagnostic_initial_delay_ms(args.diagnostic_delay * 1000)
        .build();

    let server = match Server::bind(config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    // Set up Ctrl+C handler
    let handle = server.shutdown_handle();
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("Received Ctrl+C, initiating shutdown...");
        handle.shutdown();
    }) {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
