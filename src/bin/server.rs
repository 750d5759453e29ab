//! NimbusKV Server Binary
//!
//! Replays the append-only log, then starts the TCP server.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use nimbuskv::network::Server;
use nimbuskv::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// NimbusKV Server
#[derive(Parser, Debug)]
#[command(name = "nimbuskv-server")]
#[command(about = "In-memory key-value server with sorted sets and persistence")]
#[command(version)]
struct Args {
    /// Configuration file (appendonly / save directives)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data directory
    #[arg(short, long, default_value = "./nimbuskv_data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:6380")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,nimbuskv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("NimbusKV Server v{}", nimbuskv::VERSION);

    // Start from the config file when given, then apply CLI settings
    let mut config = match &args.config {
        Some(path) => match Config::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Failed to read config file {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };
    config.data_dir = PathBuf::from(&args.data_dir);
    config.listen_addr = args.listen.clone();
    config.max_connections = args.max_connections;

    tracing::info!("Data directory: {}", config.data_dir.display());
    tracing::info!("Append-only log: {}", if config.append_only { "on" } else { "off" });

    let engine = match Engine::open(config.clone()) {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Engine initialized successfully");

    let server = Server::new(config, engine);
    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
