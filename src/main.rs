//! Asset capability server
//!
//! Usage:
//!   asset-caps [--config <path>] [--verbose]

use std::path::PathBuf;
use std::sync::Arc;

use asset_caps::asset::MemoryAssetStore;
use asset_caps::caps::{AssetCaps, CapsRegistry};
use asset_caps::config::{ConfigStore, ConfigStoreConfig};
use asset_caps::core::Result;
use asset_caps::logging::{LogLevel, LoggingSystem};
use asset_caps::server::CapsServer;
use asset_caps::transcode::ImageTranscoder;
use tokio_util::sync::CancellationToken;

/// Command line arguments
struct Args {
    /// Path to the configuration file
    config: Option<PathBuf>,
    /// Enable verbose logging
    verbose: bool,
}

impl Args {
    fn parse() -> std::result::Result<Self, String> {
        let mut args = std::env::args().skip(1);
        let mut config = None;
        let mut verbose = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    config = Some(
                        args.next()
                            .map(PathBuf::from)
                            .ok_or("--config needs a path")?,
                    );
                }
                "--verbose" | "-v" => {
                    verbose = true;
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                _ => {
                    return Err(format!("Unknown argument: {}", arg));
                }
            }
        }

        Ok(Self { config, verbose })
    }
}

fn print_help() {
    println!(
        r#"asset-caps - Capability-gated asset delivery

USAGE:
    asset-caps [OPTIONS]

OPTIONS:
    -c, --config <PATH>    Configuration file (default: <config dir>/asset-caps/config.json)
    -v, --verbose          Enable debug logging
    -h, --help             Print this help message

A default configuration file is written when none exists.
"#
    );
}

async fn run(args: Args) -> Result<()> {
    let settings = match args.config {
        Some(path) => ConfigStoreConfig::with_path(path),
        None => ConfigStoreConfig::default(),
    };
    let config_store = ConfigStore::open(settings).await?;
    let config = config_store.get().await;

    let mut logging_config = config.logging.clone();
    if args.verbose {
        logging_config = logging_config.with_level(LogLevel::Debug);
    }
    let _logging = LoggingSystem::init(logging_config)?;
    tracing::info!("Loaded configuration from {:?}", config_store.config_path());

    let store = Arc::new(MemoryAssetStore::new(config.store.cache_capacity));
    let transcoder = Arc::new(ImageTranscoder::new(config.transcode.jpeg_quality));
    let registry = Arc::new(CapsRegistry::new(config.server.server_uri()));
    let caps = Arc::new(AssetCaps::new(
        registry,
        Some(store),
        transcoder,
        config.caps.clone(),
    ));

    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Shutdown requested"),
            Err(e) => tracing::error!("Failed to listen for ctrl-c: {}", e),
        }
        ctrl_c.cancel();
    });

    let server = CapsServer::new(config, Arc::clone(&caps));
    let result = server.start(shutdown).await;

    caps.revoke_all();
    result
}

#[tokio::main]
async fn main() {
    let args = match Args::parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(args).await {
        tracing::error!("asset-caps failed: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
