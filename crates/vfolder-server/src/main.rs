//! vfolder-server - binary entry point

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use vfolder::{LogLevel, ServiceConfig};

#[derive(Parser)]
#[command(name = "vfolder-server")]
#[command(version, about = "Browse, download and upload files over an object store", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short = 'c', long = "config", value_name = "PATH", env = "VFOLDER_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, e.g. 0.0.0.0:8080 (overrides server.bind)
    #[arg(short = 'b', long = "bind", value_name = "ADDR")]
    bind: Option<String>,

    /// Log level: error, warn, info, debug, trace (overrides logging.level)
    #[arg(long = "log-level", value_name = "LEVEL")]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ServiceConfig::load(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to load configuration".to_string(),
    })?;

    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    config.validate().context("Invalid configuration")?;
    vfolder::logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    vfolder_server::run_server(config).await
}
