//! # Server Binary Entry Point
//!
//! Thin wrapper that loads configuration and runs the form server.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin server
//! cargo run --bin server -- --config config/server.toml --port 4000
//! PORT=4000 cargo run --bin server
//! ```
//!
//! Settings are layered: built-in defaults, then the TOML file, then the `PORT`
//! environment variable, then `--port`.

use clap::Parser;
use log::info;

use smart_form_tester::server::{self, config::PORT_ENV, ServerConfig};
use smart_form_tester::utils::logging::init_logger;

/// Command-line arguments for the server binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the server configuration file (TOML format)
    ///
    /// Example: config/server.toml
    #[arg(short, long)]
    config: Option<String>,

    /// Port to listen on, overriding the config file and PORT
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {}", path);
            ServerConfig::from_file(path)?
        }
        None => ServerConfig::default(),
    };

    config.apply_port_env(std::env::var(PORT_ENV).ok().as_deref())?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    server::run(config).await
}
