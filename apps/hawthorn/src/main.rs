//! # Hawthorn - Property Graph CLI
//!
//! The main binary for the Hawthorn property graph.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │            apps/hawthorn (THE BINARY)         │
//! │                                               │
//! │  ┌─────────────┐   ┌───────────┐   ┌───────┐  │
//! │  │    CLI      │   │  config   │   │ bulk  │  │
//! │  │   (clap)    │   │  (toml)   │   │ (json)│  │
//! │  └──────┬──────┘   └─────┬─────┘   └───┬───┘  │
//! │         └────────────────┼─────────────┘      │
//! │                          ▼                    │
//! │                ┌──────────────────┐           │
//! │                │  hawthorn-core   │           │
//! │                │   (THE ENGINE)   │           │
//! │                └──────────────────┘           │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! hawthorn init
//! hawthorn create --prop type=group --prop role=admin
//! hawthorn create --prop type=machine --prop ip=10.0.0.1
//! hawthorn connect 1 2 read
//! hawthorn query --start role=admin crawl:read --contains 2
//! ```

use clap::Parser;
use hawthorn::cli;
use hawthorn::config::{Config, LogFormat};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    // The config picks the formatter; its own errors are logged after init.
    let config = Config::load(cli.config.as_deref()).map(Config::with_env_overrides);
    let log_format = match &config {
        Ok(config) => config.log.format,
        Err(_) => Config::default().with_env_overrides().log.format,
    };
    init_tracing(log_format);

    let result = config.and_then(|config| cli::execute(cli, &config));
    if let Err(e) = result {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Install the global subscriber on stderr. `RUST_LOG` overrides the
/// default filter.
fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "hawthorn=info".into());

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
