//! # Pressfit - Fitness-for-Service CLI
//!
//! The main binary for the pressfit dual-path calculation engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │            apps/pressfit (THE BINARY)         │
//! │                                               │
//! │   ┌─────────────┐        ┌──────────────┐     │
//! │   │    CLI      │        │    Config    │     │
//! │   │   (clap)    │        │    (toml)    │     │
//! │   └──────┬──────┘        └──────┬───────┘     │
//! │          └───────────┬──────────┘             │
//! │                      ▼                        │
//! │              ┌───────────────┐                │
//! │              │ pressfit-core │                │
//! │              │  (THE LOGIC)  │                │
//! │              └───────────────┘                │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! pressfit init
//! pressfit thickness -p 1000 -r 24 -s 17500 -e 1.0
//! pressfit life -c 1.150 -m 0.875 -r 0.010 -l conservative --record equipment/V-101
//! pressfit assess -f v101.json -a inspector@plant
//! pressfit audit verify --all
//! ```

use clap::Parser;
use pressfit::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // PRESSFIT_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("PRESSFIT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pressfit=info,pressfit_core=info".into());

    // Logs go to stderr so --json-mode output on stdout stays parseable.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
