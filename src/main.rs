//! WeightTrack - Body Weight and Fitness Tracking
//!
//! Main entry point for the command-line application.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::debug!("Starting WeightTrack v{}", env!("CARGO_PKG_VERSION"));

    cli::run()
}
