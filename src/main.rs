//! CLI binary for the MoE deployment model

mod cli;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // RUST_LOG wins; otherwise only closed-form fallbacks and data problems are shown
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("moe_cap=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    cli::run()
}
