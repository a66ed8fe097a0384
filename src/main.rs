//! Timetabler Server
//!
//! Run with: cargo run --bin timetabler -- --config config.toml
//!
//! Without `--config` the usual locations are searched (see
//! [`Config::load_default`]). `TIMETABLER_*` environment variables override
//! file values; `RUST_LOG` overrides the log level.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use timetabler::api::{serve, AppState};
use timetabler::config::Config;

#[derive(Parser)]
#[command(name = "timetabler")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Timetable generation web service")]
struct Args {
    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Config::load_default(),
    };
    config.logging.init();

    tracing::info!("Starting Timetabler v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        population_size = config.solver.population_size,
        generations = config.solver.generations,
        seed = config.solver.seed,
        "Solver settings"
    );
    match &config.server.static_dir {
        Some(dir) => tracing::info!(static_dir = %dir, "Serving web client"),
        None => tracing::info!("No static_dir configured, web client not served"),
    }

    serve(AppState::new(config)).await?;

    tracing::info!("Timetabler stopped");
    Ok(())
}
