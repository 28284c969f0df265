//! Settlers simulator: plays batches of all-AI games and reports the results.

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod runner;

use config::SimConfig;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SimConfig::from_env()?;
    info!(?config, "Starting settlers simulator...");

    let reports = runner::run_all(&config)?;
    let summary = runner::summarize(&reports, config.players);

    info!(
        games = summary.games,
        finished = summary.finished,
        average_turns = summary.average_turns,
        "simulation complete"
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
