mod app;
mod assessments;
mod cli;
mod config;
mod dataset;
mod error;
mod jobs;
mod pipeline;
mod snapshot;
mod transport;
mod ui;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use app::App;
use cli::Cli;
use config::TalentflowConfig;
use ui::Ui;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            Ui::default().failure(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = TalentflowConfig::load()?;
    if let Some(path) = cli.snapshot {
        config.snapshot_path = path;
    }
    if let Some(latency_ms) = cli.latency_ms {
        config.latency_ms = latency_ms;
    }

    let app = App::open(config)?;
    app.execute(cli.command).await
}

// RUST_LOG wins; otherwise warnings only, or debug with --verbose.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
