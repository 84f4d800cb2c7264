// Entrypoint for the CLI application.
// - Installs the log subscriber (stderr, `RUST_LOG`, default `info`).
// - Resolves settings, builds the prediction client once and hands both
//   to the run loop.

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vertex_classify::{api::PredictionClient, config::Args, config::Settings, ui};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = Settings::resolve(args)?;

    info!("start init");
    let client = PredictionClient::new(&settings)?;
    info!("end init: endpoint {}", client.endpoint());

    let summary = ui::run(&settings, &client)?;
    if summary.failed > 0 {
        anyhow::bail!("{} image(s) could not be classified", summary.failed);
    }
    Ok(())
}
