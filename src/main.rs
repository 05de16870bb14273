use clap::Parser;
use tracing::error;

use goes_browse::cli::{self, Cli};
use goes_browse::config::load_settings;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings().await;
    cli.apply_to_settings(&mut settings);

    if let Err(err) = cli::run(cli, &settings).await {
        error!("{err:#}");
        std::process::exit(1);
    }
}
