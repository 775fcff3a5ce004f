use anyhow::Result;
use clap::Parser;
use tracing::debug;

use kino_api::{ApiClient, ApiError, ClientConfig};

mod commands;
mod prompt;

use commands::Commands;

#[derive(Parser)]
#[command(name = "kino")]
#[command(version)]
#[command(about = "Admin and account tools for the kino streaming platform")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API base URL (overrides KINO_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Bearer token (overrides KINO_TOKEN)
    #[arg(long, global = true, value_name = "TOKEN")]
    token: Option<String>,
}

#[tokio::main]
async fn main() {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kino=info,kino_api=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        if err
            .downcast_ref::<ApiError>()
            .is_some_and(ApiError::is_cancelled)
        {
            debug!("cancelled at password prompt");
            std::process::exit(130);
        }
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = ClientConfig::from_env();
    if let Some(url) = cli.api_url {
        config = config.with_base_url(url);
    }
    if let Some(token) = cli.token {
        config = config.with_token(token);
    }
    debug!(base_url = %config.base_url, signed_in = config.token.is_some(), "config loaded");

    let client = ApiClient::new(config)?;
    commands::dispatch(&client, cli.command).await
}
