mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::CliConfig::load();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let api_url = cli
        .api_url
        .as_deref()
        .unwrap_or_else(|| config.api_url())
        .to_string();
    tracing::debug!(%api_url, "resolved backend");

    // Unauthenticated commands skip the session-expired hook, so a
    // failed sign-in never tells the user to sign in again.
    let authenticated = !matches!(cli.command, Commands::Login | Commands::Signup);
    let ctx = commands::Context::new(&api_url, authenticated)?;

    match cli.command {
        Commands::Signup => commands::auth::signup(&ctx).await,
        Commands::Login => commands::auth::login(&ctx).await,
        Commands::Logout => commands::auth::logout(&ctx),
        Commands::Whoami => commands::auth::whoami(&ctx).await,
        Commands::Chat(args) => commands::chat::run(&ctx, args).await,
        Commands::Sessions(args) => commands::sessions::run(&ctx, args).await,
        Commands::Babies => commands::babies::run(&ctx).await,
    }
}
