//! googleauth CLI - obtain and cache OAuth2 credentials for Google APIs

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use googleauth::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "googleauth")]
#[command(about = "Obtain and cache OAuth2 credentials for Google APIs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Client secret JSON downloaded from the API console
    #[arg(long, global = true, env = "GOOGLEAUTH_SECRET_FILE")]
    secret_file: Option<PathBuf>,

    /// Token cache name under ~/.credentials
    #[arg(long, global = true, env = "GOOGLEAUTH_TOKEN_FILE")]
    token_file: Option<String>,

    /// Space-separated scopes to request
    #[arg(long, global = true, env = "GOOGLEAUTH_SCOPE")]
    scope: Option<String>,

    /// Print the consent URL without trying to open a browser
    #[arg(long, global = true)]
    no_browser: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Make sure a cached token exists, authorizing interactively if needed
    Login {
        /// Force interactive login even if cached token exists
        #[arg(short, long)]
        force: bool,
    },

    /// Delete the cached token
    Logout,

    /// Show the cached token's state
    Status,

    /// Send an authenticated GET request and print the response body
    Get {
        /// URL to fetch
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging (stderr, so the consent prompt on stdout stays clean)
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let overrides = Settings {
        secret_file: cli.secret_file,
        token_file: cli.token_file,
        scope: cli.scope,
        open_browser: cli.no_browser.then_some(false),
    };
    let settings = Settings::load()?.overridden_by(overrides);

    match cli.command {
        Commands::Login { force } => {
            tracing::info!("Starting authentication flow...");
            commands::login(&settings, force).await?;
        }
        Commands::Logout => {
            commands::logout(&settings)?;
        }
        Commands::Status => {
            commands::status(&settings)?;
        }
        Commands::Get { url } => {
            commands::get(&settings, &url).await?;
        }
    }

    Ok(())
}
