//! Command handlers for the CLI

use anyhow::{Context, Result};
use googleauth::api::{self, ClientAssembler};
use googleauth::auth::{
    BrowserLauncher, CredentialStore, InteractiveAuthorizer, NoBrowser, SystemBrowser, UserHome,
};
use googleauth::config::{OAuthConfig, Settings};
use tokio::io::{BufReader, Stdin, Stdout};

fn browser(settings: &Settings) -> Box<dyn BrowserLauncher> {
    if settings.open_browser() {
        Box::new(SystemBrowser)
    } else {
        Box::new(NoBrowser)
    }
}

fn oauth_config(settings: &Settings) -> Result<OAuthConfig> {
    let secret_file = settings.secret_file();
    let config = api::load_config(&secret_file, settings.scope()?)?;
    Ok(config)
}

type StdioAuthorizer = InteractiveAuthorizer<BufReader<Stdin>, Stdout, Box<dyn BrowserLauncher>>;

fn assembler(settings: &Settings) -> ClientAssembler<UserHome, StdioAuthorizer> {
    ClientAssembler::new(
        CredentialStore::new(UserHome),
        InteractiveAuthorizer::stdio(browser(settings)),
    )
}

/// Make sure a usable token is cached
pub async fn login(settings: &Settings, force: bool) -> Result<()> {
    let config = oauth_config(settings)?;
    let (_token, path) = assembler(settings)
        .force(force)
        .resolve_token(&config, settings.token_file())
        .await
        .context("Unable to obtain OAuth token")?;
    println!("Credentials cached at {}", path.display());
    Ok(())
}

/// Remove the cached token
pub fn logout(settings: &Settings) -> Result<()> {
    let store = CredentialStore::new(UserHome);
    let path = store.resolve_path(settings.token_file())?;
    if store.remove(&path)? {
        println!("Removed {}", path.display());
    } else {
        println!("No cached token at {}", path.display());
    }
    Ok(())
}

/// Display the cached token's state
pub fn status(settings: &Settings) -> Result<()> {
    let store = CredentialStore::new(UserHome);
    let path = store.resolve_path(settings.token_file())?;
    println!("Cache file:  {}", path.display());

    match store.load(&path) {
        Ok(token) => {
            if token.is_expired() {
                println!("Access tok:  expired");
            } else {
                println!("Access tok:  valid");
            }
            if let Some(exp) = token.expiry {
                println!("  expiry:    {}", exp.to_rfc3339());
            }
            match token.refresh_token {
                Some(_) => println!("Refresh tok: present"),
                None => println!("Refresh tok: none"),
            }
        }
        Err(e) if e.is_cache_fallback() => {
            println!("Access tok:  none ({})", e);
            println!("\nRun 'googleauth login' to authenticate.");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

/// Fetch `url` with the cached credentials and print the body
pub async fn get(settings: &Settings, url: &str) -> Result<()> {
    let config = oauth_config(settings)?;
    let client = assembler(settings)
        .client(&config, settings.token_file())
        .await
        .context("Unable to obtain OAuth token")?;
    let resp = client.get(url).await?;
    let body = resp.text().await.context("Failed to read response body")?;
    println!("{}", body);
    Ok(())
}
