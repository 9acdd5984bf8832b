//! Entry points producing an authenticated HTTP client

pub mod assembler;
pub mod client;

pub use assembler::ClientAssembler;
pub use client::AuthorizedClient;

use std::fs;
use std::path::Path;

use crate::auth::{CredentialStore, InteractiveAuthorizer, SystemBrowser, UserHome};
use crate::config::OAuthConfig;
use crate::error::{AuthError, Result};

/// Read and parse a client secret file.
pub fn load_config(secret_file: &Path, scope: &str) -> Result<OAuthConfig> {
    let bytes = fs::read(secret_file).map_err(|source| AuthError::SecretFile {
        path: secret_file.to_path_buf(),
        source,
    })?;
    OAuthConfig::from_json(&bytes, scope)
}

/// Client for `token_file`, prompting on stdin/stdout when no cached
/// token is usable.
pub async fn create_client(
    secret_file: impl AsRef<Path>,
    token_file: &str,
    scope: &str,
) -> Result<AuthorizedClient> {
    let config = load_config(secret_file.as_ref(), scope)?;
    client_for(&config, token_file).await
}

/// Like [`create_client`], with the client secret given as raw JSON.
pub async fn create_client_from_json(
    secret_json: &[u8],
    token_file: &str,
    scope: &str,
) -> Result<AuthorizedClient> {
    let config = OAuthConfig::from_json(secret_json, scope)?;
    client_for(&config, token_file).await
}

async fn client_for(config: &OAuthConfig, token_file: &str) -> Result<AuthorizedClient> {
    ClientAssembler::new(
        CredentialStore::new(UserHome),
        InteractiveAuthorizer::stdio(SystemBrowser),
    )
    .client(config, token_file)
    .await
}
