//! Cached-or-interactive token resolution

use std::path::PathBuf;

use super::client::AuthorizedClient;
use crate::auth::{CredentialStore, HomeDirectoryProvider, TokenRecord, TokenSource};
use crate::config::OAuthConfig;
use crate::error::Result;

/// Builds an [`AuthorizedClient`] from the token cache, falling back to
/// a [`TokenSource`] when no usable token is cached.
pub struct ClientAssembler<H, S> {
    store: CredentialStore<H>,
    source: S,
    force: bool,
}

impl<H: HomeDirectoryProvider, S: TokenSource> ClientAssembler<H, S> {
    pub fn new(store: CredentialStore<H>, source: S) -> Self {
        Self {
            store,
            source,
            force: false,
        }
    }

    /// Ignore any cached token and always ask the source.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn store(&self) -> &CredentialStore<H> {
        &self.store
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Cached token for `token_file`, or a fresh one that has been saved.
    pub async fn resolve_token(
        &mut self,
        config: &OAuthConfig,
        token_file: &str,
    ) -> Result<(TokenRecord, PathBuf)> {
        let path = self.store.resolve_path(token_file)?;
        tracing::debug!("Token cache file: {}", path.display());

        if !self.force {
            match self.store.load(&path) {
                Ok(record) => {
                    tracing::info!("Using cached token from {}", path.display());
                    return Ok((record, path));
                }
                Err(e) if e.is_cache_fallback() => {
                    tracing::info!("No usable cached token ({}), starting authorization", e);
                }
                Err(e) => return Err(e),
            }
        }

        let record = self.source.obtain(config).await?;
        self.store.save(&path, &record)?;
        Ok((record, path))
    }

    /// Authenticated client for `token_file`.
    pub async fn client(
        &mut self,
        config: &OAuthConfig,
        token_file: &str,
    ) -> Result<AuthorizedClient> {
        let (record, _path) = self.resolve_token(config, token_file).await?;
        Ok(AuthorizedClient::new(config.clone(), record))
    }
}
