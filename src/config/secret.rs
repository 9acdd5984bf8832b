//! Google client secret (`client_secret.json`) parsing

use oauth2::{basic::BasicClient, AuthType, AuthUrl, ClientId, ClientSecret, RedirectUrl, TokenUrl};
use serde::Deserialize;

use crate::error::{AuthError, Result};

/// Section of a downloaded client secret file
#[derive(Debug, Deserialize)]
struct ClientCredentials {
    client_id: String,
    #[serde(default)]
    client_secret: String,
    auth_uri: String,
    token_uri: String,
    #[serde(default)]
    redirect_uris: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    web: Option<ClientCredentials>,
    installed: Option<ClientCredentials>,
}

/// OAuth2 client configuration for one application identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub redirect_url: String,
    pub scopes: Vec<String>,
}

impl OAuthConfig {
    /// Parse a client secret blob, requesting `scope` (space-separated).
    pub fn from_json(bytes: &[u8], scope: &str) -> Result<Self> {
        let file: ClientSecretFile =
            serde_json::from_slice(bytes).map_err(|e| AuthError::ConfigParse(e.to_string()))?;

        let creds = file
            .web
            .or(file.installed)
            .ok_or_else(|| AuthError::ConfigParse("no credentials found".to_string()))?;

        let redirect_url = creds.redirect_uris.into_iter().next().ok_or_else(|| {
            AuthError::ConfigParse("missing redirect URL in the client secret".to_string())
        })?;

        let config = Self {
            client_id: creds.client_id,
            client_secret: creds.client_secret,
            auth_url: creds.auth_uri,
            token_url: creds.token_uri,
            redirect_url,
            scopes: scope.split_whitespace().map(String::from).collect(),
        };
        // Surface bad URLs here rather than at exchange time
        config.oauth_client()?;
        Ok(config)
    }

    /// Build the oauth2 client for this configuration
    pub fn oauth_client(&self) -> Result<BasicClient> {
        let invalid = |what: &str, e: oauth2::url::ParseError| {
            AuthError::ConfigParse(format!("invalid {}: {}", what, e))
        };

        let auth_url = AuthUrl::new(self.auth_url.clone()).map_err(|e| invalid("auth_uri", e))?;
        let token_url =
            TokenUrl::new(self.token_url.clone()).map_err(|e| invalid("token_uri", e))?;
        let redirect_url = RedirectUrl::new(self.redirect_url.clone())
            .map_err(|e| invalid("redirect_uri", e))?;

        let client_secret =
            (!self.client_secret.is_empty()).then(|| ClientSecret::new(self.client_secret.clone()));

        Ok(BasicClient::new(
            ClientId::new(self.client_id.clone()),
            client_secret,
            auth_url,
            Some(token_url),
        )
        .set_auth_type(AuthType::RequestBody)
        .set_redirect_uri(redirect_url))
    }
}
