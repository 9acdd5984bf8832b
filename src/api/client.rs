//! Authenticated HTTP client
//!
//! Wraps reqwest::Client with token injection and refresh on expiry.

use tokio::sync::Mutex;

use crate::auth::{oauth, TokenRecord};
use crate::config::OAuthConfig;
use crate::error::{AuthError, Result};

/// HTTP client that signs every request with the cached OAuth2 token.
pub struct AuthorizedClient {
    http: reqwest::Client,
    config: OAuthConfig,
    token: Mutex<TokenRecord>,
}

impl AuthorizedClient {
    pub fn new(config: OAuthConfig, token: TokenRecord) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            token: Mutex::new(token),
        }
    }

    /// Current token, refreshed first if it has expired.
    ///
    /// Refreshed tokens live in memory only; the cache file keeps the
    /// token it was written with.
    pub async fn token(&self) -> Result<TokenRecord> {
        let mut token = self.token.lock().await;
        if token.is_expired() {
            let refresh_token = token.refresh_token.clone().ok_or_else(|| {
                AuthError::Refresh("token expired and refresh token is not set".to_string())
            })?;

            tracing::info!("Access token expired, refreshing...");
            *token = oauth::refresh(&self.config, &refresh_token).await?;
            tracing::info!("Token refreshed");
        }
        Ok(token.clone())
    }

    /// Request builder carrying the Authorization header.
    pub async fn request(&self, method: reqwest::Method, url: &str) -> Result<reqwest::RequestBuilder> {
        let token = self.token().await?;
        Ok(self
            .http
            .request(method, url)
            .header(reqwest::header::AUTHORIZATION, token.authorization_header()))
    }

    /// Authenticated GET.
    pub async fn get(&self, url: &str) -> Result<reqwest::Response> {
        tracing::debug!("GET {}", url);
        let resp = self.request(reqwest::Method::GET, url).await?.send().await?;
        check_response(resp, url).await
    }

    /// Authenticated POST with a JSON body.
    pub async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<reqwest::Response> {
        tracing::debug!("POST {}", url);
        let resp = self
            .request(reqwest::Method::POST, url)
            .await?
            .json(body)
            .send()
            .await?;
        check_response(resp, url).await
    }
}

/// Check HTTP response status code and return a clear error on failure.
async fn check_response(resp: reqwest::Response, url: &str) -> Result<reqwest::Response> {
    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(AuthError::Http(format!(
            "401 Unauthorized for {}. Token may be invalid -- run 'googleauth login --force'.",
            url
        )));
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(AuthError::Http(format!(
            "HTTP {} for {}: {}",
            status.as_u16(),
            url,
            body
        )));
    }
    Ok(resp)
}
