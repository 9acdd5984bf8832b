//! OAuth2 out-of-band authorization code flow

use std::io;

use async_trait::async_trait;
use oauth2::basic::{BasicErrorResponse, BasicTokenResponse, BasicTokenType};
use oauth2::reqwest::async_http_client;
use oauth2::url::Url;
use oauth2::{AuthorizationCode, CsrfToken, RefreshToken, RequestTokenError, Scope, TokenResponse};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};

use super::browser::BrowserLauncher;
use super::tokens::TokenRecord;
use crate::config::OAuthConfig;
use crate::error::{AuthError, Result};

/// State value sent with every consent request.
///
/// Constant across invocations. The out-of-band flow never hands it back,
/// so it offers no CSRF protection; it is only acceptable because this is
/// a single-user flow on the operator's own machine.
pub const STATE_TOKEN: &str = "state-token";

/// Something that can produce a fresh token for a configuration.
#[async_trait]
pub trait TokenSource: Send {
    async fn obtain(&mut self, config: &OAuthConfig) -> Result<TokenRecord>;
}

/// Consent page URL requesting offline access for the configured scopes.
pub fn authorization_url(config: &OAuthConfig) -> Result<Url> {
    let client = config.oauth_client()?;
    let (url, _state) = client
        .authorize_url(|| CsrfToken::new(STATE_TOKEN.to_string()))
        .add_scopes(config.scopes.iter().cloned().map(Scope::new))
        .add_extra_param("access_type", "offline")
        .url();
    Ok(url)
}

/// Exchange an authorization code for a token. Single attempt.
pub async fn exchange(config: &OAuthConfig, code: &str) -> Result<TokenRecord> {
    let client = config.oauth_client()?;

    let token_response = client
        .exchange_code(AuthorizationCode::new(code.to_string()))
        .request_async(async_http_client)
        .await
        .map_err(|e| AuthError::Exchange(describe_token_error(&e)))?;

    Ok(record_from_response(&token_response))
}

/// Use a refresh token to obtain a new access token.
pub(crate) async fn refresh(config: &OAuthConfig, refresh_token: &str) -> Result<TokenRecord> {
    let client = config.oauth_client()?;

    let token_response = client
        .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
        .request_async(async_http_client)
        .await
        .map_err(|e| AuthError::Refresh(describe_token_error(&e)))?;

    let mut record = record_from_response(&token_response);
    if record.refresh_token.is_none() {
        record.refresh_token = Some(refresh_token.to_string());
    }
    Ok(record)
}

fn record_from_response(token_response: &BasicTokenResponse) -> TokenRecord {
    let token_type = match token_response.token_type() {
        BasicTokenType::Bearer => "Bearer".to_string(),
        BasicTokenType::Mac => "MAC".to_string(),
        BasicTokenType::Extension(ext) => ext.clone(),
    };

    TokenRecord::new(
        token_response.access_token().secret().to_string(),
        token_type,
        token_response
            .refresh_token()
            .map(|rt| rt.secret().to_string()),
        token_response.expires_in().map(|d| d.as_secs()),
    )
}

fn describe_token_error(
    err: &RequestTokenError<oauth2::reqwest::Error<reqwest::Error>, BasicErrorResponse>,
) -> String {
    match err {
        RequestTokenError::ServerResponse(resp) => format!("server returned {}", resp),
        RequestTokenError::Request(e) => format!("request failed: {}", e),
        RequestTokenError::Parse(e, _) => format!("unexpected token response: {}", e),
        RequestTokenError::Other(msg) => msg.clone(),
    }
}

/// Drives the operator through the consent page and reads back the code.
pub struct InteractiveAuthorizer<R, W, B> {
    input: R,
    output: W,
    browser: B,
}

impl<B: BrowserLauncher> InteractiveAuthorizer<BufReader<Stdin>, Stdout, B> {
    /// Prompt on stdout, read the code from stdin.
    pub fn stdio(browser: B) -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), browser)
    }
}

impl<R, W, B> InteractiveAuthorizer<R, W, B>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
    B: BrowserLauncher,
{
    pub fn new(input: R, output: W, browser: B) -> Self {
        Self {
            input,
            output,
            browser,
        }
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    /// Show the consent URL and try to open it in a browser.
    ///
    /// The URL is always written first; a browser that fails to launch
    /// only adds a hint to copy it by hand.
    pub async fn present(&mut self, url: &Url) -> Result<()> {
        let prompt = format!(
            "Go to the following link in your browser then type the authorization code:\n{}\n",
            url
        );
        self.write(prompt.as_bytes()).await?;

        match self.browser.open(url.as_str()) {
            Ok(()) => tracing::debug!("Opened consent page in browser"),
            Err(e) => {
                tracing::warn!("Could not open browser: {}", e);
                self.write(b"(Could not open a browser; copy the link above manually.)\n")
                    .await?;
            }
        }
        Ok(())
    }

    /// Read the first whitespace-delimited token the operator enters.
    pub async fn read_code(&mut self) -> Result<String> {
        let mut line = String::new();
        loop {
            line.clear();
            let n = self
                .input
                .read_line(&mut line)
                .await
                .map_err(AuthError::Input)?;
            if n == 0 {
                return Err(AuthError::Input(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "input closed before an authorization code was entered",
                )));
            }
            if let Some(code) = line.split_whitespace().next() {
                return Ok(code.to_string());
            }
        }
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.output.write_all(bytes).await.map_err(AuthError::Input)?;
        self.output.flush().await.map_err(AuthError::Input)
    }
}

#[async_trait]
impl<R, W, B> TokenSource for InteractiveAuthorizer<R, W, B>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
    B: BrowserLauncher,
{
    async fn obtain(&mut self, config: &OAuthConfig) -> Result<TokenRecord> {
        let url = authorization_url(config)?;
        tracing::debug!("Authorization URL: {}", url);
        self.present(&url).await?;

        let code = self.read_code().await?;
        tracing::info!("Exchanging authorization code for token...");
        exchange(config, &code).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, RecordingBrowser};
    use std::collections::HashMap;

    fn config(token_url: &str) -> OAuthConfig {
        OAuthConfig {
            client_id: "client-123".to_string(),
            client_secret: "shh".to_string(),
            auth_url: "https://accounts.example.com/o/oauth2/auth".to_string(),
            token_url: token_url.to_string(),
            redirect_url: "urn:ietf:wg:oauth:2.0:oob".to_string(),
            scopes: vec!["scope.a".to_string(), "scope.b".to_string()],
        }
    }

    #[test]
    fn test_authorization_url_requests_offline_access() {
        let url = authorization_url(&config("https://accounts.example.com/token")).unwrap();
        let query: HashMap<String, String> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("accounts.example.com"));
        assert_eq!(query["access_type"], "offline");
        assert_eq!(query["state"], STATE_TOKEN);
        assert_eq!(query["response_type"], "code");
        assert_eq!(query["client_id"], "client-123");
        assert_eq!(query["redirect_uri"], "urn:ietf:wg:oauth:2.0:oob");
        assert_eq!(query["scope"], "scope.a scope.b");
    }

    #[tokio::test]
    async fn test_present_with_failing_browser() {
        let browser = RecordingBrowser::failing();
        let mut authorizer = InteractiveAuthorizer::new(&b""[..], Vec::new(), browser.clone());
        let url = Url::parse("https://accounts.example.com/auth?x=1").unwrap();

        authorizer.present(&url).await.unwrap();

        let shown = String::from_utf8(authorizer.output().clone()).unwrap();
        assert!(shown.contains("https://accounts.example.com/auth?x=1"));
        assert!(shown.contains("copy the link"));
        assert_eq!(browser.opened(), vec!["https://accounts.example.com/auth?x=1"]);
    }

    #[tokio::test]
    async fn test_present_with_working_browser() {
        let browser = RecordingBrowser::working();
        let mut authorizer = InteractiveAuthorizer::new(&b""[..], Vec::new(), browser.clone());
        let url = Url::parse("https://accounts.example.com/auth").unwrap();

        authorizer.present(&url).await.unwrap();

        let shown = String::from_utf8(authorizer.output().clone()).unwrap();
        assert!(shown.contains("https://accounts.example.com/auth"));
        assert!(!shown.contains("copy the link"));
        assert_eq!(browser.opened().len(), 1);
    }

    #[tokio::test]
    async fn test_read_code_skips_blank_lines() {
        let input = tokio_test::io::Builder::new()
            .read(b"\n   \n")
            .read(b"  4/0AbCd-code  trailing\n")
            .build();
        let mut authorizer =
            InteractiveAuthorizer::new(BufReader::new(input), Vec::new(), RecordingBrowser::working());

        assert_eq!(authorizer.read_code().await.unwrap(), "4/0AbCd-code");
    }

    #[tokio::test]
    async fn test_read_code_on_closed_input() {
        let mut authorizer =
            InteractiveAuthorizer::new(&b"\n"[..], Vec::new(), RecordingBrowser::working());

        let err = authorizer.read_code().await.unwrap_err();
        assert!(matches!(err, AuthError::Input(_)));
    }

    #[tokio::test]
    async fn test_exchange_success() {
        let server = test_support::serve(vec![(
            200,
            r#"{"access_token":"ya29.new","token_type":"Bearer","expires_in":3599,"refresh_token":"1//new"}"#
                .to_string(),
        )])
        .await;

        let record = exchange(&config(&server.url("/token")), "4/code").await.unwrap();
        assert_eq!(record.access_token, "ya29.new");
        assert_eq!(record.kind(), "Bearer");
        assert_eq!(record.refresh_token.as_deref(), Some("1//new"));
        assert!(record.expiry.is_some());
        assert!(!record.is_expired());

        let requests = server.finish().await;
        assert_eq!(requests.len(), 1);
        assert!(requests[0].starts_with("POST /token"));
        assert!(requests[0].contains("grant_type=authorization_code"));
        assert!(requests[0].contains("code=4%2Fcode"));
    }

    #[tokio::test]
    async fn test_exchange_error_response() {
        let server = test_support::serve(vec![(
            400,
            r#"{"error":"invalid_grant","error_description":"Malformed auth code."}"#.to_string(),
        )])
        .await;

        let err = exchange(&config(&server.url("/token")), "bogus")
            .await
            .unwrap_err();
        match err {
            AuthError::Exchange(msg) => assert!(msg.contains("invalid_grant"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
        server.finish().await;
    }

    #[tokio::test]
    async fn test_obtain_survives_browser_failure() {
        let server = test_support::serve(vec![(
            200,
            r#"{"access_token":"ya29.flow","token_type":"Bearer","expires_in":3600}"#.to_string(),
        )])
        .await;
        let browser = RecordingBrowser::failing();
        let mut authorizer =
            InteractiveAuthorizer::new(&b"4/typed-code\n"[..], Vec::new(), browser.clone());

        let record = authorizer
            .obtain(&config(&server.url("/token")))
            .await
            .unwrap();
        assert_eq!(record.access_token, "ya29.flow");
        assert!(record.refresh_token.is_none());

        let shown = String::from_utf8(authorizer.output().clone()).unwrap();
        assert!(shown.contains("access_type=offline"));
        assert_eq!(browser.opened().len(), 1);

        let requests = server.finish().await;
        assert!(requests[0].contains("code=4%2Ftyped-code"));
    }

    #[tokio::test]
    async fn test_refresh_keeps_refresh_token() {
        let server = test_support::serve(vec![(
            200,
            r#"{"access_token":"ya29.fresh","token_type":"Bearer","expires_in":3600}"#.to_string(),
        )])
        .await;

        let record = refresh(&config(&server.url("/token")), "1//keep")
            .await
            .unwrap();
        assert_eq!(record.access_token, "ya29.fresh");
        assert_eq!(record.refresh_token.as_deref(), Some("1//keep"));

        let requests = server.finish().await;
        assert!(requests[0].contains("grant_type=refresh_token"));
    }
}
