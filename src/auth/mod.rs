//! Token acquisition and caching
//!
//! Tokens are cached as JSON under `~/.credentials`. When no usable
//! cached token exists, the operator is walked through the OAuth2
//! out-of-band authorization code flow.

pub mod browser;
pub mod oauth;
pub mod store;
pub mod tokens;

pub use browser::{BrowserLauncher, NoBrowser, SystemBrowser};
pub use oauth::{authorization_url, exchange, InteractiveAuthorizer, TokenSource, STATE_TOKEN};
pub use store::{CredentialStore, FixedHome, HomeDirectoryProvider, UserHome};
pub use tokens::TokenRecord;
