//! googleauth - cached OAuth2 credentials for Google APIs
//!
//! Reads a downloaded client secret, reuses the token cached under
//! `~/.credentials` when there is one, and otherwise walks the operator
//! through the consent page once and caches the result.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;

#[cfg(test)]
mod test_support;

pub use api::{create_client, create_client_from_json, AuthorizedClient, ClientAssembler};
pub use auth::{CredentialStore, InteractiveAuthorizer, TokenRecord, TokenSource};
pub use config::OAuthConfig;
pub use error::{AuthError, Result};
