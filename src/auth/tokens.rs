//! Token record and its JSON encoding

use std::io::{Read, Write};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AuthError, Result};

/// Tokens are treated as expired this long before their real expiry.
const EXPIRY_SKEW_SECS: i64 = 10;

/// Unix timestamp of 0001-01-01T00:00:00Z, which Go writes for "no expiry".
const GO_ZERO_TIME_SECS: i64 = -62_135_596_800;

/// Cached OAuth2 token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    #[serde(default)]
    pub access_token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_expiry",
        skip_serializing_if = "Option::is_none"
    )]
    pub expiry: Option<DateTime<Utc>>,
}

impl TokenRecord {
    pub fn new(
        access_token: String,
        token_type: String,
        refresh_token: Option<String>,
        expires_in_secs: Option<u64>,
    ) -> Self {
        let expiry = expires_in_secs
            .and_then(|secs| i64::try_from(secs).ok())
            .map(|secs| Utc::now() + Duration::seconds(secs));

        Self {
            access_token,
            token_type,
            refresh_token,
            expiry,
        }
    }

    /// Token type used in the Authorization header, `Bearer` when unset.
    pub fn kind(&self) -> &str {
        if self.token_type.is_empty() {
            "Bearer"
        } else {
            &self.token_type
        }
    }

    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.kind(), self.access_token)
    }

    pub fn is_valid(&self) -> bool {
        !self.access_token.is_empty()
    }

    pub fn is_expired(&self) -> bool {
        match self.expiry {
            Some(exp) => Utc::now() + Duration::seconds(EXPIRY_SKEW_SECS) >= exp,
            None => false,
        }
    }
}

fn deserialize_expiry<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let expiry = Option::<DateTime<Utc>>::deserialize(deserializer)?;
    Ok(expiry.filter(|t| t.timestamp() != GO_ZERO_TIME_SECS || t.timestamp_subsec_nanos() != 0))
}

/// Decode a token record from a JSON byte stream.
pub fn decode<R: Read>(reader: R) -> Result<TokenRecord> {
    let record: TokenRecord =
        serde_json::from_reader(reader).map_err(|e| AuthError::MalformedRecord(e.to_string()))?;
    if !record.is_valid() {
        return Err(AuthError::MalformedRecord(
            "record has no access_token".to_string(),
        ));
    }
    Ok(record)
}

/// Encode a token record as a single JSON line.
pub fn encode<W: Write>(record: &TokenRecord, mut writer: W) -> Result<()> {
    serde_json::to_writer(&mut writer, record).map_err(AuthError::Encoding)?;
    writer
        .write_all(b"\n")
        .map_err(|e| AuthError::Encoding(serde_json::Error::io(e)))
}
