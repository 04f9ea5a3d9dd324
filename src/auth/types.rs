//! Credential types

use crate::error::{Error, Result};
use crate::types::JsonValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Environment variable naming a service account key file
pub const ENV_APPLICATION_CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Service account key as downloaded from the console
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type")]
    pub key_type: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    /// RSA private key (PEM)
    pub private_key: String,
    pub client_email: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl ServiceAccountKey {
    fn validate(self) -> Result<Self> {
        if self.key_type != "service_account" {
            return Err(Error::auth(format!(
                "Unsupported credentials type '{}', expected 'service_account'",
                self.key_type
            )));
        }
        if self.client_email.is_empty() || self.private_key.is_empty() {
            return Err(Error::auth(
                "Service account info must contain client_email and private_key",
            ));
        }
        Ok(self)
    }
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// Credentials identifying the caller to the service
#[derive(Clone, Default)]
pub enum Credentials {
    /// No credentials; useful against emulators and mock servers
    #[default]
    Anonymous,

    /// API key sent as `x-goog-api-key`
    ApiKey { key: String },

    /// Pre-minted OAuth access token sent as a bearer token
    AccessToken { token: String },

    /// Service account key used to sign short-lived JWTs
    ServiceAccount(ServiceAccountKey),
}

impl Credentials {
    /// Build credentials from parsed service account JSON
    pub fn from_service_account_info(info: &JsonValue) -> Result<Self> {
        let key: ServiceAccountKey = serde_json::from_value(info.clone())
            .map_err(|e| Error::auth(format!("Invalid service account info: {e}")))?;
        Ok(Self::ServiceAccount(key.validate()?))
    }

    /// Build credentials from a service account key file
    pub fn from_service_account_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::Io(e)
            }
        })?;
        let info: JsonValue = serde_json::from_str(&content)?;
        Self::from_service_account_info(&info)
    }

    /// Credentials from `GOOGLE_APPLICATION_CREDENTIALS`, or anonymous
    pub fn application_default() -> Result<Self> {
        match std::env::var(ENV_APPLICATION_CREDENTIALS) {
            Ok(path) if !path.is_empty() => Self::from_service_account_file(path),
            _ => {
                debug!("{ENV_APPLICATION_CREDENTIALS} not set, using anonymous credentials");
                Ok(Self::Anonymous)
            }
        }
    }

    /// Short name of the credential kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::ApiKey { .. } => "api_key",
            Self::AccessToken { .. } => "access_token",
            Self::ServiceAccount(_) => "service_account",
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServiceAccount(key) => f.debug_tuple("ServiceAccount").field(key).finish(),
            other => write!(f, "Credentials::{}", other.kind()),
        }
    }
}

/// Cached token with expiration
#[derive(Debug, Clone)]
pub struct CachedToken {
    /// The access token
    pub token: String,
    /// When the token expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    /// Create a new cached token
    pub fn new(token: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { token, expires_at }
    }

    /// Create a token that expires in N seconds from now
    pub fn expires_in(token: String, seconds: i64) -> Self {
        let expires_at = Utc::now() + chrono::Duration::seconds(seconds);
        Self {
            token,
            expires_at: Some(expires_at),
        }
    }

    /// Check if the token is expired (with 30 second buffer)
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                let buffer = chrono::Duration::seconds(30);
                Utc::now() + buffer >= expires_at
            }
            None => false,
        }
    }
}
