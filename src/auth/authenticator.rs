//! Authenticator implementation
//!
//! Handles applying credentials to requests and caching self-signed tokens.

use super::types::{CachedToken, Credentials, ServiceAccountKey};
use crate::error::{Error, Result};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::RequestBuilder;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Lifetime of a self-signed service account token
const TOKEN_LIFETIME_SECONDS: i64 = 3600;

/// Authenticator handles applying credentials to HTTP requests
#[derive(Debug)]
pub struct Authenticator {
    credentials: Credentials,
    /// `aud` claim of self-signed tokens
    audience: String,
    /// Scopes embedded in self-signed tokens, if any were requested
    scopes: Vec<String>,
    quota_project_id: Option<String>,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
}

impl Authenticator {
    /// Create an authenticator for the given credentials and audience
    pub fn new(credentials: Credentials, audience: impl Into<String>) -> Self {
        Self {
            credentials,
            audience: audience.into(),
            scopes: Vec::new(),
            quota_project_id: None,
            cached_token: Arc::new(RwLock::new(None)),
        }
    }

    /// Embed scopes in self-signed tokens
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Bill quota to the given project
    pub fn with_quota_project(mut self, quota_project_id: Option<String>) -> Self {
        self.quota_project_id = quota_project_id;
        self
    }

    /// Apply credentials to a request builder
    pub async fn apply(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        let req = match &self.credentials {
            Credentials::Anonymous => req,
            Credentials::ApiKey { key } => req.header("x-goog-api-key", key.as_str()),
            Credentials::AccessToken { token } => req.bearer_auth(token),
            Credentials::ServiceAccount(key) => {
                let token = self.get_or_refresh_token(key).await?;
                req.bearer_auth(token)
            }
        };

        Ok(match &self.quota_project_id {
            Some(project) => req.header("x-goog-user-project", project.as_str()),
            None => req,
        })
    }

    /// Get a valid token, signing a new one if necessary
    async fn get_or_refresh_token(&self, key: &ServiceAccountKey) -> Result<String> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if !token.is_expired() {
                    return Ok(token.token.clone());
                }
            }
        }

        let mut cached = self.cached_token.write().await;

        // Another task may have refreshed while we waited for the write lock
        if let Some(token) = cached.as_ref() {
            if !token.is_expired() {
                return Ok(token.token.clone());
            }
        }

        let new_token = self.sign_jwt(key)?;
        let token_str = new_token.token.clone();
        *cached = Some(new_token);

        Ok(token_str)
    }

    /// Sign a self-signed JWT usable directly as a bearer token
    fn sign_jwt(&self, key: &ServiceAccountKey) -> Result<CachedToken> {
        let now = Utc::now().timestamp();
        let claims = JwtClaims {
            iss: key.client_email.clone(),
            sub: key.client_email.clone(),
            aud: self.audience.clone(),
            scope: if self.scopes.is_empty() {
                None
            } else {
                Some(self.scopes.join(" "))
            },
            iat: now,
            exp: now + TOKEN_LIFETIME_SECONDS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid.clone_from(&key.private_key_id);

        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            Error::JwtGeneration {
                message: format!("Invalid private key: {e}"),
            }
        })?;

        let jwt = encode(&header, &claims, &encoding_key).map_err(|e| Error::JwtGeneration {
            message: format!("Failed to encode JWT: {e}"),
        })?;

        debug!(
            issuer = %key.client_email,
            audience = %self.audience,
            "Signed service account token"
        );
        Ok(CachedToken::expires_in(jwt, TOKEN_LIFETIME_SECONDS))
    }

    /// Clear the cached token (forces the next request to sign a new one)
    pub async fn clear_cache(&self) {
        let mut cached = self.cached_token.write().await;
        *cached = None;
    }

    /// Get the credentials in use
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Audience of self-signed tokens
    pub fn audience(&self) -> &str {
        &self.audience
    }
}

/// Self-signed JWT claims
#[derive(Debug, Serialize)]
struct JwtClaims {
    iss: String,
    sub: String,
    aud: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<String>,
    iat: i64,
    exp: i64,
}
