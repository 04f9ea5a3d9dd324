//! Authentication module
//!
//! Supports: anonymous access, API keys, static access tokens and service
//! account keys (self-signed JWTs).
//!
//! The `Authenticator` applies credentials to outgoing requests and caches
//! signed tokens until shortly before they expire.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{CachedToken, Credentials, ServiceAccountKey, ENV_APPLICATION_CREDENTIALS};
