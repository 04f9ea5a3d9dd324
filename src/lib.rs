// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Logging Config Client
//!
//! Async client for the Cloud Logging configuration service (ConfigServiceV2):
//! log buckets, views, sinks, exclusions and CMEK settings over REST/JSON.
//!
//! ## Features
//!
//! - **Lazy pagination**: list calls return a [`pagination::Pager`] that walks
//!   remote pages on demand as a page or item stream
//! - **Credentials**: API key, access token, service-account self-signed JWT
//! - **Endpoint selection**: mutual TLS switches read from the environment
//! - **Per-method defaults**: retry and timeout tables, overridable per call
//! - **Resource names**: build and parse helpers for every resource path
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use logging_config::client::{CallOptions, ConfigServiceV2Client};
//!
//! #[tokio::main]
//! async fn main() -> logging_config::Result<()> {
//!     let client = ConfigServiceV2Client::new()?;
//!
//!     let pager = client
//!         .list_sinks(None, Some("projects/my-project"), CallOptions::new())
//!         .await?;
//!     let mut sinks = pager.items();
//!     while let Some(sink) = sinks.next().await {
//!         println!("{}", sink?.name);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   ConfigServiceV2Client                         │
//! │  flattened args → CallOptions → routing header → Pager          │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │  Config  │ Transport │     HTTP      │   Auth    │   Model     │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Options  │ Registry  │ Retry         │ API Key   │ Buckets     │
//! │ Env/mTLS │ REST      │ Deadline      │ Token     │ Views/Sinks │
//! │ Endpoint │           │ Rate Limit    │ JWT       │ Exclusions  │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)] // TODO: document the model request types before 1.0

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the client
pub mod error;

/// Common types and type aliases
pub mod types;

/// Lazy pagination over list calls
pub mod pagination;

/// Service resources, requests and responses
pub mod model;

/// Resource name templates
pub mod resource_names;

/// Client options and endpoint selection
pub mod config;

/// Credentials and request signing
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Transports carrying service calls
pub mod transport;

/// ConfigServiceV2 client
pub mod client;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use client::{CallOptions, ClientBuilder, ConfigServiceV2Client};
pub use config::{ClientInfo, ClientOptions};
pub use pagination::Pager;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
