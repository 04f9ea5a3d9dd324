//! Error types for the logging config client
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for the logging config client
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Caller / Configuration Errors
    // ============================================================================
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Mutual TLS channel error: {message}")]
    MutualTls { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("JWT generation failed: {message}")]
    JwtGeneration { message: String },

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("Unknown transport '{name}', available: {available}")]
    UnknownTransport { name: String, available: String },

    #[error("Transport is closed")]
    TransportClosed,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Retry deadline of {deadline_ms}ms exceeded, last error: {source}")]
    RetryExhausted {
        deadline_ms: u64,
        #[source]
        source: Box<Error>,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // API Errors
    // ============================================================================
    #[error("{status} ({code}): {message}")]
    Api {
        code: u16,
        status: String,
        message: String,
    },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

/// Status classes a retry policy can opt into
///
/// Named after the RPC status codes they stand for; HTTP responses and
/// transport failures are folded onto them by [`Error::retry_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetryCode {
    /// The deadline expired before the operation could complete (504, client timeout)
    DeadlineExceeded,
    /// Internal server error (500)
    Internal,
    /// The service is currently unavailable (502, 503, connect failure)
    Unavailable,
    /// Quota or rate limit exhausted (429)
    ResourceExhausted,
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a mutual TLS error
    pub fn mutual_tls(message: impl Into<String>) -> Self {
        Self::MutualTls {
            message: message.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create an API error from the Google error envelope fields
    pub fn api(code: u16, status: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            code,
            status: status.into(),
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// HTTP status code carried by this error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            Error::Api { code, .. } => Some(*code),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            Error::RetryExhausted { source, .. } => source.status_code(),
            _ => None,
        }
    }

    /// Classify this error for retry decisions
    pub fn retry_code(&self) -> Option<RetryCode> {
        match self {
            Error::Timeout { .. } => Some(RetryCode::DeadlineExceeded),
            Error::Http(e) if e.is_timeout() => Some(RetryCode::DeadlineExceeded),
            Error::Http(e) if e.is_connect() => Some(RetryCode::Unavailable),
            Error::HttpStatus { status, .. } | Error::Api { code: status, .. } => {
                retry_code_for_status(*status)
            }
            _ => None,
        }
    }
}

/// Map an HTTP status onto a retry class
fn retry_code_for_status(status: u16) -> Option<RetryCode> {
    match status {
        429 => Some(RetryCode::ResourceExhausted),
        500 => Some(RetryCode::Internal),
        502 | 503 => Some(RetryCode::Unavailable),
        504 => Some(RetryCode::DeadlineExceeded),
        _ => None,
    }
}

/// Result type alias for the logging config client
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
