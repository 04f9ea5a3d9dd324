//! Client configuration
//!
//! Options that shape how a client is built: endpoint, credentials source,
//! scopes, quota project, mutual TLS and rate limiting. Options can be built
//! in code or loaded from YAML; the mutual TLS switches come from the
//! environment.

use crate::error::{Error, Result};
use crate::http::RateLimiterConfig;
use crate::types::Metadata;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

/// Default service host
pub const DEFAULT_ENDPOINT: &str = "logging.googleapis.com";

/// Default service host when mutual TLS is in use
pub const DEFAULT_MTLS_ENDPOINT: &str = "logging.mtls.googleapis.com";

/// OAuth scopes requested when none are configured
pub const DEFAULT_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/cloud-platform",
    "https://www.googleapis.com/auth/cloud-platform.read-only",
    "https://www.googleapis.com/auth/logging.admin",
    "https://www.googleapis.com/auth/logging.read",
];

/// Environment switch enabling client certificates
pub const ENV_USE_CLIENT_CERTIFICATE: &str = "GOOGLE_API_USE_CLIENT_CERTIFICATE";

/// Environment switch choosing the mutual TLS endpoint
pub const ENV_USE_MTLS_ENDPOINT: &str = "GOOGLE_API_USE_MTLS_ENDPOINT";

static MTLS_ENDPOINT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>[^.]+)(?P<mtls>\.mtls)?(?P<sandbox>\.sandbox)?(?P<googledomain>\.googleapis\.com)?")
        .unwrap()
});

// ============================================================================
// Client Certificate Source
// ============================================================================

type CertLoader = dyn Fn() -> Result<(Vec<u8>, Vec<u8>)> + Send + Sync;

/// Callback producing a PEM client certificate and private key
#[derive(Clone)]
pub struct ClientCertSource(Arc<CertLoader>);

impl ClientCertSource {
    /// Wrap a loader callback
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Result<(Vec<u8>, Vec<u8>)> + Send + Sync + 'static,
    {
        Self(Arc::new(loader))
    }

    /// Read the certificate and key from PEM files on each load
    pub fn from_files(cert: impl Into<PathBuf>, key: impl Into<PathBuf>) -> Self {
        let cert = cert.into();
        let key = key.into();
        Self::new(move || Ok((read_file(&cert)?, read_file(&key)?)))
    }

    /// Produce `(certificate, key)` bytes
    pub fn load(&self) -> Result<(Vec<u8>, Vec<u8>)> {
        (self.0)()
    }
}

impl fmt::Debug for ClientCertSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClientCertSource(..)")
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::Io(e)
        }
    })
}

// ============================================================================
// Client Options
// ============================================================================

/// User-supplied client options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    /// Host (optionally `host:port` or a full `http(s)://` base URL) overriding
    /// the default endpoint
    pub api_endpoint: Option<String>,

    /// Programmatic certificate source; takes precedence over the file pair
    #[serde(skip)]
    pub client_cert_source: Option<ClientCertSource>,

    /// PEM client certificate used when no certificate source is set
    pub client_cert_file: Option<PathBuf>,

    /// PEM private key paired with `client_cert_file`
    pub client_key_file: Option<PathBuf>,

    /// Service account key file
    pub credentials_file: Option<PathBuf>,

    /// OAuth scopes; [`DEFAULT_SCOPES`] when unset
    pub scopes: Option<Vec<String>>,

    /// Project billed for quota
    pub quota_project_id: Option<String>,

    /// API key; mutually exclusive with explicit credentials
    pub api_key: Option<String>,

    /// Audience for self-signed JWTs; defaults to the endpoint URL
    pub api_audience: Option<String>,

    /// Client-side request rate limit
    pub rate_limit: Option<RateLimiterConfig>,

    /// Fallback timeout for methods with no default timeout
    pub timeout_seconds: Option<u64>,

    /// TCP connect timeout
    pub connect_timeout_seconds: u64,
}

fn default_connect_timeout() -> u64 {
    10
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_endpoint: None,
            client_cert_source: None,
            client_cert_file: None,
            client_key_file: None,
            credentials_file: None,
            scopes: None,
            quota_project_id: None,
            api_key: None,
            api_audience: None,
            rate_limit: None,
            timeout_seconds: None,
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

impl ClientOptions {
    /// Parse options from YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let options: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse client options YAML: {e}")))?;
        options.validate()?;
        Ok(options)
    }

    /// Set the endpoint override
    pub fn with_api_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.api_endpoint = Some(endpoint.into());
        self
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the certificate source
    pub fn with_client_cert_source(mut self, source: ClientCertSource) -> Self {
        self.client_cert_source = Some(source);
        self
    }

    /// Certificate source from either the callback or the file pair
    pub fn cert_source(&self) -> Option<ClientCertSource> {
        if let Some(source) = &self.client_cert_source {
            return Some(source.clone());
        }
        match (&self.client_cert_file, &self.client_key_file) {
            (Some(cert), Some(key)) => Some(ClientCertSource::from_files(cert, key)),
            _ => None,
        }
    }

    /// Scopes to request
    pub fn effective_scopes(&self) -> Vec<String> {
        match &self.scopes {
            Some(scopes) if !scopes.is_empty() => scopes.clone(),
            _ => DEFAULT_SCOPES.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.client_cert_file.is_some() != self.client_key_file.is_some() {
            return Err(Error::config(
                "client_cert_file and client_key_file must be set together",
            ));
        }
        if matches!(&self.api_endpoint, Some(e) if e.trim().is_empty()) {
            return Err(Error::config("api_endpoint cannot be empty"));
        }
        Ok(())
    }
}

/// Load client options from a YAML file
pub fn load_client_options(path: impl AsRef<Path>) -> Result<ClientOptions> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::config(format!(
                "Failed to read client options '{}': {}",
                path.display(),
                e
            ))
        }
    })?;
    ClientOptions::from_yaml_str(&content)
}

// ============================================================================
// Mutual TLS Environment
// ============================================================================

/// When to use the mutual TLS endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MtlsEndpointMode {
    /// Use it only when a client certificate is available
    #[default]
    Auto,
    Never,
    Always,
}

impl FromStr for MtlsEndpointMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(Self::Auto),
            "never" => Ok(Self::Never),
            "always" => Ok(Self::Always),
            _ => Err(Error::mutual_tls(format!(
                "Environment variable `{ENV_USE_MTLS_ENDPOINT}` must be `never`, `auto` or `always`"
            ))),
        }
    }
}

/// Mutual TLS switches read from the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnvSettings {
    pub use_client_certificate: bool,
    pub use_mtls_endpoint: MtlsEndpointMode,
}

impl EnvSettings {
    /// Read both switches from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_values(
            std::env::var(ENV_USE_CLIENT_CERTIFICATE).ok().as_deref(),
            std::env::var(ENV_USE_MTLS_ENDPOINT).ok().as_deref(),
        )
    }

    /// Validate raw switch values; unset means `false` and `auto`
    pub fn from_values(
        use_client_certificate: Option<&str>,
        use_mtls_endpoint: Option<&str>,
    ) -> Result<Self> {
        let use_client_certificate = match use_client_certificate.unwrap_or("false") {
            "true" => true,
            "false" => false,
            _ => {
                return Err(Error::invalid_argument(format!(
                    "Environment variable `{ENV_USE_CLIENT_CERTIFICATE}` must be either `true` or `false`"
                )))
            }
        };
        let use_mtls_endpoint = use_mtls_endpoint.unwrap_or("auto").parse()?;

        Ok(Self {
            use_client_certificate,
            use_mtls_endpoint,
        })
    }
}

/// Outcome of endpoint resolution
#[derive(Debug, Clone)]
pub struct ResolvedEndpoint {
    pub endpoint: String,
    pub cert_source: Option<ClientCertSource>,
}

/// Pick the endpoint and client certificate source
///
/// The certificate source is only honoured when client certificates are
/// enabled. An explicit `api_endpoint` always wins; otherwise the mutual TLS
/// endpoint is used for `always`, or for `auto` when a certificate is present.
pub fn resolve_endpoint(options: &ClientOptions, env: &EnvSettings) -> ResolvedEndpoint {
    let cert_source = if env.use_client_certificate {
        options.cert_source()
    } else {
        None
    };

    let endpoint = match &options.api_endpoint {
        Some(endpoint) => endpoint.clone(),
        None => match env.use_mtls_endpoint {
            MtlsEndpointMode::Always => DEFAULT_MTLS_ENDPOINT.to_string(),
            MtlsEndpointMode::Auto if cert_source.is_some() => DEFAULT_MTLS_ENDPOINT.to_string(),
            _ => DEFAULT_ENDPOINT.to_string(),
        },
    };

    ResolvedEndpoint {
        endpoint,
        cert_source,
    }
}

/// Rewrite a Google API host to its mutual TLS variant
///
/// `*.googleapis.com` becomes `*.mtls.googleapis.com` and
/// `*.sandbox.googleapis.com` becomes `*.mtls.sandbox.googleapis.com`; other
/// hosts, hosts already on mTLS and the empty string pass through unchanged.
pub fn default_mtls_endpoint(api_endpoint: &str) -> String {
    if api_endpoint.is_empty() {
        return String::new();
    }
    let Some(caps) = MTLS_ENDPOINT_REGEX.captures(api_endpoint) else {
        return api_endpoint.to_string();
    };
    if caps.name("mtls").is_some() || caps.name("googledomain").is_none() {
        return api_endpoint.to_string();
    }
    if caps.name("sandbox").is_some() {
        return api_endpoint.replace("sandbox.googleapis.com", "mtls.sandbox.googleapis.com");
    }
    api_endpoint.replace(".googleapis.com", ".mtls.googleapis.com")
}

// ============================================================================
// Client Info
// ============================================================================

/// Library identification sent with every request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub client_library_version: String,
    /// Extra product token prepended to the user agent
    pub user_agent: Option<String>,
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self {
            client_library_version: env!("CARGO_PKG_VERSION").to_string(),
            user_agent: None,
        }
    }
}

impl ClientInfo {
    /// Value of the `user-agent` header
    pub fn to_user_agent(&self) -> String {
        let base = format!("{}/{}", env!("CARGO_PKG_NAME"), self.client_library_version);
        match &self.user_agent {
            Some(prefix) => format!("{prefix} {base}"),
            None => base,
        }
    }

    /// Value of the `x-goog-api-client` header
    pub fn to_api_client_header(&self) -> String {
        format!("gl-rust gapic/{} rest", self.client_library_version)
    }

    /// Both identification headers
    pub fn headers(&self) -> Metadata {
        vec![
            ("user-agent".to_string(), self.to_user_agent()),
            ("x-goog-api-client".to_string(), self.to_api_client_header()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use test_case::test_case;

    #[test_case("" => ""; "empty")]
    #[test_case("example.googleapis.com" => "example.mtls.googleapis.com"; "api")]
    #[test_case("example.mtls.googleapis.com" => "example.mtls.googleapis.com"; "already mtls")]
    #[test_case("example.sandbox.googleapis.com" => "example.mtls.sandbox.googleapis.com"; "sandbox")]
    #[test_case("example.mtls.sandbox.googleapis.com" => "example.mtls.sandbox.googleapis.com"; "sandbox mtls")]
    #[test_case("api.example.com" => "api.example.com"; "non google")]
    fn test_default_mtls_endpoint(endpoint: &str) -> String {
        default_mtls_endpoint(endpoint)
    }

    #[test]
    fn test_default_mtls_constant_matches_rewrite() {
        assert_eq!(default_mtls_endpoint(DEFAULT_ENDPOINT), DEFAULT_MTLS_ENDPOINT);
    }

    #[test]
    fn test_env_settings_defaults() {
        let env = EnvSettings::from_values(None, None).unwrap();
        assert!(!env.use_client_certificate);
        assert_eq!(env.use_mtls_endpoint, MtlsEndpointMode::Auto);
    }

    #[test]
    fn test_env_settings_invalid_certificate_flag() {
        let err = EnvSettings::from_values(Some("Unsupported"), None).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[test]
    fn test_env_settings_invalid_endpoint_mode() {
        let err = EnvSettings::from_values(None, Some("Unsupported")).unwrap_err();
        assert!(matches!(err, Error::MutualTls { .. }));
    }

    fn cert_source() -> ClientCertSource {
        ClientCertSource::new(|| Ok((b"cert".to_vec(), b"key".to_vec())))
    }

    fn env(cert: &str, mode: &str) -> EnvSettings {
        EnvSettings::from_values(Some(cert), Some(mode)).unwrap()
    }

    #[test]
    fn test_resolve_explicit_endpoint_wins() {
        let options = ClientOptions::default().with_api_endpoint("squid.clam.whelk");
        let resolved = resolve_endpoint(&options, &env("false", "always"));
        assert_eq!(resolved.endpoint, "squid.clam.whelk");
        assert!(resolved.cert_source.is_none());
    }

    #[test_case("false", "auto", false => DEFAULT_ENDPOINT; "auto without cert")]
    #[test_case("true", "auto", true => DEFAULT_MTLS_ENDPOINT; "auto with cert")]
    #[test_case("false", "auto", true => DEFAULT_ENDPOINT; "cert ignored when disabled")]
    #[test_case("true", "never", true => DEFAULT_ENDPOINT; "never")]
    #[test_case("false", "always", false => DEFAULT_MTLS_ENDPOINT; "always")]
    fn test_resolve_endpoint(cert_flag: &str, mode: &str, with_cert: bool) -> &'static str {
        let mut options = ClientOptions::default();
        if with_cert {
            options = options.with_client_cert_source(cert_source());
        }
        let resolved = resolve_endpoint(&options, &env(cert_flag, mode));
        assert_eq!(resolved.cert_source.is_some(), cert_flag == "true" && with_cert);
        if resolved.endpoint == DEFAULT_MTLS_ENDPOINT {
            DEFAULT_MTLS_ENDPOINT
        } else {
            DEFAULT_ENDPOINT
        }
    }

    #[test]
    fn test_cert_source_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let cert = dir.path().join("cert.pem");
        let key = dir.path().join("key.pem");
        fs::File::create(&cert).unwrap().write_all(b"CERT").unwrap();
        fs::File::create(&key).unwrap().write_all(b"KEY").unwrap();

        let source = ClientCertSource::from_files(&cert, &key);
        assert_eq!(source.load().unwrap(), (b"CERT".to_vec(), b"KEY".to_vec()));

        let missing = ClientCertSource::from_files(dir.path().join("nope"), &key);
        assert!(matches!(missing.load(), Err(Error::FileNotFound { .. })));
    }

    #[test]
    fn test_options_from_yaml() {
        let yaml = r#"
api_endpoint: localhost:8080
scopes:
  - https://www.googleapis.com/auth/logging.read
quota_project_id: billing-project
rate_limit:
  requests_per_second: 5
  burst_size: 2
"#;
        let options = ClientOptions::from_yaml_str(yaml).unwrap();
        assert_eq!(options.api_endpoint.as_deref(), Some("localhost:8080"));
        assert_eq!(
            options.effective_scopes(),
            vec!["https://www.googleapis.com/auth/logging.read"]
        );
        assert_eq!(options.quota_project_id.as_deref(), Some("billing-project"));
        assert_eq!(options.rate_limit.map(|r| r.requests_per_second), Some(5));
        assert_eq!(options.connect_timeout_seconds, 10);
    }

    #[test]
    fn test_options_yaml_rejects_half_cert_pair() {
        let err = ClientOptions::from_yaml_str("client_cert_file: cert.pem\n").unwrap_err();
        assert!(err.to_string().contains("must be set together"));
    }

    #[test]
    fn test_load_client_options_missing_file() {
        let err = load_client_options("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_load_client_options_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_key: abc123").unwrap();

        let options = load_client_options(file.path()).unwrap();
        assert_eq!(options.api_key.as_deref(), Some("abc123"));
        assert_eq!(options.effective_scopes().len(), DEFAULT_SCOPES.len());
    }

    #[test]
    fn test_client_info_headers() {
        let info = ClientInfo {
            client_library_version: "1.2.3".to_string(),
            user_agent: Some("my-tool/0.1".to_string()),
        };
        let headers = info.headers();
        assert_eq!(headers[0].0, "user-agent");
        assert!(headers[0].1.starts_with("my-tool/0.1 "));
        assert!(headers[0].1.ends_with("/1.2.3"));
        assert_eq!(
            headers[1],
            (
                "x-goog-api-client".to_string(),
                "gl-rust gapic/1.2.3 rest".to_string()
            )
        );
    }
}
