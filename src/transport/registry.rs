//! Named transport factories

use super::{ConfigServiceV2Transport, RestTransport};
use crate::auth::Credentials;
use crate::config::{ClientCertSource, ClientInfo};
use crate::error::{Error, Result};
use crate::http::RateLimiterConfig;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Everything a factory needs to build a transport
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Host or base URL
    pub host: String,
    /// Explicit credentials; when unset, `credentials_file` and then the
    /// environment are consulted
    pub credentials: Option<Credentials>,
    pub credentials_file: Option<PathBuf>,
    /// Scopes embedded in self-signed tokens
    pub scopes: Option<Vec<String>>,
    pub quota_project_id: Option<String>,
    pub client_cert_source: Option<ClientCertSource>,
    pub client_info: ClientInfo,
    pub api_audience: Option<String>,
    pub rate_limit: Option<RateLimiterConfig>,
    pub timeout: Option<Duration>,
    pub connect_timeout: Duration,
}

impl TransportConfig {
    /// Minimal config for a host
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            credentials: None,
            credentials_file: None,
            scopes: None,
            quota_project_id: None,
            client_cert_source: None,
            client_info: ClientInfo::default(),
            api_audience: None,
            rate_limit: None,
            timeout: None,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Builds a transport from its config
pub type TransportFactory =
    Arc<dyn Fn(TransportConfig) -> Result<Arc<dyn ConfigServiceV2Transport>> + Send + Sync>;

/// Ordered table of transport factories; the first entry is the default
#[derive(Clone)]
pub struct TransportRegistry {
    entries: Vec<(String, TransportFactory)>,
}

impl TransportRegistry {
    /// Registry with no entries
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add or replace a factory; new names go to the end
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(TransportConfig) -> Result<Arc<dyn ConfigServiceV2Transport>> + Send + Sync + 'static,
    {
        let name = name.into();
        let factory: TransportFactory = Arc::new(factory);
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = factory,
            None => self.entries.push((name, factory)),
        }
        self
    }

    /// Registered names, default first
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Name of the default transport
    pub fn default_name(&self) -> Option<&str> {
        self.entries.first().map(|(n, _)| n.as_str())
    }

    /// Look up a factory by name, or the default when `name` is `None`
    pub fn get(&self, name: Option<&str>) -> Result<&TransportFactory> {
        let found = match name {
            Some(name) => self.entries.iter().find(|(n, _)| n == name),
            None => self.entries.first(),
        };
        found.map(|(_, f)| f).ok_or_else(|| Error::UnknownTransport {
            name: name.unwrap_or("<default>").to_string(),
            available: self.names().join(", "),
        })
    }

    /// Build a transport by name
    pub fn create(
        &self,
        name: Option<&str>,
        config: TransportConfig,
    ) -> Result<Arc<dyn ConfigServiceV2Transport>> {
        let factory = self.get(name)?;
        factory(config)
    }
}

impl Default for TransportRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("rest", |config| {
            let transport: Arc<dyn ConfigServiceV2Transport> = Arc::new(RestTransport::new(config)?);
            Ok(transport)
        });
        registry
    }
}

impl fmt::Debug for TransportRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportRegistry")
            .field("names", &self.names())
            .finish()
    }
}
