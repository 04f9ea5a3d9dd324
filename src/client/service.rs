//! ConfigServiceV2 client

use super::options::{CallOptions, Rpc};
use crate::auth::Credentials;
use crate::config::{resolve_endpoint, ClientInfo, ClientOptions, EnvSettings};
use crate::error::{Error, Result};
use crate::model::{
    CmekSettings, CreateBucketRequest, CreateExclusionRequest, CreateSinkRequest,
    CreateViewRequest, DeleteBucketRequest, DeleteExclusionRequest, DeleteSinkRequest,
    DeleteViewRequest, FieldMask, GetBucketRequest, GetCmekSettingsRequest, GetExclusionRequest,
    GetSinkRequest, GetViewRequest, ListBucketsRequest, ListBucketsResponse,
    ListExclusionsRequest, ListExclusionsResponse, ListSinksRequest, ListSinksResponse,
    ListViewsRequest, ListViewsResponse, LogBucket, LogExclusion, LogSink, LogView,
    UndeleteBucketRequest, UpdateBucketRequest, UpdateCmekSettingsRequest,
    UpdateExclusionRequest, UpdateSinkRequest, UpdateViewRequest,
};
use crate::pagination::Pager;
use crate::transport::{
    CallSettings, ConfigServiceV2Transport, TransportConfig, TransportRegistry,
};
use crate::types::JsonValue;
use std::fmt;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub type ListBucketsPager = Pager<ListBucketsRequest, ListBucketsResponse>;
pub type ListViewsPager = Pager<ListViewsRequest, ListViewsResponse>;
pub type ListSinksPager = Pager<ListSinksRequest, ListSinksResponse>;
pub type ListExclusionsPager = Pager<ListExclusionsRequest, ListExclusionsResponse>;

// ============================================================================
// Builder
// ============================================================================

/// Which transport a client should use
#[derive(Debug, Clone, Default)]
pub enum TransportSelection {
    /// First entry of the registry
    #[default]
    Default,
    /// Registry entry by name
    Named(String),
    /// Ready-made transport; the client shares it and never closes it
    Instance(Arc<dyn ConfigServiceV2Transport>),
}

/// Builder for [`ConfigServiceV2Client`]
#[derive(Debug, Default)]
pub struct ClientBuilder {
    credentials: Option<Credentials>,
    transport: TransportSelection,
    options: ClientOptions,
    client_info: ClientInfo,
    env: Option<EnvSettings>,
    registry: Option<TransportRegistry>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit credentials
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Use a registered transport by name
    pub fn transport_name(mut self, name: impl Into<String>) -> Self {
        self.transport = TransportSelection::Named(name.into());
        self
    }

    /// Use an existing transport instance
    pub fn transport(mut self, transport: Arc<dyn ConfigServiceV2Transport>) -> Self {
        self.transport = TransportSelection::Instance(transport);
        self
    }

    pub fn client_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    pub fn client_info(mut self, client_info: ClientInfo) -> Self {
        self.client_info = client_info;
        self
    }

    /// Mutual TLS switches; read from the environment when unset
    pub fn env_settings(mut self, env: EnvSettings) -> Self {
        self.env = Some(env);
        self
    }

    /// Registry to resolve transport names against
    pub fn registry(mut self, registry: TransportRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Validate the combination of inputs and build the client
    pub fn build(self) -> Result<ConfigServiceV2Client> {
        let env = match self.env {
            Some(env) => env,
            None => EnvSettings::from_env()?,
        };
        let resolved = resolve_endpoint(&self.options, &env);

        let options = self.options;
        if options.api_key.is_some() && self.credentials.is_some() {
            return Err(Error::invalid_argument(
                "client_options.api_key and credentials are mutually exclusive",
            ));
        }

        let (transport, owns_transport) = match self.transport {
            TransportSelection::Instance(transport) => {
                if self.credentials.is_some()
                    || options.credentials_file.is_some()
                    || options.api_key.is_some()
                {
                    return Err(Error::invalid_argument(
                        "When providing a transport instance, provide its credentials directly.",
                    ));
                }
                if options.scopes.as_ref().is_some_and(|s| !s.is_empty()) {
                    return Err(Error::invalid_argument(
                        "When providing a transport instance, provide its scopes directly.",
                    ));
                }
                (transport, false)
            }
            selection => {
                let name = match &selection {
                    TransportSelection::Named(name) => Some(name.as_str()),
                    _ => None,
                };
                let credentials = match options.api_key.clone() {
                    Some(key) => Some(Credentials::ApiKey { key }),
                    None => self.credentials,
                };
                let config = TransportConfig {
                    host: resolved.endpoint,
                    credentials,
                    credentials_file: options.credentials_file.clone(),
                    scopes: options.scopes.clone(),
                    quota_project_id: options.quota_project_id.clone(),
                    client_cert_source: resolved.cert_source,
                    client_info: self.client_info,
                    api_audience: options.api_audience.clone(),
                    rate_limit: options.rate_limit,
                    timeout: options.timeout_seconds.map(Duration::from_secs),
                    connect_timeout: Duration::from_secs(options.connect_timeout_seconds),
                };
                let registry = self.registry.unwrap_or_default();
                (registry.create(name, config)?, true)
            }
        };

        debug!(
            host = transport.host(),
            owns_transport, "Created ConfigServiceV2 client"
        );

        Ok(ConfigServiceV2Client {
            transport: Arc::new(TransportHandle {
                inner: transport,
                owned: owns_transport,
            }),
        })
    }
}

// ============================================================================
// Client
// ============================================================================

/// Transport shared by a client and the pagers it hands out
///
/// An owned transport is closed when the last holder goes away.
struct TransportHandle {
    inner: Arc<dyn ConfigServiceV2Transport>,
    owned: bool,
}

impl Deref for TransportHandle {
    type Target = dyn ConfigServiceV2Transport;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl Drop for TransportHandle {
    fn drop(&mut self) {
        if self.owned {
            debug!(host = self.inner.host(), "Closing owned transport");
            self.inner.close();
        }
    }
}

/// Client for the Cloud Logging configuration service
///
/// Manages log buckets, views, sinks, exclusions and CMEK settings. A client
/// that built its own transport closes it on [`close`](Self::close), or once
/// the client and every pager it returned are dropped. A shared transport
/// instance is left open.
pub struct ConfigServiceV2Client {
    transport: Arc<TransportHandle>,
}

/// Whether a flattened string field was given; empty strings count as unset
fn is_set(field: Option<&str>) -> bool {
    field.is_some_and(|value| !value.is_empty())
}

/// Take the caller's request, refusing it alongside flattened fields
fn coerce_request<R: Default>(request: Option<R>, has_flattened: bool) -> Result<R> {
    if request.is_some() && has_flattened {
        return Err(Error::invalid_argument(
            "If the `request` argument is set, then none of the individual field arguments should be set.",
        ));
    }
    Ok(request.unwrap_or_default())
}

impl ConfigServiceV2Client {
    /// Client with default options, credentials and transport
    pub fn new() -> Result<Self> {
        ClientBuilder::new().build()
    }

    /// Start configuring a client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Build with service account credentials from parsed key JSON
    pub fn from_service_account_info(info: &JsonValue, builder: ClientBuilder) -> Result<Self> {
        builder
            .credentials(Credentials::from_service_account_info(info)?)
            .build()
    }

    /// Build with service account credentials from a key file
    pub fn from_service_account_file(path: impl AsRef<Path>, builder: ClientBuilder) -> Result<Self> {
        builder
            .credentials(Credentials::from_service_account_file(path)?)
            .build()
    }

    /// The transport in use
    pub fn transport(&self) -> &Arc<dyn ConfigServiceV2Transport> {
        &self.transport.inner
    }

    /// Release the client and close an owned transport right away
    ///
    /// Pagers still holding the transport fail their next fetch with
    /// `TransportClosed`.
    pub fn close(self) {
        if self.transport.owned {
            self.transport.inner.close();
        }
    }

    fn settings(options: CallOptions, rpc: Rpc, key: &str, value: &str) -> CallSettings {
        debug!(rpc = rpc.name(), resource = value, "ConfigServiceV2 call");
        options.resolve(rpc, &[(key, value)])
    }

    // ========================================================================
    // Buckets
    // ========================================================================

    /// List buckets under `parent` (`projects/*/locations/*`; `-` for every location)
    pub async fn list_buckets(
        &self,
        request: Option<ListBucketsRequest>,
        parent: Option<&str>,
        options: CallOptions,
    ) -> Result<ListBucketsPager> {
        let mut request = coerce_request(request, is_set(parent))?;
        if let Some(parent) = parent.filter(|v| !v.is_empty()) {
            request.parent = parent.to_string();
        }

        let settings = Self::settings(options, Rpc::ListBuckets, "parent", &request.parent);
        let response = self
            .transport
            .list_buckets(request.clone(), settings.clone())
            .await?;

        let transport = Arc::clone(&self.transport);
        Ok(Pager::new(
            request,
            response,
            settings.metadata.clone(),
            move |request, metadata| {
                let transport = Arc::clone(&transport);
                let settings = CallSettings {
                    metadata,
                    ..settings.clone()
                };
                async move { transport.list_buckets(request, settings).await }
            },
        ))
    }

    pub async fn get_bucket(
        &self,
        request: GetBucketRequest,
        options: CallOptions,
    ) -> Result<LogBucket> {
        let settings = Self::settings(options, Rpc::GetBucket, "name", &request.name);
        self.transport.get_bucket(request, settings).await
    }

    pub async fn create_bucket(
        &self,
        request: CreateBucketRequest,
        options: CallOptions,
    ) -> Result<LogBucket> {
        let settings = Self::settings(options, Rpc::CreateBucket, "parent", &request.parent);
        self.transport.create_bucket(request, settings).await
    }

    pub async fn update_bucket(
        &self,
        request: UpdateBucketRequest,
        options: CallOptions,
    ) -> Result<LogBucket> {
        let settings = Self::settings(options, Rpc::UpdateBucket, "name", &request.name);
        self.transport.update_bucket(request, settings).await
    }

    pub async fn delete_bucket(
        &self,
        request: DeleteBucketRequest,
        options: CallOptions,
    ) -> Result<()> {
        let settings = Self::settings(options, Rpc::DeleteBucket, "name", &request.name);
        self.transport.delete_bucket(request, settings).await
    }

    pub async fn undelete_bucket(
        &self,
        request: UndeleteBucketRequest,
        options: CallOptions,
    ) -> Result<()> {
        let settings = Self::settings(options, Rpc::UndeleteBucket, "name", &request.name);
        self.transport.undelete_bucket(request, settings).await
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// List views of the bucket `parent`
    pub async fn list_views(
        &self,
        request: Option<ListViewsRequest>,
        parent: Option<&str>,
        options: CallOptions,
    ) -> Result<ListViewsPager> {
        let mut request = coerce_request(request, is_set(parent))?;
        if let Some(parent) = parent.filter(|v| !v.is_empty()) {
            request.parent = parent.to_string();
        }

        let settings = Self::settings(options, Rpc::ListViews, "parent", &request.parent);
        let response = self
            .transport
            .list_views(request.clone(), settings.clone())
            .await?;

        let transport = Arc::clone(&self.transport);
        Ok(Pager::new(
            request,
            response,
            settings.metadata.clone(),
            move |request, metadata| {
                let transport = Arc::clone(&transport);
                let settings = CallSettings {
                    metadata,
                    ..settings.clone()
                };
                async move { transport.list_views(request, settings).await }
            },
        ))
    }

    pub async fn get_view(&self, request: GetViewRequest, options: CallOptions) -> Result<LogView> {
        let settings = Self::settings(options, Rpc::GetView, "name", &request.name);
        self.transport.get_view(request, settings).await
    }

    pub async fn create_view(
        &self,
        request: CreateViewRequest,
        options: CallOptions,
    ) -> Result<LogView> {
        let settings = Self::settings(options, Rpc::CreateView, "parent", &request.parent);
        self.transport.create_view(request, settings).await
    }

    pub async fn update_view(
        &self,
        request: UpdateViewRequest,
        options: CallOptions,
    ) -> Result<LogView> {
        let settings = Self::settings(options, Rpc::UpdateView, "name", &request.name);
        self.transport.update_view(request, settings).await
    }

    pub async fn delete_view(&self, request: DeleteViewRequest, options: CallOptions) -> Result<()> {
        let settings = Self::settings(options, Rpc::DeleteView, "name", &request.name);
        self.transport.delete_view(request, settings).await
    }

    // ========================================================================
    // Sinks
    // ========================================================================

    /// List sinks of a project, organization, folder or billing account
    pub async fn list_sinks(
        &self,
        request: Option<ListSinksRequest>,
        parent: Option<&str>,
        options: CallOptions,
    ) -> Result<ListSinksPager> {
        let mut request = coerce_request(request, is_set(parent))?;
        if let Some(parent) = parent.filter(|v| !v.is_empty()) {
            request.parent = parent.to_string();
        }

        let settings = Self::settings(options, Rpc::ListSinks, "parent", &request.parent);
        let response = self
            .transport
            .list_sinks(request.clone(), settings.clone())
            .await?;

        let transport = Arc::clone(&self.transport);
        Ok(Pager::new(
            request,
            response,
            settings.metadata.clone(),
            move |request, metadata| {
                let transport = Arc::clone(&transport);
                let settings = CallSettings {
                    metadata,
                    ..settings.clone()
                };
                async move { transport.list_sinks(request, settings).await }
            },
        ))
    }

    pub async fn get_sink(
        &self,
        request: Option<GetSinkRequest>,
        sink_name: Option<&str>,
        options: CallOptions,
    ) -> Result<LogSink> {
        let mut request = coerce_request(request, is_set(sink_name))?;
        if let Some(sink_name) = sink_name.filter(|v| !v.is_empty()) {
            request.sink_name = sink_name.to_string();
        }
        let settings = Self::settings(options, Rpc::GetSink, "sink_name", &request.sink_name);
        self.transport.get_sink(request, settings).await
    }

    pub async fn create_sink(
        &self,
        request: Option<CreateSinkRequest>,
        parent: Option<&str>,
        sink: Option<LogSink>,
        options: CallOptions,
    ) -> Result<LogSink> {
        let mut request = coerce_request(request, is_set(parent) || sink.is_some())?;
        if let Some(parent) = parent.filter(|v| !v.is_empty()) {
            request.parent = parent.to_string();
        }
        if sink.is_some() {
            request.sink = sink;
        }
        let settings = Self::settings(options, Rpc::CreateSink, "parent", &request.parent);
        self.transport.create_sink(request, settings).await
    }

    pub async fn update_sink(
        &self,
        request: Option<UpdateSinkRequest>,
        sink_name: Option<&str>,
        sink: Option<LogSink>,
        update_mask: Option<FieldMask>,
        options: CallOptions,
    ) -> Result<LogSink> {
        let has_flattened = is_set(sink_name) || sink.is_some() || update_mask.is_some();
        let mut request = coerce_request(request, has_flattened)?;
        if let Some(sink_name) = sink_name.filter(|v| !v.is_empty()) {
            request.sink_name = sink_name.to_string();
        }
        if sink.is_some() {
            request.sink = sink;
        }
        if update_mask.is_some() {
            request.update_mask = update_mask;
        }
        let settings = Self::settings(options, Rpc::UpdateSink, "sink_name", &request.sink_name);
        self.transport.update_sink(request, settings).await
    }

    pub async fn delete_sink(
        &self,
        request: Option<DeleteSinkRequest>,
        sink_name: Option<&str>,
        options: CallOptions,
    ) -> Result<()> {
        let mut request = coerce_request(request, is_set(sink_name))?;
        if let Some(sink_name) = sink_name.filter(|v| !v.is_empty()) {
            request.sink_name = sink_name.to_string();
        }
        let settings = Self::settings(options, Rpc::DeleteSink, "sink_name", &request.sink_name);
        self.transport.delete_sink(request, settings).await
    }

    // ========================================================================
    // Exclusions
    // ========================================================================

    pub async fn list_exclusions(
        &self,
        request: Option<ListExclusionsRequest>,
        parent: Option<&str>,
        options: CallOptions,
    ) -> Result<ListExclusionsPager> {
        let mut request = coerce_request(request, is_set(parent))?;
        if let Some(parent) = parent.filter(|v| !v.is_empty()) {
            request.parent = parent.to_string();
        }

        let settings = Self::settings(options, Rpc::ListExclusions, "parent", &request.parent);
        let response = self
            .transport
            .list_exclusions(request.clone(), settings.clone())
            .await?;

        let transport = Arc::clone(&self.transport);
        Ok(Pager::new(
            request,
            response,
            settings.metadata.clone(),
            move |request, metadata| {
                let transport = Arc::clone(&transport);
                let settings = CallSettings {
                    metadata,
                    ..settings.clone()
                };
                async move { transport.list_exclusions(request, settings).await }
            },
        ))
    }

    pub async fn get_exclusion(
        &self,
        request: Option<GetExclusionRequest>,
        name: Option<&str>,
        options: CallOptions,
    ) -> Result<LogExclusion> {
        let mut request = coerce_request(request, is_set(name))?;
        if let Some(name) = name.filter(|v| !v.is_empty()) {
            request.name = name.to_string();
        }
        let settings = Self::settings(options, Rpc::GetExclusion, "name", &request.name);
        self.transport.get_exclusion(request, settings).await
    }

    pub async fn create_exclusion(
        &self,
        request: Option<CreateExclusionRequest>,
        parent: Option<&str>,
        exclusion: Option<LogExclusion>,
        options: CallOptions,
    ) -> Result<LogExclusion> {
        let mut request = coerce_request(request, is_set(parent) || exclusion.is_some())?;
        if let Some(parent) = parent.filter(|v| !v.is_empty()) {
            request.parent = parent.to_string();
        }
        if exclusion.is_some() {
            request.exclusion = exclusion;
        }
        let settings = Self::settings(options, Rpc::CreateExclusion, "parent", &request.parent);
        self.transport.create_exclusion(request, settings).await
    }

    pub async fn update_exclusion(
        &self,
        request: Option<UpdateExclusionRequest>,
        name: Option<&str>,
        exclusion: Option<LogExclusion>,
        update_mask: Option<FieldMask>,
        options: CallOptions,
    ) -> Result<LogExclusion> {
        let has_flattened = is_set(name) || exclusion.is_some() || update_mask.is_some();
        let mut request = coerce_request(request, has_flattened)?;
        if let Some(name) = name.filter(|v| !v.is_empty()) {
            request.name = name.to_string();
        }
        if exclusion.is_some() {
            request.exclusion = exclusion;
        }
        if update_mask.is_some() {
            request.update_mask = update_mask;
        }
        let settings = Self::settings(options, Rpc::UpdateExclusion, "name", &request.name);
        self.transport.update_exclusion(request, settings).await
    }

    pub async fn delete_exclusion(
        &self,
        request: Option<DeleteExclusionRequest>,
        name: Option<&str>,
        options: CallOptions,
    ) -> Result<()> {
        let mut request = coerce_request(request, is_set(name))?;
        if let Some(name) = name.filter(|v| !v.is_empty()) {
            request.name = name.to_string();
        }
        let settings = Self::settings(options, Rpc::DeleteExclusion, "name", &request.name);
        self.transport.delete_exclusion(request, settings).await
    }

    // ========================================================================
    // CMEK
    // ========================================================================

    pub async fn get_cmek_settings(
        &self,
        request: GetCmekSettingsRequest,
        options: CallOptions,
    ) -> Result<CmekSettings> {
        let settings = Self::settings(options, Rpc::GetCmekSettings, "name", &request.name);
        self.transport.get_cmek_settings(request, settings).await
    }

    pub async fn update_cmek_settings(
        &self,
        request: UpdateCmekSettingsRequest,
        options: CallOptions,
    ) -> Result<CmekSettings> {
        let settings = Self::settings(options, Rpc::UpdateCmekSettings, "name", &request.name);
        self.transport.update_cmek_settings(request, settings).await
    }
}

impl fmt::Debug for ConfigServiceV2Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigServiceV2Client")
            .field("transport", &self.transport.inner)
            .field("owns_transport", &self.transport.owned)
            .finish()
    }
}
