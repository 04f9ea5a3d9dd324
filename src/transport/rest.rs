//! REST/JSON transport
//!
//! Maps each RPC onto the `v2` HTTP surface of the service: list and get are
//! `GET`, create is `POST` on the collection, update is `PATCH` (`PUT` for
//! sinks) with an `updateMask` query, delete is `DELETE`.

use super::{CallSettings, ConfigServiceV2Transport, TransportConfig};
use crate::auth::{Authenticator, Credentials};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
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
use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Transport speaking JSON over HTTP/1.1
#[derive(Debug)]
pub struct RestTransport {
    host: String,
    http: HttpClient,
    closed: AtomicBool,
}

impl RestTransport {
    /// Build a transport: resolve credentials, client certificate and headers
    pub fn new(config: TransportConfig) -> Result<Self> {
        let base_url = base_url(&config.host);

        let credentials = match (config.credentials, &config.credentials_file) {
            (Some(credentials), _) => credentials,
            (None, Some(path)) => Credentials::from_service_account_file(path)?,
            (None, None) => Credentials::application_default()?,
        };
        let audience = config
            .api_audience
            .unwrap_or_else(|| format!("{}/", base_url.trim_end_matches('/')));
        let authenticator = Authenticator::new(credentials, audience)
            .with_scopes(config.scopes.unwrap_or_default())
            .with_quota_project(config.quota_project_id);

        let mut builder = HttpClientConfig::builder()
            .base_url(base_url)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.client_info.to_user_agent())
            .header("x-goog-api-client", config.client_info.to_api_client_header());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(rate_limit) = config.rate_limit {
            builder = builder.rate_limit(rate_limit);
        }
        if let Some(source) = &config.client_cert_source {
            let (cert, key) = source.load()?;
            builder = builder.identity_pem(&cert, &key);
        }

        debug!(
            host = %config.host,
            credentials = authenticator.credentials().kind(),
            mtls = config.client_cert_source.is_some(),
            "Created REST transport"
        );

        Ok(Self {
            host: config.host,
            http: HttpClient::with_auth(builder.build(), authenticator)?,
            closed: AtomicBool::new(false),
        })
    }

    /// The underlying HTTP client
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    fn request_config(&self, rpc: &str, settings: CallSettings) -> Result<RequestConfig> {
        if self.is_closed() {
            return Err(Error::TransportClosed);
        }
        debug!(rpc, "Calling ConfigServiceV2");
        Ok(RequestConfig::new()
            .headers(settings.metadata)
            .timeout(settings.timeout)
            .retry(settings.retry))
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: String,
        config: RequestConfig,
    ) -> Result<T> {
        self.http.request_json(method, &path, &config).await
    }

    async fn call_empty(&self, method: Method, path: String, config: RequestConfig) -> Result<()> {
        self.http.request_empty(method, &path, &config).await
    }
}

/// Base URL for a host; bare hosts get `https://`
fn base_url(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.trim_end_matches('/').to_string()
    } else {
        format!("https://{host}")
    }
}

/// Serialize an optional resource as the request body; absent means `{}`
fn body<T: Serialize + Default>(resource: Option<T>) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(resource.unwrap_or_default())?)
}

fn with_page(config: RequestConfig, page_token: &str, page_size: i32) -> RequestConfig {
    let config = if page_token.is_empty() {
        config
    } else {
        config.query("pageToken", page_token)
    };
    if page_size > 0 {
        config.query("pageSize", page_size.to_string())
    } else {
        config
    }
}

fn with_mask(config: RequestConfig, mask: Option<&FieldMask>) -> RequestConfig {
    match mask {
        Some(mask) if !mask.is_empty() => config.query("updateMask", mask.to_query_value()),
        _ => config,
    }
}

#[async_trait]
impl ConfigServiceV2Transport for RestTransport {
    fn host(&self) -> &str {
        &self.host
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            debug!(host = %self.host, "Closed REST transport");
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    // ========================================================================
    // Buckets
    // ========================================================================

    async fn list_buckets(
        &self,
        request: ListBucketsRequest,
        settings: CallSettings,
    ) -> Result<ListBucketsResponse> {
        let config = self.request_config("ListBuckets", settings)?;
        let config = with_page(config, &request.page_token, request.page_size);
        self.call(Method::GET, format!("v2/{}/buckets", request.parent), config)
            .await
    }

    async fn get_bucket(
        &self,
        request: GetBucketRequest,
        settings: CallSettings,
    ) -> Result<LogBucket> {
        let config = self.request_config("GetBucket", settings)?;
        self.call(Method::GET, format!("v2/{}", request.name), config)
            .await
    }

    async fn create_bucket(
        &self,
        request: CreateBucketRequest,
        settings: CallSettings,
    ) -> Result<LogBucket> {
        let config = self
            .request_config("CreateBucket", settings)?
            .query("bucketId", request.bucket_id)
            .json(body(request.bucket)?);
        self.call(Method::POST, format!("v2/{}/buckets", request.parent), config)
            .await
    }

    async fn update_bucket(
        &self,
        request: UpdateBucketRequest,
        settings: CallSettings,
    ) -> Result<LogBucket> {
        let config = self.request_config("UpdateBucket", settings)?;
        let config = with_mask(config, request.update_mask.as_ref()).json(body(request.bucket)?);
        self.call(Method::PATCH, format!("v2/{}", request.name), config)
            .await
    }

    async fn delete_bucket(
        &self,
        request: DeleteBucketRequest,
        settings: CallSettings,
    ) -> Result<()> {
        let config = self.request_config("DeleteBucket", settings)?;
        self.call_empty(Method::DELETE, format!("v2/{}", request.name), config)
            .await
    }

    async fn undelete_bucket(
        &self,
        request: UndeleteBucketRequest,
        settings: CallSettings,
    ) -> Result<()> {
        let config = self
            .request_config("UndeleteBucket", settings)?
            .json(serde_json::json!({}));
        self.call_empty(Method::POST, format!("v2/{}:undelete", request.name), config)
            .await
    }

    // ========================================================================
    // Views
    // ========================================================================

    async fn list_views(
        &self,
        request: ListViewsRequest,
        settings: CallSettings,
    ) -> Result<ListViewsResponse> {
        let config = self.request_config("ListViews", settings)?;
        let config = with_page(config, &request.page_token, request.page_size);
        self.call(Method::GET, format!("v2/{}/views", request.parent), config)
            .await
    }

    async fn get_view(&self, request: GetViewRequest, settings: CallSettings) -> Result<LogView> {
        let config = self.request_config("GetView", settings)?;
        self.call(Method::GET, format!("v2/{}", request.name), config)
            .await
    }

    async fn create_view(
        &self,
        request: CreateViewRequest,
        settings: CallSettings,
    ) -> Result<LogView> {
        let config = self
            .request_config("CreateView", settings)?
            .query("viewId", request.view_id)
            .json(body(request.view)?);
        self.call(Method::POST, format!("v2/{}/views", request.parent), config)
            .await
    }

    async fn update_view(
        &self,
        request: UpdateViewRequest,
        settings: CallSettings,
    ) -> Result<LogView> {
        let config = self.request_config("UpdateView", settings)?;
        let config = with_mask(config, request.update_mask.as_ref()).json(body(request.view)?);
        self.call(Method::PATCH, format!("v2/{}", request.name), config)
            .await
    }

    async fn delete_view(&self, request: DeleteViewRequest, settings: CallSettings) -> Result<()> {
        let config = self.request_config("DeleteView", settings)?;
        self.call_empty(Method::DELETE, format!("v2/{}", request.name), config)
            .await
    }

    // ========================================================================
    // Sinks
    // ========================================================================

    async fn list_sinks(
        &self,
        request: ListSinksRequest,
        settings: CallSettings,
    ) -> Result<ListSinksResponse> {
        let config = self.request_config("ListSinks", settings)?;
        let config = with_page(config, &request.page_token, request.page_size);
        self.call(Method::GET, format!("v2/{}/sinks", request.parent), config)
            .await
    }

    async fn get_sink(&self, request: GetSinkRequest, settings: CallSettings) -> Result<LogSink> {
        let config = self.request_config("GetSink", settings)?;
        self.call(Method::GET, format!("v2/{}", request.sink_name), config)
            .await
    }

    async fn create_sink(
        &self,
        request: CreateSinkRequest,
        settings: CallSettings,
    ) -> Result<LogSink> {
        let mut config = self.request_config("CreateSink", settings)?;
        if request.unique_writer_identity {
            config = config.query("uniqueWriterIdentity", "true");
        }
        let config = config.json(body(request.sink)?);
        self.call(Method::POST, format!("v2/{}/sinks", request.parent), config)
            .await
    }

    async fn update_sink(
        &self,
        request: UpdateSinkRequest,
        settings: CallSettings,
    ) -> Result<LogSink> {
        let mut config = self.request_config("UpdateSink", settings)?;
        if request.unique_writer_identity {
            config = config.query("uniqueWriterIdentity", "true");
        }
        let config = with_mask(config, request.update_mask.as_ref()).json(body(request.sink)?);
        self.call(Method::PUT, format!("v2/{}", request.sink_name), config)
            .await
    }

    async fn delete_sink(&self, request: DeleteSinkRequest, settings: CallSettings) -> Result<()> {
        let config = self.request_config("DeleteSink", settings)?;
        self.call_empty(Method::DELETE, format!("v2/{}", request.sink_name), config)
            .await
    }

    // ========================================================================
    // Exclusions
    // ========================================================================

    async fn list_exclusions(
        &self,
        request: ListExclusionsRequest,
        settings: CallSettings,
    ) -> Result<ListExclusionsResponse> {
        let config = self.request_config("ListExclusions", settings)?;
        let config = with_page(config, &request.page_token, request.page_size);
        self.call(Method::GET, format!("v2/{}/exclusions", request.parent), config)
            .await
    }

    async fn get_exclusion(
        &self,
        request: GetExclusionRequest,
        settings: CallSettings,
    ) -> Result<LogExclusion> {
        let config = self.request_config("GetExclusion", settings)?;
        self.call(Method::GET, format!("v2/{}", request.name), config)
            .await
    }

    async fn create_exclusion(
        &self,
        request: CreateExclusionRequest,
        settings: CallSettings,
    ) -> Result<LogExclusion> {
        let config = self
            .request_config("CreateExclusion", settings)?
            .json(body(request.exclusion)?);
        self.call(Method::POST, format!("v2/{}/exclusions", request.parent), config)
            .await
    }

    async fn update_exclusion(
        &self,
        request: UpdateExclusionRequest,
        settings: CallSettings,
    ) -> Result<LogExclusion> {
        let config = self.request_config("UpdateExclusion", settings)?;
        let config =
            with_mask(config, request.update_mask.as_ref()).json(body(request.exclusion)?);
        self.call(Method::PATCH, format!("v2/{}", request.name), config)
            .await
    }

    async fn delete_exclusion(
        &self,
        request: DeleteExclusionRequest,
        settings: CallSettings,
    ) -> Result<()> {
        let config = self.request_config("DeleteExclusion", settings)?;
        self.call_empty(Method::DELETE, format!("v2/{}", request.name), config)
            .await
    }

    // ========================================================================
    // CMEK
    // ========================================================================

    async fn get_cmek_settings(
        &self,
        request: GetCmekSettingsRequest,
        settings: CallSettings,
    ) -> Result<CmekSettings> {
        let config = self.request_config("GetCmekSettings", settings)?;
        self.call(Method::GET, format!("v2/{}", request.name), config)
            .await
    }

    async fn update_cmek_settings(
        &self,
        request: UpdateCmekSettingsRequest,
        settings: CallSettings,
    ) -> Result<CmekSettings> {
        let config = self.request_config("UpdateCmekSettings", settings)?;
        let config =
            with_mask(config, request.update_mask.as_ref()).json(body(request.cmek_settings)?);
        self.call(Method::PATCH, format!("v2/{}", request.name), config)
            .await
    }
}
