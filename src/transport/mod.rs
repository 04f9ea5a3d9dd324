//! Transport layer
//!
//! A transport carries ConfigServiceV2 calls to the service. The client only
//! sees the [`ConfigServiceV2Transport`] trait; concrete transports are picked
//! by name from a [`TransportRegistry`] or supplied ready-made by the caller.

mod registry;
mod rest;

pub use registry::{TransportConfig, TransportFactory, TransportRegistry};
pub use rest::RestTransport;

use crate::error::Result;
use crate::http::RetryPolicy;
use crate::model::{
    CmekSettings, CreateBucketRequest, CreateExclusionRequest, CreateSinkRequest,
    CreateViewRequest, DeleteBucketRequest, DeleteExclusionRequest, DeleteSinkRequest,
    DeleteViewRequest, GetBucketRequest, GetCmekSettingsRequest, GetExclusionRequest,
    GetSinkRequest, GetViewRequest, ListBucketsRequest, ListBucketsResponse,
    ListExclusionsRequest, ListExclusionsResponse, ListSinksRequest, ListSinksResponse,
    ListViewsRequest, ListViewsResponse, LogBucket, LogExclusion, LogSink, LogView,
    UndeleteBucketRequest, UpdateBucketRequest, UpdateCmekSettingsRequest,
    UpdateExclusionRequest, UpdateSinkRequest, UpdateViewRequest,
};
use crate::types::Metadata;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// Effective settings of a single call, after method defaults are applied
#[derive(Debug, Clone, Default)]
pub struct CallSettings {
    pub retry: Option<RetryPolicy>,
    pub timeout: Option<Duration>,
    /// Headers sent with the call, routing header last
    pub metadata: Metadata,
}

/// Carries ConfigServiceV2 calls to the service
#[async_trait]
pub trait ConfigServiceV2Transport: Send + Sync + fmt::Debug {
    /// Host the transport talks to
    fn host(&self) -> &str;

    /// Release the transport; later calls fail with `TransportClosed`
    fn close(&self);

    fn is_closed(&self) -> bool;

    // Buckets
    async fn list_buckets(
        &self,
        request: ListBucketsRequest,
        settings: CallSettings,
    ) -> Result<ListBucketsResponse>;
    async fn get_bucket(&self, request: GetBucketRequest, settings: CallSettings)
        -> Result<LogBucket>;
    async fn create_bucket(
        &self,
        request: CreateBucketRequest,
        settings: CallSettings,
    ) -> Result<LogBucket>;
    async fn update_bucket(
        &self,
        request: UpdateBucketRequest,
        settings: CallSettings,
    ) -> Result<LogBucket>;
    async fn delete_bucket(&self, request: DeleteBucketRequest, settings: CallSettings)
        -> Result<()>;
    async fn undelete_bucket(
        &self,
        request: UndeleteBucketRequest,
        settings: CallSettings,
    ) -> Result<()>;

    // Views
    async fn list_views(
        &self,
        request: ListViewsRequest,
        settings: CallSettings,
    ) -> Result<ListViewsResponse>;
    async fn get_view(&self, request: GetViewRequest, settings: CallSettings) -> Result<LogView>;
    async fn create_view(&self, request: CreateViewRequest, settings: CallSettings)
        -> Result<LogView>;
    async fn update_view(&self, request: UpdateViewRequest, settings: CallSettings)
        -> Result<LogView>;
    async fn delete_view(&self, request: DeleteViewRequest, settings: CallSettings) -> Result<()>;

    // Sinks
    async fn list_sinks(
        &self,
        request: ListSinksRequest,
        settings: CallSettings,
    ) -> Result<ListSinksResponse>;
    async fn get_sink(&self, request: GetSinkRequest, settings: CallSettings) -> Result<LogSink>;
    async fn create_sink(&self, request: CreateSinkRequest, settings: CallSettings)
        -> Result<LogSink>;
    async fn update_sink(&self, request: UpdateSinkRequest, settings: CallSettings)
        -> Result<LogSink>;
    async fn delete_sink(&self, request: DeleteSinkRequest, settings: CallSettings) -> Result<()>;

    // Exclusions
    async fn list_exclusions(
        &self,
        request: ListExclusionsRequest,
        settings: CallSettings,
    ) -> Result<ListExclusionsResponse>;
    async fn get_exclusion(
        &self,
        request: GetExclusionRequest,
        settings: CallSettings,
    ) -> Result<LogExclusion>;
    async fn create_exclusion(
        &self,
        request: CreateExclusionRequest,
        settings: CallSettings,
    ) -> Result<LogExclusion>;
    async fn update_exclusion(
        &self,
        request: UpdateExclusionRequest,
        settings: CallSettings,
    ) -> Result<LogExclusion>;
    async fn delete_exclusion(
        &self,
        request: DeleteExclusionRequest,
        settings: CallSettings,
    ) -> Result<()>;

    // CMEK
    async fn get_cmek_settings(
        &self,
        request: GetCmekSettingsRequest,
        settings: CallSettings,
    ) -> Result<CmekSettings>;
    async fn update_cmek_settings(
        &self,
        request: UpdateCmekSettingsRequest,
        settings: CallSettings,
    ) -> Result<CmekSettings>;
}

#[cfg(test)]
mod tests;
