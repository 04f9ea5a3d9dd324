//! Per-call options and per-method defaults

use crate::http::RetryPolicy;
use crate::transport::CallSettings;
use crate::types::Metadata;
use std::time::Duration;
use url::form_urlencoded;

/// Every RPC of the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rpc {
    ListBuckets,
    GetBucket,
    CreateBucket,
    UpdateBucket,
    DeleteBucket,
    UndeleteBucket,
    ListViews,
    GetView,
    CreateView,
    UpdateView,
    DeleteView,
    ListSinks,
    GetSink,
    CreateSink,
    UpdateSink,
    DeleteSink,
    ListExclusions,
    GetExclusion,
    CreateExclusion,
    UpdateExclusion,
    DeleteExclusion,
    GetCmekSettings,
    UpdateCmekSettings,
}

impl Rpc {
    /// Method name as it appears in the service definition
    pub fn name(self) -> &'static str {
        match self {
            Rpc::ListBuckets => "ListBuckets",
            Rpc::GetBucket => "GetBucket",
            Rpc::CreateBucket => "CreateBucket",
            Rpc::UpdateBucket => "UpdateBucket",
            Rpc::DeleteBucket => "DeleteBucket",
            Rpc::UndeleteBucket => "UndeleteBucket",
            Rpc::ListViews => "ListViews",
            Rpc::GetView => "GetView",
            Rpc::CreateView => "CreateView",
            Rpc::UpdateView => "UpdateView",
            Rpc::DeleteView => "DeleteView",
            Rpc::ListSinks => "ListSinks",
            Rpc::GetSink => "GetSink",
            Rpc::CreateSink => "CreateSink",
            Rpc::UpdateSink => "UpdateSink",
            Rpc::DeleteSink => "DeleteSink",
            Rpc::ListExclusions => "ListExclusions",
            Rpc::GetExclusion => "GetExclusion",
            Rpc::CreateExclusion => "CreateExclusion",
            Rpc::UpdateExclusion => "UpdateExclusion",
            Rpc::DeleteExclusion => "DeleteExclusion",
            Rpc::GetCmekSettings => "GetCmekSettings",
            Rpc::UpdateCmekSettings => "UpdateCmekSettings",
        }
    }

    /// Default retry policy
    ///
    /// Idempotent sink and exclusion calls retry on deadline, internal and
    /// unavailable errors; everything else is sent once.
    pub fn default_retry(self) -> Option<RetryPolicy> {
        match self {
            Rpc::ListSinks
            | Rpc::GetSink
            | Rpc::UpdateSink
            | Rpc::DeleteSink
            | Rpc::ListExclusions
            | Rpc::GetExclusion
            | Rpc::DeleteExclusion => Some(RetryPolicy::idempotent_default()),
            _ => None,
        }
    }

    /// Default per-attempt timeout; `None` falls back to the client timeout
    pub fn default_timeout(self) -> Option<Duration> {
        match self {
            Rpc::ListSinks
            | Rpc::GetSink
            | Rpc::UpdateSink
            | Rpc::DeleteSink
            | Rpc::ListExclusions
            | Rpc::GetExclusion
            | Rpc::DeleteExclusion => Some(Duration::from_secs(60)),
            Rpc::CreateSink | Rpc::CreateExclusion | Rpc::UpdateExclusion => {
                Some(Duration::from_secs(120))
            }
            _ => None,
        }
    }
}

/// Caller overrides for one call
///
/// Unset retry and timeout fall back to the method defaults; metadata is sent
/// ahead of the routing header.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub retry: Option<RetryPolicy>,
    pub timeout: Option<Duration>,
    pub metadata: Metadata,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the retry policy; [`RetryPolicy::disabled`] turns retrying off
    #[must_use]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add a metadata entry
    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push((key.into(), value.into()));
        self
    }

    /// Apply method defaults and append the routing header
    pub(crate) fn resolve(self, rpc: Rpc, routing: &[(&str, &str)]) -> CallSettings {
        let retry = match self.retry {
            Some(policy) if policy.is_disabled() => None,
            Some(policy) => Some(policy),
            None => rpc.default_retry(),
        };
        let timeout = self.timeout.or_else(|| rpc.default_timeout());

        let mut metadata = self.metadata;
        metadata.push(routing_header(routing));

        CallSettings {
            retry,
            timeout,
            metadata,
        }
    }
}

/// `x-goog-request-params` header carrying the resource the call targets
pub fn routing_header(params: &[(&str, &str)]) -> (String, String) {
    let value = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    ("x-goog-request-params".to_string(), value)
}
