//! Log buckets

use super::FieldMask;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a log bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    #[default]
    LifecycleStateUnspecified,
    /// Normal and active state
    Active,
    /// Scheduled for deletion; can be undeleted within the grace period
    DeleteRequested,
}

/// A repository of log entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogBucket {
    /// `projects/{project}/locations/{location}/buckets/{bucket}`
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
    /// Days to retain entries; 0 means the service default
    pub retention_days: i32,
    /// A locked bucket cannot have its retention shortened or be deleted
    pub locked: bool,
    pub lifecycle_state: LifecycleState,
}

/// Parameters of `ListBuckets`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListBucketsRequest {
    /// e.g. `projects/my-project/locations/-` to list every location
    pub parent: String,
    pub page_token: String,
    pub page_size: i32,
}

/// Result of `ListBuckets`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListBucketsResponse {
    pub buckets: Vec<LogBucket>,
    pub next_page_token: String,
}

/// Parameters of `GetBucket`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetBucketRequest {
    pub name: String,
}

/// Parameters of `CreateBucket`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateBucketRequest {
    /// `projects/{project}/locations/{location}`
    pub parent: String,
    pub bucket_id: String,
    pub bucket: Option<LogBucket>,
}

/// Parameters of `UpdateBucket`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateBucketRequest {
    pub name: String,
    pub bucket: Option<LogBucket>,
    pub update_mask: Option<FieldMask>,
}

/// Parameters of `DeleteBucket`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeleteBucketRequest {
    pub name: String,
}

/// Parameters of `UndeleteBucket`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UndeleteBucketRequest {
    pub name: String,
}
