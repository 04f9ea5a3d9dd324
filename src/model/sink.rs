//! Log sinks
//!
//! A sink exports matching log entries to a Cloud Storage bucket, a BigQuery
//! dataset, a Pub/Sub topic or another log bucket.

use super::{FieldMask, LogExclusion};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Log entry format written by a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VersionFormat {
    #[default]
    VersionFormatUnspecified,
    V2,
    V1,
}

/// Options that apply to BigQuery destinations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BigQueryOptions {
    pub use_partitioned_tables: bool,
    /// Output only
    pub uses_timestamp_column_partitioning: bool,
}

/// Export destination plus the filter selecting what is exported
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogSink {
    /// Sink identifier, e.g. `my-syslog-errors-to-pubsub`
    pub name: String,
    /// e.g. `storage.googleapis.com/[GCS_BUCKET]`
    pub destination: String,
    pub filter: String,
    pub description: String,
    pub disabled: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclusions: Vec<LogExclusion>,
    pub output_version_format: VersionFormat,
    /// Output only: identity the service writes to the destination as
    pub writer_identity: String,
    pub include_children: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bigquery_options: Option<BigQueryOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListSinksRequest {
    /// `projects/[PROJECT_ID]`, `organizations/[ORGANIZATION_ID]`,
    /// `billingAccounts/[BILLING_ACCOUNT_ID]` or `folders/[FOLDER_ID]`
    pub parent: String,
    pub page_token: String,
    pub page_size: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListSinksResponse {
    pub sinks: Vec<LogSink>,
    pub next_page_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetSinkRequest {
    /// `projects/[PROJECT_ID]/sinks/[SINK_ID]` and its organization, billing
    /// account and folder forms
    pub sink_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateSinkRequest {
    pub parent: String,
    pub sink: Option<LogSink>,
    /// Ask for a dedicated service account as the writer identity
    pub unique_writer_identity: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateSinkRequest {
    pub sink_name: String,
    pub sink: Option<LogSink>,
    pub unique_writer_identity: bool,
    pub update_mask: Option<FieldMask>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeleteSinkRequest {
    pub sink_name: String,
}
