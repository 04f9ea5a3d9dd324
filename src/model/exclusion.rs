//! Log exclusions

use super::FieldMask;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Filter that drops matching entries before they are stored or exported
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogExclusion {
    pub name: String,
    pub description: String,
    pub filter: String,
    pub disabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListExclusionsRequest {
    pub parent: String,
    pub page_token: String,
    pub page_size: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListExclusionsResponse {
    pub exclusions: Vec<LogExclusion>,
    pub next_page_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetExclusionRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateExclusionRequest {
    pub parent: String,
    pub exclusion: Option<LogExclusion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateExclusionRequest {
    pub name: String,
    pub exclusion: Option<LogExclusion>,
    pub update_mask: Option<FieldMask>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeleteExclusionRequest {
    pub name: String,
}
