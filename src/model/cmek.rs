//! Customer-managed encryption key settings of the Logs Router

use super::FieldMask;
use serde::{Deserialize, Serialize};

/// CMEK settings of a project, folder, organization or billing account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CmekSettings {
    /// Output only
    pub name: String,
    /// Cloud KMS key used to protect routed entries; empty disables CMEK
    pub kms_key_name: String,
    /// Output only: service account that needs encrypter/decrypter access
    pub service_account_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetCmekSettingsRequest {
    /// e.g. `projects/[PROJECT_ID]/cmekSettings`
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateCmekSettingsRequest {
    pub name: String,
    pub cmek_settings: Option<CmekSettings>,
    pub update_mask: Option<FieldMask>,
}
