// Copyright 2025 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::models::KeyValue;
use crate::models::encryption::EncryptionConfiguration;
use crate::models::identity::IdpConfiguration;
use crate::models::pool::Pool;
use crate::models::security::TlsConfiguration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct DomainsConfiguration {
    pub console: String,
    pub minio: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateDomainsRequest {
    pub domains: Option<DomainsConfiguration>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ImageRegistry {
    pub registry: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateTenantRequest {
    pub name: String,
    pub namespace: String,
    pub pools: Vec<Pool>,
    /// Generated when empty.
    pub access_key: String,
    /// Generated when empty.
    pub secret_key: String,
    pub image: String,
    pub image_pull_secret: String,
    pub image_registry: Option<ImageRegistry>,
    pub mount_path: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    pub enable_console: Option<bool>,
    pub enable_tls: Option<bool>,
    pub erasure_coding_parity: i64,
    pub expose_minio: bool,
    pub expose_console: bool,
    pub expose_sftp: bool,
    pub environment_variables: Vec<KeyValue>,
    pub domains: Option<DomainsConfiguration>,
    pub idp: Option<IdpConfiguration>,
    pub tls: Option<TlsConfiguration>,
    pub encryption: Option<EncryptionConfiguration>,
}

/// Console credentials handed back after a create.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConsoleCredentials {
    pub access_key: String,
    pub secret_key: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreateTenantResponse {
    pub external_idp: bool,
    pub console: Vec<ConsoleCredentials>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateTenantRequest {
    pub image: String,
    pub image_pull_secret: String,
    pub image_registry: Option<ImageRegistry>,
    pub enable_prometheus: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct DeleteTenantRequest {
    pub delete_pvcs: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TierElement {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub size: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TenantListItem {
    pub name: String,
    pub namespace: String,
    pub current_state: String,
    pub health_status: String,
    pub pool_count: i64,
    pub instance_count: i64,
    pub volume_count: i64,
    pub total_size: i64,
    pub capacity_raw: i64,
    pub capacity_raw_usage: i64,
    pub capacity: i64,
    pub capacity_usage: i64,
    pub tiers: Vec<TierElement>,
    pub domains: Option<DomainsConfiguration>,
    pub creation_date: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub deletion_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TenantList {
    pub tenants: Vec<TenantListItem>,
    pub total: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TenantInfo {
    pub name: String,
    pub namespace: String,
    pub image: String,
    pub current_state: String,
    pub total_size: i64,
    pub pools: Vec<Pool>,
    pub enable_prometheus: bool,
    pub creation_date: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub deletion_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TenantEndpoints {
    pub minio: String,
    pub console: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TenantUsageStatus {
    pub capacity: i64,
    pub capacity_usage: i64,
    pub raw: i64,
    pub raw_usage: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TenantStatus {
    pub health_status: String,
    pub drives_online: i64,
    pub drives_offline: i64,
    pub drives_healing: i64,
    pub write_quorum: i64,
    pub usage: Option<TenantUsageStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TenantDetails {
    #[serde(flatten)]
    pub info: TenantInfo,
    pub status: TenantStatus,
    pub endpoints: TenantEndpoints,
    pub tiers: Vec<TierElement>,
    pub domains: Option<DomainsConfiguration>,
    pub sftp_exposed: bool,
    pub encryption_enabled: bool,
    pub idp_oidc_enabled: bool,
    pub idp_ad_enabled: bool,
    pub external_idp: bool,
    pub minio_tls: bool,
    /// Names of the user secrets attached to the tenant.
    pub users: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TenantUsage {
    pub used: i64,
    pub disk_used: i64,
}
