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
use crate::models::pool::SecurityContext;
use crate::models::security::{CertificateInfo, KeyPairConfiguration};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// KMS client material, base64-encoded PEM.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct KmsMtls {
    pub crt: String,
    pub key: String,
    pub ca: String,
}

impl KmsMtls {
    pub fn is_empty(&self) -> bool {
        self.crt.is_empty() && self.key.is_empty() && self.ca.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct VaultConfiguration {
    pub endpoint: String,
    pub engine: String,
    pub namespace: String,
    pub prefix: String,
    pub approle: Option<VaultAppRole>,
    /// Seconds between health checks.
    pub status_ping: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct VaultAppRole {
    pub engine: String,
    pub id: String,
    pub secret: String,
    /// Seconds.
    pub retry: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct AwsConfiguration {
    pub endpoint: String,
    pub region: String,
    pub kms_key: String,
    pub credentials: Option<AwsCredentials>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct AwsCredentials {
    pub access_key: String,
    pub secret_key: String,
    pub session_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct GemaltoConfiguration {
    pub endpoint: String,
    pub token: String,
    pub domain: String,
    /// Seconds.
    pub retry: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct GcpConfiguration {
    pub project_id: String,
    pub endpoint: String,
    pub credentials: Option<GcpCredentials>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct GcpCredentials {
    pub client_email: String,
    pub client_id: String,
    pub private_key_id: String,
    pub private_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct AzureConfiguration {
    pub endpoint: String,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
}

/// Encryption intent: KES deployment plus exactly one KMS backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct EncryptionConfiguration {
    pub image: String,
    pub replicas: String,
    pub security_context: Option<SecurityContext>,
    /// KES server certificate.
    pub server_tls: Option<KeyPairConfiguration>,
    /// Client certificate MinIO presents to KES.
    pub minio_mtls: Option<KeyPairConfiguration>,
    /// Client certificate KES presents to the KMS.
    pub kms_mtls: Option<KmsMtls>,
    /// Pre-rendered `server-config.yaml`, stored as is.
    pub raw: String,
    pub vault: Option<VaultConfiguration>,
    pub aws: Option<AwsConfiguration>,
    pub gemalto: Option<GemaltoConfiguration>,
    pub gcp: Option<GcpConfiguration>,
    pub azure: Option<AzureConfiguration>,
    pub secrets_to_be_deleted: Vec<String>,
    pub labels: Vec<KeyValue>,
    pub annotations: Vec<KeyValue>,
    pub node_selector: Vec<KeyValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct KmsMtlsInfo {
    pub crt: Option<CertificateInfo>,
    pub ca: Option<CertificateInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct EncryptionInfo {
    pub image: String,
    pub replicas: String,
    pub security_context: Option<SecurityContext>,
    pub server_tls: Option<CertificateInfo>,
    pub minio_mtls: Option<CertificateInfo>,
    pub kms_mtls: Option<KmsMtlsInfo>,
    pub raw: String,
    pub vault: Option<VaultConfiguration>,
    pub aws: Option<AwsConfiguration>,
    pub gemalto: Option<GemaltoConfiguration>,
    pub gcp: Option<GcpConfiguration>,
    pub azure: Option<AzureConfiguration>,
}
