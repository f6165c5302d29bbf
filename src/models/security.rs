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

use crate::models::pool::SecurityContext;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Base64-encoded PEM certificate and private key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct KeyPairConfiguration {
    pub crt: String,
    pub key: String,
}

impl KeyPairConfiguration {
    pub fn new(crt: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            crt: crt.into(),
            key: key.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct TlsConfiguration {
    pub minio_server_certificates: Vec<KeyPairConfiguration>,
    pub minio_client_certificates: Vec<KeyPairConfiguration>,
    /// Base64-encoded PEM bundles.
    pub minio_ca_certificates: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CertificateInfo {
    pub serial_number: String,
    /// Name of the secret holding the certificate.
    pub name: String,
    pub domains: Vec<String>,
    pub expiry: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CustomCertificates {
    pub minio: Vec<CertificateInfo>,
    pub minio_cas: Vec<CertificateInfo>,
    pub client: Vec<CertificateInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SecurityResponse {
    pub auto_cert: bool,
    pub custom_certificates: CustomCertificates,
    pub security_context: Option<SecurityContext>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CustomCertificatesRequest {
    pub minio_server_certificates: Vec<KeyPairConfiguration>,
    pub minio_client_certificates: Vec<KeyPairConfiguration>,
    pub minio_ca_certificates: Vec<String>,
    /// Secret names to drop from the tenant's references.
    pub secrets_to_be_deleted: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateSecurityRequest {
    pub auto_cert: bool,
    pub custom_certificates: Option<CustomCertificatesRequest>,
    pub security_context: Option<SecurityContext>,
}
