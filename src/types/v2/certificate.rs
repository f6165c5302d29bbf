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

use kube::KubeSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Secret types a certificate reference may point at.
///
/// The type decides which data key holds the public certificate.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Display, EnumString, PartialEq, Eq)]
pub enum CertificateSecretType {
    #[strum(to_string = "Opaque")]
    #[serde(rename = "Opaque")]
    Opaque,

    #[strum(to_string = "kubernetes.io/tls")]
    #[serde(rename = "kubernetes.io/tls")]
    KubernetesTls,

    #[strum(to_string = "cert-manager.io/v1")]
    #[serde(rename = "cert-manager.io/v1")]
    CertManagerV1,

    #[strum(to_string = "cert-manager.io/v1alpha2")]
    #[serde(rename = "cert-manager.io/v1alpha2")]
    CertManagerV1Alpha2,
}

impl CertificateSecretType {
    /// Data key carrying the PEM certificate for this secret type.
    pub fn public_key_field(self) -> &'static str {
        match self {
            CertificateSecretType::Opaque => "public.crt",
            CertificateSecretType::KubernetesTls
            | CertificateSecretType::CertManagerV1
            | CertificateSecretType::CertManagerV1Alpha2 => "tls.crt",
        }
    }
}

/// Reference to a secret holding certificate material, in the Tenant's namespace.
#[derive(Deserialize, Serialize, Clone, Debug, KubeSchema, Default, PartialEq, Eq)]
pub struct LocalCertificateReference {
    pub name: String,

    /// Raw secret type. Unknown types resolve like `Opaque`.
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub type_: String,
}

impl LocalCertificateReference {
    pub fn new(name: impl Into<String>, type_: CertificateSecretType) -> Self {
        Self {
            name: name.into(),
            type_: type_.to_string(),
        }
    }

    pub fn secret_type(&self) -> CertificateSecretType {
        self.type_.parse().unwrap_or(CertificateSecretType::Opaque)
    }
}
