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

use crate::error::{InvalidCertificateSnafu, Result};
use crate::models::security::CertificateInfo;
use crate::types::v2::certificate::CertificateSecretType;
use crate::utils::tls;
use k8s_openapi::api::core::v1 as corev1;
use kube::ResourceExt;
use snafu::ResultExt;

/// Every certificate found under the public key field of `secret`.
///
/// Entries are named after the secret, not the certificate subject.
pub fn certificate_info(
    secret: &corev1::Secret,
    secret_type: CertificateSecretType,
) -> Result<Vec<CertificateInfo>> {
    certificates_under(secret, secret_type.public_key_field())
}

/// Every certificate stored under `key`.
pub fn certificates_under(secret: &corev1::Secret, key: &str) -> Result<Vec<CertificateInfo>> {
    let name = secret.name_any();
    let pem = secret
        .data
        .as_ref()
        .and_then(|data| data.get(key))
        .ok_or(tls::Error::NonCertificate)
        .context(InvalidCertificateSnafu { name: name.as_str() })?;

    let certificates = tls::parse_certificates(&pem.0)
        .context(InvalidCertificateSnafu { name: name.as_str() })?;

    Ok(certificates
        .into_iter()
        .map(|details| CertificateInfo {
            serial_number: details.serial_number,
            name: name.clone(),
            domains: details.domains,
            expiry: details.expiry,
        })
        .collect())
}
