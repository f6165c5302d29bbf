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

//! Names of the secrets that belong to a tenant.

use rand::Rng;
use rand::distributions::Alphanumeric;

pub fn credentials(tenant: &str) -> String {
    format!("{}-secret", tenant)
}

pub fn configuration(tenant: &str) -> String {
    format!("{}-env-configuration", tenant)
}

pub fn user(tenant: &str, index: usize) -> String {
    format!("{}-user-{}", tenant, index)
}

pub fn registry(tenant: &str) -> String {
    format!("{}-regcred", tenant)
}

/// The `i`-th secret of a rotated keypair set.
pub fn key_pair(base: &str, index: usize) -> String {
    format!("{}-{}", base, index)
}

pub fn rotated_server_certificate(tenant: &str, suffix: &str) -> String {
    format!("{}-{}-external-server-certificate", tenant, suffix)
}

pub fn rotated_client_certificate(tenant: &str, suffix: &str) -> String {
    format!("{}-{}-external-client-certificate", tenant, suffix)
}

pub fn rotated_ca_certificate(tenant: &str, suffix: &str, index: usize) -> String {
    format!("{}-{}-ca-certificate-{}", tenant, suffix, index)
}

pub fn server_certificate(tenant: &str) -> String {
    format!("{}-external-server-certificate", tenant)
}

pub fn client_certificate(tenant: &str) -> String {
    format!("{}-external-client-certificate", tenant)
}

pub fn ca_certificate(tenant: &str, index: usize) -> String {
    format!("{}-ca-certificate-{}", tenant, index)
}

/// Server certificates replaced through the certificates endpoint.
pub fn instance_certificates(tenant: &str) -> String {
    format!("{}-instance-external-certificates", tenant)
}

pub fn kes_configuration(tenant: &str) -> String {
    format!("{}-secret-kes-configuration", tenant)
}

pub fn kes_client_cert(tenant: &str) -> String {
    format!("{}-secret-kes-client-cert", tenant)
}

pub fn kes_external_cert(tenant: &str) -> String {
    format!("{}-secret-kes-external-cert", tenant)
}

/// Client certificate MinIO presents to KES, written on update.
pub fn tenant_kes_client_cert(tenant: &str) -> String {
    format!("{}-secret-tenant-external-client-cert", tenant)
}

/// Client certificate MinIO presents to KES, written on create.
pub fn created_kes_client_cert(tenant: &str) -> String {
    format!("{}-external-client-certificate-kes", tenant)
}

/// Five lowercase letters for rotated secret names.
pub fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..5)
        .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
        .collect()
}

/// Identifier labelling the secrets written by one composer call.
pub fn operation_id() -> String {
    random_alphanumeric(12).to_lowercase()
}

pub fn random_alphanumeric(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
