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

//! Secrets that hang off a tenant.
//!
//! Certificate and KES secrets are immutable, so replacing one means deleting it
//! and creating it again. Every secret written here carries the tenant label, and
//! the operation label when the materializer belongs to a single composer call.

pub mod configuration;
pub mod envfile;
pub mod names;
mod registry;

use crate::error::{
    Error, InvalidCertificateEncodingSnafu, InvalidCertificateSnafu, InvalidKeyPairSnafu, Result,
};
use crate::gateway::Gateway;
use crate::models::security::KeyPairConfiguration;
use crate::types::v2::certificate::{CertificateSecretType, LocalCertificateReference};
use crate::types::v2::tenant::TENANT_LABEL;
use crate::utils::tls;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use k8s_openapi::ByteString;
use k8s_openapi::api::core::v1 as corev1;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use snafu::{ResultExt, ensure};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// Label grouping the secrets written by one composer call.
pub const OPERATION_LABEL: &str = "v1.min.io/operation";

pub const TLS_CERT_KEY: &str = "tls.crt";
pub const TLS_PRIVATE_KEY: &str = "tls.key";
pub const CA_CERT_KEY: &str = "public.crt";

/// An opaque secret to write, keyed by data entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpaqueSecret {
    pub name: String,
    pub data: BTreeMap<String, Vec<u8>>,
}

impl OpaqueSecret {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

pub struct Materializer<'a> {
    gateway: &'a dyn Gateway,
    namespace: &'a str,
    tenant: &'a str,
    operation: Option<&'a str>,
    written: AtomicBool,
}

impl<'a> Materializer<'a> {
    pub fn new(gateway: &'a dyn Gateway, namespace: &'a str, tenant: &'a str) -> Self {
        Self {
            gateway,
            namespace,
            tenant,
            operation: None,
            written: AtomicBool::new(false),
        }
    }

    /// Tags every written secret with `v1.min.io/operation=<operation>`.
    pub fn for_operation(mut self, operation: &'a str) -> Self {
        self.operation = Some(operation);
        self
    }

    /// Whether at least one secret was created, or may have been when a
    /// create was cancelled in flight.
    pub fn has_written(&self) -> bool {
        self.written.load(Ordering::SeqCst)
    }

    pub fn labels(&self) -> BTreeMap<String, String> {
        let mut labels = BTreeMap::from([(TENANT_LABEL.to_string(), self.tenant.to_string())]);
        if let Some(operation) = self.operation {
            labels.insert(OPERATION_LABEL.to_string(), operation.to_string());
        }
        labels
    }

    /// Selector matching what this materializer writes.
    pub fn selector(&self) -> String {
        self.labels()
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(",")
    }

    pub(crate) fn secret(
        &self,
        name: &str,
        type_: &str,
        data: BTreeMap<String, Vec<u8>>,
        immutable: bool,
    ) -> corev1::Secret {
        corev1::Secret {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(self.namespace.to_string()),
                labels: Some(self.labels()),
                ..Default::default()
            },
            type_: Some(type_.to_string()),
            immutable: immutable.then_some(true),
            data: Some(
                data.into_iter()
                    .map(|(k, v)| (k, ByteString(v)))
                    .collect(),
            ),
            ..Default::default()
        }
    }

    pub async fn create(&self, secret: &corev1::Secret) -> Result<corev1::Secret> {
        match self.gateway.create_secret(self.namespace, secret).await {
            Ok(created) => {
                self.written.store(true, Ordering::SeqCst);
                debug!(namespace = self.namespace, name = ?secret.metadata.name, "secret created");
                Ok(created)
            }
            Err(e) => {
                // the server may have stored it before the call was dropped
                if e.is_cancelled() {
                    self.written.store(true, Ordering::SeqCst);
                }
                Err(e)
            }
        }
    }

    /// Deletes the secret when present.
    pub async fn delete_if_exists(&self, name: &str) -> Result<()> {
        match self.gateway.delete_secret(self.namespace, name).await {
            Err(e) if e.is_not_found() => Ok(()),
            other => other,
        }
    }

    /// Delete-then-create.
    pub async fn replace(&self, secret: &corev1::Secret) -> Result<corev1::Secret> {
        if let Some(name) = secret.metadata.name.as_deref() {
            self.delete_if_exists(name).await?;
        }
        self.create(secret).await
    }

    /// Writes immutable opaque secrets, skipping the ones without data.
    pub async fn create_or_replace_opaque(
        &self,
        secrets: Vec<OpaqueSecret>,
    ) -> Result<Vec<LocalCertificateReference>> {
        let mut refs = Vec::with_capacity(secrets.len());
        for OpaqueSecret { name, data } in secrets {
            if data.is_empty() {
                continue;
            }
            let secret = self.secret(&name, "Opaque", data, true);
            self.replace(&secret).await?;
            refs.push(LocalCertificateReference::new(
                name,
                CertificateSecretType::Opaque,
            ));
        }
        Ok(refs)
    }

    /// Writes one `kubernetes.io/tls` secret per pair, named `{base}-{i}`.
    ///
    /// Every pair is validated before anything is written.
    pub async fn create_or_replace_key_pairs(
        &self,
        base: &str,
        pairs: &[KeyPairConfiguration],
    ) -> Result<Vec<LocalCertificateReference>> {
        let decoded = pairs
            .iter()
            .enumerate()
            .map(|(i, pair)| {
                let name = names::key_pair(base, i);
                let (crt, key) = decode_key_pair(&name, pair)?;
                Ok((name, crt, key))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut refs = Vec::with_capacity(decoded.len());
        for (name, crt, key) in decoded {
            let data = BTreeMap::from([
                (TLS_CERT_KEY.to_string(), crt),
                (TLS_PRIVATE_KEY.to_string(), key),
            ]);
            let secret = self.secret(&name, "kubernetes.io/tls", data, true);
            self.replace(&secret).await?;
            refs.push(LocalCertificateReference::new(
                name,
                CertificateSecretType::KubernetesTls,
            ));
        }

        if !refs.is_empty() {
            info!(namespace = self.namespace, tenant = self.tenant, base, count = refs.len(), "key pairs written");
        }
        Ok(refs)
    }

    /// Writes CA bundles as `public.crt`, one secret per entry.
    pub async fn create_or_replace_ca_certificates(
        &self,
        bundles: &[String],
        name_of: impl Fn(usize) -> String,
    ) -> Result<Vec<LocalCertificateReference>> {
        let secrets = bundles
            .iter()
            .enumerate()
            .filter(|(_, bundle)| !bundle.is_empty())
            .map(|(i, bundle)| {
                let name = name_of(i);
                let pem = decode(&name, bundle)?;
                Ok(OpaqueSecret::new(name).with(CA_CERT_KEY, pem))
            })
            .collect::<Result<Vec<_>>>()?;

        self.create_or_replace_opaque(secrets).await
    }
}

/// Base64 material of a secret named `name`.
pub fn decode(name: &str, value: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(value.trim())
        .context(InvalidCertificateEncodingSnafu { name })
}

/// Decodes and validates a keypair.
pub fn decode_key_pair(name: &str, pair: &KeyPairConfiguration) -> Result<(Vec<u8>, Vec<u8>)> {
    ensure!(
        !pair.crt.is_empty() && !pair.key.is_empty(),
        InvalidKeyPairSnafu { name }
    );

    let crt = decode(name, &pair.crt)?;
    let key = decode(name, &pair.key)?;
    tls::x509_key_pair(crt.as_slice(), key.as_slice()).context(InvalidCertificateSnafu { name })?;

    Ok((crt, key))
}

/// UTF-8 value of a secret entry.
pub fn value(secret: &corev1::Secret, key: &str) -> Option<String> {
    secret
        .data
        .as_ref()
        .and_then(|data| data.get(key))
        .and_then(|bytes| String::from_utf8(bytes.0.clone()).ok())
        .or_else(|| {
            secret
                .string_data
                .as_ref()
                .and_then(|data| data.get(key).cloned())
        })
}

pub(crate) fn not_found(kind: &str, name: &str) -> Error {
    Error::NotFound {
        resource: format!("{} {}", kind, name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::gateway::Cancellable;
    use crate::gateway::fake::FakeGateway;
    use crate::tests::{EC_SEC1_CERT, EC_SEC1_KEY, RSA_PKCS8_CERT, RSA_PKCS8_KEY, b64, opaque_secret};
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    fn pair(crt: &str, key: &str) -> KeyPairConfiguration {
        KeyPairConfiguration::new(b64(crt), b64(key))
    }

    #[tokio::test]
    async fn test_key_pairs_are_named_and_labelled() {
        let gateway = FakeGateway::new();
        let materializer = Materializer::new(&gateway, "ns1", "acme").for_operation("op1");

        let refs = materializer
            .create_or_replace_key_pairs(
                "acme-abcde-external-server-certificate",
                &[pair(RSA_PKCS8_CERT, RSA_PKCS8_KEY), pair(EC_SEC1_CERT, EC_SEC1_KEY)],
            )
            .await
            .unwrap();

        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].name, "acme-abcde-external-server-certificate-0");
        assert_eq!(refs[1].name, "acme-abcde-external-server-certificate-1");
        assert_eq!(refs[0].type_, "kubernetes.io/tls");

        let secret = gateway
            .secret("ns1", "acme-abcde-external-server-certificate-0")
            .unwrap();
        assert_eq!(secret.immutable, Some(true));
        assert_eq!(secret.type_.as_deref(), Some("kubernetes.io/tls"));
        assert_eq!(secret.metadata.labels.as_ref().unwrap()[TENANT_LABEL], "acme");
        assert_eq!(secret.metadata.labels.as_ref().unwrap()[OPERATION_LABEL], "op1");
        assert_eq!(
            gateway
                .secret_value("ns1", "acme-abcde-external-server-certificate-0", TLS_CERT_KEY)
                .unwrap(),
            RSA_PKCS8_CERT
        );
        assert!(materializer.has_written());
    }

    #[tokio::test]
    async fn test_empty_key_pair_fails_before_writing() {
        let gateway = FakeGateway::new();
        let materializer = Materializer::new(&gateway, "ns1", "acme");

        let err = materializer
            .create_or_replace_key_pairs(
                "base",
                &[pair(RSA_PKCS8_CERT, RSA_PKCS8_KEY), KeyPairConfiguration::new(b64(RSA_PKCS8_CERT), "")],
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidKeyPair);
        assert!(gateway.secret_names("ns1").is_empty());
        assert!(!materializer.has_written());
    }

    #[tokio::test]
    async fn test_mismatched_key_pair_is_invalid_certificate() {
        let gateway = FakeGateway::new();
        let materializer = Materializer::new(&gateway, "ns1", "acme");

        let err = materializer
            .create_or_replace_key_pairs("base", &[pair(RSA_PKCS8_CERT, EC_SEC1_KEY)])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCertificate);

        let err = materializer
            .create_or_replace_key_pairs("base", &[KeyPairConfiguration::new("%%%", "%%%")])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCertificate);
    }

    #[tokio::test]
    async fn test_no_pairs_is_a_no_op() {
        let gateway = FakeGateway::new();
        let materializer = Materializer::new(&gateway, "ns1", "acme");
        let refs = materializer.create_or_replace_key_pairs("base", &[]).await.unwrap();
        assert!(refs.is_empty());
        assert!(gateway.journal().is_empty());
    }

    #[tokio::test]
    async fn test_replace_deletes_existing_secret_first() {
        let gateway = FakeGateway::new();
        let materializer = Materializer::new(&gateway, "ns1", "acme");
        let old = materializer.secret("acme-ca-certificate-0", "Opaque", BTreeMap::new(), true);
        gateway.insert_secret("ns1", old);

        let refs = materializer
            .create_or_replace_ca_certificates(&[b64(RSA_PKCS8_CERT)], |i| {
                names::ca_certificate("acme", i)
            })
            .await
            .unwrap();

        assert_eq!(refs[0].name, "acme-ca-certificate-0");
        assert_eq!(refs[0].type_, "Opaque");
        assert_eq!(
            gateway.journal(),
            vec![
                "delete_secret ns1/acme-ca-certificate-0",
                "create_secret ns1/acme-ca-certificate-0"
            ]
        );
        assert_eq!(
            gateway
                .secret_value("ns1", "acme-ca-certificate-0", CA_CERT_KEY)
                .unwrap(),
            RSA_PKCS8_CERT
        );
    }

    #[tokio::test]
    async fn test_cancelled_create_counts_as_written() {
        let gateway = Arc::new(FakeGateway::new());
        let token = CancellationToken::new();
        gateway.interrupt_on("create_secret ns1/cfg", token.clone());
        let cancellable = Cancellable::new(gateway.clone(), token);
        let materializer = Materializer::new(&cancellable, "ns1", "acme").for_operation("op1");

        let err = materializer
            .create_or_replace_opaque(vec![OpaqueSecret::new("cfg").with("k", "v")])
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert!(gateway.secret("ns1", "cfg").is_some());
        assert!(materializer.has_written());
    }

    #[tokio::test]
    async fn test_rejected_create_is_not_written() {
        let gateway = FakeGateway::new();
        gateway.insert_secret("ns1", opaque_secret("acme-secret", &[]));
        let materializer = Materializer::new(&gateway, "ns1", "acme");

        let secret = materializer.secret("acme-secret", "Opaque", BTreeMap::new(), false);
        let err = materializer.create(&secret).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert!(!materializer.has_written());
    }

    #[tokio::test]
    async fn test_delete_failure_other_than_not_found_is_fatal() {
        let gateway = FakeGateway::new();
        gateway.fail_on("delete_secret ns1/cfg");
        let materializer = Materializer::new(&gateway, "ns1", "acme");

        let result = materializer
            .create_or_replace_opaque(vec![OpaqueSecret::new("cfg").with("k", "v")])
            .await;
        assert!(result.is_err());
        assert!(gateway.secret("ns1", "cfg").is_none());
    }

    #[tokio::test]
    async fn test_opaque_skips_empty_entries() {
        let gateway = FakeGateway::new();
        let materializer = Materializer::new(&gateway, "ns1", "acme");
        let refs = materializer
            .create_or_replace_opaque(vec![OpaqueSecret::new("empty")])
            .await
            .unwrap();
        assert!(refs.is_empty());
        assert!(gateway.journal().is_empty());
    }

    #[test]
    fn test_selector() {
        let gateway = FakeGateway::new();
        let materializer = Materializer::new(&gateway, "ns1", "acme");
        assert_eq!(materializer.selector(), "v1.min.io/tenant=acme");
        let materializer = materializer.for_operation("abc");
        assert_eq!(
            materializer.selector(),
            "v1.min.io/operation=abc,v1.min.io/tenant=acme"
        );
    }
}
