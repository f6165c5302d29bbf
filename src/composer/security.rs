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

//! TLS material and pod security context of a tenant.

use super::Composer;
use crate::gateway::Gateway;
use crate::error::Result;
use crate::models::security::{
    CertificateInfo, CustomCertificates, CustomCertificatesRequest, SecurityResponse,
    TlsConfiguration, UpdateSecurityRequest,
};
use crate::projection::{certificate_info, from_security_context, to_security_context};
use crate::secrets::{self, Materializer, names};
use crate::types::v2::certificate::LocalCertificateReference;
use crate::types::v2::tenant::Tenant;
use tracing::info;

fn validate_certificates(
    tenant: &str,
    suffix: &str,
    request: &CustomCertificatesRequest,
) -> Result<()> {
    let server = names::rotated_server_certificate(tenant, suffix);
    for (i, pair) in request.minio_server_certificates.iter().enumerate() {
        secrets::decode_key_pair(&names::key_pair(&server, i), pair)?;
    }
    let client = names::rotated_client_certificate(tenant, suffix);
    for (i, pair) in request.minio_client_certificates.iter().enumerate() {
        secrets::decode_key_pair(&names::key_pair(&client, i), pair)?;
    }
    for (i, bundle) in request.minio_ca_certificates.iter().enumerate() {
        if !bundle.is_empty() {
            secrets::decode(&names::rotated_ca_certificate(tenant, suffix, i), bundle)?;
        }
    }
    Ok(())
}

fn retain_kept(references: &mut Vec<LocalCertificateReference>, removed: &[String]) {
    references.retain(|reference| !removed.contains(&reference.name));
}

impl Composer {
    async fn certificates(
        &self,
        namespace: &str,
        references: &[LocalCertificateReference],
    ) -> Result<Vec<CertificateInfo>> {
        let mut certificates = Vec::new();
        for reference in references {
            let secret = self.gateway.get_secret(namespace, &reference.name).await?;
            certificates.extend(certificate_info(&secret, reference.secret_type())?);
        }
        Ok(certificates)
    }

    pub async fn security(&self, namespace: &str, name: &str) -> Result<SecurityResponse> {
        let tenant = self.load(namespace, name).await?;
        let spec = &tenant.spec;

        Ok(SecurityResponse {
            auto_cert: tenant.auto_cert_enabled(),
            custom_certificates: CustomCertificates {
                minio: self.certificates(namespace, &spec.external_cert_secret).await?,
                minio_cas: self.certificates(namespace, &spec.external_ca_cert_secret).await?,
                client: self
                    .certificates(namespace, &spec.external_client_cert_secrets)
                    .await?,
            },
            security_context: spec
                .pools
                .first()
                .and_then(|pool| pool.security_context.as_ref())
                .map(from_security_context),
        })
    }

    /// Drops removed certificate references, writes the new ones under a
    /// fresh suffix and applies the security context to every pool.
    ///
    /// Removed secrets are left in place.
    pub async fn update_security(
        &self,
        namespace: &str,
        name: &str,
        request: &UpdateSecurityRequest,
    ) -> Result<()> {
        let tenant = self.load(namespace, name).await?;
        let operation = names::operation_id();
        let materializer =
            Materializer::new(&self.gateway, namespace, name).for_operation(&operation);

        let result = self
            .apply_security(namespace, tenant, request, &materializer)
            .await;
        self.settle(namespace, &materializer, result).await
    }

    async fn apply_security(
        &self,
        namespace: &str,
        mut tenant: Tenant,
        request: &UpdateSecurityRequest,
        materializer: &Materializer<'_>,
    ) -> Result<()> {
        let name = tenant.name();
        let suffix = names::random_suffix();
        let security_context = request
            .security_context
            .as_ref()
            .map(to_security_context)
            .transpose()?;
        if let Some(certificates) = &request.custom_certificates {
            validate_certificates(&name, &suffix, certificates)?;
        }

        tenant.spec.request_auto_cert = Some(request.auto_cert);

        if let Some(certificates) = &request.custom_certificates {
            let removed = &certificates.secrets_to_be_deleted;
            let spec = &mut tenant.spec;
            retain_kept(&mut spec.external_cert_secret, removed);
            retain_kept(&mut spec.external_client_cert_secrets, removed);
            retain_kept(&mut spec.external_ca_cert_secret, removed);

            let server = materializer
                .create_or_replace_key_pairs(
                    &names::rotated_server_certificate(&name, &suffix),
                    &certificates.minio_server_certificates,
                )
                .await?;
            spec.external_cert_secret.extend(server);

            let client = materializer
                .create_or_replace_key_pairs(
                    &names::rotated_client_certificate(&name, &suffix),
                    &certificates.minio_client_certificates,
                )
                .await?;
            spec.external_client_cert_secrets.extend(client);

            let cas = materializer
                .create_or_replace_ca_certificates(&certificates.minio_ca_certificates, |i| {
                    names::rotated_ca_certificate(&name, &suffix, i)
                })
                .await?;
            spec.external_ca_cert_secret.extend(cas);
        }

        if let Some(context) = security_context {
            for pool in &mut tenant.spec.pools {
                pool.security_context = Some(context.clone());
            }
        }

        self.gateway.update_tenant(namespace, &tenant).await?;
        info!(namespace, tenant = %name, suffix = %suffix, auto_cert = request.auto_cert, "security updated");
        Ok(())
    }

    /// Replaces the server certificates of a tenant that already uses
    /// external ones. Other tenants are left untouched.
    pub async fn update_certificates(
        &self,
        namespace: &str,
        name: &str,
        request: &TlsConfiguration,
    ) -> Result<()> {
        let mut tenant = self.load(namespace, name).await?;
        if !tenant.external_cert_enabled() || request.minio_server_certificates.is_empty() {
            info!(namespace, tenant = name, "no external server certificates to replace");
            return Ok(());
        }

        let operation = names::operation_id();
        let materializer =
            Materializer::new(&self.gateway, namespace, name).for_operation(&operation);
        let result = async {
            tenant.spec.external_cert_secret = materializer
                .create_or_replace_key_pairs(
                    &names::instance_certificates(name),
                    &request.minio_server_certificates,
                )
                .await?;
            self.gateway.update_tenant(namespace, &tenant).await?;
            info!(namespace, tenant = name, "server certificates replaced");
            Ok::<_, crate::error::Error>(())
        }
        .await;
        self.settle(namespace, &materializer, result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::testing::Harness;
    use crate::error::ErrorKind;
    use crate::models::pool::SecurityContext;
    use crate::models::security::KeyPairConfiguration;
    use crate::tests::{EC_SEC1_CERT, EC_SEC1_KEY, RSA_PKCS8_CERT, RSA_PKCS8_KEY, b64, create_test_tenant};
    use crate::types::v2::certificate::CertificateSecretType;
    use k8s_openapi::ByteString;
    use k8s_openapi::api::core::v1 as corev1;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use std::collections::BTreeMap;

    fn tls_secret(name: &str, cert: &str) -> corev1::Secret {
        corev1::Secret {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            type_: Some("kubernetes.io/tls".to_string()),
            data: Some(BTreeMap::from([(
                "tls.crt".to_string(),
                ByteString(cert.as_bytes().to_vec()),
            )])),
            ..Default::default()
        }
    }

    fn tls_ref(name: &str) -> LocalCertificateReference {
        LocalCertificateReference::new(name, CertificateSecretType::KubernetesTls)
    }

    fn harness_with_external_cert() -> Harness {
        let harness = Harness::new();
        let mut tenant = create_test_tenant("acme", "ns1");
        tenant.spec.request_auto_cert = Some(false);
        tenant.spec.external_cert_secret = vec![tls_ref("acme-a")];
        harness.gateway.insert_tenant(tenant);
        harness.gateway.insert_secret("ns1", tls_secret("acme-a", RSA_PKCS8_CERT));
        harness
    }

    fn rsa_pair() -> KeyPairConfiguration {
        KeyPairConfiguration::new(b64(RSA_PKCS8_CERT), b64(RSA_PKCS8_KEY))
    }

    #[tokio::test]
    async fn test_rotate_server_certificate() {
        let harness = harness_with_external_cert();
        let request = UpdateSecurityRequest {
            custom_certificates: Some(CustomCertificatesRequest {
                minio_server_certificates: vec![rsa_pair()],
                secrets_to_be_deleted: vec!["acme-a".to_string()],
                ..Default::default()
            }),
            ..Default::default()
        };

        harness
            .composer()
            .update_security("ns1", "acme", &request)
            .await
            .unwrap();

        let refs = harness.gateway.tenant("ns1", "acme").unwrap().spec.external_cert_secret;
        assert_eq!(refs.len(), 1);
        let name = &refs[0].name;
        assert!(name.starts_with("acme-"), "{name}");
        assert!(name.ends_with("-external-server-certificate-0"), "{name}");
        assert_ne!(name, "acme-a");
        assert!(harness.gateway.secret("ns1", "acme-a").is_some());
        assert!(harness.gateway.secret("ns1", name).is_some());
    }

    #[tokio::test]
    async fn test_security_context_applies_to_every_pool() {
        let harness = Harness::new();
        let mut tenant = create_test_tenant("acme", "ns1");
        tenant.spec.pools.push(tenant.spec.pools[0].clone());
        tenant.spec.pools[1].name = "pool-1".to_string();
        harness.gateway.insert_tenant(tenant);
        let context = SecurityContext {
            run_as_user: "1000".to_string(),
            run_as_group: "1000".to_string(),
            fs_group: "1000".to_string(),
            run_as_non_root: true,
            ..Default::default()
        };
        let request = UpdateSecurityRequest {
            auto_cert: true,
            security_context: Some(context),
            ..Default::default()
        };
        let composer = harness.composer();

        composer.update_security("ns1", "acme", &request).await.unwrap();
        let first = harness.gateway.tenant("ns1", "acme").unwrap().spec;
        composer.update_security("ns1", "acme", &request).await.unwrap();
        let second = harness.gateway.tenant("ns1", "acme").unwrap().spec;

        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
        assert_eq!(second.request_auto_cert, Some(true));
        for pool in &second.pools {
            assert_eq!(pool.security_context.as_ref().unwrap().run_as_user, Some(1000));
        }

        let security = composer.security("ns1", "acme").await.unwrap();
        assert!(security.auto_cert);
        assert_eq!(security.security_context.unwrap().fs_group, "1000");
    }

    #[tokio::test]
    async fn test_invalid_pair_leaves_tenant_alone() {
        let harness = harness_with_external_cert();
        let request = UpdateSecurityRequest {
            custom_certificates: Some(CustomCertificatesRequest {
                minio_server_certificates: vec![rsa_pair()],
                minio_client_certificates: vec![KeyPairConfiguration::new(
                    b64(RSA_PKCS8_CERT),
                    b64(EC_SEC1_KEY),
                )],
                secrets_to_be_deleted: vec!["acme-a".to_string()],
                ..Default::default()
            }),
            ..Default::default()
        };

        let err = harness
            .composer()
            .update_security("ns1", "acme", &request)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCertificate);
        assert_eq!(harness.gateway.secret_names("ns1"), vec!["acme-a"]);
        let refs = harness.gateway.tenant("ns1", "acme").unwrap().spec.external_cert_secret;
        assert_eq!(refs, vec![tls_ref("acme-a")]);
    }

    #[tokio::test]
    async fn test_failed_update_rolls_back_rotation() {
        let harness = harness_with_external_cert();
        harness.gateway.fail_on("update_tenant ns1/acme");
        let request = UpdateSecurityRequest {
            custom_certificates: Some(CustomCertificatesRequest {
                minio_server_certificates: vec![rsa_pair()],
                minio_ca_certificates: vec![b64(EC_SEC1_CERT)],
                ..Default::default()
            }),
            ..Default::default()
        };

        assert!(
            harness
                .composer()
                .update_security("ns1", "acme", &request)
                .await
                .is_err()
        );
        assert_eq!(harness.gateway.secret_names("ns1"), vec!["acme-a"]);
    }

    #[tokio::test]
    async fn test_cancelled_rotation_is_rolled_back() {
        let harness = harness_with_external_cert();
        harness
            .gateway
            .interrupt_on("create_secret ns1/acme-", harness.token.clone());
        let request = UpdateSecurityRequest {
            custom_certificates: Some(CustomCertificatesRequest {
                minio_server_certificates: vec![rsa_pair()],
                ..Default::default()
            }),
            ..Default::default()
        };

        let err = harness
            .composer()
            .update_security("ns1", "acme", &request)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(harness.gateway.secret_names("ns1"), vec!["acme-a"]);
        let refs = harness.gateway.tenant("ns1", "acme").unwrap().spec.external_cert_secret;
        assert_eq!(refs, vec![tls_ref("acme-a")]);
    }

    #[tokio::test]
    async fn test_security_lists_certificates() {
        let harness = harness_with_external_cert();
        let security = harness.composer().security("ns1", "acme").await.unwrap();
        assert!(!security.auto_cert);
        assert_eq!(security.custom_certificates.minio.len(), 1);
        assert_eq!(security.custom_certificates.minio[0].name, "acme-a");
        assert_eq!(security.custom_certificates.minio[0].domains, vec!["localhost"]);
        assert!(security.custom_certificates.client.is_empty());
        assert!(security.security_context.is_none());
    }

    #[tokio::test]
    async fn test_update_certificates_replaces_instance_secret() {
        let harness = harness_with_external_cert();
        let request = TlsConfiguration {
            minio_server_certificates: vec![rsa_pair()],
            ..Default::default()
        };

        harness
            .composer()
            .update_certificates("ns1", "acme", &request)
            .await
            .unwrap();
        let refs = harness.gateway.tenant("ns1", "acme").unwrap().spec.external_cert_secret;
        assert_eq!(refs, vec![tls_ref("acme-instance-external-certificates-0")]);
    }

    #[tokio::test]
    async fn test_update_certificates_skips_tenants_without_external_certs() {
        let harness = Harness::new();
        harness.gateway.insert_tenant(create_test_tenant("acme", "ns1"));
        let request = TlsConfiguration {
            minio_server_certificates: vec![rsa_pair()],
            ..Default::default()
        };

        harness
            .composer()
            .update_certificates("ns1", "acme", &request)
            .await
            .unwrap();
        assert!(harness.gateway.secret_names("ns1").is_empty());
        assert!(!harness.gateway.journal().contains(&"update_tenant ns1/acme".to_string()));
    }
}
