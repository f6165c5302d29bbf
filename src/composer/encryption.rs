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

//! KES encryption: read back, update and delete.

use super::Composer;
use crate::gateway::Gateway;
use crate::error::{ConfigurationMissingSnafu, InvalidReplicasSnafu, Result};
use crate::kes::{self, Backends, ServerConfig};
use crate::models::encryption::{EncryptionConfiguration, EncryptionInfo, KmsMtlsInfo};
use crate::models::from_key_values;
use crate::models::security::{CertificateInfo, KeyPairConfiguration};
use crate::projection::{self, from_security_context, to_security_context};
use crate::secrets::{self, Materializer, OpaqueSecret, names};
use crate::types::v2::certificate::LocalCertificateReference;
use crate::types::v2::kes::KesConfig;
use crate::types::v2::tenant::Tenant;
use k8s_openapi::api::core::v1 as corev1;
use snafu::{OptionExt, ResultExt};
use std::slice;
use tracing::info;

/// Pairs the client left blank count as not supplied.
pub(crate) fn supplied(pair: Option<&KeyPairConfiguration>) -> Option<&KeyPairConfiguration> {
    pair.filter(|pair| !pair.crt.is_empty() || !pair.key.is_empty())
}

/// Writes the MinIO client certificate KES authenticates, as `{base}-0`.
pub(crate) async fn write_minio_mtls(
    materializer: &Materializer<'_>,
    base: &str,
    config: &EncryptionConfiguration,
) -> Result<Option<LocalCertificateReference>> {
    let Some(pair) = supplied(config.minio_mtls.as_ref()) else {
        return Ok(None);
    };
    let refs = materializer
        .create_or_replace_key_pairs(base, slice::from_ref(pair))
        .await?;
    Ok(refs.into_iter().next())
}

/// KES settings validated ahead of any secret write.
pub(crate) struct KesPlan {
    image: String,
    replicas: i32,
    security_context: Option<corev1::PodSecurityContext>,
    material: kes::KesMaterial,
}

/// Validates image, replicas, security context, both key pairs and the
/// server configuration of `config`.
pub(crate) fn plan_kes(tenant: &str, config: &EncryptionConfiguration) -> Result<KesPlan> {
    let image = match config.image.trim() {
        "" => kes::DEFAULT_KES_IMAGE.to_string(),
        image => image.to_string(),
    };
    let replicas = match config.replicas.trim() {
        "" => kes::DEFAULT_REPLICAS,
        value => value.parse::<i32>().context(InvalidReplicasSnafu { value })?,
    };
    let security_context = config
        .security_context
        .as_ref()
        .map(to_security_context)
        .transpose()?;

    if let Some(pair) = supplied(config.server_tls.as_ref()) {
        secrets::decode_key_pair(&names::key_pair(&names::kes_external_cert(tenant), 0), pair)?;
    }
    if let Some(pair) = supplied(config.minio_mtls.as_ref()) {
        secrets::decode_key_pair("minio mTLS certificate", pair)?;
    }
    let material = kes::build(config, &image)?;

    Ok(KesPlan {
        image,
        replicas,
        security_context,
        material,
    })
}

/// Writes the KES secrets of `plan` and returns `kes` pointing at them.
pub(crate) async fn write_kes(
    materializer: &Materializer<'_>,
    tenant: &str,
    config: &EncryptionConfiguration,
    plan: KesPlan,
    mut kes: KesConfig,
) -> Result<KesConfig> {
    let KesPlan {
        image,
        replicas,
        security_context,
        material,
    } = plan;

    if let Some(pair) = supplied(config.server_tls.as_ref()) {
        let refs = materializer
            .create_or_replace_key_pairs(&names::kes_external_cert(tenant), slice::from_ref(pair))
            .await?;
        kes.external_cert_secret = refs.into_iter().next();
    }

    kes.client_cert_secret = if material.client_cert.is_empty() {
        None
    } else {
        let secret = OpaqueSecret {
            name: names::kes_client_cert(tenant),
            data: material.client_cert,
        };
        materializer
            .create_or_replace_opaque(vec![secret])
            .await?
            .into_iter()
            .next()
    };

    let configuration = names::kes_configuration(tenant);
    materializer
        .create_or_replace_opaque(vec![
            OpaqueSecret::new(configuration.as_str())
                .with(kes::SERVER_CONFIG_KEY, material.server_config),
        ])
        .await?;
    kes.kes_secret = Some(corev1::LocalObjectReference {
        name: configuration,
    });

    kes.image = image;
    kes.replicas = replicas;
    kes.security_context = security_context;
    kes.labels = from_key_values(&config.labels);
    kes.annotations = from_key_values(&config.annotations);
    kes.node_selector = from_key_values(&config.node_selector);

    info!(tenant, image = %kes.image, version = %material.version, "KES configuration written");
    Ok(kes)
}

/// First certificate stored under `key`, if the secret has that entry.
fn first_certificate_under(secret: &corev1::Secret, key: &str) -> Result<Option<CertificateInfo>> {
    let present = secret
        .data
        .as_ref()
        .is_some_and(|data| data.contains_key(key));
    if !present {
        return Ok(None);
    }
    Ok(projection::certificates_under(secret, key)?.into_iter().next())
}

impl Composer {
    async fn first_certificate(
        &self,
        namespace: &str,
        reference: Option<&LocalCertificateReference>,
    ) -> Result<Option<CertificateInfo>> {
        let Some(reference) = reference else {
            return Ok(None);
        };
        let secret = self.gateway.get_secret(namespace, &reference.name).await?;
        Ok(projection::certificate_info(&secret, reference.secret_type())?
            .into_iter()
            .next())
    }

    /// KES settings and the backend parsed back from `server-config.yaml`.
    pub async fn encryption_info(&self, namespace: &str, name: &str) -> Result<EncryptionInfo> {
        let tenant = self.load(namespace, name).await?;
        let kes = tenant
            .spec
            .kes
            .as_ref()
            .context(ConfigurationMissingSnafu { what: "encryption" })?;

        let image = if kes.image.is_empty() {
            kes::DEFAULT_KES_IMAGE.to_string()
        } else {
            kes.image.clone()
        };

        let server_tls = self
            .first_certificate(namespace, kes.external_cert_secret.as_ref())
            .await?;
        let minio_mtls = self
            .first_certificate(namespace, tenant.spec.external_client_cert_secret.as_ref())
            .await?;

        let kms_mtls = match &kes.client_cert_secret {
            Some(reference) => {
                let secret = self.gateway.get_secret(namespace, &reference.name).await?;
                Some(KmsMtlsInfo {
                    crt: first_certificate_under(&secret, kes::CLIENT_CERT_KEY)?,
                    ca: first_certificate_under(&secret, kes::CA_CERT_KEY)?,
                })
            }
            None => None,
        };

        let config_ref = kes.kes_secret.as_ref().context(ConfigurationMissingSnafu {
            what: "KES configuration secret",
        })?;
        let secret = self.gateway.get_secret(namespace, &config_ref.name).await?;
        let raw = secrets::value(&secret, kes::SERVER_CONFIG_KEY).context(
            ConfigurationMissingSnafu {
                what: kes::SERVER_CONFIG_KEY,
            },
        )?;
        let parsed = ServerConfig::parse(kes::version::select(&image)?, raw.as_bytes())?;
        let Backends {
            vault,
            aws,
            gemalto,
            gcp,
            azure,
        } = Backends::from(parsed.keys());

        Ok(EncryptionInfo {
            image,
            replicas: kes.replicas.to_string(),
            security_context: kes.security_context.as_ref().map(from_security_context),
            server_tls,
            minio_mtls,
            kms_mtls,
            raw,
            vault,
            aws,
            gemalto,
            gcp,
            azure,
        })
    }

    /// Rewrites the KES secrets and points the tenant at them.
    pub async fn update_encryption(
        &self,
        namespace: &str,
        name: &str,
        request: &EncryptionConfiguration,
    ) -> Result<()> {
        let tenant = self.load(namespace, name).await?;
        let operation = names::operation_id();
        let materializer =
            Materializer::new(&self.gateway, namespace, name).for_operation(&operation);

        let result = self
            .apply_encryption(namespace, tenant, request, &materializer)
            .await;
        self.settle(namespace, &materializer, result).await
    }

    async fn apply_encryption(
        &self,
        namespace: &str,
        mut tenant: Tenant,
        request: &EncryptionConfiguration,
        materializer: &Materializer<'_>,
    ) -> Result<()> {
        let name = tenant.name();
        let removed = |reference: &Option<LocalCertificateReference>| {
            reference
                .as_ref()
                .is_some_and(|r| request.secrets_to_be_deleted.contains(&r.name))
        };

        let mut kes = tenant.spec.kes.take().unwrap_or_default();
        if removed(&kes.external_cert_secret) {
            kes.external_cert_secret = None;
        }
        if removed(&tenant.spec.external_client_cert_secret) {
            tenant.spec.external_client_cert_secret = None;
        }

        let plan = plan_kes(&name, request)?;
        let kes = write_kes(materializer, &name, request, plan, kes).await?;
        if let Some(reference) =
            write_minio_mtls(materializer, &names::tenant_kes_client_cert(&name), request).await?
        {
            tenant.spec.external_client_cert_secret = Some(reference);
        }
        tenant.spec.kes = Some(kes);

        self.gateway.update_tenant(namespace, &tenant).await?;
        info!(namespace, tenant = %name, "encryption updated");
        Ok(())
    }

    /// Detaches KES. Its secrets stay until the tenant is deleted.
    pub async fn delete_encryption(&self, namespace: &str, name: &str) -> Result<()> {
        let mut tenant = self.load(namespace, name).await?;
        tenant.spec.kes = None;
        self.gateway.update_tenant(namespace, &tenant).await?;
        info!(namespace, tenant = name, "encryption disabled");
        Ok(())
    }
}
