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

//! Tenant creation.

use super::Composer;
use super::encryption::{KesPlan, plan_kes, write_kes, write_minio_mtls};
use super::identity::{CONSOLE_ACCESS_KEY, CONSOLE_SECRET_KEY, apply_identity};
use super::pools::plan_pools;
use crate::gateway::Gateway;
use crate::error::{Error, InvalidErasureCodingSnafu, Result};
use crate::models::security::TlsConfiguration;
use crate::models::tenant::{ConsoleCredentials, CreateTenantRequest, CreateTenantResponse};
use crate::secrets::configuration::{ACCESS_KEY, SECRET_KEY};
use crate::secrets::{self, Materializer, names};
use crate::types::v2::features::{ExposeServices, Features, TenantDomains};
use crate::types::v2::pool::Pool;
use crate::types::v2::tenant::{DEFAULT_MINIO_IMAGE, DEFAULT_MOUNT_PATH, Tenant, TenantSpec};
use k8s_openapi::api::core::v1 as corev1;
use kube::api::ObjectMeta;
use snafu::ensure;
use std::collections::BTreeMap;
use tracing::{info, warn};

const ACCESS_KEY_LENGTH: usize = 16;
const SECRET_KEY_LENGTH: usize = 32;

const MIN_PARITY: i64 = 2;
const MAX_PARITY: i64 = 8;

fn validate_tls(name: &str, tls: &TlsConfiguration) -> Result<()> {
    for (i, pair) in tls.minio_server_certificates.iter().enumerate() {
        secrets::decode_key_pair(&names::key_pair(&names::server_certificate(name), i), pair)?;
    }
    for (i, pair) in tls.minio_client_certificates.iter().enumerate() {
        secrets::decode_key_pair(&names::key_pair(&names::client_certificate(name), i), pair)?;
    }
    for (i, bundle) in tls.minio_ca_certificates.iter().enumerate() {
        if !bundle.is_empty() {
            secrets::decode(&names::ca_certificate(name, i), bundle)?;
        }
    }
    Ok(())
}

fn user_secret(materializer: &Materializer<'_>, name: &str, data: &[(&str, &str)]) -> corev1::Secret {
    let data = data
        .iter()
        .map(|(key, value)| (key.to_string(), value.as_bytes().to_vec()))
        .collect();
    materializer.secret(name, "Opaque", data, true)
}

impl Composer {
    /// Writes the secrets of a new tenant, then creates it.
    ///
    /// Once the credentials secret exists, any failure deletes every secret
    /// carrying the tenant label.
    pub async fn create_tenant(&self, request: &CreateTenantRequest) -> Result<CreateTenantResponse> {
        let namespace = request.namespace.as_str();
        let name = request.name.as_str();
        if namespace.is_empty() || name.is_empty() {
            return Err(Error::invalid_request("tenant name and namespace are required"));
        }

        let parity = request.erasure_coding_parity;
        if parity > 0 {
            ensure!(
                (MIN_PARITY..=MAX_PARITY).contains(&parity),
                InvalidErasureCodingSnafu { parity }
            );
        }
        let pools = plan_pools(&request.pools, &[])?;
        if let Some(tls) = &request.tls {
            validate_tls(name, tls)?;
        }
        let kes_plan = request
            .encryption
            .as_ref()
            .map(|config| plan_kes(name, config))
            .transpose()?;

        let operation = names::operation_id();
        let materializer =
            Materializer::new(&self.gateway, namespace, name).for_operation(&operation);
        let result = self
            .compose_tenant(request, pools, kes_plan, &materializer)
            .await;
        self.settle(namespace, &materializer, result).await
    }

    async fn compose_tenant(
        &self,
        request: &CreateTenantRequest,
        pools: Vec<Pool>,
        kes_plan: Option<KesPlan>,
        materializer: &Materializer<'_>,
    ) -> Result<CreateTenantResponse> {
        let namespace = request.namespace.as_str();
        let name = request.name.as_str();

        let access_key = match request.access_key.as_str() {
            "" => names::random_alphanumeric(ACCESS_KEY_LENGTH),
            key => key.to_string(),
        };
        let secret_key = match request.secret_key.as_str() {
            "" => names::random_alphanumeric(SECRET_KEY_LENGTH),
            key => key.to_string(),
        };

        // legacy credentials secret, kept empty; a second create of the same
        // tenant stops here before anything else is written
        let credentials = names::credentials(name);
        materializer
            .create(&user_secret(
                materializer,
                &credentials,
                &[(ACCESS_KEY, ""), (SECRET_KEY, "")],
            ))
            .await?;

        let console_enabled = request.enable_console.unwrap_or(true);
        let mut env = BTreeMap::from([
            (
                "MINIO_BROWSER".to_string(),
                if console_enabled { "on" } else { "off" }.to_string(),
            ),
            ("MINIO_ROOT_USER".to_string(), access_key),
            ("MINIO_ROOT_PASSWORD".to_string(), secret_key),
        ]);
        if request.erasure_coding_parity > 0 {
            env.insert(
                "MINIO_STORAGE_CLASS_STANDARD".to_string(),
                format!("EC:{}", request.erasure_coding_parity),
            );
        }

        let mut spec = TenantSpec {
            image: match request.image.trim() {
                "" => DEFAULT_MINIO_IMAGE.to_string(),
                image => image.to_string(),
            },
            pools,
            creds_secret: Some(corev1::LocalObjectReference { name: credentials }),
            mount_path: Some(match request.mount_path.as_str() {
                "" => DEFAULT_MOUNT_PATH.to_string(),
                path => path.to_string(),
            }),
            ..Default::default()
        };

        let mut external_idp = false;
        let idp = request.idp.as_ref();
        if let Some(ad) = idp.and_then(|idp| idp.active_directory.as_ref()) {
            external_idp = true;
            apply_identity(&mut env, None, Some(ad));
            for (i, dn) in ad.user_dns.iter().enumerate() {
                let user = names::user(name, i);
                materializer
                    .create(&user_secret(materializer, &user, &[(CONSOLE_ACCESS_KEY, dn.as_str())]))
                    .await?;
                spec.users.push(corev1::LocalObjectReference { name: user });
            }
        } else if let Some(oidc) = idp.and_then(|idp| idp.oidc.as_ref()) {
            external_idp = true;
            apply_identity(&mut env, Some(oidc), None);
        } else if let Some(idp) = idp {
            for (i, key) in idp.keys.iter().enumerate() {
                let user = names::user(name, i);
                let data = [
                    (CONSOLE_ACCESS_KEY, key.access_key.as_str()),
                    (CONSOLE_SECRET_KEY, key.secret_key.as_str()),
                ];
                materializer
                    .create(&user_secret(materializer, &user, &data))
                    .await?;
                spec.users.push(corev1::LocalObjectReference { name: user });
            }
        }

        spec.request_auto_cert = request.enable_tls;
        let mut can_encrypt = request.enable_tls == Some(true);

        if let Some(tls) = &request.tls {
            spec.external_cert_secret = materializer
                .create_or_replace_key_pairs(
                    &names::server_certificate(name),
                    &tls.minio_server_certificates,
                )
                .await?;
            can_encrypt |= !spec.external_cert_secret.is_empty();

            spec.external_client_cert_secrets = materializer
                .create_or_replace_key_pairs(
                    &names::client_certificate(name),
                    &tls.minio_client_certificates,
                )
                .await?;

            spec.external_ca_cert_secret = materializer
                .create_or_replace_ca_certificates(&tls.minio_ca_certificates, |i| {
                    names::ca_certificate(name, i)
                })
                .await?;
        }

        if let (Some(config), Some(plan)) = (&request.encryption, kes_plan) {
            if can_encrypt {
                spec.external_client_cert_secret =
                    write_minio_mtls(materializer, &names::created_kes_client_cert(name), config)
                        .await?;
                spec.kes = Some(write_kes(materializer, name, config, plan, Default::default()).await?);
            } else {
                warn!(namespace, tenant = name, "encryption requires TLS, skipping KES");
            }
        }

        if !request.image_pull_secret.is_empty() {
            spec.image_pull_secret = Some(corev1::LocalObjectReference {
                name: request.image_pull_secret.clone(),
            });
        } else if let Some(secret) = materializer
            .set_image_registry(request.image_registry.as_ref())
            .await?
        {
            spec.image_pull_secret = Some(corev1::LocalObjectReference { name: secret });
        }

        spec.expose_services = Some(ExposeServices {
            minio: request.expose_minio,
            console: request.expose_console,
        });

        for variable in &request.environment_variables {
            if !variable.key.trim().is_empty() {
                env.insert(variable.key.trim().to_string(), variable.value.clone());
            }
        }

        let configuration = names::configuration(name);
        materializer.write_configuration(&configuration, &env).await?;
        spec.configuration = Some(corev1::LocalObjectReference {
            name: configuration,
        });

        spec.features = Some(Features {
            bucket_dns: false,
            domains: request.domains.as_ref().map(|domains| TenantDomains {
                minio: domains.minio.clone(),
                console: domains.console.clone(),
            }),
            enable_sftp: request.expose_sftp.then_some(true),
        });

        let tenant = Tenant {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                labels: (!request.labels.is_empty()).then(|| request.labels.clone()),
                annotations: (!request.annotations.is_empty()).then(|| request.annotations.clone()),
                ..Default::default()
            },
            spec,
            status: None,
        };
        let created = self.gateway.create_tenant(namespace, &tenant).await?;
        info!(namespace, tenant = name, pools = created.spec.pools.len(), "tenant created");

        let mut console = Vec::new();
        if !external_idp {
            if let Some(idp) = idp {
                let url = created.service_url()?;
                console = idp
                    .keys
                    .iter()
                    .map(|key| ConsoleCredentials {
                        access_key: key.access_key.clone(),
                        secret_key: key.secret_key.clone(),
                        url: url.clone(),
                    })
                    .collect();
            }
        }

        Ok(CreateTenantResponse {
            external_idp,
            console,
        })
    }
}
