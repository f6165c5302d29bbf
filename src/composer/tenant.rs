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

//! Tenant level reads plus the update and delete composers.

use super::Composer;
use crate::gateway::Gateway;
use crate::error::{AdminSnafu, Result};
use crate::models::tenant::{
    TenantDetails, TenantInfo, TenantList, TenantUsage, UpdateDomainsRequest,
    UpdateTenantRequest,
};
use crate::projection;
use crate::secrets::configuration::full_view;
use crate::secrets::{Materializer, names};
use crate::types::v2::features::{Features, TenantDomains};
use crate::types::v2::tenant::{
    MINIO_SERVICE_NAME, PROMETHEUS_PATH_ANNOTATION, PROMETHEUS_PORT_ANNOTATION,
    PROMETHEUS_SCRAPE_ANNOTATION, Tenant, tenant_selector,
};
use k8s_openapi::api::core::v1 as corev1;
use serde_json::json;
use snafu::ResultExt;
use std::collections::BTreeMap;
use tracing::{info, warn};

const LDAP_SERVER_KEY: &str = "MINIO_IDENTITY_LDAP_SERVER_ADDR";
const OIDC_CONFIG_URL_KEY: &str = "MINIO_IDENTITY_OPENID_CONFIG_URL";
const KMS_SECRET_KEY: &str = "MINIO_KMS_SECRET_KEY";

const PROMETHEUS_METRICS_PATH: &str = "/minio/prometheus/metrics";
const PROMETHEUS_METRICS_PORT: &str = "9000";

fn prometheus_annotations() -> [(&'static str, &'static str); 3] {
    [
        (PROMETHEUS_PATH_ANNOTATION, PROMETHEUS_METRICS_PATH),
        (PROMETHEUS_PORT_ANNOTATION, PROMETHEUS_METRICS_PORT),
        (PROMETHEUS_SCRAPE_ANNOTATION, "true"),
    ]
}

fn toggle_annotations(annotations: &mut BTreeMap<String, String>, enable: bool) {
    for (key, value) in prometheus_annotations() {
        if enable {
            annotations.insert(key.to_string(), value.to_string());
        } else {
            annotations.remove(key);
        }
    }
}

fn is_set(config: &BTreeMap<String, String>, key: &str) -> bool {
    config.get(key).is_some_and(|value| !value.is_empty())
}

impl Composer {
    pub async fn list_tenants(&self, namespace: Option<&str>) -> Result<TenantList> {
        let tenants: Vec<_> = self
            .gateway
            .list_tenants(namespace)
            .await?
            .iter()
            .map(projection::tenant_list_item)
            .collect();

        Ok(TenantList {
            total: tenants.len() as i64,
            tenants,
        })
    }

    pub async fn tenant_info(&self, namespace: &str, name: &str) -> Result<TenantInfo> {
        Ok(projection::tenant_info(&self.load(namespace, name).await?))
    }

    async fn service(&self, namespace: &str, name: &str) -> Option<corev1::Service> {
        match self.gateway.get_service(namespace, name).await {
            Ok(service) => Some(service),
            Err(e) => {
                warn!(namespace, service = name, error = %e, "service unavailable, continuing");
                None
            }
        }
    }

    pub async fn tenant_details(&self, namespace: &str, name: &str) -> Result<TenantDetails> {
        let tenant = self.load(namespace, name).await?;

        let config = match full_view(&self.gateway, &tenant).await {
            Ok(config) => config,
            Err(e) => {
                warn!(namespace, tenant = name, error = %e, "unable to read tenant configuration");
                BTreeMap::new()
            }
        };
        let idp_ad_enabled = is_set(&config, LDAP_SERVER_KEY);
        let idp_oidc_enabled = is_set(&config, OIDC_CONFIG_URL_KEY);

        let minio = self.service(namespace, MINIO_SERVICE_NAME).await;
        let console = self.service(namespace, &tenant.console_service_name()).await;

        Ok(TenantDetails {
            info: projection::tenant_info(&tenant),
            status: projection::tenant_status(&tenant),
            endpoints: projection::endpoints(&tenant, minio.as_ref(), console.as_ref()),
            tiers: projection::tiers(&tenant),
            domains: projection::domains(&tenant),
            sftp_exposed: tenant.sftp_enabled(),
            encryption_enabled: tenant.kes_enabled() || is_set(&config, KMS_SECRET_KEY),
            idp_oidc_enabled,
            idp_ad_enabled,
            external_idp: idp_oidc_enabled || idp_ad_enabled,
            minio_tls: tenant.tls_enabled(),
            users: tenant.spec.users.iter().map(|user| user.name.clone()).collect(),
        })
    }

    /// Usage reported by the tenant's admin API.
    pub async fn tenant_usage(&self, namespace: &str, name: &str) -> Result<TenantUsage> {
        let tenant = self.load(namespace, name).await?;
        let client = self.admin_client(&tenant).await?;
        let info = client.server_info().await.context(AdminSnafu)?;

        Ok(TenantUsage {
            used: i64::try_from(info.used()).unwrap_or(i64::MAX),
            disk_used: i64::try_from(info.disks_used()).unwrap_or(i64::MAX),
        })
    }

    /// Pull secret, image and Prometheus annotations, committed as a merge patch.
    pub async fn update_tenant(
        &self,
        namespace: &str,
        name: &str,
        request: &UpdateTenantRequest,
    ) -> Result<()> {
        let tenant = self.load(namespace, name).await?;
        let operation = names::operation_id();
        let materializer =
            Materializer::new(&self.gateway, namespace, name).for_operation(&operation);

        let result = self
            .apply_tenant_update(namespace, tenant, request, &materializer)
            .await;
        self.settle(namespace, &materializer, result).await
    }

    async fn apply_tenant_update(
        &self,
        namespace: &str,
        mut tenant: Tenant,
        request: &UpdateTenantRequest,
        materializer: &Materializer<'_>,
    ) -> Result<()> {
        let name = tenant.name();

        if !request.image_pull_secret.is_empty() {
            tenant.spec.image_pull_secret = Some(corev1::LocalObjectReference {
                name: request.image_pull_secret.clone(),
            });
        } else if let Some(secret) = materializer
            .set_image_registry(request.image_registry.as_ref())
            .await?
        {
            tenant.spec.image_pull_secret = Some(corev1::LocalObjectReference { name: secret });
        }

        if !request.image.trim().is_empty() {
            tenant.spec.image = request.image.trim().to_string();
        }

        let enable = request.enable_prometheus;
        for pool in &mut tenant.spec.pools {
            if let Some(template) = pool.volume_claim_template.as_mut() {
                let annotations = template.metadata.annotations.get_or_insert_with(Default::default);
                toggle_annotations(annotations, enable);
                if annotations.is_empty() {
                    template.metadata.annotations = None;
                }
            }
        }

        // removed annotations must be nulled out for the merge patch to drop them
        let annotations: serde_json::Map<String, serde_json::Value> = prometheus_annotations()
            .into_iter()
            .map(|(key, value)| {
                let value = if enable { json!(value) } else { serde_json::Value::Null };
                (key.to_string(), value)
            })
            .collect();

        let patch = json!({
            "metadata": { "annotations": annotations },
            "spec": serde_json::to_value(&tenant.spec)?,
        });
        self.gateway.patch_tenant(namespace, &name, &patch).await?;
        info!(namespace, tenant = %name, image = %tenant.spec.image, enable_prometheus = enable, "tenant updated");
        Ok(())
    }

    /// Deletes the tenant, and with `delete_pvcs` its volumes and secrets too.
    pub async fn delete_tenant(&self, namespace: &str, name: &str, delete_pvcs: bool) -> Result<()> {
        match self.gateway.delete_tenant(namespace, name).await {
            Ok(()) => info!(namespace, tenant = name, "tenant deleted"),
            // a partial earlier deletion still gets its volumes cleaned up
            Err(e) if delete_pvcs && e.is_not_found() => {
                warn!(namespace, tenant = name, "tenant already gone, deleting volumes");
            }
            Err(e) => return Err(e),
        }

        if delete_pvcs {
            let selector = tenant_selector(name);
            self.gateway
                .delete_persistent_volume_claims(namespace, &selector)
                .await?;
            self.gateway.delete_secrets(namespace, &selector).await?;
            info!(namespace, tenant = name, "tenant volumes and secrets deleted");
        }
        Ok(())
    }

    /// Replaces the domains, keeping `bucketDNS`.
    pub async fn update_domains(
        &self,
        namespace: &str,
        name: &str,
        request: &UpdateDomainsRequest,
    ) -> Result<()> {
        let mut tenant = self.load(namespace, name).await?;
        let bucket_dns = tenant
            .spec
            .features
            .as_ref()
            .is_some_and(|features| features.bucket_dns);

        let domains = request.domains.as_ref().map(|domains| TenantDomains {
            minio: domains.minio.clone(),
            console: domains.console.clone(),
        });

        tenant.spec.features = Some(Features {
            bucket_dns,
            domains,
            enable_sftp: tenant.spec.features.as_ref().and_then(|f| f.enable_sftp),
        });
        self.gateway.update_tenant(namespace, &tenant).await?;
        info!(namespace, tenant = name, "domains updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::admin::{Drive, ServerInfo, ServerProperties, UsageInfo};
    use crate::composer::testing::Harness;
    use crate::error::ErrorKind;
    use crate::models::tenant::{DomainsConfiguration, ImageRegistry, UpdateDomainsRequest, UpdateTenantRequest};
    use crate::secrets::envfile::CONFIG_ENV_KEY;
    use crate::tests::{create_test_tenant, opaque_secret};
    use crate::types::v2::features::{Features, TenantDomains};
    use crate::types::v2::kes::KesConfig;
    use crate::types::v2::tenant::{PROMETHEUS_SCRAPE_ANNOTATION, TENANT_LABEL};
    use k8s_openapi::api::core::v1 as corev1;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use std::collections::BTreeMap;

    fn labelled(name: &str, tenant: &str) -> ObjectMeta {
        ObjectMeta {
            name: Some(name.to_string()),
            labels: Some(BTreeMap::from([(TENANT_LABEL.to_string(), tenant.to_string())])),
            ..Default::default()
        }
    }

    fn configured_tenant(harness: &Harness, config: &str) -> crate::types::v2::tenant::Tenant {
        let mut tenant = create_test_tenant("acme", "ns1");
        tenant.spec.configuration = Some(corev1::LocalObjectReference {
            name: "acme-env-configuration".to_string(),
        });
        harness.gateway.insert_secret(
            "ns1",
            opaque_secret("acme-env-configuration", &[(CONFIG_ENV_KEY, config)]),
        );
        tenant
    }

    #[tokio::test]
    async fn test_list_tenants_by_namespace() {
        let harness = Harness::new();
        harness.gateway.insert_tenant(create_test_tenant("acme", "ns1"));
        harness.gateway.insert_tenant(create_test_tenant("beta", "ns2"));
        let composer = harness.composer();

        let all = composer.list_tenants(None).await.unwrap();
        assert_eq!(all.total, 2);

        let ns1 = composer.list_tenants(Some("ns1")).await.unwrap();
        assert_eq!(ns1.total, 1);
        assert_eq!(ns1.tenants[0].name, "acme");
        assert_eq!(ns1.tenants[0].total_size, 16_000_000_000);
    }

    #[tokio::test]
    async fn test_details_flags() {
        let harness = Harness::new();
        let mut tenant = configured_tenant(
            &harness,
            "export MINIO_IDENTITY_LDAP_SERVER_ADDR=\"ldap:389\"\nexport MINIO_KMS_SECRET_KEY=\"k:v\"\n",
        );
        tenant.spec.request_auto_cert = Some(true);
        tenant.spec.users = vec![corev1::LocalObjectReference {
            name: "acme-user-0".to_string(),
        }];
        harness.gateway.insert_tenant(tenant);

        let details = harness.composer().tenant_details("ns1", "acme").await.unwrap();
        assert!(details.idp_ad_enabled);
        assert!(!details.idp_oidc_enabled);
        assert!(details.external_idp);
        assert!(details.encryption_enabled);
        assert!(details.minio_tls);
        assert_eq!(details.users, vec!["acme-user-0"]);
        // no services exist, endpoints stay empty
        assert_eq!(details.endpoints.minio, "");
        assert_eq!(details.info.name, "acme");
    }

    #[tokio::test]
    async fn test_details_read_service_addresses() {
        let harness = Harness::new();
        let mut tenant = create_test_tenant("acme", "ns1");
        tenant.spec.request_auto_cert = Some(false);
        harness.gateway.insert_tenant(tenant);
        for (name, ip) in [("minio", "10.0.0.1"), ("acme-console", "10.0.0.2")] {
            harness.gateway.insert_service(
                "ns1",
                corev1::Service {
                    metadata: labelled(name, "acme"),
                    status: Some(corev1::ServiceStatus {
                        load_balancer: Some(corev1::LoadBalancerStatus {
                            ingress: Some(vec![corev1::LoadBalancerIngress {
                                ip: Some(ip.to_string()),
                                ..Default::default()
                            }]),
                        }),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            );
        }

        let details = harness.composer().tenant_details("ns1", "acme").await.unwrap();
        assert_eq!(details.endpoints.minio, "http://10.0.0.1");
        assert_eq!(details.endpoints.console, "http://10.0.0.2:9090");
        assert!(!details.minio_tls);
    }

    #[tokio::test]
    async fn test_details_tolerate_missing_configuration() {
        let harness = Harness::new();
        let mut tenant = create_test_tenant("acme", "ns1");
        tenant.spec.configuration = Some(corev1::LocalObjectReference {
            name: "missing".to_string(),
        });
        tenant.spec.kes = Some(KesConfig::default());
        harness.gateway.insert_tenant(tenant);

        let details = harness.composer().tenant_details("ns1", "acme").await.unwrap();
        assert!(details.encryption_enabled);
        assert!(!details.external_idp);
    }

    #[tokio::test]
    async fn test_tenant_usage() {
        let harness = Harness::new();
        harness.gateway.insert_tenant(create_test_tenant("acme", "ns1"));
        harness.admin.set_info(ServerInfo {
            usage: UsageInfo { size: 1024 },
            servers: vec![
                ServerProperties {
                    drives: vec![Drive { usedspace: 10 }, Drive { usedspace: 20 }],
                },
                ServerProperties {
                    drives: vec![Drive { usedspace: 5 }],
                },
            ],
        });

        let usage = harness.composer().tenant_usage("ns1", "acme").await.unwrap();
        assert_eq!(usage.used, 1024);
        assert_eq!(usage.disk_used, 35);
    }

    #[tokio::test]
    async fn test_update_tenant_patches_image_and_annotations() {
        let harness = Harness::new();
        harness.gateway.insert_tenant(create_test_tenant("acme", "ns1"));
        let composer = harness.composer();

        let request = UpdateTenantRequest {
            image: "minio/minio:RELEASE.2024-01-01T00-00-00Z".to_string(),
            image_registry: Some(ImageRegistry {
                registry: "quay.io".to_string(),
                username: "robot".to_string(),
                password: "hunter2".to_string(),
            }),
            enable_prometheus: true,
            ..Default::default()
        };
        composer.update_tenant("ns1", "acme", &request).await.unwrap();

        let tenant = harness.gateway.tenant("ns1", "acme").unwrap();
        assert_eq!(tenant.spec.image, "minio/minio:RELEASE.2024-01-01T00-00-00Z");
        assert_eq!(tenant.spec.image_pull_secret.as_ref().unwrap().name, "acme-regcred");
        assert!(tenant.prometheus_annotations_enabled());
        let pool_annotations = tenant.spec.pools[0]
            .volume_claim_template
            .as_ref()
            .unwrap()
            .metadata
            .annotations
            .clone()
            .unwrap();
        assert_eq!(pool_annotations[PROMETHEUS_SCRAPE_ANNOTATION], "true");
        assert!(harness.gateway.journal().contains(&"patch_tenant ns1/acme".to_string()));

        let disable = UpdateTenantRequest {
            image_pull_secret: "custom".to_string(),
            ..Default::default()
        };
        composer.update_tenant("ns1", "acme", &disable).await.unwrap();
        let tenant = harness.gateway.tenant("ns1", "acme").unwrap();
        assert!(!tenant.prometheus_annotations_enabled());
        assert!(tenant.metadata.annotations.unwrap_or_default().is_empty());
        assert_eq!(tenant.spec.image_pull_secret.unwrap().name, "custom");
        assert_eq!(tenant.spec.image, "minio/minio:RELEASE.2024-01-01T00-00-00Z");
    }

    #[tokio::test]
    async fn test_update_tenant_rolls_back_pull_secret() {
        let harness = Harness::new();
        harness.gateway.insert_tenant(create_test_tenant("acme", "ns1"));
        harness.gateway.fail_on("patch_tenant ns1/acme");

        let request = UpdateTenantRequest {
            image_registry: Some(ImageRegistry {
                registry: "quay.io".to_string(),
                username: "robot".to_string(),
                password: "hunter2".to_string(),
            }),
            ..Default::default()
        };
        let err = harness
            .composer()
            .update_tenant("ns1", "acme", &request)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(harness.gateway.secret_names("ns1").is_empty());
    }

    #[tokio::test]
    async fn test_delete_tenant_with_volumes() {
        let harness = Harness::new();
        harness.gateway.insert_tenant(create_test_tenant("acme", "ns1"));
        harness.gateway.insert_pvc(
            "ns1",
            corev1::PersistentVolumeClaim {
                metadata: labelled("data-acme-0", "acme"),
                ..Default::default()
            },
        );
        harness.gateway.insert_pvc(
            "ns1",
            corev1::PersistentVolumeClaim {
                metadata: labelled("data-other-0", "other"),
                ..Default::default()
            },
        );
        harness.gateway.insert_secret(
            "ns1",
            corev1::Secret {
                metadata: labelled("acme-secret", "acme"),
                ..Default::default()
            },
        );

        harness.composer().delete_tenant("ns1", "acme", true).await.unwrap();
        assert!(harness.gateway.tenant("ns1", "acme").is_none());
        assert_eq!(harness.gateway.pvc_names("ns1"), vec!["data-other-0"]);
        assert!(harness.gateway.secret_names("ns1").is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_tenant() {
        let harness = Harness::new();
        let composer = harness.composer();

        let err = composer.delete_tenant("ns1", "acme", false).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        composer.delete_tenant("ns1", "acme", true).await.unwrap();
        assert_eq!(
            harness.gateway.journal(),
            vec![
                "delete_tenant ns1/acme",
                "delete_tenant ns1/acme",
                "delete_pvcs ns1/v1.min.io/tenant=acme",
                "delete_secrets ns1/v1.min.io/tenant=acme",
            ]
        );
    }

    #[tokio::test]
    async fn test_update_domains_keeps_bucket_dns() {
        let harness = Harness::new();
        let mut tenant = create_test_tenant("acme", "ns1");
        tenant.spec.features = Some(Features {
            bucket_dns: true,
            domains: Some(TenantDomains {
                minio: vec!["old.example.com".to_string()],
                console: String::new(),
            }),
            enable_sftp: Some(true),
        });
        harness.gateway.insert_tenant(tenant);

        let request = UpdateDomainsRequest {
            domains: Some(DomainsConfiguration {
                console: "console.example.com".to_string(),
                minio: vec!["s3.example.com".to_string()],
            }),
        };
        let composer = harness.composer();
        composer.update_domains("ns1", "acme", &request).await.unwrap();
        composer.update_domains("ns1", "acme", &request).await.unwrap();

        let features = harness.gateway.tenant("ns1", "acme").unwrap().spec.features.unwrap();
        assert!(features.bucket_dns);
        assert_eq!(features.enable_sftp, Some(true));
        let domains = features.domains.unwrap();
        assert_eq!(domains.console, "console.example.com");
        assert_eq!(domains.minio, vec!["s3.example.com"]);
    }
}
