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

use super::Composer;
use crate::gateway::Gateway;
use crate::error::{ConfigurationMissingSnafu, Result};
use crate::models::configuration::{ConfigurationResponse, UpdateConfigurationRequest};
use crate::models::{KeyValue, to_key_values};
use crate::secrets::Materializer;
use crate::secrets::configuration::{client_view, full_view, is_privileged};
use crate::types::v2::tenant::tenant_selector;
use snafu::OptionExt;
use std::collections::BTreeMap;
use tracing::info;

/// Applies `request` to `config`. Empty keys and privileged keys are never kept.
fn merge_configuration(config: &mut BTreeMap<String, String>, request: &UpdateConfigurationRequest) {
    for KeyValue { key, value } in &request.environment_variables {
        if !key.is_empty() {
            config.insert(key.clone(), value.clone());
        }
    }
    for key in &request.keys_to_be_deleted {
        config.remove(key);
    }
    config.retain(|key, _| !is_privileged(key));
}

impl Composer {
    pub async fn configuration(&self, namespace: &str, name: &str) -> Result<ConfigurationResponse> {
        let tenant = self.load(namespace, name).await?;
        let config = client_view(full_view(&self.gateway, &tenant).await?);

        Ok(ConfigurationResponse {
            environment_variables: to_key_values(Some(&config)),
            sftp_exposed: tenant.sftp_enabled(),
        })
    }

    /// Rewrites `config.env` in place and restarts the tenant pods.
    pub async fn update_configuration(
        &self,
        namespace: &str,
        name: &str,
        request: &UpdateConfigurationRequest,
    ) -> Result<()> {
        let mut tenant = self.load(namespace, name).await?;
        let config_name = tenant
            .spec
            .configuration
            .as_ref()
            .map(|r| r.name.clone())
            .filter(|name| !name.is_empty())
            .context(ConfigurationMissingSnafu {
                what: "tenant configuration",
            })?;

        let mut config = full_view(&self.gateway, &tenant).await?;
        merge_configuration(&mut config, request);

        let materializer = Materializer::new(&self.gateway, namespace, name);
        materializer.update_configuration(&config_name, &config).await?;

        if let Some(exposed) = request.sftp_exposed {
            if let Some(features) = tenant.spec.features.as_mut() {
                features.enable_sftp = Some(exposed);
                self.gateway.update_tenant(namespace, &tenant).await?;
            }
        }

        self.gateway.delete_pods(namespace, &tenant_selector(name)).await?;
        info!(namespace, tenant = name, keys = config.len(), "configuration updated, pods restarted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::testing::Harness;
    use crate::error::ErrorKind;
    use crate::secrets::envfile::CONFIG_ENV_KEY;
    use crate::tests::{create_test_tenant, opaque_secret};
    use crate::types::v2::features::Features;
    use crate::types::v2::tenant::{TENANT_LABEL, Tenant};
    use k8s_openapi::api::core::v1 as corev1;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    const CONFIG: &str = r#"export MINIO_ROOT_USER="minio"
export MINIO_ROOT_PASSWORD="minio123"
export MINIO_BROWSER="on"
"#;

    fn pod(name: &str, tenant: &str) -> corev1::Pod {
        corev1::Pod {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                labels: Some(BTreeMap::from([(TENANT_LABEL.to_string(), tenant.to_string())])),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn configured(harness: &Harness) -> Tenant {
        let mut tenant = create_test_tenant("acme", "ns1");
        tenant.spec.configuration = Some(corev1::LocalObjectReference {
            name: "acme-env-configuration".to_string(),
        });
        harness.gateway.insert_secret(
            "ns1",
            opaque_secret(
                "acme-env-configuration",
                &[(CONFIG_ENV_KEY, CONFIG), ("extra", "kept")],
            ),
        );
        harness.gateway.insert_secret(
            "ns1",
            opaque_secret("acme-secret", &[("accesskey", "legacy"), ("secretkey", "legacy123")]),
        );
        tenant.spec.creds_secret = Some(corev1::LocalObjectReference {
            name: "acme-secret".to_string(),
        });
        tenant
    }

    #[tokio::test]
    async fn test_configuration_hides_privileged_keys() {
        let harness = Harness::new();
        harness.gateway.insert_tenant(configured(&harness));

        let response = harness.composer().configuration("ns1", "acme").await.unwrap();
        let keys: Vec<&str> = response
            .environment_variables
            .iter()
            .map(|kv| kv.key.as_str())
            .collect();
        assert_eq!(keys, vec!["MINIO_BROWSER", "MINIO_ROOT_PASSWORD", "MINIO_ROOT_USER"]);
        assert!(!response.sftp_exposed);
    }

    #[tokio::test]
    async fn test_update_configuration_in_place_and_restarts_pods() {
        let harness = Harness::new();
        harness.gateway.insert_tenant(configured(&harness));
        harness.gateway.insert_pod("ns1", pod("acme-pool-0-0", "acme"));
        harness.gateway.insert_pod("ns1", pod("other-pool-0-0", "other"));
        harness.gateway.clear_journal();

        let request = UpdateConfigurationRequest {
            environment_variables: vec![
                KeyValue::new("MINIO_DOMAIN", "s3.example.com"),
                KeyValue::new("", "ignored"),
                KeyValue::new("accesskey", "injected"),
            ],
            keys_to_be_deleted: vec!["MINIO_BROWSER".to_string()],
            ..Default::default()
        };
        harness
            .composer()
            .update_configuration("ns1", "acme", &request)
            .await
            .unwrap();

        let content = harness
            .gateway
            .secret_value("ns1", "acme-env-configuration", CONFIG_ENV_KEY)
            .unwrap();
        assert_eq!(
            content,
            "export MINIO_DOMAIN=\"s3.example.com\"\n\
             export MINIO_ROOT_PASSWORD=\"minio123\"\n\
             export MINIO_ROOT_USER=\"minio\"\n"
        );
        assert_eq!(
            harness.gateway.secret_value("ns1", "acme-env-configuration", "extra").unwrap(),
            "kept"
        );
        assert_eq!(harness.gateway.pod_names("ns1"), vec!["other-pool-0-0"]);
        assert_eq!(
            harness.gateway.journal(),
            vec![
                "get_tenant ns1/acme",
                "get_secret ns1/acme-secret",
                "get_secret ns1/acme-env-configuration",
                "get_secret ns1/acme-env-configuration",
                "update_secret ns1/acme-env-configuration",
                "delete_pods ns1/v1.min.io/tenant=acme",
            ]
        );
    }

    #[tokio::test]
    async fn test_cancelled_update_skips_restart() {
        let harness = Harness::new();
        harness.gateway.insert_tenant(configured(&harness));
        harness.gateway.insert_pod("ns1", pod("acme-pool-0-0", "acme"));
        harness
            .gateway
            .interrupt_on("update_secret ns1/acme-env-configuration", harness.token.clone());

        let request = UpdateConfigurationRequest {
            environment_variables: vec![KeyValue::new("MINIO_DOMAIN", "s3.example.com")],
            ..Default::default()
        };
        let err = harness
            .composer()
            .update_configuration("ns1", "acme", &request)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(harness.gateway.pod_names("ns1"), vec!["acme-pool-0-0"]);
        // the secret existed before the call and is not rolled back
        assert!(harness.gateway.secret("ns1", "acme-env-configuration").is_some());
        assert!(
            !harness
                .gateway
                .journal()
                .iter()
                .any(|entry| entry.starts_with("delete_secrets"))
        );
    }

    #[tokio::test]
    async fn test_update_configuration_requires_reference() {
        let harness = Harness::new();
        harness.gateway.insert_tenant(create_test_tenant("acme", "ns1"));

        let err = harness
            .composer()
            .update_configuration("ns1", "acme", &UpdateConfigurationRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigurationMissing);
        assert_eq!(err.kind().code(), 404);
    }

    #[tokio::test]
    async fn test_sftp_flag_only_for_declared_features() {
        let harness = Harness::new();
        let mut tenant = configured(&harness);
        tenant.spec.features = Some(Features::default());
        harness.gateway.insert_tenant(tenant);
        let request = UpdateConfigurationRequest {
            sftp_exposed: Some(true),
            ..Default::default()
        };

        let composer = harness.composer();
        composer.update_configuration("ns1", "acme", &request).await.unwrap();
        assert!(composer.configuration("ns1", "acme").await.unwrap().sftp_exposed);

        let other = Harness::new();
        other.gateway.insert_tenant(configured(&other));
        other
            .composer()
            .update_configuration("ns1", "acme", &request)
            .await
            .unwrap();
        assert!(other.gateway.tenant("ns1", "acme").unwrap().spec.features.is_none());
    }
}
