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

use crate::types;
use crate::types::error::NoNamespaceSnafu;
use crate::types::v2::certificate::LocalCertificateReference;
use crate::types::v2::features::{ExposeServices, Features};
use crate::types::v2::kes::KesConfig;
use crate::types::v2::pool::Pool;
use crate::types::v2::prometheus::PrometheusConfig;
use k8s_openapi::api::core::v1 as corev1;
use kube::{CustomResource, KubeSchema, ResourceExt};
use serde::{Deserialize, Serialize};
use snafu::OptionExt;

/// Label carried by every object that belongs to a Tenant.
pub const TENANT_LABEL: &str = "v1.min.io/tenant";

pub const MINIO_SERVICE_NAME: &str = "minio";
pub const MINIO_PORT: i32 = 80;
pub const MINIO_TLS_PORT: i32 = 443;
pub const CONSOLE_PORT: i32 = 9090;
pub const CONSOLE_TLS_PORT: i32 = 9443;

pub const DEFAULT_MOUNT_PATH: &str = "/export";
pub const DEFAULT_MINIO_IMAGE: &str = "minio/minio:RELEASE.2021-06-07T21-40-51Z";

pub const PROMETHEUS_PATH_ANNOTATION: &str = "prometheus.io/path";
pub const PROMETHEUS_PORT_ANNOTATION: &str = "prometheus.io/port";
pub const PROMETHEUS_SCRAPE_ANNOTATION: &str = "prometheus.io/scrape";

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, KubeSchema, Default)]
#[kube(
    group = "minio.min.io",
    version = "v2",
    kind = "Tenant",
    namespaced,
    status = "crate::types::v2::status::Status",
    shortname = "tenant",
    plural = "tenants",
    singular = "tenant",
    printcolumn = r#"{"name":"State", "type":"string", "jsonPath":".status.currentState"}"#,
    printcolumn = r#"{"name":"Health", "type":"string", "jsonPath":".status.healthStatus"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#,
    crates(serde_json = "k8s_openapi::serde_json")
)]
#[serde(rename_all = "camelCase")]
pub struct TenantSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_secret: Option<corev1::LocalObjectReference>,

    #[x_kube(validation = Rule::new("self.size() > 0").message("pools must be configured"))]
    pub pools: Vec<Pool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_auto_cert: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_cert_secret: Vec<LocalCertificateReference>,

    /// mTLS client certificate MinIO presents to KES.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_client_cert_secret: Option<LocalCertificateReference>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_client_cert_secrets: Vec<LocalCertificateReference>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_ca_cert_secret: Vec<LocalCertificateReference>,

    /// Secret with a single `config.env` entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<corev1::LocalObjectReference>,

    /// Legacy credentials secret (`accesskey` / `secretkey`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creds_secret: Option<corev1::LocalObjectReference>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<corev1::EnvVar>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kes: Option<KesConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prometheus: Option<PrometheusConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Features>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<corev1::LocalObjectReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expose_services: Option<ExposeServices>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,
}

impl Tenant {
    pub fn namespace(&self) -> Result<String, types::error::Error> {
        ResourceExt::namespace(self).context(NoNamespaceSnafu)
    }

    pub fn name(&self) -> String {
        ResourceExt::name_any(self)
    }

    /// `v1.min.io/tenant=<name>`, used to find every dependent object.
    pub fn label_selector(&self) -> String {
        tenant_selector(&self.name())
    }

    /// Auto-cert is on unless `requestAutoCert` is explicitly false.
    pub fn auto_cert_enabled(&self) -> bool {
        self.spec.request_auto_cert.unwrap_or(true)
    }

    pub fn external_cert_enabled(&self) -> bool {
        !self.spec.external_cert_secret.is_empty()
    }

    /// MinIO is served over TLS when auto-cert is on or server certificates are mounted.
    pub fn tls_enabled(&self) -> bool {
        self.auto_cert_enabled() || self.external_cert_enabled()
    }

    pub fn kes_enabled(&self) -> bool {
        self.spec.kes.is_some()
    }

    pub fn console_service_name(&self) -> String {
        format!("{}-console", self.name())
    }

    /// In-cluster URL of the MinIO service.
    pub fn service_url(&self) -> Result<String, types::error::Error> {
        let namespace = self.namespace()?;
        let (scheme, port) = if self.tls_enabled() {
            ("https", MINIO_TLS_PORT)
        } else {
            ("http", MINIO_PORT)
        };

        Ok(format!(
            "{}://{}.{}.svc.cluster.local:{}",
            scheme, MINIO_SERVICE_NAME, namespace, port
        ))
    }

    /// All three scrape annotations are present on the Tenant.
    pub fn prometheus_annotations_enabled(&self) -> bool {
        let annotations = self.annotations();
        [
            PROMETHEUS_PATH_ANNOTATION,
            PROMETHEUS_PORT_ANNOTATION,
            PROMETHEUS_SCRAPE_ANNOTATION,
        ]
        .iter()
        .all(|key| annotations.contains_key(*key))
    }

    pub fn sftp_enabled(&self) -> bool {
        self.spec
            .features
            .as_ref()
            .and_then(|features| features.enable_sftp)
            .unwrap_or(false)
    }
}

pub fn tenant_selector(tenant: &str) -> String {
    format!("{}={}", TENANT_LABEL, tenant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::create_test_tenant;
    use crate::types::v2::certificate::CertificateSecretType;
    use kube::CustomResourceExt;

    #[test]
    fn test_service_url_follows_tls() {
        let mut tenant = create_test_tenant("acme", "ns1");
        assert_eq!(
            tenant.service_url().unwrap(),
            "https://minio.ns1.svc.cluster.local:443"
        );

        tenant.spec.request_auto_cert = Some(false);
        assert_eq!(
            tenant.service_url().unwrap(),
            "http://minio.ns1.svc.cluster.local:80"
        );

        tenant.spec.external_cert_secret = vec![LocalCertificateReference::new(
            "acme-a",
            CertificateSecretType::KubernetesTls,
        )];
        assert!(tenant.tls_enabled());
    }

    #[test]
    fn test_auto_cert_defaults_on() {
        let mut tenant = create_test_tenant("acme", "ns1");
        assert!(tenant.spec.request_auto_cert.is_none());
        assert!(tenant.auto_cert_enabled());
        assert!(tenant.tls_enabled());

        tenant.spec.request_auto_cert = Some(false);
        assert!(!tenant.auto_cert_enabled());
        assert!(!tenant.tls_enabled());
    }

    #[test]
    fn test_label_selector() {
        let tenant = create_test_tenant("acme", "ns1");
        assert_eq!(tenant.label_selector(), "v1.min.io/tenant=acme");
    }

    #[test]
    fn test_prometheus_annotations() {
        let mut tenant = create_test_tenant("acme", "ns1");
        assert!(!tenant.prometheus_annotations_enabled());

        tenant.metadata.annotations = Some(
            [
                (PROMETHEUS_PATH_ANNOTATION.to_string(), "/minio/v2/metrics/cluster".to_string()),
                (PROMETHEUS_PORT_ANNOTATION.to_string(), "9000".to_string()),
            ]
            .into_iter()
            .collect(),
        );
        assert!(!tenant.prometheus_annotations_enabled());

        tenant
            .metadata
            .annotations
            .as_mut()
            .unwrap()
            .insert(PROMETHEUS_SCRAPE_ANNOTATION.to_string(), "true".to_string());
        assert!(tenant.prometheus_annotations_enabled());
    }

    #[test]
    fn test_crd_names() {
        let crd = Tenant::crd();
        assert_eq!(crd.spec.group, "minio.min.io");
        assert_eq!(crd.spec.names.plural, "tenants");
        assert_eq!(crd.spec.versions[0].name, "v2");
    }

    #[test]
    fn test_missing_namespace() {
        let mut tenant = create_test_tenant("acme", "ns1");
        tenant.metadata.namespace = None;
        assert!(tenant.namespace().is_err());
    }
}
