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
use crate::error::{Error, Result};
use crate::models::monitoring::MonitoringInfo;
use crate::models::{from_key_values, to_key_values};
use crate::projection::{from_security_context, to_security_context};
use crate::types::v2::prometheus::PrometheusConfig;
use crate::utils::quantity;
use k8s_openapi::api::core::v1 as corev1;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;
use tracing::info;

pub const DEFAULT_DISK_CAPACITY_GB: i32 = 5;

fn request_of(prometheus: &PrometheusConfig, resource: &str) -> String {
    prometheus
        .resources
        .as_ref()
        .and_then(|r| r.requests.as_ref())
        .and_then(|requests| requests.get(resource))
        .map(|q| q.0.clone())
        .unwrap_or_default()
}

fn monitoring_info(prometheus: Option<&PrometheusConfig>) -> MonitoringInfo {
    let Some(prometheus) = prometheus else {
        return MonitoringInfo::default();
    };

    MonitoringInfo {
        prometheus_enabled: true,
        toggle: false,
        storage_class_name: prometheus.storage_class_name.clone().unwrap_or_default(),
        monitoring_cpu_request: request_of(prometheus, "cpu"),
        monitoring_mem_request: request_of(prometheus, "memory"),
        labels: to_key_values(prometheus.labels.as_ref()),
        annotations: to_key_values(prometheus.annotations.as_ref()),
        node_selector: to_key_values(prometheus.node_selector.as_ref()),
        disk_capacity_gb: prometheus
            .disk_capacity_gb
            .map(|gb| gb.to_string())
            .unwrap_or_default(),
        image: prometheus.image.clone(),
        sidecar_image: prometheus.sidecar_image.clone(),
        init_image: prometheus.init_image.clone(),
        service_account_name: prometheus.service_account_name.clone(),
        security_context: prometheus.security_context.as_ref().map(from_security_context),
    }
}

fn requests(info: &MonitoringInfo) -> Result<Option<BTreeMap<String, Quantity>>> {
    let mut requests = BTreeMap::new();
    for (resource, value) in [
        ("cpu", &info.monitoring_cpu_request),
        ("memory", &info.monitoring_mem_request),
    ] {
        if value.is_empty() {
            continue;
        }
        quantity::parse(value)
            .map_err(|e| Error::invalid_request(format!("{} request: {}", resource, e)))?;
        requests.insert(resource.to_string(), Quantity(value.clone()));
    }
    Ok((!requests.is_empty()).then_some(requests))
}

/// The whole Prometheus spec described by `info`, on top of `current`.
fn desired_prometheus(current: Option<PrometheusConfig>, info: &MonitoringInfo) -> Result<PrometheusConfig> {
    let mut prometheus = current.unwrap_or_default();

    prometheus.resources = Some(corev1::ResourceRequirements {
        requests: requests(info)?,
        ..prometheus.resources.unwrap_or_default()
    });

    if !info.disk_capacity_gb.is_empty() {
        let gb = info.disk_capacity_gb.trim().parse::<i32>().map_err(|e| {
            Error::invalid_request(format!("disk capacity '{}': {}", info.disk_capacity_gb, e))
        })?;
        prometheus.disk_capacity_gb = Some(gb);
    }

    prometheus.labels = from_key_values(&info.labels);
    prometheus.annotations = from_key_values(&info.annotations);
    prometheus.node_selector = from_key_values(&info.node_selector);
    prometheus.image = info.image.clone();
    prometheus.sidecar_image = info.sidecar_image.clone();
    prometheus.init_image = info.init_image.clone();
    prometheus.storage_class_name =
        (!info.storage_class_name.is_empty()).then(|| info.storage_class_name.clone());
    prometheus.service_account_name = info.service_account_name.clone();
    prometheus.security_context = info
        .security_context
        .as_ref()
        .map(to_security_context)
        .transpose()?;

    Ok(prometheus)
}

impl Composer {
    pub async fn monitoring(&self, namespace: &str, name: &str) -> Result<MonitoringInfo> {
        let tenant = self.load(namespace, name).await?;
        Ok(monitoring_info(tenant.spec.prometheus.as_ref()))
    }

    /// In toggle mode only switches Prometheus on (with a default disk) or off.
    pub async fn set_monitoring(&self, namespace: &str, name: &str, info: &MonitoringInfo) -> Result<()> {
        let mut tenant = self.load(namespace, name).await?;

        tenant.spec.prometheus = if info.toggle {
            info.prometheus_enabled.then(|| PrometheusConfig {
                disk_capacity_gb: Some(DEFAULT_DISK_CAPACITY_GB),
                ..Default::default()
            })
        } else {
            Some(desired_prometheus(tenant.spec.prometheus.take(), info)?)
        };

        self.gateway.update_tenant(namespace, &tenant).await?;
        info!(
            namespace,
            tenant = name,
            toggle = info.toggle,
            enabled = tenant.spec.prometheus.is_some(),
            "monitoring updated"
        );
        Ok(())
    }
}
