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

//! Cluster-wide reads: node sizing, labels, quotas and tenant events.

use super::Composer;
use crate::gateway::Gateway;
use crate::error::Result;
use crate::models::cluster::{
    AllocatableResources, EventListElement, MaxAllocatableMemory, NodeLabels, ResourceQuota,
    ResourceQuotaElement,
};
use crate::nodes;
use crate::projection::timestamp;
use crate::utils::quantity;
use chrono::DateTime;
use k8s_openapi::api::core::v1 as corev1;
use kube::ResourceExt;
use std::collections::BTreeMap;
use tracing::debug;

const STORAGE_CLASS_REQUESTS: &str = "storageclass.storage.k8s.io/requests.storage";

fn last_seen(event: &corev1::Event) -> i64 {
    DateTime::parse_from_rfc3339(&timestamp(event.last_timestamp.as_ref()))
        .map(|time| time.timestamp())
        .unwrap_or(0)
}

fn quota_elements(status: Option<&corev1::ResourceQuotaStatus>) -> Vec<ResourceQuotaElement> {
    let Some(status) = status else {
        return Vec::new();
    };

    let mut elements: BTreeMap<&String, ResourceQuotaElement> = status
        .hard
        .iter()
        .flatten()
        .map(|(name, hard)| {
            let element = ResourceQuotaElement {
                name: name.clone(),
                hard: quantity::parse_or_zero(Some(hard)),
                used: 0,
            };
            (name, element)
        })
        .collect();

    for (name, used) in status.used.iter().flatten() {
        if let Some(element) = elements.get_mut(name) {
            element.used = quantity::parse_or_zero(Some(used));
        }
    }
    elements.into_values().collect()
}

impl Composer {
    pub async fn max_allocatable_memory(&self, num_nodes: usize) -> Result<MaxAllocatableMemory> {
        let nodes = self.gateway.list_nodes().await?;
        Ok(MaxAllocatableMemory {
            max_memory: nodes::max_allocatable_memory(num_nodes, &nodes)?,
        })
    }

    pub async fn allocatable_resources(&self, num_nodes: usize) -> Result<AllocatableResources> {
        let nodes = self.gateway.list_nodes().await?;
        nodes::allocatable_resources(num_nodes, &nodes)
    }

    pub async fn node_labels(&self) -> Result<NodeLabels> {
        let nodes = self.gateway.list_nodes().await?;
        Ok(nodes::node_labels(&nodes))
    }

    /// Events about the tenant object, oldest first.
    pub async fn events(&self, namespace: &str, name: &str) -> Result<Vec<EventListElement>> {
        let tenant = self.load(namespace, name).await?;
        let selector = format!("involvedObject.uid={}", tenant.uid().unwrap_or_default());

        let mut events: Vec<EventListElement> = self
            .gateway
            .list_events(namespace, &selector)
            .await?
            .iter()
            .map(|event| EventListElement {
                namespace: event.namespace().unwrap_or_default(),
                last_seen: last_seen(event),
                message: event.message.clone().unwrap_or_default(),
                event_type: event.type_.clone().unwrap_or_default(),
                reason: event.reason.clone().unwrap_or_default(),
            })
            .collect();

        events.sort_by_key(|event| event.last_seen);
        Ok(events)
    }

    /// Hard and used values of a quota. Without one every storage class is unbounded.
    pub async fn resource_quota(&self, namespace: &str, name: &str) -> Result<ResourceQuota> {
        match self.gateway.get_resource_quota(namespace, name).await {
            Ok(quota) => Ok(ResourceQuota {
                name: quota.name_any(),
                elements: quota_elements(quota.status.as_ref()),
            }),
            Err(e) if e.is_not_found() => {
                debug!(namespace, name, "no resource quota, reporting storage classes");
                let elements = self
                    .gateway
                    .list_storage_classes()
                    .await?
                    .iter()
                    .map(|class| ResourceQuotaElement {
                        name: format!("{}.{}", class.name_any(), STORAGE_CLASS_REQUESTS),
                        hard: i64::MAX,
                        used: 0,
                    })
                    .collect();
                Ok(ResourceQuota {
                    name: name.to_string(),
                    elements,
                })
            }
            Err(e) => Err(e),
        }
    }
}
