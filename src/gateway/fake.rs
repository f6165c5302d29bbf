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

//! In-memory gateway for composer tests.
//!
//! Every call is appended to a journal as `"<operation> <namespace>/<name>"`.
//! Failures can be injected per journal entry, and a cancellation token can be
//! fired when an entry is reached, either before the call runs or after its
//! write has landed.

use super::Gateway;
use crate::error::{Error, Result};
use crate::types::v2::tenant::Tenant;
use async_trait::async_trait;
use k8s_openapi::api::core::v1 as corev1;
use k8s_openapi::api::storage::v1 as storagev1;
use kube::ResourceExt;
use std::collections::BTreeMap;
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct State {
    tenants: BTreeMap<(String, String), Tenant>,
    secrets: BTreeMap<(String, String), corev1::Secret>,
    pods: BTreeMap<(String, String), corev1::Pod>,
    pvcs: BTreeMap<(String, String), corev1::PersistentVolumeClaim>,
    services: BTreeMap<(String, String), corev1::Service>,
    quotas: BTreeMap<(String, String), corev1::ResourceQuota>,
    events: Vec<corev1::Event>,
    nodes: Vec<corev1::Node>,
    storage_classes: Vec<storagev1::StorageClass>,
    journal: Vec<String>,
    failures: Vec<String>,
    cancel_on: Vec<(String, CancellationToken)>,
    interrupt_on: Vec<(String, CancellationToken)>,
    revision: u64,
}

#[derive(Default)]
pub struct FakeGateway {
    state: Mutex<State>,
}

fn key(namespace: &str, name: &str) -> (String, String) {
    (namespace.to_string(), name.to_string())
}

/// `a=b,c=d` equality selectors only.
pub fn selector_matches(selector: &str, labels: &BTreeMap<String, String>) -> bool {
    selector
        .split(',')
        .filter(|term| !term.is_empty())
        .all(|term| match term.split_once('=') {
            Some((k, v)) => labels.get(k.trim()).map(String::as_str) == Some(v.trim()),
            None => labels.contains_key(term.trim()),
        })
}

/// RFC 7386 JSON merge patch.
pub fn merge_patch(target: &mut serde_json::Value, patch: &serde_json::Value) {
    match patch {
        serde_json::Value::Object(entries) => {
            if !target.is_object() {
                *target = serde_json::Value::Object(Default::default());
            }
            if let serde_json::Value::Object(map) = target {
                for (k, v) in entries {
                    if v.is_null() {
                        map.remove(k);
                    } else {
                        merge_patch(map.entry(k.clone()).or_insert(serde_json::Value::Null), v);
                    }
                }
            }
        }
        other => *target = other.clone(),
    }
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Records the call and applies injected behavior.
    fn enter(&self, operation: &str, namespace: &str, name: &str) -> Result<()> {
        let entry = format!("{} {}/{}", operation, namespace, name);
        let mut state = self.state();
        state.journal.push(entry.clone());

        for (at, token) in &state.cancel_on {
            if *at == entry {
                token.cancel();
            }
        }

        if state.failures.contains(&entry) {
            return Err(Error::Internal {
                message: format!("injected failure on {}", entry),
            });
        }
        Ok(())
    }

    /// Fires the interrupts matching the entry after a write and yields once,
    /// so a racing cancellation wins over the finished call.
    async fn leave(&self, operation: &str, namespace: &str, name: &str) {
        let entry = format!("{} {}/{}", operation, namespace, name);
        let tokens: Vec<CancellationToken> = self
            .state()
            .interrupt_on
            .iter()
            .filter(|(prefix, _)| entry.starts_with(prefix.as_str()))
            .map(|(_, token)| token.clone())
            .collect();
        if tokens.is_empty() {
            return;
        }
        for token in tokens {
            token.cancel();
        }
        tokio::task::yield_now().await;
    }

    fn next_revision(state: &mut State) -> String {
        state.revision += 1;
        state.revision.to_string()
    }

    pub fn fail_on(&self, entry: &str) {
        self.state().failures.push(entry.to_string());
    }

    pub fn cancel_on(&self, entry: &str, token: CancellationToken) {
        self.state().cancel_on.push((entry.to_string(), token));
    }

    /// Lets every call whose entry starts with `prefix` complete its write,
    /// then cancels `token` before the call returns.
    pub fn interrupt_on(&self, prefix: &str, token: CancellationToken) {
        self.state().interrupt_on.push((prefix.to_string(), token));
    }

    pub fn journal(&self) -> Vec<String> {
        self.state().journal.clone()
    }

    pub fn clear_journal(&self) {
        self.state().journal.clear();
    }

    pub fn insert_tenant(&self, tenant: Tenant) {
        let mut state = self.state();
        let mut tenant = tenant;
        tenant.metadata.resource_version = Some(Self::next_revision(&mut state));
        let namespace = tenant.namespace().unwrap_or_default();
        state.tenants.insert(key(&namespace, &tenant.name()), tenant);
    }

    pub fn tenant(&self, namespace: &str, name: &str) -> Option<Tenant> {
        self.state().tenants.get(&key(namespace, name)).cloned()
    }

    pub fn insert_secret(&self, namespace: &str, secret: corev1::Secret) {
        let mut secret = secret;
        secret.metadata.namespace = Some(namespace.to_string());
        let name = secret.name_any();
        self.state().secrets.insert(key(namespace, &name), secret);
    }

    pub fn secret(&self, namespace: &str, name: &str) -> Option<corev1::Secret> {
        self.state().secrets.get(&key(namespace, name)).cloned()
    }

    pub fn secret_names(&self, namespace: &str) -> Vec<String> {
        self.state()
            .secrets
            .keys()
            .filter(|(ns, _)| ns == namespace)
            .map(|(_, name)| name.clone())
            .collect()
    }

    /// UTF-8 value of one secret key.
    pub fn secret_value(&self, namespace: &str, name: &str, data_key: &str) -> Option<String> {
        self.secret(namespace, name)
            .and_then(|s| s.data)
            .and_then(|data| data.get(data_key).cloned())
            .and_then(|bytes| String::from_utf8(bytes.0).ok())
    }

    pub fn insert_pod(&self, namespace: &str, pod: corev1::Pod) {
        let name = pod.name_any();
        self.state().pods.insert(key(namespace, &name), pod);
    }

    pub fn pod_names(&self, namespace: &str) -> Vec<String> {
        self.state()
            .pods
            .keys()
            .filter(|(ns, _)| ns == namespace)
            .map(|(_, name)| name.clone())
            .collect()
    }

    pub fn insert_pvc(&self, namespace: &str, pvc: corev1::PersistentVolumeClaim) {
        let name = pvc.name_any();
        self.state().pvcs.insert(key(namespace, &name), pvc);
    }

    pub fn pvc_names(&self, namespace: &str) -> Vec<String> {
        self.state()
            .pvcs
            .keys()
            .filter(|(ns, _)| ns == namespace)
            .map(|(_, name)| name.clone())
            .collect()
    }

    pub fn insert_service(&self, namespace: &str, service: corev1::Service) {
        let name = service.name_any();
        self.state().services.insert(key(namespace, &name), service);
    }

    pub fn insert_resource_quota(&self, namespace: &str, quota: corev1::ResourceQuota) {
        let name = quota.name_any();
        self.state().quotas.insert(key(namespace, &name), quota);
    }

    pub fn insert_event(&self, event: corev1::Event) {
        self.state().events.push(event);
    }

    pub fn insert_node(&self, node: corev1::Node) {
        self.state().nodes.push(node);
    }

    pub fn insert_storage_class(&self, storage_class: storagev1::StorageClass) {
        self.state().storage_classes.push(storage_class);
    }
}

fn not_found(kind: &str, namespace: &str, name: &str) -> Error {
    Error::NotFound {
        resource: format!("{} {}/{}", kind, namespace, name),
    }
}

fn already_exists(kind: &str, namespace: &str, name: &str) -> Error {
    Error::AlreadyExists {
        resource: format!("{} {}/{}", kind, namespace, name),
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn get_tenant(&self, namespace: &str, name: &str) -> Result<Tenant> {
        self.enter("get_tenant", namespace, name)?;
        self.tenant(namespace, name)
            .ok_or_else(|| not_found("tenant", namespace, name))
    }

    async fn list_tenants(&self, namespace: Option<&str>) -> Result<Vec<Tenant>> {
        self.enter("list_tenants", namespace.unwrap_or(""), "")?;
        Ok(self
            .state()
            .tenants
            .iter()
            .filter(|((ns, _), _)| namespace.is_none_or(|wanted| wanted == ns))
            .map(|(_, tenant)| tenant.clone())
            .collect())
    }

    async fn create_tenant(&self, namespace: &str, tenant: &Tenant) -> Result<Tenant> {
        let name = tenant.name();
        self.enter("create_tenant", namespace, &name)?;
        let created = {
            let mut state = self.state();
            if state.tenants.contains_key(&key(namespace, &name)) {
                return Err(already_exists("tenant", namespace, &name));
            }
            let mut created = tenant.clone();
            created.metadata.namespace = Some(namespace.to_string());
            created.metadata.resource_version = Some(Self::next_revision(&mut state));
            state.tenants.insert(key(namespace, &name), created.clone());
            created
        };
        self.leave("create_tenant", namespace, &name).await;
        Ok(created)
    }

    async fn update_tenant(&self, namespace: &str, tenant: &Tenant) -> Result<Tenant> {
        let name = tenant.name();
        self.enter("update_tenant", namespace, &name)?;
        let updated = {
            let mut state = self.state();
            let current = state
                .tenants
                .get(&key(namespace, &name))
                .ok_or_else(|| not_found("tenant", namespace, &name))?;
            if tenant.metadata.resource_version.is_some()
                && tenant.metadata.resource_version != current.metadata.resource_version
            {
                return Err(Error::Internal {
                    message: format!("conflict updating tenant {}/{}", namespace, name),
                });
            }
            let mut updated = tenant.clone();
            updated.metadata.resource_version = Some(Self::next_revision(&mut state));
            state.tenants.insert(key(namespace, &name), updated.clone());
            updated
        };
        self.leave("update_tenant", namespace, &name).await;
        Ok(updated)
    }

    async fn patch_tenant(
        &self,
        namespace: &str,
        name: &str,
        patch: &serde_json::Value,
    ) -> Result<Tenant> {
        self.enter("patch_tenant", namespace, name)?;
        let patched = {
            let mut state = self.state();
            let current = state
                .tenants
                .get(&key(namespace, name))
                .ok_or_else(|| not_found("tenant", namespace, name))?;
            let mut value = serde_json::to_value(current)?;
            merge_patch(&mut value, patch);
            let mut patched: Tenant = serde_json::from_value(value)?;
            patched.metadata.resource_version = Some(Self::next_revision(&mut state));
            state.tenants.insert(key(namespace, name), patched.clone());
            patched
        };
        self.leave("patch_tenant", namespace, name).await;
        Ok(patched)
    }

    async fn delete_tenant(&self, namespace: &str, name: &str) -> Result<()> {
        self.enter("delete_tenant", namespace, name)?;
        self.state()
            .tenants
            .remove(&key(namespace, name))
            .map(|_| ())
            .ok_or_else(|| not_found("tenant", namespace, name))
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<corev1::Secret> {
        self.enter("get_secret", namespace, name)?;
        self.secret(namespace, name)
            .ok_or_else(|| not_found("secret", namespace, name))
    }

    async fn create_secret(
        &self,
        namespace: &str,
        secret: &corev1::Secret,
    ) -> Result<corev1::Secret> {
        let name = secret.name_any();
        self.enter("create_secret", namespace, &name)?;
        let created = {
            let mut state = self.state();
            if state.secrets.contains_key(&key(namespace, &name)) {
                return Err(already_exists("secret", namespace, &name));
            }
            let mut created = secret.clone();
            created.metadata.namespace = Some(namespace.to_string());
            if let Some(string_data) = created.string_data.take() {
                let data = created.data.get_or_insert_with(Default::default);
                for (k, v) in string_data {
                    data.insert(k, k8s_openapi::ByteString(v.into_bytes()));
                }
            }
            state.secrets.insert(key(namespace, &name), created.clone());
            created
        };
        self.leave("create_secret", namespace, &name).await;
        Ok(created)
    }

    async fn update_secret(
        &self,
        namespace: &str,
        secret: &corev1::Secret,
    ) -> Result<corev1::Secret> {
        let name = secret.name_any();
        self.enter("update_secret", namespace, &name)?;
        {
            let mut state = self.state();
            let current = state
                .secrets
                .get(&key(namespace, &name))
                .ok_or_else(|| not_found("secret", namespace, &name))?;
            if current.immutable == Some(true) {
                return Err(Error::Internal {
                    message: format!("secret {}/{} is immutable", namespace, name),
                });
            }
            state.secrets.insert(key(namespace, &name), secret.clone());
        }
        self.leave("update_secret", namespace, &name).await;
        Ok(secret.clone())
    }

    async fn delete_secret(&self, namespace: &str, name: &str) -> Result<()> {
        self.enter("delete_secret", namespace, name)?;
        self.state()
            .secrets
            .remove(&key(namespace, name))
            .ok_or_else(|| not_found("secret", namespace, name))?;
        self.leave("delete_secret", namespace, name).await;
        Ok(())
    }

    async fn delete_secrets(&self, namespace: &str, label_selector: &str) -> Result<()> {
        self.enter("delete_secrets", namespace, label_selector)?;
        self.state().secrets.retain(|(ns, _), secret| {
            ns != namespace || !selector_matches(label_selector, secret.labels())
        });
        Ok(())
    }

    async fn delete_pods(&self, namespace: &str, label_selector: &str) -> Result<()> {
        self.enter("delete_pods", namespace, label_selector)?;
        self.state()
            .pods
            .retain(|(ns, _), pod| ns != namespace || !selector_matches(label_selector, pod.labels()));
        Ok(())
    }

    async fn delete_persistent_volume_claims(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<()> {
        self.enter("delete_pvcs", namespace, label_selector)?;
        self.state()
            .pvcs
            .retain(|(ns, _), pvc| ns != namespace || !selector_matches(label_selector, pvc.labels()));
        Ok(())
    }

    async fn get_service(&self, namespace: &str, name: &str) -> Result<corev1::Service> {
        self.enter("get_service", namespace, name)?;
        self.state()
            .services
            .get(&key(namespace, name))
            .cloned()
            .ok_or_else(|| not_found("service", namespace, name))
    }

    async fn list_nodes(&self) -> Result<Vec<corev1::Node>> {
        self.enter("list_nodes", "", "")?;
        Ok(self.state().nodes.clone())
    }

    async fn get_resource_quota(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<corev1::ResourceQuota> {
        self.enter("get_resource_quota", namespace, name)?;
        self.state()
            .quotas
            .get(&key(namespace, name))
            .cloned()
            .ok_or_else(|| not_found("resourcequota", namespace, name))
    }

    async fn list_storage_classes(&self) -> Result<Vec<storagev1::StorageClass>> {
        self.enter("list_storage_classes", "", "")?;
        Ok(self.state().storage_classes.clone())
    }

    async fn list_events(
        &self,
        namespace: &str,
        field_selector: &str,
    ) -> Result<Vec<corev1::Event>> {
        self.enter("list_events", namespace, field_selector)?;
        let wanted: BTreeMap<String, String> = field_selector
            .split(',')
            .filter_map(|term| term.split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Ok(self
            .state()
            .events
            .iter()
            .filter(|event| event.metadata.namespace.as_deref() == Some(namespace))
            .filter(|event| {
                wanted.iter().all(|(k, v)| match k.as_str() {
                    "involvedObject.uid" => event.involved_object.uid.as_deref() == Some(v),
                    "involvedObject.name" => event.involved_object.name.as_deref() == Some(v),
                    "involvedObject.kind" => event.involved_object.kind.as_deref() == Some(v),
                    _ => true,
                })
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_selector_matches() {
        let labels: BTreeMap<String, String> = [
            ("v1.min.io/tenant".to_string(), "acme".to_string()),
            ("v1.min.io/operation".to_string(), "abc12".to_string()),
        ]
        .into_iter()
        .collect();

        assert!(selector_matches("v1.min.io/tenant=acme", &labels));
        assert!(selector_matches(
            "v1.min.io/tenant=acme,v1.min.io/operation=abc12",
            &labels
        ));
        assert!(!selector_matches("v1.min.io/tenant=other", &labels));
        assert!(!selector_matches(
            "v1.min.io/tenant=acme,v1.min.io/operation=zzz",
            &labels
        ));
    }

    #[test]
    fn test_merge_patch() {
        let mut target = json!({"a": 1, "b": {"c": 2, "d": 3}, "list": [1, 2]});
        merge_patch(&mut target, &json!({"b": {"c": null, "e": 4}, "list": [3]}));
        assert_eq!(target, json!({"a": 1, "b": {"d": 3, "e": 4}, "list": [3]}));
    }
}
