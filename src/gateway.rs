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

//! Typed access to the orchestrator.
//!
//! Composers only talk to the cluster through [`Gateway`]. [`KubeGateway`] is the
//! production implementation; [`Cancellable`] wraps any gateway so every call
//! races the request's cancellation token.

use crate::error::{CancelledSnafu, KubeSnafu, Result};
use crate::types::v2::tenant::Tenant;
use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use k8s_openapi::api::core::v1 as corev1;
use k8s_openapi::api::storage::v1 as storagev1;
use kube::api::{Api, DeleteParams, ListParams, Patch, PatchParams, PostParams};
use kube::{Resource, ResourceExt};
use serde::Serialize;
use serde::de::DeserializeOwned;
use snafu::ResultExt;
use snafu::futures::TryFutureExt;
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[cfg(test)]
pub mod fake;

#[async_trait]
pub trait Gateway: Send + Sync {
    async fn get_tenant(&self, namespace: &str, name: &str) -> Result<Tenant>;

    /// Lists tenants in one namespace, or in all namespaces when `None`.
    async fn list_tenants(&self, namespace: Option<&str>) -> Result<Vec<Tenant>>;

    async fn create_tenant(&self, namespace: &str, tenant: &Tenant) -> Result<Tenant>;

    /// Full update, guarded by the tenant's `resourceVersion`.
    async fn update_tenant(&self, namespace: &str, tenant: &Tenant) -> Result<Tenant>;

    /// JSON merge patch.
    async fn patch_tenant(
        &self,
        namespace: &str,
        name: &str,
        patch: &serde_json::Value,
    ) -> Result<Tenant>;

    async fn delete_tenant(&self, namespace: &str, name: &str) -> Result<()>;

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<corev1::Secret>;

    async fn create_secret(&self, namespace: &str, secret: &corev1::Secret)
    -> Result<corev1::Secret>;

    async fn update_secret(&self, namespace: &str, secret: &corev1::Secret)
    -> Result<corev1::Secret>;

    async fn delete_secret(&self, namespace: &str, name: &str) -> Result<()>;

    async fn delete_secrets(&self, namespace: &str, label_selector: &str) -> Result<()>;

    async fn delete_pods(&self, namespace: &str, label_selector: &str) -> Result<()>;

    async fn delete_persistent_volume_claims(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<()>;

    async fn get_service(&self, namespace: &str, name: &str) -> Result<corev1::Service>;

    async fn list_nodes(&self) -> Result<Vec<corev1::Node>>;

    async fn get_resource_quota(&self, namespace: &str, name: &str)
    -> Result<corev1::ResourceQuota>;

    async fn list_storage_classes(&self) -> Result<Vec<storagev1::StorageClass>>;

    async fn list_events(&self, namespace: &str, field_selector: &str)
    -> Result<Vec<corev1::Event>>;
}

/// Gateway backed by a `kube::Client`.
#[derive(Clone)]
pub struct KubeGateway {
    client: kube::Client,
}

impl KubeGateway {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }

    fn api<T>(&self, namespace: &str) -> Api<T>
    where
        T: Resource<Scope = NamespaceResourceScope>,
        <T as Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), namespace)
    }

    async fn get<T>(&self, namespace: &str, name: &str) -> Result<T>
    where
        T: Clone + DeserializeOwned + Debug + Resource<Scope = NamespaceResourceScope>,
        <T as Resource>::DynamicType: Default,
    {
        self.api::<T>(namespace).get(name).context(KubeSnafu).await
    }

    async fn create<T>(&self, namespace: &str, resource: &T) -> Result<T>
    where
        T: Clone + Serialize + DeserializeOwned + Debug + Resource<Scope = NamespaceResourceScope>,
        <T as Resource>::DynamicType: Default,
    {
        self.api::<T>(namespace)
            .create(&PostParams::default(), resource)
            .context(KubeSnafu)
            .await
    }

    async fn replace<T>(&self, namespace: &str, resource: &T) -> Result<T>
    where
        T: Clone + Serialize + DeserializeOwned + Debug + Resource<Scope = NamespaceResourceScope>,
        <T as Resource>::DynamicType: Default,
    {
        self.api::<T>(namespace)
            .replace(&resource.name_any(), &PostParams::default(), resource)
            .context(KubeSnafu)
            .await
    }

    async fn delete<T>(&self, namespace: &str, name: &str) -> Result<()>
    where
        T: Clone + DeserializeOwned + Debug + Resource<Scope = NamespaceResourceScope>,
        <T as Resource>::DynamicType: Default,
    {
        self.api::<T>(namespace)
            .delete(name, &DeleteParams::default())
            .context(KubeSnafu)
            .await?;
        Ok(())
    }

    async fn delete_collection<T>(&self, namespace: &str, label_selector: &str) -> Result<()>
    where
        T: Clone + DeserializeOwned + Debug + Resource<Scope = NamespaceResourceScope>,
        <T as Resource>::DynamicType: Default,
    {
        debug!(namespace, label_selector, kind = %T::kind(&Default::default()), "delete collection");
        self.api::<T>(namespace)
            .delete_collection(
                &DeleteParams::default(),
                &ListParams::default().labels(label_selector),
            )
            .context(KubeSnafu)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Gateway for KubeGateway {
    async fn get_tenant(&self, namespace: &str, name: &str) -> Result<Tenant> {
        self.get(namespace, name).await
    }

    async fn list_tenants(&self, namespace: Option<&str>) -> Result<Vec<Tenant>> {
        let api: Api<Tenant> = match namespace {
            Some(namespace) => self.api(namespace),
            None => Api::all(self.client.clone()),
        };
        let list = api.list(&ListParams::default()).context(KubeSnafu).await?;
        Ok(list.items)
    }

    async fn create_tenant(&self, namespace: &str, tenant: &Tenant) -> Result<Tenant> {
        self.create(namespace, tenant).await
    }

    async fn update_tenant(&self, namespace: &str, tenant: &Tenant) -> Result<Tenant> {
        self.replace(namespace, tenant).await
    }

    async fn patch_tenant(
        &self,
        namespace: &str,
        name: &str,
        patch: &serde_json::Value,
    ) -> Result<Tenant> {
        self.api::<Tenant>(namespace)
            .patch(name, &PatchParams::default(), &Patch::Merge(patch))
            .context(KubeSnafu)
            .await
    }

    async fn delete_tenant(&self, namespace: &str, name: &str) -> Result<()> {
        self.delete::<Tenant>(namespace, name).await
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<corev1::Secret> {
        self.get(namespace, name).await
    }

    async fn create_secret(
        &self,
        namespace: &str,
        secret: &corev1::Secret,
    ) -> Result<corev1::Secret> {
        self.create(namespace, secret).await
    }

    async fn update_secret(
        &self,
        namespace: &str,
        secret: &corev1::Secret,
    ) -> Result<corev1::Secret> {
        self.replace(namespace, secret).await
    }

    async fn delete_secret(&self, namespace: &str, name: &str) -> Result<()> {
        self.delete::<corev1::Secret>(namespace, name).await
    }

    async fn delete_secrets(&self, namespace: &str, label_selector: &str) -> Result<()> {
        self.delete_collection::<corev1::Secret>(namespace, label_selector)
            .await
    }

    async fn delete_pods(&self, namespace: &str, label_selector: &str) -> Result<()> {
        self.delete_collection::<corev1::Pod>(namespace, label_selector)
            .await
    }

    async fn delete_persistent_volume_claims(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<()> {
        self.delete_collection::<corev1::PersistentVolumeClaim>(namespace, label_selector)
            .await
    }

    async fn get_service(&self, namespace: &str, name: &str) -> Result<corev1::Service> {
        self.get(namespace, name).await
    }

    async fn list_nodes(&self) -> Result<Vec<corev1::Node>> {
        let api: Api<corev1::Node> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).context(KubeSnafu).await?;
        Ok(list.items)
    }

    async fn get_resource_quota(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<corev1::ResourceQuota> {
        self.get(namespace, name).await
    }

    async fn list_storage_classes(&self) -> Result<Vec<storagev1::StorageClass>> {
        let api: Api<storagev1::StorageClass> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).context(KubeSnafu).await?;
        Ok(list.items)
    }

    async fn list_events(
        &self,
        namespace: &str,
        field_selector: &str,
    ) -> Result<Vec<corev1::Event>> {
        let list = self
            .api::<corev1::Event>(namespace)
            .list(&ListParams::default().fields(field_selector))
            .context(KubeSnafu)
            .await?;
        Ok(list.items)
    }
}

/// Opens a gateway acting with a caller's bearer token.
#[async_trait]
pub trait GatewayProvider: Send + Sync {
    async fn connect(&self, token: &str) -> Result<Arc<dyn Gateway>>;
}

/// Builds one client per session from a shared base configuration.
#[derive(Clone)]
pub struct KubeGatewayProvider {
    config: kube::Config,
}

impl KubeGatewayProvider {
    pub fn new(config: kube::Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl GatewayProvider for KubeGatewayProvider {
    async fn connect(&self, token: &str) -> Result<Arc<dyn Gateway>> {
        let mut config = self.config.clone();
        config.auth_info.token = Some(token.to_string().into());
        let client = kube::Client::try_from(config).context(KubeSnafu)?;
        Ok(Arc::new(KubeGateway::new(client)))
    }
}

/// Gateway whose calls abort with `Cancelled` once the token fires.
#[derive(Clone)]
pub struct Cancellable {
    inner: Arc<dyn Gateway>,
    token: CancellationToken,
}

impl Cancellable {
    pub fn new(inner: Arc<dyn Gateway>, token: CancellationToken) -> Self {
        Self { inner, token }
    }

    async fn guard<T>(&self, call: impl Future<Output = Result<T>> + Send) -> Result<T> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => CancelledSnafu.fail(),
            result = call => result,
        }
    }
}

#[async_trait]
impl Gateway for Cancellable {
    async fn get_tenant(&self, namespace: &str, name: &str) -> Result<Tenant> {
        self.guard(self.inner.get_tenant(namespace, name)).await
    }

    async fn list_tenants(&self, namespace: Option<&str>) -> Result<Vec<Tenant>> {
        self.guard(self.inner.list_tenants(namespace)).await
    }

    async fn create_tenant(&self, namespace: &str, tenant: &Tenant) -> Result<Tenant> {
        self.guard(self.inner.create_tenant(namespace, tenant)).await
    }

    async fn update_tenant(&self, namespace: &str, tenant: &Tenant) -> Result<Tenant> {
        self.guard(self.inner.update_tenant(namespace, tenant)).await
    }

    async fn patch_tenant(
        &self,
        namespace: &str,
        name: &str,
        patch: &serde_json::Value,
    ) -> Result<Tenant> {
        self.guard(self.inner.patch_tenant(namespace, name, patch))
            .await
    }

    async fn delete_tenant(&self, namespace: &str, name: &str) -> Result<()> {
        self.guard(self.inner.delete_tenant(namespace, name)).await
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<corev1::Secret> {
        self.guard(self.inner.get_secret(namespace, name)).await
    }

    async fn create_secret(
        &self,
        namespace: &str,
        secret: &corev1::Secret,
    ) -> Result<corev1::Secret> {
        self.guard(self.inner.create_secret(namespace, secret)).await
    }

    async fn update_secret(
        &self,
        namespace: &str,
        secret: &corev1::Secret,
    ) -> Result<corev1::Secret> {
        self.guard(self.inner.update_secret(namespace, secret)).await
    }

    async fn delete_secret(&self, namespace: &str, name: &str) -> Result<()> {
        self.guard(self.inner.delete_secret(namespace, name)).await
    }

    async fn delete_secrets(&self, namespace: &str, label_selector: &str) -> Result<()> {
        self.guard(self.inner.delete_secrets(namespace, label_selector))
            .await
    }

    async fn delete_pods(&self, namespace: &str, label_selector: &str) -> Result<()> {
        self.guard(self.inner.delete_pods(namespace, label_selector))
            .await
    }

    async fn delete_persistent_volume_claims(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<()> {
        self.guard(
            self.inner
                .delete_persistent_volume_claims(namespace, label_selector),
        )
        .await
    }

    async fn get_service(&self, namespace: &str, name: &str) -> Result<corev1::Service> {
        self.guard(self.inner.get_service(namespace, name)).await
    }

    async fn list_nodes(&self) -> Result<Vec<corev1::Node>> {
        self.guard(self.inner.list_nodes()).await
    }

    async fn get_resource_quota(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<corev1::ResourceQuota> {
        self.guard(self.inner.get_resource_quota(namespace, name))
            .await
    }

    async fn list_storage_classes(&self) -> Result<Vec<storagev1::StorageClass>> {
        self.guard(self.inner.list_storage_classes()).await
    }

    async fn list_events(
        &self,
        namespace: &str,
        field_selector: &str,
    ) -> Result<Vec<corev1::Event>> {
        self.guard(self.inner.list_events(namespace, field_selector))
            .await
    }
}
