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

//! Intent composers.
//!
//! Each composer loads the current Tenant, derives the new desired state, writes
//! the dependent secrets and then commits the Tenant. When a call fails after a
//! secret was written, the secrets it wrote are deleted again by label.

mod cluster;
mod configuration;
mod create;
mod encryption;
mod identity;
mod monitoring;
mod pools;
mod security;
mod tenant;

use crate::admin::{self, AdminConnector};
use crate::error::{AdminSnafu, Result};
use crate::gateway::{Cancellable, Gateway};
use crate::secrets::Materializer;
use crate::secrets::configuration::{ACCESS_KEY, SECRET_KEY, full_view};
use crate::types::v2::tenant::Tenant;
use snafu::ResultExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub struct Composer {
    gateway: Cancellable,
    /// Used for rollbacks, which must run even after the request was cancelled.
    raw: Arc<dyn Gateway>,
    admin: Arc<dyn AdminConnector>,
}

impl Composer {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        admin: Arc<dyn AdminConnector>,
        token: CancellationToken,
    ) -> Self {
        Self {
            gateway: Cancellable::new(gateway.clone(), token),
            raw: gateway,
            admin,
        }
    }

    pub(crate) fn gateway(&self) -> &dyn Gateway {
        &self.gateway
    }

    pub(crate) async fn load(&self, namespace: &str, name: &str) -> Result<Tenant> {
        self.gateway.get_tenant(namespace, name).await
    }

    /// Hands `result` back, deleting what `materializer` wrote when it failed.
    pub(crate) async fn settle<T>(
        &self,
        namespace: &str,
        materializer: &Materializer<'_>,
        result: Result<T>,
    ) -> Result<T> {
        let Err(e) = &result else {
            return result;
        };
        if materializer.has_written() {
            let selector = materializer.selector();
            warn!(namespace, selector, error = %e, "composer failed, rolling back secrets");
            match self.raw.delete_secrets(namespace, &selector).await {
                Ok(()) => info!(namespace, selector, "secrets rolled back"),
                Err(rollback) => {
                    warn!(namespace, selector, error = %rollback, "secret rollback failed")
                }
            }
        }
        result
    }

    /// Admin client authenticated with the tenant's root credentials.
    pub(crate) async fn admin_client(&self, tenant: &Tenant) -> Result<Box<dyn admin::AdminClient>> {
        let config = full_view(&self.gateway, tenant).await?;
        let access_key = config.get(ACCESS_KEY).map(String::as_str).unwrap_or_default();
        let secret_key = config.get(SECRET_KEY).map(String::as_str).unwrap_or_default();

        self.admin
            .connect(&tenant.service_url()?, access_key, secret_key)
            .context(AdminSnafu)
    }
}
