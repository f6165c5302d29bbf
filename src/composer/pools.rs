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

//! Pool additions and replacements, committed as merge patches.

use super::Composer;
use crate::gateway::Gateway;
use crate::error::{Error, Result};
use crate::models::pool::{Pool, PoolUpdateRequest};
use crate::projection::{from_pool, to_pool};
use crate::types::v2::pool as v2;
use serde_json::json;
use std::collections::BTreeSet;
use tracing::info;

/// Converts and validates `pools`, naming unnamed ones `pool-{i}` after the
/// `existing` pools already on the tenant.
pub(crate) fn plan_pools(pools: &[Pool], existing: &[v2::Pool]) -> Result<Vec<v2::Pool>> {
    if pools.is_empty() {
        return Err(Error::invalid_request("at least one pool is required"));
    }

    let mut taken: BTreeSet<String> = existing.iter().map(|pool| pool.name.clone()).collect();
    let mut next = existing.len();
    let mut planned = Vec::with_capacity(pools.len());

    for pool in pools {
        let mut converted = to_pool(pool)?;
        if converted.name.is_empty() {
            while taken.contains(&format!("pool-{}", next)) {
                next += 1;
            }
            converted.name = format!("pool-{}", next);
        }
        if !taken.insert(converted.name.clone()) {
            return Err(Error::invalid_request(format!(
                "pool '{}' is defined more than once",
                converted.name
            )));
        }
        planned.push(converted);
    }
    Ok(planned)
}

impl Composer {
    async fn patch_pools(&self, namespace: &str, name: &str, pools: &[v2::Pool]) -> Result<Vec<Pool>> {
        let patch = json!({ "spec": { "pools": serde_json::to_value(pools)? } });
        let tenant = self.gateway.patch_tenant(namespace, name, &patch).await?;
        info!(namespace, tenant = name, pools = pools.len(), "pools patched");
        Ok(tenant.spec.pools.iter().map(from_pool).collect())
    }

    /// Appends one pool.
    pub async fn add_pool(&self, namespace: &str, name: &str, pool: &Pool) -> Result<Vec<Pool>> {
        let tenant = self.load(namespace, name).await?;
        let mut pools = tenant.spec.pools.clone();
        pools.extend(plan_pools(std::slice::from_ref(pool), &tenant.spec.pools)?);
        self.patch_pools(namespace, name, &pools).await
    }

    /// Rewrites the whole pool list.
    pub async fn replace_pools(
        &self,
        namespace: &str,
        name: &str,
        request: &PoolUpdateRequest,
    ) -> Result<Vec<Pool>> {
        // fetched so a missing tenant fails before the patch
        self.load(namespace, name).await?;
        let pools = plan_pools(&request.pools, &[])?;
        self.patch_pools(namespace, name, &pools).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::testing::Harness;
    use crate::error::ErrorKind;
    use crate::models::pool::VolumeConfiguration;
    use crate::tests::create_test_tenant;

    fn pool(name: &str, servers: i64) -> Pool {
        Pool {
            name: name.to_string(),
            servers,
            volumes_per_server: 4,
            volume_configuration: Some(VolumeConfiguration {
                size: 2_000_000_000,
                storage_class_name: "fast".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_unnamed_pools_get_free_names() {
        let existing = create_test_tenant("acme", "ns1").spec.pools;
        let planned = plan_pools(&[pool("", 4), pool("", 2)], &existing).unwrap();
        assert_eq!(planned[0].name, "pool-1");
        assert_eq!(planned[1].name, "pool-2");
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let err = plan_pools(&[pool("a", 4), pool("a", 4)], &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }

    #[tokio::test]
    async fn test_add_pool_appends() {
        let harness = Harness::new();
        harness.gateway.insert_tenant(create_test_tenant("acme", "ns1"));

        let pools = harness
            .composer()
            .add_pool("ns1", "acme", &pool("pool-1", 8))
            .await
            .unwrap();
        assert_eq!(pools.len(), 2);
        assert_eq!(pools[1].servers, 8);

        let tenant = harness.gateway.tenant("ns1", "acme").unwrap();
        assert_eq!(tenant.spec.pools[0].name, "pool-0");
        assert_eq!(tenant.spec.pools[1].name, "pool-1");
        assert!(harness.gateway.journal().contains(&"patch_tenant ns1/acme".to_string()));
    }

    #[tokio::test]
    async fn test_replace_pools_validates_before_patching() {
        let harness = Harness::new();
        harness.gateway.insert_tenant(create_test_tenant("acme", "ns1"));
        let composer = harness.composer();

        let request = PoolUpdateRequest {
            pools: vec![pool("pool-0", 0)],
        };
        let err = composer.replace_pools("ns1", "acme", &request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert!(!harness.gateway.journal().contains(&"patch_tenant ns1/acme".to_string()));

        let request = PoolUpdateRequest {
            pools: vec![pool("big", 16)],
        };
        let pools = composer.replace_pools("ns1", "acme", &request).await.unwrap();
        assert_eq!(pools.len(), 1);
        assert_eq!(pools[0].name, "big");
        assert_eq!(harness.gateway.tenant("ns1", "acme").unwrap().spec.pools[0].servers, 16);
    }
}
