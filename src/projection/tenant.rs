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

use super::{from_pool, timestamp};
use crate::models::tenant::{
    DomainsConfiguration, TenantInfo, TenantListItem, TenantStatus, TenantUsageStatus, TierElement,
};
use crate::types::v2::tenant::Tenant;

pub fn tenant_info(tenant: &Tenant) -> TenantInfo {
    TenantInfo {
        name: tenant.name(),
        namespace: tenant.namespace().unwrap_or_default(),
        image: tenant.spec.image.clone(),
        current_state: current_state(tenant),
        total_size: total_size(tenant),
        pools: tenant.spec.pools.iter().map(from_pool).collect(),
        enable_prometheus: tenant.prometheus_annotations_enabled(),
        creation_date: timestamp(tenant.metadata.creation_timestamp.as_ref()),
        deletion_date: timestamp(tenant.metadata.deletion_timestamp.as_ref()),
    }
}

pub fn tenant_list_item(tenant: &Tenant) -> TenantListItem {
    let status = tenant.status.as_ref();
    let usage = status.and_then(|status| status.usage.clone()).unwrap_or_default();
    let pools = &tenant.spec.pools;

    TenantListItem {
        name: tenant.name(),
        namespace: tenant.namespace().unwrap_or_default(),
        current_state: current_state(tenant),
        health_status: status
            .map(|status| status.health_status.clone())
            .unwrap_or_default(),
        pool_count: pools.len() as i64,
        instance_count: pools.iter().map(|pool| i64::from(pool.servers)).sum(),
        volume_count: pools
            .iter()
            .map(|pool| i64::from(pool.servers) * i64::from(pool.volumes_per_server))
            .sum(),
        total_size: total_size(tenant),
        capacity_raw: usage.raw_capacity,
        capacity_raw_usage: usage.raw_usage,
        capacity: usage.capacity,
        capacity_usage: usage.usage,
        tiers: tiers(tenant),
        domains: domains(tenant),
        creation_date: timestamp(tenant.metadata.creation_timestamp.as_ref()),
        deletion_date: timestamp(tenant.metadata.deletion_timestamp.as_ref()),
    }
}

/// Health, drives and usage as last reported by the tenant controller.
pub fn tenant_status(tenant: &Tenant) -> TenantStatus {
    let Some(status) = tenant.status.as_ref() else {
        return TenantStatus::default();
    };

    TenantStatus {
        health_status: status.health_status.clone(),
        drives_online: i64::from(status.drives_online),
        drives_offline: i64::from(status.drives_offline),
        drives_healing: i64::from(status.drives_healing),
        write_quorum: i64::from(status.write_quorum),
        usage: status.usage.as_ref().map(|usage| TenantUsageStatus {
            capacity: usage.capacity,
            capacity_usage: usage.usage,
            raw: usage.raw_capacity,
            raw_usage: usage.raw_usage,
        }),
    }
}

pub fn tiers(tenant: &Tenant) -> Vec<TierElement> {
    tenant
        .status
        .iter()
        .flat_map(|status| status.usage.iter())
        .flat_map(|usage| usage.tiers.iter())
        .map(|tier| TierElement {
            name: tier.name.clone(),
            type_: tier.type_.clone(),
            size: tier.total_size,
        })
        .collect()
}

pub fn domains(tenant: &Tenant) -> Option<DomainsConfiguration> {
    let domains = tenant.spec.features.as_ref()?.domains.as_ref()?;
    Some(DomainsConfiguration {
        console: domains.console.clone(),
        minio: domains.minio.clone(),
    })
}

// pools without a readable storage request count as empty
fn total_size(tenant: &Tenant) -> i64 {
    tenant
        .spec
        .pools
        .iter()
        .map(|pool| pool.capacity().unwrap_or(0))
        .sum()
}

fn current_state(tenant: &Tenant) -> String {
    tenant
        .status
        .as_ref()
        .map(|status| status.current_state.clone())
        .unwrap_or_default()
}
