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

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MaxAllocatableMemory {
    pub max_memory: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NodeMaxAllocatable {
    pub max_allocatable_cpu: i64,
    pub max_allocatable_mem: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AllocatableResources {
    pub min_allocatable_cpu: i64,
    pub min_allocatable_mem: i64,
    pub cpu_priority: NodeMaxAllocatable,
    pub mem_priority: NodeMaxAllocatable,
}

/// Label key to the sorted unique values found across nodes.
pub type NodeLabels = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResourceQuotaElement {
    pub name: String,
    pub hard: i64,
    pub used: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResourceQuota {
    pub name: String,
    pub elements: Vec<ResourceQuotaElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EventListElement {
    pub namespace: String,
    /// Unix seconds.
    pub last_seen: i64,
    pub message: String,
    pub event_type: String,
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NodeCountQuery {
    pub num_nodes: usize,
}
