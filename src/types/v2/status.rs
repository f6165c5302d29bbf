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

use kube::KubeSchema;
use serde::{Deserialize, Serialize};

/// Observed state written by the tenant controller. Read-only here.
#[derive(Deserialize, Serialize, Clone, Debug, KubeSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    #[serde(default)]
    pub current_state: String,

    #[serde(default)]
    pub available_replicas: i32,

    #[serde(default)]
    pub drives_online: i32,

    #[serde(default)]
    pub drives_offline: i32,

    #[serde(default)]
    pub drives_healing: i32,

    #[serde(default)]
    pub health_status: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub health_message: String,

    #[serde(default)]
    pub write_quorum: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pools: Vec<PoolStatus>,
}

#[derive(Deserialize, Serialize, Clone, Debug, KubeSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    #[serde(default)]
    pub capacity: i64,

    #[serde(default)]
    pub raw_capacity: i64,

    #[serde(default)]
    pub usage: i64,

    #[serde(default)]
    pub raw_usage: i64,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tiers: Vec<TierUsage>,
}

#[derive(Deserialize, Serialize, Clone, Debug, KubeSchema, Default, PartialEq)]
pub struct TierUsage {
    #[serde(default, rename = "Name")]
    pub name: String,

    #[serde(default, rename = "Type")]
    pub type_: String,

    #[serde(default, rename = "TotalSize")]
    pub total_size: i64,
}

#[derive(Deserialize, Serialize, Clone, Debug, KubeSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PoolStatus {
    #[serde(default)]
    pub ss_name: String,

    #[serde(default)]
    pub state: String,
}
