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

use crate::models::KeyValue;
use crate::models::pool::SecurityContext;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Prometheus settings, used both to read and to write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct MonitoringInfo {
    pub prometheus_enabled: bool,
    /// When set, only flips Prometheus on or off.
    pub toggle: bool,
    pub storage_class_name: String,
    pub monitoring_cpu_request: String,
    pub monitoring_mem_request: String,
    pub labels: Vec<KeyValue>,
    pub annotations: Vec<KeyValue>,
    pub node_selector: Vec<KeyValue>,
    pub disk_capacity_gb: String,
    pub image: String,
    pub sidecar_image: String,
    pub init_image: String,
    pub service_account_name: String,
    pub security_context: Option<SecurityContext>,
}
