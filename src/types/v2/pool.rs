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

use crate::types::error::{Error, InvalidStorageRequestSnafu, NoVolumeClaimTemplateSnafu};
use crate::utils::quantity;
use k8s_openapi::api::core::v1 as corev1;
use kube::KubeSchema;
use serde::{Deserialize, Serialize};
use snafu::OptionExt;
use std::collections::BTreeMap;

#[derive(Deserialize, Serialize, Clone, Debug, KubeSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    #[serde(default)]
    pub name: String,

    #[x_kube(validation = Rule::new("self > 0").message("servers must be greater than 0"))]
    pub servers: i32,

    #[x_kube(validation = Rule::new("self > 0").message("volumesPerServer must be greater than 0"))]
    pub volumes_per_server: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_claim_template: Option<corev1::PersistentVolumeClaim>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<corev1::ResourceRequirements>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affinity: Option<corev1::Affinity>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tolerations: Vec<corev1::Toleration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_context: Option<corev1::PodSecurityContext>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_class_name: Option<String>,
}

impl Pool {
    /// Storage requested by each volume of the pool, in bytes.
    pub fn volume_size(&self) -> Result<i64, Error> {
        let storage = self
            .volume_claim_template
            .as_ref()
            .and_then(|pvc| pvc.spec.as_ref())
            .and_then(|spec| spec.resources.as_ref())
            .and_then(|resources| resources.requests.as_ref())
            .and_then(|requests| requests.get("storage"))
            .context(NoVolumeClaimTemplateSnafu {
                pool: self.name.clone(),
            })?;

        quantity::parse(&storage.0).map_err(|_| {
            InvalidStorageRequestSnafu {
                pool: self.name.clone(),
                value: storage.0.clone(),
            }
            .build()
        })
    }

    /// Raw capacity of the pool: servers x volumes x volume size.
    pub fn capacity(&self) -> Result<i64, Error> {
        Ok(i64::from(self.servers) * i64::from(self.volumes_per_server) * self.volume_size()?)
    }

    pub fn storage_class_name(&self) -> Option<&str> {
        self.volume_claim_template
            .as_ref()
            .and_then(|pvc| pvc.spec.as_ref())
            .and_then(|spec| spec.storage_class_name.as_deref())
    }
}
