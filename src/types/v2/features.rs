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

#[derive(Deserialize, Serialize, Clone, Debug, KubeSchema, Default, PartialEq)]
pub struct Features {
    #[serde(default, rename = "bucketDNS")]
    pub bucket_dns: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domains: Option<TenantDomains>,

    #[serde(default, rename = "enableSFTP", skip_serializing_if = "Option::is_none")]
    pub enable_sftp: Option<bool>,
}

#[derive(Deserialize, Serialize, Clone, Debug, KubeSchema, Default, PartialEq)]
pub struct TenantDomains {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub minio: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub console: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, KubeSchema, Default, PartialEq)]
pub struct ExposeServices {
    #[serde(default)]
    pub minio: bool,

    #[serde(default)]
    pub console: bool,
}
