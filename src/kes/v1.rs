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

//! Layout read by KES releases before v0.22.0.

use super::backend::Keys;
use super::{Cache, Log, Tls};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_POLICY: &str = "default-policy";
pub const MINIO_KEY: &str = "my-minio-key";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    #[serde(default)]
    pub paths: Vec<String>,
    #[serde(default)]
    pub identities: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub root: String,
    #[serde(default)]
    pub tls: Tls,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub policy: BTreeMap<String, Policy>,
    #[serde(default)]
    pub cache: Cache,
    #[serde(default)]
    pub log: Log,
    #[serde(default)]
    pub keys: Keys,
}

impl ServerConfig {
    /// Root access is disabled; `identity` may only use the MinIO key.
    pub fn new(identity: &str, keys: Keys) -> Self {
        let paths = ["create", "generate", "decrypt"]
            .iter()
            .map(|op| format!("/v1/key/{}/{}", op, MINIO_KEY))
            .collect();

        Self {
            address: super::DEFAULT_ADDRESS.to_string(),
            root: "disabled".to_string(),
            tls: Tls::server(),
            policy: BTreeMap::from([(
                DEFAULT_POLICY.to_string(),
                Policy {
                    paths,
                    identities: vec![identity.to_string()],
                },
            )]),
            cache: Cache::standard(),
            log: Log::standard(),
            keys,
        }
    }
}
