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

use super::{Materializer, names};
use crate::error::Result;
use crate::models::tenant::ImageRegistry;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use k8s_openapi::ByteString;
use serde_json::json;
use std::collections::BTreeMap;
use tracing::info;

pub const DOCKER_CONFIG_KEY: &str = ".dockerconfigjson";
pub const DOCKER_CONFIG_TYPE: &str = "kubernetes.io/dockerconfigjson";

fn docker_config(registry: &ImageRegistry) -> Result<Vec<u8>> {
    let auth = STANDARD.encode(format!("{}:{}", registry.username, registry.password));
    let body = json!({
        "auths": {
            registry.registry.as_str(): {
                "username": registry.username,
                "password": registry.password,
                "auth": auth,
            }
        }
    });
    Ok(serde_json::to_vec(&body)?)
}

impl Materializer<'_> {
    /// Writes the `{tenant}-regcred` pull secret and returns its name.
    ///
    /// Nothing happens unless registry, username and password are all set. The
    /// secret keeps its name, so an existing one is updated in place.
    pub async fn set_image_registry(
        &self,
        registry: Option<&ImageRegistry>,
    ) -> Result<Option<String>> {
        let Some(registry) = registry.filter(|r| {
            !r.registry.is_empty() && !r.username.is_empty() && !r.password.is_empty()
        }) else {
            return Ok(None);
        };

        let name = names::registry(self.tenant);
        let config = docker_config(registry)?;

        match self.gateway.get_secret(self.namespace, &name).await {
            Ok(mut existing) => {
                existing.data = Some(BTreeMap::from([(
                    DOCKER_CONFIG_KEY.to_string(),
                    ByteString(config),
                )]));
                self.gateway.update_secret(self.namespace, &existing).await?;
                info!(namespace = self.namespace, name, "image pull secret updated");
            }
            Err(e) if e.is_not_found() => {
                let data = BTreeMap::from([(DOCKER_CONFIG_KEY.to_string(), config)]);
                let secret = self.secret(&name, DOCKER_CONFIG_TYPE, data, false);
                self.create(&secret).await?;
                info!(namespace = self.namespace, name, "image pull secret created");
            }
            Err(e) => return Err(e),
        }

        Ok(Some(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::fake::FakeGateway;

    fn registry() -> ImageRegistry {
        ImageRegistry {
            registry: "quay.io".to_string(),
            username: "robot".to_string(),
            password: "hunter2".to_string(),
        }
    }

    #[tokio::test]
    async fn test_incomplete_registry_is_ignored() {
        let gateway = FakeGateway::new();
        let materializer = Materializer::new(&gateway, "ns1", "acme");

        assert_eq!(materializer.set_image_registry(None).await.unwrap(), None);
        let mut partial = registry();
        partial.password.clear();
        assert_eq!(materializer.set_image_registry(Some(&partial)).await.unwrap(), None);
        assert!(gateway.journal().is_empty());
    }

    #[tokio::test]
    async fn test_registry_is_created_then_updated_in_place() {
        let gateway = FakeGateway::new();
        let materializer = Materializer::new(&gateway, "ns1", "acme");

        let name = materializer.set_image_registry(Some(&registry())).await.unwrap();
        assert_eq!(name.as_deref(), Some("acme-regcred"));
        let first = gateway.secret("ns1", "acme-regcred").unwrap();
        assert_eq!(first.type_.as_deref(), Some(DOCKER_CONFIG_TYPE));

        let body: serde_json::Value = serde_json::from_str(
            &gateway.secret_value("ns1", "acme-regcred", DOCKER_CONFIG_KEY).unwrap(),
        )
        .unwrap();
        assert_eq!(body["auths"]["quay.io"]["username"], "robot");
        assert_eq!(body["auths"]["quay.io"]["auth"], "cm9ib3Q6aHVudGVyMg==");

        gateway.clear_journal();
        materializer.set_image_registry(Some(&registry())).await.unwrap();
        assert_eq!(
            gateway.journal(),
            vec!["get_secret ns1/acme-regcred", "update_secret ns1/acme-regcred"]
        );
        assert_eq!(gateway.secret("ns1", "acme-regcred").unwrap().data, first.data);
    }
}
