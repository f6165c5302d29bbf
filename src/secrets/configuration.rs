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

//! The tenant configuration view.
//!
//! Sources, lowest precedence first: the tenant `env`, the legacy credentials
//! secret, then `config.env` from the configuration secret. `accesskey` and
//! `secretkey` stay in the full view for the admin client and are dropped from
//! anything returned to clients or written back.

use super::envfile::{self, CONFIG_ENV_KEY};
use super::{Materializer, value};
use crate::error::Result;
use crate::gateway::Gateway;
use crate::types::v2::tenant::Tenant;
use k8s_openapi::ByteString;
use std::collections::BTreeMap;
use tracing::{info, warn};

pub const ACCESS_KEY: &str = "accesskey";
pub const SECRET_KEY: &str = "secretkey";

const ACCESS_KEY_ALIASES: [&str; 2] = ["MINIO_ROOT_USER", "MINIO_ACCESS_KEY"];
const SECRET_KEY_ALIASES: [&str; 2] = ["MINIO_ROOT_PASSWORD", "MINIO_SECRET_KEY"];

pub fn is_privileged(key: &str) -> bool {
    key == ACCESS_KEY || key == SECRET_KEY
}

/// Drops `accesskey` and `secretkey`.
pub fn client_view(mut config: BTreeMap<String, String>) -> BTreeMap<String, String> {
    config.retain(|key, _| !is_privileged(key));
    config
}

fn alias_root_credentials(config: &mut BTreeMap<String, String>) {
    for (target, aliases) in [
        (ACCESS_KEY, ACCESS_KEY_ALIASES),
        (SECRET_KEY, SECRET_KEY_ALIASES),
    ] {
        if let Some(found) = aliases.iter().find_map(|alias| config.get(*alias)).cloned() {
            config.insert(target.to_string(), found);
        }
    }
}

/// Full configuration of a tenant, privileged keys included.
pub async fn full_view(gateway: &dyn Gateway, tenant: &Tenant) -> Result<BTreeMap<String, String>> {
    let namespace = tenant.namespace()?;
    let mut config: BTreeMap<String, String> = tenant
        .spec
        .env
        .iter()
        .map(|env| (env.name.clone(), env.value.clone().unwrap_or_default()))
        .collect();

    if let Some(creds) = tenant.spec.creds_secret.as_ref().filter(|r| !r.name.is_empty()) {
        match gateway.get_secret(&namespace, &creds.name).await {
            Ok(secret) => {
                for (key, bytes) in secret.data.unwrap_or_default() {
                    config.insert(key, String::from_utf8_lossy(&bytes.0).into_owned());
                }
            }
            Err(e) if e.is_not_found() => {
                warn!(namespace, name = creds.name, "credentials secret is missing");
            }
            Err(e) => return Err(e),
        }
    }

    if let Some(reference) = tenant.spec.configuration.as_ref().filter(|r| !r.name.is_empty()) {
        let secret = gateway.get_secret(&namespace, &reference.name).await?;
        let parsed = value(&secret, CONFIG_ENV_KEY)
            .map(|content| envfile::parse(&content))
            .unwrap_or_default();
        config.extend(parsed);
    }

    alias_root_credentials(&mut config);
    Ok(config)
}

impl Materializer<'_> {
    /// Replaces the configuration secret with `config`, minus privileged keys.
    pub async fn write_configuration(&self, name: &str, config: &BTreeMap<String, String>) -> Result<()> {
        let content = envfile::render(&client_view(config.clone()));
        let data = BTreeMap::from([(CONFIG_ENV_KEY.to_string(), content.into_bytes())]);
        let secret = self.secret(name, "Opaque", data, false);
        self.replace(&secret).await?;
        info!(namespace = self.namespace, tenant = self.tenant, name, "configuration written");
        Ok(())
    }

    /// Rewrites `config.env` of an existing configuration secret in place.
    pub async fn update_configuration(&self, name: &str, config: &BTreeMap<String, String>) -> Result<()> {
        let mut secret = self.gateway.get_secret(self.namespace, name).await?;
        let content = envfile::render(&client_view(config.clone()));
        secret
            .data
            .get_or_insert_with(Default::default)
            .insert(CONFIG_ENV_KEY.to_string(), ByteString(content.into_bytes()));
        self.gateway.update_secret(self.namespace, &secret).await?;
        info!(namespace = self.namespace, tenant = self.tenant, name, "configuration updated");
        Ok(())
    }
}
