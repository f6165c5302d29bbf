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

//! Identity providers and console administrators.

use super::Composer;
use crate::admin::CONSOLE_ADMIN_POLICY;
use crate::gateway::Gateway;
use crate::error::{AdminSnafu, Result};
use crate::models::identity::{
    ActiveDirectoryConfiguration, IdpConfiguration, OidcConfiguration, SetAdministratorsRequest,
};
use crate::secrets::configuration::full_view;
use crate::secrets::{Materializer, names};
use crate::types::v2::tenant::Tenant;
use k8s_openapi::api::core::v1 as corev1;
use snafu::ResultExt;
use std::collections::BTreeMap;
use tracing::{info, warn};

const OIDC_CONFIG_URL: &str = "MINIO_IDENTITY_OPENID_CONFIG_URL";
const OIDC_CLIENT_ID: &str = "MINIO_IDENTITY_OPENID_CLIENT_ID";
const OIDC_CLIENT_SECRET: &str = "MINIO_IDENTITY_OPENID_CLIENT_SECRET";
const OIDC_CLAIM_NAME: &str = "MINIO_IDENTITY_OPENID_CLAIM_NAME";
const OIDC_REDIRECT_URI: &str = "MINIO_IDENTITY_OPENID_REDIRECT_URI";
const OIDC_SCOPES: &str = "MINIO_IDENTITY_OPENID_SCOPES";

const LDAP_SERVER_ADDR: &str = "MINIO_IDENTITY_LDAP_SERVER_ADDR";
const LDAP_SERVER_INSECURE: &str = "MINIO_IDENTITY_LDAP_SERVER_INSECURE";
const LDAP_SERVER_STARTTLS: &str = "MINIO_IDENTITY_LDAP_SERVER_STARTTLS";
const LDAP_TLS_SKIP_VERIFY: &str = "MINIO_IDENTITY_LDAP_TLS_SKIP_VERIFY";
const LDAP_LOOKUP_BIND_DN: &str = "MINIO_IDENTITY_LDAP_LOOKUP_BIND_DN";
const LDAP_LOOKUP_BIND_PASSWORD: &str = "MINIO_IDENTITY_LDAP_LOOKUP_BIND_PASSWORD";
const LDAP_USER_DN_SEARCH_BASE_DN: &str = "MINIO_IDENTITY_LDAP_USER_DN_SEARCH_BASE_DN";
const LDAP_USER_DN_SEARCH_FILTER: &str = "MINIO_IDENTITY_LDAP_USER_DN_SEARCH_FILTER";
const LDAP_GROUP_SEARCH_BASE_DN: &str = "MINIO_IDENTITY_LDAP_GROUP_SEARCH_BASE_DN";
const LDAP_GROUP_SEARCH_FILTER: &str = "MINIO_IDENTITY_LDAP_GROUP_SEARCH_FILTER";

const OIDC_KEYS: [&str; 6] = [
    OIDC_CONFIG_URL,
    OIDC_CLIENT_ID,
    OIDC_CLIENT_SECRET,
    OIDC_CLAIM_NAME,
    OIDC_REDIRECT_URI,
    OIDC_SCOPES,
];

const LDAP_KEYS: [&str; 10] = [
    LDAP_SERVER_ADDR,
    LDAP_SERVER_INSECURE,
    LDAP_SERVER_STARTTLS,
    LDAP_TLS_SKIP_VERIFY,
    LDAP_LOOKUP_BIND_DN,
    LDAP_LOOKUP_BIND_PASSWORD,
    LDAP_USER_DN_SEARCH_BASE_DN,
    LDAP_USER_DN_SEARCH_FILTER,
    LDAP_GROUP_SEARCH_BASE_DN,
    LDAP_GROUP_SEARCH_FILTER,
];

pub(crate) const DEFAULT_OIDC_SCOPES: &str = "openid,profile,email";

/// Data key of user secrets holding the console access key or directory DN.
pub(crate) const CONSOLE_ACCESS_KEY: &str = "CONSOLE_ACCESS_KEY";
pub(crate) const CONSOLE_SECRET_KEY: &str = "CONSOLE_SECRET_KEY";

const ON: &str = "on";

fn set_flag(config: &mut BTreeMap<String, String>, key: &str, enabled: bool) {
    if enabled {
        config.insert(key.to_string(), ON.to_string());
    }
}

fn flag(config: &BTreeMap<String, String>, key: &str) -> bool {
    config.get(key).is_some_and(|value| value == ON)
}

fn get(config: &BTreeMap<String, String>, key: &str) -> String {
    config.get(key).cloned().unwrap_or_default()
}

/// Replaces every OIDC and LDAP key of `config` with the given providers.
pub(crate) fn apply_identity(
    config: &mut BTreeMap<String, String>,
    oidc: Option<&OidcConfiguration>,
    active_directory: Option<&ActiveDirectoryConfiguration>,
) {
    for key in OIDC_KEYS.iter().chain(LDAP_KEYS.iter()) {
        config.remove(*key);
    }

    if let Some(oidc) = oidc {
        let scopes = match oidc.scopes.trim() {
            "" => DEFAULT_OIDC_SCOPES,
            scopes => scopes,
        };
        for (key, value) in [
            (OIDC_CONFIG_URL, oidc.configuration_url.as_str()),
            (OIDC_CLIENT_ID, oidc.client_id.as_str()),
            (OIDC_CLIENT_SECRET, oidc.secret_id.as_str()),
            (OIDC_CLAIM_NAME, oidc.claim_name.as_str()),
            (OIDC_REDIRECT_URI, oidc.redirect_url.as_str()),
            (OIDC_SCOPES, scopes),
        ] {
            config.insert(key.to_string(), value.to_string());
        }
    }

    if let Some(ad) = active_directory {
        for (key, value) in [
            (LDAP_SERVER_ADDR, &ad.url),
            (LDAP_LOOKUP_BIND_DN, &ad.lookup_bind_dn),
            (LDAP_LOOKUP_BIND_PASSWORD, &ad.lookup_bind_password),
            (LDAP_USER_DN_SEARCH_BASE_DN, &ad.user_dn_search_base_dn),
            (LDAP_USER_DN_SEARCH_FILTER, &ad.user_dn_search_filter),
            (LDAP_GROUP_SEARCH_BASE_DN, &ad.group_search_base_dn),
            (LDAP_GROUP_SEARCH_FILTER, &ad.group_search_filter),
        ] {
            config.insert(key.to_string(), value.clone());
        }
        set_flag(config, LDAP_TLS_SKIP_VERIFY, ad.skip_tls_verification);
        set_flag(config, LDAP_SERVER_INSECURE, ad.server_insecure);
        set_flag(config, LDAP_SERVER_STARTTLS, ad.server_start_tls);
    }
}

/// Identity providers found in a configuration view.
pub(crate) fn read_identity(config: &BTreeMap<String, String>) -> IdpConfiguration {
    let configured = |key: &str| config.get(key).is_some_and(|value| !value.is_empty());

    let oidc = configured(OIDC_CONFIG_URL).then(|| OidcConfiguration {
        configuration_url: get(config, OIDC_CONFIG_URL),
        client_id: get(config, OIDC_CLIENT_ID),
        secret_id: get(config, OIDC_CLIENT_SECRET),
        claim_name: get(config, OIDC_CLAIM_NAME),
        redirect_url: get(config, OIDC_REDIRECT_URI),
        scopes: get(config, OIDC_SCOPES),
    });

    let active_directory = configured(LDAP_SERVER_ADDR).then(|| ActiveDirectoryConfiguration {
        url: get(config, LDAP_SERVER_ADDR),
        lookup_bind_dn: get(config, LDAP_LOOKUP_BIND_DN),
        lookup_bind_password: get(config, LDAP_LOOKUP_BIND_PASSWORD),
        user_dn_search_base_dn: get(config, LDAP_USER_DN_SEARCH_BASE_DN),
        user_dn_search_filter: get(config, LDAP_USER_DN_SEARCH_FILTER),
        group_search_base_dn: get(config, LDAP_GROUP_SEARCH_BASE_DN),
        group_search_filter: get(config, LDAP_GROUP_SEARCH_FILTER),
        skip_tls_verification: flag(config, LDAP_TLS_SKIP_VERIFY),
        server_insecure: flag(config, LDAP_SERVER_INSECURE),
        server_start_tls: flag(config, LDAP_SERVER_STARTTLS),
        user_dns: Vec::new(),
    });

    IdpConfiguration {
        oidc,
        active_directory,
        keys: Vec::new(),
    }
}

impl Composer {
    pub async fn identity_provider(&self, namespace: &str, name: &str) -> Result<IdpConfiguration> {
        let tenant = self.load(namespace, name).await?;
        let config = full_view(&self.gateway, &tenant).await?;
        Ok(read_identity(&config))
    }

    /// Rewrites the OIDC and LDAP keys of `config.env`.
    ///
    /// An existing configuration secret is updated in place. A missing one,
    /// referenced or not, is written and attached to the tenant.
    pub async fn update_identity_provider(
        &self,
        namespace: &str,
        name: &str,
        request: &IdpConfiguration,
    ) -> Result<()> {
        let tenant = self.load(namespace, name).await?;
        let operation = names::operation_id();
        let materializer =
            Materializer::new(&self.gateway, namespace, name).for_operation(&operation);

        let result = self
            .apply_identity_provider(namespace, tenant, request, &materializer)
            .await;
        self.settle(namespace, &materializer, result).await
    }

    async fn apply_identity_provider(
        &self,
        namespace: &str,
        mut tenant: Tenant,
        request: &IdpConfiguration,
        materializer: &Materializer<'_>,
    ) -> Result<()> {
        let name = tenant.name();
        let existing = tenant
            .spec
            .configuration
            .as_ref()
            .map(|reference| reference.name.clone())
            .filter(|name| !name.is_empty());

        let (mut config, dangling) = match full_view(&self.gateway, &tenant).await {
            Ok(config) => (config, false),
            Err(e) if e.is_not_found() && existing.is_some() => {
                warn!(namespace, tenant = %name, secret = ?existing, "configuration secret is missing, writing a new one");
                let mut detached = tenant.clone();
                detached.spec.configuration = None;
                (full_view(&self.gateway, &detached).await?, true)
            }
            Err(e) => return Err(e),
        };
        apply_identity(
            &mut config,
            request.oidc.as_ref(),
            request.active_directory.as_ref(),
        );

        let secret = match existing {
            Some(secret) if !dangling => {
                materializer.update_configuration(&secret, &config).await?;
                secret
            }
            Some(secret) => {
                materializer.write_configuration(&secret, &config).await?;
                secret
            }
            None => {
                let secret = names::configuration(&name);
                materializer.write_configuration(&secret, &config).await?;
                secret
            }
        };

        tenant.spec.configuration = Some(corev1::LocalObjectReference { name: secret });
        self.gateway.update_tenant(namespace, &tenant).await?;
        info!(
            namespace,
            tenant = %name,
            oidc = request.oidc.is_some(),
            active_directory = request.active_directory.is_some(),
            "identity provider updated"
        );
        Ok(())
    }

    /// Grants `consoleAdmin` to every user DN, then every group DN.
    ///
    /// Stops at the first failure; bindings made before it are kept.
    pub async fn set_administrators(
        &self,
        namespace: &str,
        name: &str,
        request: &SetAdministratorsRequest,
    ) -> Result<()> {
        let tenant = self.load(namespace, name).await?;
        let client = self.admin_client(&tenant).await?;

        let entities = request
            .user_dns
            .iter()
            .map(|dn| (dn, false))
            .chain(request.group_dns.iter().map(|dn| (dn, true)));
        for (entity, is_group) in entities {
            client
                .set_policy(CONSOLE_ADMIN_POLICY, entity, is_group)
                .await
                .context(AdminSnafu)?;
        }

        info!(
            namespace,
            tenant = name,
            users = request.user_dns.len(),
            groups = request.group_dns.len(),
            "administrators set"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::testing::Harness;
    use crate::error::ErrorKind;
    use crate::secrets::envfile::{self, CONFIG_ENV_KEY};
    use crate::tests::{create_test_tenant, opaque_secret};

    const OIDC_CONFIG: &str = "\
export MINIO_ROOT_USER=\"minio\"
export MINIO_ROOT_PASSWORD=\"minio123\"
export MINIO_BROWSER=\"on\"
export MINIO_IDENTITY_OPENID_CONFIG_URL=\"https://idp/.well-known/openid-configuration\"
export MINIO_IDENTITY_OPENID_CLIENT_ID=\"console\"
export MINIO_IDENTITY_OPENID_SCOPES=\"openid\"
";

    fn harness_with_config(config: &str) -> Harness {
        let harness = Harness::new();
        let mut tenant = create_test_tenant("acme", "ns1");
        tenant.spec.configuration = Some(corev1::LocalObjectReference {
            name: "acme-env-configuration".to_string(),
        });
        harness.gateway.insert_tenant(tenant);
        harness.gateway.insert_secret(
            "ns1",
            opaque_secret("acme-env-configuration", &[(CONFIG_ENV_KEY, config)]),
        );
        harness
    }

    fn has_identity_keys(config: &BTreeMap<String, String>) -> bool {
        config.keys().any(|key| key.starts_with("MINIO_IDENTITY_"))
    }

    fn stored_config(harness: &Harness) -> BTreeMap<String, String> {
        let content = harness
            .gateway
            .secret_value("ns1", "acme-env-configuration", CONFIG_ENV_KEY)
            .unwrap();
        envfile::parse(&content)
    }

    #[test]
    fn test_ldap_flags_are_on_only_when_set() {
        let mut config = BTreeMap::new();
        let ad = ActiveDirectoryConfiguration {
            url: "ldap.example.com:636".to_string(),
            server_start_tls: true,
            ..Default::default()
        };
        apply_identity(&mut config, None, Some(&ad));

        assert_eq!(config[LDAP_SERVER_ADDR], "ldap.example.com:636");
        assert_eq!(config[LDAP_SERVER_STARTTLS], "on");
        assert!(!config.contains_key(LDAP_SERVER_INSECURE));
        assert!(!config.contains_key(LDAP_TLS_SKIP_VERIFY));

        let read = read_identity(&config);
        assert!(read.oidc.is_none());
        assert_eq!(read.active_directory.unwrap(), ad);
    }

    #[test]
    fn test_empty_scopes_default() {
        let mut config = BTreeMap::new();
        let oidc = OidcConfiguration {
            configuration_url: "https://idp".to_string(),
            ..Default::default()
        };
        apply_identity(&mut config, Some(&oidc), None);
        assert_eq!(config[OIDC_SCOPES], DEFAULT_OIDC_SCOPES);
    }

    #[tokio::test]
    async fn test_reset_removes_every_identity_key() {
        let harness = harness_with_config(OIDC_CONFIG);
        let composer = harness.composer();

        composer
            .update_identity_provider("ns1", "acme", &IdpConfiguration::default())
            .await
            .unwrap();

        let config = stored_config(&harness);
        assert!(!has_identity_keys(&config));
        assert_eq!(config["MINIO_BROWSER"], "on");
        assert_eq!(config["MINIO_ROOT_USER"], "minio");
        assert!(!config.contains_key("accesskey"));

        let tenant = harness.gateway.tenant("ns1", "acme").unwrap();
        assert_eq!(tenant.spec.configuration.unwrap().name, "acme-env-configuration");
    }

    #[tokio::test]
    async fn test_switch_to_ldap_is_idempotent() {
        let harness = harness_with_config(OIDC_CONFIG);
        let composer = harness.composer();
        let request = IdpConfiguration {
            active_directory: Some(ActiveDirectoryConfiguration {
                url: "ldap:389".to_string(),
                lookup_bind_dn: "cn=admin".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };

        composer.update_identity_provider("ns1", "acme", &request).await.unwrap();
        let first = stored_config(&harness);
        composer.update_identity_provider("ns1", "acme", &request).await.unwrap();
        assert_eq!(stored_config(&harness), first);

        let read = composer.identity_provider("ns1", "acme").await.unwrap();
        assert!(read.oidc.is_none());
        assert_eq!(read.active_directory.unwrap().lookup_bind_dn, "cn=admin");
    }

    #[tokio::test]
    async fn test_missing_configuration_secret_is_written() {
        let harness = Harness::new();
        harness.gateway.insert_tenant(create_test_tenant("acme", "ns1"));
        let request = IdpConfiguration {
            oidc: Some(OidcConfiguration {
                configuration_url: "https://idp".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };

        harness
            .composer()
            .update_identity_provider("ns1", "acme", &request)
            .await
            .unwrap();

        let tenant = harness.gateway.tenant("ns1", "acme").unwrap();
        assert_eq!(tenant.spec.configuration.unwrap().name, "acme-env-configuration");
        assert_eq!(stored_config(&harness)[OIDC_CONFIG_URL], "https://idp");
    }

    #[tokio::test]
    async fn test_dangling_configuration_reference_is_rewritten() {
        let harness = Harness::new();
        let mut tenant = create_test_tenant("acme", "ns1");
        tenant.spec.configuration = Some(corev1::LocalObjectReference {
            name: "acme-old-configuration".to_string(),
        });
        harness.gateway.insert_tenant(tenant);
        let request = IdpConfiguration {
            oidc: Some(OidcConfiguration {
                configuration_url: "https://idp".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };

        harness
            .composer()
            .update_identity_provider("ns1", "acme", &request)
            .await
            .unwrap();

        let content = harness
            .gateway
            .secret_value("ns1", "acme-old-configuration", CONFIG_ENV_KEY)
            .unwrap();
        assert_eq!(envfile::parse(&content)[OIDC_CONFIG_URL], "https://idp");
        let tenant = harness.gateway.tenant("ns1", "acme").unwrap();
        assert_eq!(tenant.spec.configuration.unwrap().name, "acme-old-configuration");
    }

    #[tokio::test]
    async fn test_cancelled_configuration_write_is_rolled_back() {
        let harness = Harness::new();
        harness.gateway.insert_tenant(create_test_tenant("acme", "ns1"));
        harness
            .gateway
            .interrupt_on("create_secret ns1/acme-env-configuration", harness.token.clone());
        let request = IdpConfiguration {
            oidc: Some(OidcConfiguration {
                configuration_url: "https://idp".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };

        let err = harness
            .composer()
            .update_identity_provider("ns1", "acme", &request)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert!(harness.gateway.secret_names("ns1").is_empty());
        assert!(harness.gateway.tenant("ns1", "acme").unwrap().spec.configuration.is_none());
    }

    #[tokio::test]
    async fn test_administrators_users_then_groups() {
        let harness = harness_with_config(OIDC_CONFIG);
        let request = SetAdministratorsRequest {
            user_dns: vec!["uid=alice".to_string()],
            group_dns: vec!["cn=admins".to_string()],
        };

        harness
            .composer()
            .set_administrators("ns1", "acme", &request)
            .await
            .unwrap();
        assert_eq!(
            harness.admin.calls(),
            vec!["consoleAdmin uid=alice user", "consoleAdmin cn=admins group"]
        );
    }

    #[tokio::test]
    async fn test_administrators_stop_at_first_failure() {
        let harness = harness_with_config(OIDC_CONFIG);
        harness.admin.fail_on("uid=bob");
        let request = SetAdministratorsRequest {
            user_dns: vec!["uid=alice".to_string(), "uid=bob".to_string()],
            group_dns: vec!["cn=admins".to_string()],
        };

        let err = harness
            .composer()
            .set_administrators("ns1", "acme", &request)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(harness.admin.calls(), vec!["consoleAdmin uid=alice user"]);
    }
}
