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
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct OidcConfiguration {
    pub configuration_url: String,
    pub client_id: String,
    pub secret_id: String,
    pub claim_name: String,
    pub redirect_url: String,
    /// Comma separated. Empty means `openid,profile,email`.
    pub scopes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ActiveDirectoryConfiguration {
    pub url: String,
    pub lookup_bind_dn: String,
    pub lookup_bind_password: String,
    pub user_dn_search_base_dn: String,
    pub user_dn_search_filter: String,
    pub group_search_base_dn: String,
    pub group_search_filter: String,
    pub skip_tls_verification: bool,
    pub server_insecure: bool,
    pub server_start_tls: bool,
    /// Directory users granted console access on create.
    pub user_dns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct BuiltInUser {
    pub access_key: String,
    pub secret_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct IdpConfiguration {
    pub oidc: Option<OidcConfiguration>,
    pub active_directory: Option<ActiveDirectoryConfiguration>,
    /// Built-in console users, only honored on create.
    pub keys: Vec<BuiltInUser>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SetAdministratorsRequest {
    pub user_dns: Vec<String>,
    pub group_dns: Vec<String>,
}
