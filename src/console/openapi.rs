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

use crate::console::error::ErrorResponse;
use crate::console::handlers::{auth, cluster, configuration, events, security, tenants};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "Tenant Composer API", description = "Desired-state admin API for MinIO tenants"),
    paths(
        auth::login,
        auth::logout,
        auth::session_check,
        tenants::list_all_tenants,
        tenants::list_tenants_by_namespace,
        tenants::create_tenant,
        tenants::get_tenant_details,
        tenants::update_tenant,
        tenants::delete_tenant,
        tenants::tenant_info,
        tenants::tenant_usage,
        tenants::update_domains,
        tenants::add_pool,
        tenants::replace_pools,
        security::get_security,
        security::update_security,
        security::update_certificates,
        security::encryption_info,
        security::update_encryption,
        security::delete_encryption,
        configuration::identity_provider,
        configuration::update_identity_provider,
        configuration::get_configuration,
        configuration::update_configuration,
        configuration::get_monitoring,
        configuration::set_monitoring,
        configuration::set_administrators,
        events::list_tenant_events,
        cluster::max_allocatable_memory,
        cluster::allocatable_resources,
        cluster::node_labels,
        cluster::resource_quota,
    ),
    components(schemas(ErrorResponse)),
    tags(
        (name = "session"),
        (name = "tenants"),
        (name = "pools"),
        (name = "security"),
        (name = "encryption"),
        (name = "configuration"),
        (name = "cluster"),
    )
)]
pub struct ApiDoc;
