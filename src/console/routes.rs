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

use crate::console::{handlers, state::AppState};
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route("/session", get(handlers::auth::session_check))
}

pub fn tenant_routes() -> Router<AppState> {
    use handlers::tenants;

    Router::new()
        .route(
            "/tenants",
            get(tenants::list_all_tenants).post(tenants::create_tenant),
        )
        .route(
            "/namespaces/{namespace}/tenants",
            get(tenants::list_tenants_by_namespace),
        )
        .route(
            "/namespaces/{namespace}/tenants/{name}",
            get(tenants::get_tenant_details)
                .put(tenants::update_tenant)
                .delete(tenants::delete_tenant),
        )
        .route("/namespaces/{namespace}/tenants/{name}/info", get(tenants::tenant_info))
        .route("/namespaces/{namespace}/tenants/{name}/usage", get(tenants::tenant_usage))
        .route(
            "/namespaces/{namespace}/tenants/{name}/domains",
            put(tenants::update_domains),
        )
        .route(
            "/namespaces/{namespace}/tenants/{name}/pools",
            post(tenants::add_pool).put(tenants::replace_pools),
        )
}

pub fn security_routes() -> Router<AppState> {
    use handlers::security;

    Router::new()
        .route(
            "/namespaces/{namespace}/tenants/{name}/security",
            get(security::get_security).post(security::update_security),
        )
        .route(
            "/namespaces/{namespace}/tenants/{name}/certificates",
            put(security::update_certificates),
        )
        .route(
            "/namespaces/{namespace}/tenants/{name}/encryption",
            get(security::encryption_info)
                .put(security::update_encryption)
                .delete(security::delete_encryption),
        )
}

pub fn configuration_routes() -> Router<AppState> {
    use handlers::configuration;

    Router::new()
        .route(
            "/namespaces/{namespace}/tenants/{name}/identity-provider",
            get(configuration::identity_provider).post(configuration::update_identity_provider),
        )
        .route(
            "/namespaces/{namespace}/tenants/{name}/configuration",
            get(configuration::get_configuration).patch(configuration::update_configuration),
        )
        .route(
            "/namespaces/{namespace}/tenants/{name}/monitoring",
            get(configuration::get_monitoring).put(configuration::set_monitoring),
        )
        .route(
            "/namespaces/{namespace}/tenants/{name}/set-administrators",
            post(configuration::set_administrators),
        )
}

pub fn event_routes() -> Router<AppState> {
    Router::new().route(
        "/namespaces/{namespace}/tenants/{name}/events",
        get(handlers::events::list_tenant_events),
    )
}

pub fn cluster_routes() -> Router<AppState> {
    use handlers::cluster;

    Router::new()
        .route(
            "/cluster/max-allocatable-memory",
            get(cluster::max_allocatable_memory),
        )
        .route(
            "/cluster/allocatable-resources",
            get(cluster::allocatable_resources),
        )
        .route("/nodes/labels", get(cluster::node_labels))
        .route(
            "/namespaces/{namespace}/resourcequotas/{name}",
            get(cluster::resource_quota),
        )
}
