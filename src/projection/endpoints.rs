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

use crate::models::tenant::TenantEndpoints;
use crate::types::v2::tenant::{CONSOLE_PORT, CONSOLE_TLS_PORT, Tenant};
use k8s_openapi::api::core::v1 as corev1;

/// External URLs read from the load balancer status of the two services.
///
/// A service without an ingress address yields an empty URL.
pub fn endpoints(
    tenant: &Tenant,
    minio: Option<&corev1::Service>,
    console: Option<&corev1::Service>,
) -> TenantEndpoints {
    let scheme = if tenant.tls_enabled() { "https" } else { "http" };
    let console_port = if tenant.tls_enabled() {
        CONSOLE_TLS_PORT
    } else {
        CONSOLE_PORT
    };

    TenantEndpoints {
        minio: minio
            .and_then(ingress_host)
            .map(|host| format!("{}://{}", scheme, host))
            .unwrap_or_default(),
        console: console
            .and_then(ingress_host)
            .map(|host| format!("{}://{}:{}", scheme, host, console_port))
            .unwrap_or_default(),
    }
}

// hostname wins over ip
fn ingress_host(service: &corev1::Service) -> Option<String> {
    let ingress = service
        .status
        .as_ref()?
        .load_balancer
        .as_ref()?
        .ingress
        .as_ref()?
        .first()?;

    ingress
        .hostname
        .clone()
        .filter(|host| !host.is_empty())
        .or_else(|| ingress.ip.clone().filter(|ip| !ip.is_empty()))
}
