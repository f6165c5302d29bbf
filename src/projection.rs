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

//! Mappings between the Tenant resource and the API models.
//!
//! Everything here is pure: callers fetch the objects and hand them in.

mod certificates;
mod endpoints;
mod pool;
mod security_context;
mod tenant;

pub use certificates::{certificate_info, certificates_under};
pub use endpoints::endpoints;
pub use pool::{from_pool, to_pool};
pub use security_context::{from_security_context, to_security_context};
pub use tenant::{domains, tenant_info, tenant_list_item, tenant_status, tiers};

use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use std::collections::BTreeMap;

pub(crate) fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

pub(crate) fn non_empty_vec<T>(values: Vec<T>) -> Option<Vec<T>> {
    (!values.is_empty()).then_some(values)
}

pub(crate) fn non_empty_map(map: &BTreeMap<String, String>) -> Option<BTreeMap<String, String>> {
    (!map.is_empty()).then(|| map.clone())
}

/// RFC 3339 rendering of an object timestamp, empty when unset.
pub fn timestamp(time: Option<&Time>) -> String {
    time.and_then(|time| serde_json::to_value(time).ok())
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_default()
}
