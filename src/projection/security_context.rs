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

use crate::error::{Error, Result};
use crate::models::pool::SecurityContext;
use k8s_openapi::api::core::v1 as corev1;

pub const DEFAULT_FS_GROUP_CHANGE_POLICY: &str = "Always";

/// Ids are optional but must be integers when given.
pub fn to_security_context(context: &SecurityContext) -> Result<corev1::PodSecurityContext> {
    let policy = if context.fs_group_change_policy.is_empty() {
        DEFAULT_FS_GROUP_CHANGE_POLICY
    } else {
        context.fs_group_change_policy.as_str()
    };

    Ok(corev1::PodSecurityContext {
        run_as_user: parse_id("runAsUser", &context.run_as_user)?,
        run_as_group: parse_id("runAsGroup", &context.run_as_group)?,
        run_as_non_root: Some(context.run_as_non_root),
        fs_group: parse_id("fsGroup", &context.fs_group)?,
        fs_group_change_policy: Some(policy.to_string()),
        ..Default::default()
    })
}

pub fn from_security_context(context: &corev1::PodSecurityContext) -> SecurityContext {
    let id = |value: Option<i64>| value.map(|id| id.to_string()).unwrap_or_default();

    SecurityContext {
        run_as_user: id(context.run_as_user),
        run_as_group: id(context.run_as_group),
        run_as_non_root: context.run_as_non_root.unwrap_or(false),
        fs_group: id(context.fs_group),
        fs_group_change_policy: context
            .fs_group_change_policy
            .clone()
            .unwrap_or_else(|| DEFAULT_FS_GROUP_CHANGE_POLICY.to_string()),
    }
}

fn parse_id(field: &str, value: &str) -> Result<Option<i64>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }

    value
        .parse::<i64>()
        .map(Some)
        .map_err(|_| Error::invalid_request(format!("{} '{}' is not an integer", field, value)))
}
