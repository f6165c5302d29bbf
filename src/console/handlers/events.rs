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

use super::compose;
use crate::console::error::Result;
use crate::console::state::{AppState, Claims};
use crate::models::cluster::EventListElement;
use axum::{
    Extension, Json,
    extract::{Path, State},
};

/// Events whose involved object is the tenant, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/namespaces/{namespace}/tenants/{name}/events",
    params(("namespace" = String, Path), ("name" = String, Path)),
    responses((status = 200, body = Vec<EventListElement>)),
    tag = "tenants"
)]
pub async fn list_tenant_events(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((namespace, name)): Path<(String, String)>,
) -> Result<Json<Vec<EventListElement>>> {
    let events = compose(&state, &claims, |c| async move {
        c.events(&namespace, &name).await
    })
    .await?;
    Ok(Json(events))
}
