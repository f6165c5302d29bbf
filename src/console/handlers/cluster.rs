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
use crate::console::error::{ErrorResponse, Result};
use crate::console::state::{AppState, Claims};
use crate::models::cluster::{
    AllocatableResources, MaxAllocatableMemory, NodeCountQuery, NodeLabels, ResourceQuota,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};

#[utoipa::path(
    get,
    path = "/api/v1/cluster/max-allocatable-memory",
    params(NodeCountQuery),
    responses((status = 200, body = MaxAllocatableMemory), (status = 400, body = ErrorResponse)),
    tag = "cluster"
)]
pub async fn max_allocatable_memory(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<NodeCountQuery>,
) -> Result<Json<MaxAllocatableMemory>> {
    let memory = compose(&state, &claims, |c| async move {
        c.max_allocatable_memory(query.num_nodes).await
    })
    .await?;
    Ok(Json(memory))
}

#[utoipa::path(
    get,
    path = "/api/v1/cluster/allocatable-resources",
    params(NodeCountQuery),
    responses((status = 200, body = AllocatableResources), (status = 400, body = ErrorResponse)),
    tag = "cluster"
)]
pub async fn allocatable_resources(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<NodeCountQuery>,
) -> Result<Json<AllocatableResources>> {
    let resources = compose(&state, &claims, |c| async move {
        c.allocatable_resources(query.num_nodes).await
    })
    .await?;
    Ok(Json(resources))
}

#[utoipa::path(
    get,
    path = "/api/v1/nodes/labels",
    responses((status = 200, body = BTreeMap<String, Vec<String>>)),
    tag = "cluster"
)]
pub async fn node_labels(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<NodeLabels>> {
    let labels = compose(&state, &claims, |c| async move { c.node_labels().await }).await?;
    Ok(Json(labels))
}

#[utoipa::path(
    get,
    path = "/api/v1/namespaces/{namespace}/resourcequotas/{name}",
    params(("namespace" = String, Path), ("name" = String, Path)),
    responses((status = 200, body = ResourceQuota)),
    tag = "cluster"
)]
pub async fn resource_quota(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((namespace, name)): Path<(String, String)>,
) -> Result<Json<ResourceQuota>> {
    let quota = compose(&state, &claims, |c| async move {
        c.resource_quota(&namespace, &name).await
    })
    .await?;
    Ok(Json(quota))
}
