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
use crate::models::pool::{Pool, PoolUpdateRequest};
use crate::models::tenant::{
    CreateTenantRequest, CreateTenantResponse, DeleteTenantRequest, TenantDetails, TenantInfo,
    TenantList, TenantUsage, UpdateDomainsRequest, UpdateTenantRequest,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

#[utoipa::path(get, path = "/api/v1/tenants", responses((status = 200, body = TenantList)), tag = "tenants")]
pub async fn list_all_tenants(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<TenantList>> {
    let list = compose(&state, &claims, |c| async move { c.list_tenants(None).await }).await?;
    Ok(Json(list))
}

#[utoipa::path(
    get,
    path = "/api/v1/namespaces/{namespace}/tenants",
    params(("namespace" = String, Path)),
    responses((status = 200, body = TenantList)),
    tag = "tenants"
)]
pub async fn list_tenants_by_namespace(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(namespace): Path<String>,
) -> Result<Json<TenantList>> {
    let list = compose(&state, &claims, |c| async move {
        c.list_tenants(Some(&namespace)).await
    })
    .await?;
    Ok(Json(list))
}

#[utoipa::path(
    post,
    path = "/api/v1/tenants",
    request_body = CreateTenantRequest,
    responses(
        (status = 201, body = CreateTenantResponse),
        (status = 400, body = ErrorResponse),
        (status = 409, body = ErrorResponse)
    ),
    tag = "tenants"
)]
pub async fn create_tenant(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateTenantRequest>,
) -> Result<(StatusCode, Json<CreateTenantResponse>)> {
    let response = compose(&state, &claims, |c| async move { c.create_tenant(&request).await }).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/v1/namespaces/{namespace}/tenants/{name}",
    params(("namespace" = String, Path), ("name" = String, Path)),
    responses((status = 200, body = TenantDetails), (status = 404, body = ErrorResponse)),
    tag = "tenants"
)]
pub async fn get_tenant_details(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((namespace, name)): Path<(String, String)>,
) -> Result<Json<TenantDetails>> {
    let details = compose(&state, &claims, |c| async move {
        c.tenant_details(&namespace, &name).await
    })
    .await?;
    Ok(Json(details))
}

#[utoipa::path(
    put,
    path = "/api/v1/namespaces/{namespace}/tenants/{name}",
    params(("namespace" = String, Path), ("name" = String, Path)),
    request_body = UpdateTenantRequest,
    responses((status = 204), (status = 404, body = ErrorResponse)),
    tag = "tenants"
)]
pub async fn update_tenant(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((namespace, name)): Path<(String, String)>,
    Json(request): Json<UpdateTenantRequest>,
) -> Result<StatusCode> {
    compose(&state, &claims, |c| async move {
        c.update_tenant(&namespace, &name, &request).await
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The body is optional; without it volumes are kept.
#[utoipa::path(
    delete,
    path = "/api/v1/namespaces/{namespace}/tenants/{name}",
    params(("namespace" = String, Path), ("name" = String, Path)),
    request_body = DeleteTenantRequest,
    responses((status = 204), (status = 404, body = ErrorResponse)),
    tag = "tenants"
)]
pub async fn delete_tenant(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((namespace, name)): Path<(String, String)>,
    request: Option<Json<DeleteTenantRequest>>,
) -> Result<StatusCode> {
    let delete_pvcs = request.map(|Json(r)| r.delete_pvcs).unwrap_or(false);
    compose(&state, &claims, |c| async move {
        c.delete_tenant(&namespace, &name, delete_pvcs).await
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/namespaces/{namespace}/tenants/{name}/info",
    params(("namespace" = String, Path), ("name" = String, Path)),
    responses((status = 200, body = TenantInfo), (status = 404, body = ErrorResponse)),
    tag = "tenants"
)]
pub async fn tenant_info(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((namespace, name)): Path<(String, String)>,
) -> Result<Json<TenantInfo>> {
    let info = compose(&state, &claims, |c| async move {
        c.tenant_info(&namespace, &name).await
    })
    .await?;
    Ok(Json(info))
}

#[utoipa::path(
    get,
    path = "/api/v1/namespaces/{namespace}/tenants/{name}/usage",
    params(("namespace" = String, Path), ("name" = String, Path)),
    responses((status = 200, body = TenantUsage)),
    tag = "tenants"
)]
pub async fn tenant_usage(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((namespace, name)): Path<(String, String)>,
) -> Result<Json<TenantUsage>> {
    let usage = compose(&state, &claims, |c| async move {
        c.tenant_usage(&namespace, &name).await
    })
    .await?;
    Ok(Json(usage))
}

#[utoipa::path(
    put,
    path = "/api/v1/namespaces/{namespace}/tenants/{name}/domains",
    params(("namespace" = String, Path), ("name" = String, Path)),
    request_body = UpdateDomainsRequest,
    responses((status = 204)),
    tag = "tenants"
)]
pub async fn update_domains(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((namespace, name)): Path<(String, String)>,
    Json(request): Json<UpdateDomainsRequest>,
) -> Result<StatusCode> {
    compose(&state, &claims, |c| async move {
        c.update_domains(&namespace, &name, &request).await
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/namespaces/{namespace}/tenants/{name}/pools",
    params(("namespace" = String, Path), ("name" = String, Path)),
    request_body = Pool,
    responses((status = 201, body = Vec<Pool>), (status = 400, body = ErrorResponse)),
    tag = "pools"
)]
pub async fn add_pool(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((namespace, name)): Path<(String, String)>,
    Json(pool): Json<Pool>,
) -> Result<(StatusCode, Json<Vec<Pool>>)> {
    let pools = compose(&state, &claims, |c| async move {
        c.add_pool(&namespace, &name, &pool).await
    })
    .await?;
    Ok((StatusCode::CREATED, Json(pools)))
}

#[utoipa::path(
    put,
    path = "/api/v1/namespaces/{namespace}/tenants/{name}/pools",
    params(("namespace" = String, Path), ("name" = String, Path)),
    request_body = PoolUpdateRequest,
    responses((status = 200, body = Vec<Pool>), (status = 400, body = ErrorResponse)),
    tag = "pools"
)]
pub async fn replace_pools(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((namespace, name)): Path<(String, String)>,
    Json(request): Json<PoolUpdateRequest>,
) -> Result<Json<Vec<Pool>>> {
    let pools = compose(&state, &claims, |c| async move {
        c.replace_pools(&namespace, &name, &request).await
    })
    .await?;
    Ok(Json(pools))
}
