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
use crate::models::encryption::{EncryptionConfiguration, EncryptionInfo};
use crate::models::security::{SecurityResponse, TlsConfiguration, UpdateSecurityRequest};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/api/v1/namespaces/{namespace}/tenants/{name}/security",
    params(("namespace" = String, Path), ("name" = String, Path)),
    responses((status = 200, body = SecurityResponse), (status = 404, body = ErrorResponse)),
    tag = "security"
)]
pub async fn get_security(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((namespace, name)): Path<(String, String)>,
) -> Result<Json<SecurityResponse>> {
    let security = compose(&state, &claims, |c| async move {
        c.security(&namespace, &name).await
    })
    .await?;
    Ok(Json(security))
}

#[utoipa::path(
    post,
    path = "/api/v1/namespaces/{namespace}/tenants/{name}/security",
    params(("namespace" = String, Path), ("name" = String, Path)),
    request_body = UpdateSecurityRequest,
    responses((status = 204), (status = 400, body = ErrorResponse)),
    tag = "security"
)]
pub async fn update_security(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((namespace, name)): Path<(String, String)>,
    Json(request): Json<UpdateSecurityRequest>,
) -> Result<StatusCode> {
    compose(&state, &claims, |c| async move {
        c.update_security(&namespace, &name, &request).await
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/v1/namespaces/{namespace}/tenants/{name}/certificates",
    params(("namespace" = String, Path), ("name" = String, Path)),
    request_body = TlsConfiguration,
    responses((status = 204), (status = 400, body = ErrorResponse)),
    tag = "security"
)]
pub async fn update_certificates(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((namespace, name)): Path<(String, String)>,
    Json(request): Json<TlsConfiguration>,
) -> Result<StatusCode> {
    compose(&state, &claims, |c| async move {
        c.update_certificates(&namespace, &name, &request).await
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/namespaces/{namespace}/tenants/{name}/encryption",
    params(("namespace" = String, Path), ("name" = String, Path)),
    responses((status = 200, body = EncryptionInfo), (status = 404, body = ErrorResponse)),
    tag = "encryption"
)]
pub async fn encryption_info(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((namespace, name)): Path<(String, String)>,
) -> Result<Json<EncryptionInfo>> {
    let info = compose(&state, &claims, |c| async move {
        c.encryption_info(&namespace, &name).await
    })
    .await?;
    Ok(Json(info))
}

#[utoipa::path(
    put,
    path = "/api/v1/namespaces/{namespace}/tenants/{name}/encryption",
    params(("namespace" = String, Path), ("name" = String, Path)),
    request_body = EncryptionConfiguration,
    responses((status = 204), (status = 400, body = ErrorResponse)),
    tag = "encryption"
)]
pub async fn update_encryption(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((namespace, name)): Path<(String, String)>,
    Json(request): Json<EncryptionConfiguration>,
) -> Result<StatusCode> {
    compose(&state, &claims, |c| async move {
        c.update_encryption(&namespace, &name, &request).await
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/v1/namespaces/{namespace}/tenants/{name}/encryption",
    params(("namespace" = String, Path), ("name" = String, Path)),
    responses((status = 204)),
    tag = "encryption"
)]
pub async fn delete_encryption(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((namespace, name)): Path<(String, String)>,
) -> Result<StatusCode> {
    compose(&state, &claims, |c| async move {
        c.delete_encryption(&namespace, &name).await
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}
