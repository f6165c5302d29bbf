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

//! Identity provider, configuration, monitoring and administrators.

use super::compose;
use crate::console::error::{ErrorResponse, Result};
use crate::console::state::{AppState, Claims};
use crate::models::configuration::{ConfigurationResponse, UpdateConfigurationRequest};
use crate::models::identity::{IdpConfiguration, SetAdministratorsRequest};
use crate::models::monitoring::MonitoringInfo;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/api/v1/namespaces/{namespace}/tenants/{name}/identity-provider",
    params(("namespace" = String, Path), ("name" = String, Path)),
    responses((status = 200, body = IdpConfiguration)),
    tag = "configuration"
)]
pub async fn identity_provider(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((namespace, name)): Path<(String, String)>,
) -> Result<Json<IdpConfiguration>> {
    let idp = compose(&state, &claims, |c| async move {
        c.identity_provider(&namespace, &name).await
    })
    .await?;
    Ok(Json(idp))
}

#[utoipa::path(
    post,
    path = "/api/v1/namespaces/{namespace}/tenants/{name}/identity-provider",
    params(("namespace" = String, Path), ("name" = String, Path)),
    request_body = IdpConfiguration,
    responses((status = 204)),
    tag = "configuration"
)]
pub async fn update_identity_provider(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((namespace, name)): Path<(String, String)>,
    Json(request): Json<IdpConfiguration>,
) -> Result<StatusCode> {
    compose(&state, &claims, |c| async move {
        c.update_identity_provider(&namespace, &name, &request).await
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/namespaces/{namespace}/tenants/{name}/configuration",
    params(("namespace" = String, Path), ("name" = String, Path)),
    responses((status = 200, body = ConfigurationResponse)),
    tag = "configuration"
)]
pub async fn get_configuration(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((namespace, name)): Path<(String, String)>,
) -> Result<Json<ConfigurationResponse>> {
    let config = compose(&state, &claims, |c| async move {
        c.configuration(&namespace, &name).await
    })
    .await?;
    Ok(Json(config))
}

#[utoipa::path(
    patch,
    path = "/api/v1/namespaces/{namespace}/tenants/{name}/configuration",
    params(("namespace" = String, Path), ("name" = String, Path)),
    request_body = UpdateConfigurationRequest,
    responses((status = 204), (status = 404, body = ErrorResponse)),
    tag = "configuration"
)]
pub async fn update_configuration(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((namespace, name)): Path<(String, String)>,
    Json(request): Json<UpdateConfigurationRequest>,
) -> Result<StatusCode> {
    compose(&state, &claims, |c| async move {
        c.update_configuration(&namespace, &name, &request).await
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/namespaces/{namespace}/tenants/{name}/monitoring",
    params(("namespace" = String, Path), ("name" = String, Path)),
    responses((status = 200, body = MonitoringInfo)),
    tag = "configuration"
)]
pub async fn get_monitoring(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((namespace, name)): Path<(String, String)>,
) -> Result<Json<MonitoringInfo>> {
    let info = compose(&state, &claims, |c| async move {
        c.monitoring(&namespace, &name).await
    })
    .await?;
    Ok(Json(info))
}

#[utoipa::path(
    put,
    path = "/api/v1/namespaces/{namespace}/tenants/{name}/monitoring",
    params(("namespace" = String, Path), ("name" = String, Path)),
    request_body = MonitoringInfo,
    responses((status = 204), (status = 400, body = ErrorResponse)),
    tag = "configuration"
)]
pub async fn set_monitoring(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((namespace, name)): Path<(String, String)>,
    Json(request): Json<MonitoringInfo>,
) -> Result<StatusCode> {
    compose(&state, &claims, |c| async move {
        c.set_monitoring(&namespace, &name, &request).await
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/namespaces/{namespace}/tenants/{name}/set-administrators",
    params(("namespace" = String, Path), ("name" = String, Path)),
    request_body = SetAdministratorsRequest,
    responses((status = 204), (status = 500, body = ErrorResponse)),
    tag = "configuration"
)]
pub async fn set_administrators(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((namespace, name)): Path<(String, String)>,
    Json(request): Json<SetAdministratorsRequest>,
) -> Result<StatusCode> {
    compose(&state, &claims, |c| async move {
        c.set_administrators(&namespace, &name, &request).await
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}
