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

use crate::console::{
    error::{Error, JwtSnafu, Result},
    middleware::auth::SESSION_COOKIE,
    models::{LoginRequest, LoginResponse, SessionResponse},
    state::{AppState, Claims, SESSION_TTL_SECS},
};
use axum::{Extension, Json, extract::State, http::header, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use snafu::ResultExt;

/// Checks the token against the orchestrator and opens a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session opened", body = LoginResponse),
        (status = 401, description = "Token rejected", body = crate::console::error::ErrorResponse)
    ),
    tag = "session"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let probe = match state.gateways.connect(&req.token).await {
        Ok(gateway) => gateway.list_tenants(None).await.map(|_| ()),
        Err(e) => Err(e),
    };
    if let Err(e) = probe {
        tracing::warn!(error = %e, "login rejected");
        return Err(Error::Unauthorized {
            message: "invalid or insufficient permissions".to_string(),
        });
    }

    let claims = Claims::new(req.token);
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.jwt_secret.as_bytes()),
    )
    .context(JwtSnafu)?;

    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        SESSION_COOKIE, token, SESSION_TTL_SECS
    );
    tracing::info!("session opened");

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            success: true,
            message: "login successful".to_string(),
        }),
    ))
}

#[utoipa::path(post, path = "/api/v1/logout", responses((status = 200, body = LoginResponse)), tag = "session")]
pub async fn logout() -> impl IntoResponse {
    let cookie = format!("{}=; Path=/; HttpOnly; Max-Age=0", SESSION_COOKIE);
    (
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            success: true,
            message: "logout successful".to_string(),
        }),
    )
}

#[utoipa::path(get, path = "/api/v1/session", responses((status = 200, body = SessionResponse)), tag = "session")]
pub async fn session_check(Extension(claims): Extension<Claims>) -> Json<SessionResponse> {
    let expires_at = chrono::DateTime::from_timestamp(claims.exp as i64, 0).map(|dt| dt.to_rfc3339());

    Json(SessionResponse {
        valid: true,
        expires_at,
    })
}
