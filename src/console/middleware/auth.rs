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

use crate::console::state::{AppState, Claims};
use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};

pub const SESSION_COOKIE: &str = "session";

const PUBLIC_PREFIXES: [&str; 3] = ["/api/v1/login", "/swagger-ui", "/api-docs"];

fn is_public(path: &str) -> bool {
    path == "/healthz" || path == "/readyz" || PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p))
}

/// Validates the session cookie and hands its claims to the handlers.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if is_public(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let cookies = request
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let token = parse_session_cookie(cookies).ok_or(StatusCode::UNAUTHORIZED)?;

    // expiry is checked by the default validation
    let claims = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::warn!(error = %e, "session rejected");
        StatusCode::UNAUTHORIZED
    })?
    .claims;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

fn parse_session_cookie(cookies: &str) -> Option<String> {
    cookies.split(';').find_map(|cookie| {
        let (name, value) = cookie.trim().split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}
