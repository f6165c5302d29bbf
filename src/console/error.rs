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

use crate::error::{self as composer, ErrorKind};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use snafu::Snafu;
use utoipa::ToSchema;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("unauthorized: {}", message))]
    Unauthorized { message: String },

    #[snafu(display("{}", source))]
    Composer { source: composer::Error },

    #[snafu(display("JWT error: {}", source))]
    Jwt { source: jsonwebtoken::errors::Error },

    #[snafu(display("request task failed: {}", source))]
    Task { source: tokio::task::JoinError },
}

impl From<composer::Error> for Error {
    fn from(source: composer::Error) -> Self {
        Error::Composer { source }
    }
}

/// Body of every failed response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error, message, details) = match &self {
            Error::Unauthorized { message } => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized".to_string(),
                message.clone(),
                None,
            ),
            Error::Composer { source } => {
                let kind = source.kind();
                let status =
                    StatusCode::from_u16(kind.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if kind == ErrorKind::Internal {
                    tracing::error!(error = %source, "request failed");
                }
                (status, kind.to_string(), source.to_string(), None)
            }
            Error::Jwt { source } => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized".to_string(),
                "invalid or expired session".to_string(),
                Some(source.to_string()),
            ),
            Error::Task { source } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorKind::Internal.to_string(),
                "request task failed".to_string(),
                Some(source.to_string()),
            ),
        };

        let body = Json(ErrorResponse {
            error,
            message,
            details,
        });
        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composer_errors_keep_their_code() {
        let cases = [
            (composer::Error::invalid_request("bad pool"), StatusCode::BAD_REQUEST),
            (
                composer::Error::NotFound {
                    resource: "tenant ns1/acme".to_string(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                composer::Error::AlreadyExists {
                    resource: "secret ns1/acme-secret".to_string(),
                },
                StatusCode::CONFLICT,
            ),
            (composer::Error::Cancelled, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (source, status) in cases {
            let response = Error::from(source).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn test_unauthorized() {
        let response = Error::Unauthorized {
            message: "no session".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
