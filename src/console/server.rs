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

use crate::admin::MinioAdminConnector;
use crate::config::ServerOptions;
use crate::console::{openapi::ApiDoc, routes, state::AppState};
use crate::gateway::KubeGatewayProvider;
use crate::secrets::names;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::{Router, extract::State, middleware, response::IntoResponse, routing::get};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// The full console router.
pub fn app(state: AppState, cors_origin: Option<HeaderValue>) -> Router {
    let mut app = Router::new()
        .route("/healthz", get(health_check))
        .route("/readyz", get(ready_check))
        .nest("/api/v1", api_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            crate::console::middleware::auth::auth_middleware,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    if let Some(origin) = cors_origin {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
                .allow_credentials(true),
        );
    }
    app
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(routes::auth_routes())
        .merge(routes::tenant_routes())
        .merge(routes::security_routes())
        .merge(routes::configuration_routes())
        .merge(routes::event_routes())
        .merge(routes::cluster_routes())
}

pub async fn run(options: ServerOptions) -> Result<(), Box<dyn std::error::Error>> {
    let jwt_secret = match options.jwt_secret.clone().filter(|s| !s.is_empty()) {
        Some(secret) => secret,
        None => {
            tracing::warn!("no JWT secret configured, sessions end when the console restarts");
            names::random_alphanumeric(64)
        }
    };
    let cors_origin = options
        .cors_origin
        .as_deref()
        .map(HeaderValue::from_str)
        .transpose()?;

    let config = options.kube_config()?;
    tracing::info!(api_server = %config.cluster_url, "orchestrator endpoint resolved");

    let state = AppState::new(
        jwt_secret,
        Arc::new(KubeGatewayProvider::new(config)),
        Arc::new(MinioAdminConnector),
    )
    .with_operator_token(options.operator_token.clone());

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], options.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "console listening");

    axum::serve(listener, app(state, cors_origin))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Ready once the orchestrator answers with the operator token, when one is set.
async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let Some(token) = state.operator_token.as_ref() else {
        return (StatusCode::OK, "Ready");
    };

    let probe = match state.gateways.connect(token).await {
        Ok(gateway) => gateway.list_tenants(None).await.map(|_| ()),
        Err(e) => Err(e),
    };
    match probe {
        Ok(()) => (StatusCode::OK, "Ready"),
        Err(e) => {
            tracing::warn!(error = %e, "orchestrator not reachable");
            (StatusCode::SERVICE_UNAVAILABLE, "Not ready")
        }
    }
}
