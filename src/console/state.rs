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

use crate::admin::AdminConnector;
use crate::gateway::GatewayProvider;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Lifetime of a console session.
pub const SESSION_TTL_SECS: usize = 12 * 3600;

/// Shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub jwt_secret: Arc<String>,
    pub gateways: Arc<dyn GatewayProvider>,
    pub admin: Arc<dyn AdminConnector>,
    /// Token used by the readiness probe, when configured.
    pub operator_token: Option<Arc<String>>,
}

impl AppState {
    pub fn new(
        jwt_secret: String,
        gateways: Arc<dyn GatewayProvider>,
        admin: Arc<dyn AdminConnector>,
    ) -> Self {
        Self {
            jwt_secret: Arc::new(jwt_secret),
            gateways,
            admin,
            operator_token: None,
        }
    }

    pub fn with_operator_token(mut self, token: Option<String>) -> Self {
        self.operator_token = token.filter(|t| !t.is_empty()).map(Arc::new);
        self
    }
}

/// Session claims. The orchestrator token travels inside the signed cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub k8s_token: String,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn new(k8s_token: String) -> Self {
        let now = chrono::Utc::now().timestamp().max(0) as usize;
        Self {
            k8s_token,
            iat: now,
            exp: now + SESSION_TTL_SECS,
        }
    }
}
