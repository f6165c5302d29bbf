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

pub mod auth;
pub mod cluster;
pub mod configuration;
pub mod events;
pub mod security;
pub mod tenants;

use crate::composer::Composer;
use crate::console::error::{Result, TaskSnafu};
use crate::console::state::{AppState, Claims};
use snafu::ResultExt;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Runs one composer call for the session in `claims`.
///
/// The call runs on its own task. Dropping the handler future, as axum does
/// when the client goes away, cancels the call through its token.
pub(crate) async fn compose<T, F, Fut>(state: &AppState, claims: &Claims, call: F) -> Result<T>
where
    F: FnOnce(Composer) -> Fut,
    Fut: Future<Output = crate::error::Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let gateway = state.gateways.connect(&claims.k8s_token).await?;
    let token = CancellationToken::new();
    let _guard = token.clone().drop_guard();

    let composer = Composer::new(gateway, state.admin.clone(), token);
    let result = tokio::spawn(call(composer)).await.context(TaskSnafu)?;
    Ok(result?)
}
