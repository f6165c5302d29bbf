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

//! Recording admin client for composer tests.

use super::{AdminClient, AdminConnector, Error, ServerInfo};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
struct State {
    connections: Vec<(String, String, String)>,
    calls: Vec<String>,
    failing_entity: Option<String>,
    info: ServerInfo,
}

/// Hands out clients sharing one journal. Each `set_policy` call is recorded
/// as `policy entity user|group`.
#[derive(Debug, Clone, Default)]
pub struct FakeAdmin {
    state: Arc<Mutex<State>>,
}

impl FakeAdmin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(&self, entity: &str) {
        self.lock().failing_entity = Some(entity.to_string());
    }

    pub fn set_info(&self, info: ServerInfo) {
        self.lock().info = info;
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// `(endpoint, access key, secret key)` of every connection.
    pub fn connections(&self) -> Vec<(String, String, String)> {
        self.lock().connections.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AdminConnector for FakeAdmin {
    fn connect(
        &self,
        endpoint: &str,
        access_key: &str,
        secret_key: &str,
    ) -> Result<Box<dyn AdminClient>, Error> {
        self.lock().connections.push((
            endpoint.to_string(),
            access_key.to_string(),
            secret_key.to_string(),
        ));
        Ok(Box::new(self.clone()))
    }
}

#[async_trait]
impl AdminClient for FakeAdmin {
    async fn set_policy(&self, policy: &str, entity: &str, is_group: bool) -> Result<(), Error> {
        let mut state = self.lock();
        if state.failing_entity.as_deref() == Some(entity) {
            return Err(Error::Status {
                code: 500,
                body: format!("unable to bind {}", entity),
            });
        }

        let kind = if is_group { "group" } else { "user" };
        state.calls.push(format!("{} {} {}", policy, entity, kind));
        Ok(())
    }

    async fn server_info(&self) -> Result<ServerInfo, Error> {
        Ok(self.lock().info.clone())
    }
}
