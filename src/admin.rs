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

//! Client for the MinIO admin REST API of a tenant.

pub mod sigv4;

#[cfg(test)]
pub mod fake;

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::Deserialize;
use sigv4::Credentials;
use snafu::{ResultExt, Snafu, ensure};
use std::time::Duration;
use tracing::debug;

/// Policy bound to console administrators.
pub const CONSOLE_ADMIN_POLICY: &str = "consoleAdmin";

const ADMIN_TIMEOUT: Duration = Duration::from_secs(4);
const SET_POLICY_PATH: &str = "/minio/admin/v3/set-user-or-group-policy";
const INFO_PATH: &str = "/minio/admin/v3/info";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("invalid admin endpoint '{}': {}", endpoint, reason))]
    InvalidEndpoint { endpoint: String, reason: String },

    #[snafu(display("admin request failed: {}", source))]
    Http { source: reqwest::Error },

    #[snafu(display("admin request returned {}: {}", code, body))]
    Status { code: u16, body: String },

    #[snafu(display("unable to decode admin response: {}", source))]
    Decode { source: serde_json::Error },
}

/// Subset of the `info` response used for usage reporting.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerInfo {
    pub usage: UsageInfo,
    pub servers: Vec<ServerProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UsageInfo {
    pub size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerProperties {
    pub drives: Vec<Drive>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Drive {
    pub usedspace: u64,
}

impl ServerInfo {
    /// Bytes of object data stored.
    pub fn used(&self) -> u64 {
        self.usage.size
    }

    /// Bytes used across every drive, parity included.
    pub fn disks_used(&self) -> u64 {
        self.servers
            .iter()
            .flat_map(|server| server.drives.iter())
            .map(|drive| drive.usedspace)
            .sum()
    }
}

#[async_trait]
pub trait AdminClient: Send + Sync {
    /// Binds `policy` to a user, or to a group when `is_group` is set.
    async fn set_policy(&self, policy: &str, entity: &str, is_group: bool) -> Result<(), Error>;

    async fn server_info(&self) -> Result<ServerInfo, Error>;
}

/// Opens admin clients against a tenant endpoint.
pub trait AdminConnector: Send + Sync {
    fn connect(
        &self,
        endpoint: &str,
        access_key: &str,
        secret_key: &str,
    ) -> Result<Box<dyn AdminClient>, Error>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MinioAdminConnector;

impl AdminConnector for MinioAdminConnector {
    fn connect(
        &self,
        endpoint: &str,
        access_key: &str,
        secret_key: &str,
    ) -> Result<Box<dyn AdminClient>, Error> {
        Ok(Box::new(MinioAdmin::new(endpoint, access_key, secret_key)?))
    }
}

#[derive(Debug, Clone)]
pub struct MinioAdmin {
    client: reqwest::Client,
    endpoint: Url,
    credentials: Credentials,
}

impl MinioAdmin {
    /// In-cluster endpoints carry operator-issued certificates, so TLS
    /// verification is off.
    pub fn new(endpoint: &str, access_key: &str, secret_key: &str) -> Result<Self, Error> {
        let endpoint = Url::parse(endpoint).map_err(|e| Error::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        let client = reqwest::Client::builder()
            .timeout(ADMIN_TIMEOUT)
            .danger_accept_invalid_certs(true)
            .build()
            .context(HttpSnafu)?;

        Ok(Self {
            client,
            endpoint,
            credentials: Credentials {
                access_key: access_key.to_string(),
                secret_key: secret_key.to_string(),
            },
        })
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> Url {
        let mut url = self.endpoint.clone();
        url.set_path(path);
        url.set_query(None);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    async fn send(&self, method: Method, url: Url) -> Result<String, Error> {
        debug!(%method, path = url.path(), "admin request");

        let headers = sigv4::sign(
            method.as_str(),
            &url,
            b"",
            &self.credentials,
            chrono::Utc::now(),
        );

        let mut request = self.client.request(method, url);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let response = request.send().await.context(HttpSnafu)?;
        let status = response.status();
        let body = response.text().await.context(HttpSnafu)?;

        ensure!(
            status.is_success(),
            StatusSnafu {
                code: status.as_u16(),
                body
            }
        );

        Ok(body)
    }
}

#[async_trait]
impl AdminClient for MinioAdmin {
    async fn set_policy(&self, policy: &str, entity: &str, is_group: bool) -> Result<(), Error> {
        let is_group = if is_group { "true" } else { "false" };
        let url = self.url(
            SET_POLICY_PATH,
            &[
                ("policyName", policy),
                ("userOrGroup", entity),
                ("isGroup", is_group),
            ],
        );

        self.send(Method::PUT, url).await.map(|_| ())
    }

    async fn server_info(&self) -> Result<ServerInfo, Error> {
        let url = self.url(INFO_PATH, &[]);
        let body = self.send(Method::GET, url).await?;
        serde_json::from_str(&body).context(DecodeSnafu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_info_usage() {
        let info: ServerInfo = serde_json::from_str(
            r#"{
                "mode": "online",
                "usage": {"size": 1024},
                "servers": [
                    {"endpoint": "pool-0-0", "drives": [{"usedspace": 10}, {"usedspace": 20}]},
                    {"endpoint": "pool-0-1", "drives": [{"usedspace": 30}]},
                    {"endpoint": "pool-0-2"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(info.used(), 1024);
        assert_eq!(info.disks_used(), 60);
    }

    #[test]
    fn test_request_urls() {
        let admin = MinioAdmin::new("https://minio.ns1.svc.cluster.local:443", "admin", "secret").unwrap();

        let url = admin.url(
            SET_POLICY_PATH,
            &[("policyName", "consoleAdmin"), ("userOrGroup", "cn=ops,dc=org"), ("isGroup", "true")],
        );
        assert_eq!(url.path(), "/minio/admin/v3/set-user-or-group-policy");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[1], ("userOrGroup".to_string(), "cn=ops,dc=org".to_string()));

        let url = admin.url(INFO_PATH, &[]);
        assert_eq!(url.as_str(), "https://minio.ns1.svc.cluster.local/minio/admin/v3/info");
    }

    #[test]
    fn test_invalid_endpoint() {
        let err = MinioAdminConnector.connect("not a url", "a", "b").err().unwrap();
        assert!(matches!(err, Error::InvalidEndpoint { .. }));
    }
}
