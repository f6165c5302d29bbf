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

//! Command-line and environment options of the console server.

use clap::Args;
use snafu::{ResultExt, Snafu, ensure};
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 9090;
pub const DEFAULT_API_SERVER: &str = "http://localhost:8001";
const IN_CLUSTER_CA: &str = "/var/run/secrets/kubernetes.io/serviceaccount/ca.crt";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("invalid API server url '{}': {}", url, source))]
    InvalidApiServer {
        url: String,
        source: http::uri::InvalidUri,
    },

    #[snafu(display("unable to read CA bundle {}: {}", path.display(), source))]
    ReadCa {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("no certificate found in CA bundle {}", path.display()))]
    EmptyCa { path: PathBuf },
}

#[derive(Debug, Clone, Args)]
pub struct ServerOptions {
    /// Port the console listens on.
    #[arg(long, env = "CONSOLE_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Secret signing session cookies. A random one is used when unset.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Origin allowed to call the API from a browser.
    #[arg(long, env = "CONSOLE_CORS_ORIGIN")]
    pub cors_origin: Option<String>,

    /// Token used by the readiness probe to reach the orchestrator.
    #[arg(long, env = "OPERATOR_SA_TOKEN", hide_env_values = true)]
    pub operator_token: Option<String>,

    /// Overrides the orchestrator API endpoint.
    #[arg(long, env = "OPERATOR_K8S_API_SERVER")]
    pub api_server: Option<String>,

    /// PEM bundle trusted for the orchestrator API.
    #[arg(long, env = "OPERATOR_K8S_API_SERVER_TLS_ROOT_CA")]
    pub api_server_ca: Option<PathBuf>,
}

/// Explicit override first, then the in-cluster service, then a local proxy.
pub fn resolve_api_server(explicit: Option<&str>, host: Option<&str>, port: Option<&str>) -> String {
    if let Some(url) = explicit.filter(|url| !url.is_empty()) {
        return url.to_string();
    }

    match (host.filter(|h| !h.is_empty()), port.filter(|p| !p.is_empty())) {
        (Some(host), Some(port)) if host.contains(':') => format!("https://[{}]:{}", host, port),
        (Some(host), Some(port)) => format!("https://{}:{}", host, port),
        _ => DEFAULT_API_SERVER.to_string(),
    }
}

fn read_ca(path: &Path) -> Result<Vec<Vec<u8>>, Error> {
    let pem = std::fs::read(path).context(ReadCaSnafu { path })?;
    let certs = rustls_pemfile::certs(&mut pem.as_slice())
        .map(|cert| cert.map(|der| der.to_vec()))
        .collect::<Result<Vec<_>, _>>()
        .context(ReadCaSnafu { path })?;
    ensure!(!certs.is_empty(), EmptyCaSnafu { path });
    Ok(certs)
}

impl ServerOptions {
    pub fn api_server(&self) -> String {
        let host = std::env::var("KUBERNETES_SERVICE_HOST").ok();
        let port = std::env::var("KUBERNETES_SERVICE_PORT").ok();
        resolve_api_server(self.api_server.as_deref(), host.as_deref(), port.as_deref())
    }

    /// Base client configuration; sessions add their own bearer token.
    pub fn kube_config(&self) -> Result<kube::Config, Error> {
        let url = self.api_server();
        let uri: http::Uri = url.parse().context(InvalidApiServerSnafu { url: url.as_str() })?;
        let mut config = kube::Config::new(uri);

        let in_cluster = Path::new(IN_CLUSTER_CA);
        let ca = match &self.api_server_ca {
            Some(path) => Some(path.as_path()),
            None if url.starts_with("https://") && in_cluster.exists() => Some(in_cluster),
            None => None,
        };
        if let Some(path) = ca {
            config.root_cert = Some(read_ca(path)?);
        }

        Ok(config)
    }
}
