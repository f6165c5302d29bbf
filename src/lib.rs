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

//! Turns high-level tenant requests into the desired state of MinIO tenants
//! and serves them over the console API.

use crate::config::ServerOptions;
use crate::types::v2::tenant::Tenant;
use kube::CustomResourceExt;
use std::pin::Pin;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing_subscriber::EnvFilter;

pub mod admin;
pub mod composer;
pub mod config;
pub mod console;
pub mod error;
pub mod gateway;
pub mod kes;
pub mod models;
pub mod nodes;
pub mod projection;
pub mod secrets;
pub mod types;
pub mod utils;


shadow_rs::shadow!(build);

pub async fn run(options: ServerOptions) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    tracing::info!(version = build::PKG_VERSION, commit = build::SHORT_COMMIT, "starting console");
    console::server::run(options).await
}

/// Writes the tenant CRD as YAML to `file`, or to stdout.
pub async fn crd(file: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer: Pin<Box<dyn AsyncWrite + Send>> = if let Some(file) = file {
        Box::pin(
            tokio::fs::OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(file)
                .await?,
        )
    } else {
        Box::pin(tokio::io::stdout())
    };

    writer
        .write_all(serde_yaml_ng::to_string(&Tenant::crd())?.as_bytes())
        .await?;
    writer.flush().await?;

    Ok(())
}
