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

//! Failure kinds every composer reports.
//!
//! Orchestrator and admin client errors are wrapped here and classified through
//! [`Error::kind`], so callers never match on `kube::Error` themselves.

use crate::{admin, types, utils};
use snafu::Snafu;
use strum::Display;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("{} not found", resource))]
    NotFound { resource: String },

    #[snafu(display("{} already exists", resource))]
    AlreadyExists { resource: String },

    #[snafu(display("Kubernetes API error: {}", source))]
    Kube { source: kube::Error },

    #[snafu(display("key pair {} must carry both a certificate and a private key", name))]
    InvalidKeyPair { name: String },

    #[snafu(display("invalid certificate material for {}: {}", name, source))]
    InvalidCertificate { name: String, source: utils::tls::Error },

    #[snafu(display("certificate material for {} is not valid base64", name))]
    InvalidCertificateEncoding {
        name: String,
        source: base64::DecodeError,
    },

    #[snafu(display("invalid replicas '{}'", value))]
    InvalidReplicas {
        value: String,
        source: std::num::ParseIntError,
    },

    #[snafu(display("erasure coding parity {} is outside the range 2 to 8", parity))]
    InvalidErasureCoding { parity: i64 },

    #[snafu(display("unable to infer the KES configuration version from image '{}'", image))]
    UnknownKesImage { image: String },

    #[snafu(display("a KMS backend must be configured to enable encryption"))]
    KesMissingCredentials,

    #[snafu(display("{} is not configured", what))]
    ConfigurationMissing { what: String },

    #[snafu(display("at least 4 nodes are required, {} requested", requested))]
    NotEnoughNodes { requested: usize },

    #[snafu(display(
        "{} nodes requested but only {} nodes can be scheduled",
        requested,
        available
    ))]
    TooManyNodes { requested: usize, available: usize },

    #[snafu(display(
        "{} nodes requested but only {} nodes are available",
        requested,
        available
    ))]
    TooFewAvailableNodes { requested: usize, available: usize },

    #[snafu(display("{} is not supported", what))]
    Unsupported { what: String },

    #[snafu(display("{}", message))]
    InvalidRequest { message: String },

    #[snafu(display("invalid KES configuration: {}", source))]
    InvalidKesConfig { source: serde_yaml_ng::Error },

    #[snafu(display("request cancelled"))]
    Cancelled,

    #[snafu(display("admin API error: {}", source))]
    Admin { source: admin::Error },

    #[snafu(display("serialization error: {}", message))]
    Serialization { message: String },

    #[snafu(transparent)]
    Types { source: types::error::Error },

    #[snafu(display("internal error: {}", message))]
    Internal { message: String },
}

/// Classification surfaced to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidKeyPair,
    InvalidCertificate,
    InvalidReplicas,
    InvalidErasureCoding,
    UnknownKesImage,
    KesMissingCredentials,
    ConfigurationMissing,
    NotEnoughNodes,
    TooManyNodes,
    TooFewAvailableNodes,
    Unsupported,
    InvalidRequest,
    Internal,
}

impl ErrorKind {
    /// HTTP status code for the kind.
    pub fn code(self) -> u16 {
        match self {
            ErrorKind::NotFound | ErrorKind::ConfigurationMissing => 404,
            ErrorKind::AlreadyExists => 409,
            ErrorKind::Internal => 500,
            ErrorKind::Unsupported => 501,
            _ => 400,
        }
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Error::Kube { source } => classify_kube(source),
            Error::InvalidKeyPair { .. } => ErrorKind::InvalidKeyPair,
            Error::InvalidCertificate { .. } | Error::InvalidCertificateEncoding { .. } => {
                ErrorKind::InvalidCertificate
            }
            Error::InvalidReplicas { .. } => ErrorKind::InvalidReplicas,
            Error::InvalidErasureCoding { .. } => ErrorKind::InvalidErasureCoding,
            Error::UnknownKesImage { .. } => ErrorKind::UnknownKesImage,
            Error::KesMissingCredentials => ErrorKind::KesMissingCredentials,
            Error::ConfigurationMissing { .. } => ErrorKind::ConfigurationMissing,
            Error::NotEnoughNodes { .. } => ErrorKind::NotEnoughNodes,
            Error::TooManyNodes { .. } => ErrorKind::TooManyNodes,
            Error::TooFewAvailableNodes { .. } => ErrorKind::TooFewAvailableNodes,
            Error::Unsupported { .. } => ErrorKind::Unsupported,
            Error::InvalidRequest { .. } | Error::InvalidKesConfig { .. } => {
                ErrorKind::InvalidRequest
            }
            Error::Cancelled
            | Error::Admin { .. }
            | Error::Serialization { .. }
            | Error::Types { .. }
            | Error::Internal { .. } => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Error::InvalidRequest {
            message: message.into(),
        }
    }
}

// Conflicts on update stay Internal: the client is expected to retry.
fn classify_kube(source: &kube::Error) -> ErrorKind {
    match source {
        kube::Error::Api(response) if response.code == 404 => ErrorKind::NotFound,
        kube::Error::Api(response) if response.code == 409 && response.reason == "AlreadyExists" => {
            ErrorKind::AlreadyExists
        }
        _ => ErrorKind::Internal,
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Error::Serialization {
            message: source.to_string(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
