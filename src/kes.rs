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

//! `server-config.yaml` for the KES sidecar.
//!
//! The layout depends on the KES image (see [`version::select`]). Both layouts
//! share the listen address, server TLS paths, cache and log settings; they
//! differ in how the MinIO identity is authorised and where the KMS backend
//! lives (`keys` for v1, `keystore` for v2).

pub mod backend;
pub mod duration;
mod v1;
mod v2;
pub mod version;

use crate::error::{
    Error, InvalidCertificateSnafu, InvalidKesConfigSnafu, InvalidRequestSnafu,
    KesMissingCredentialsSnafu, Result,
};
use crate::models::encryption::{
    AwsConfiguration, AwsCredentials, AzureConfiguration, EncryptionConfiguration,
    GcpConfiguration, GcpCredentials, GemaltoConfiguration, VaultAppRole, VaultConfiguration,
};
use crate::secrets;
use crate::utils::tls;
use backend::Keys;
use duration::KesDuration;
use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt, ensure};
use std::collections::BTreeMap;
use version::SchemaVersion;

pub const DEFAULT_KES_IMAGE: &str = "minio/kes:2023-05-02T22-48-10Z";
pub const DEFAULT_REPLICAS: i32 = 1;

pub const SERVER_CONFIG_KEY: &str = "server-config.yaml";
pub const CLIENT_CERT_KEY: &str = "client.crt";
pub const CLIENT_KEY_KEY: &str = "client.key";
pub const CA_CERT_KEY: &str = "ca.crt";

/// Resolved by the operator when MinIO's client certificate is generated.
pub const IDENTITY_PLACEHOLDER: &str = "${MINIO_KES_IDENTITY}";

const DEFAULT_ADDRESS: &str = "0.0.0.0:7373";
const SERVER_KEY_PATH: &str = "/tmp/kes/server.key";
const SERVER_CERT_PATH: &str = "/tmp/kes/server.crt";
const CLIENT_CERT_PATH: &str = "/tmp/kes/client.crt";
const CLIENT_KEY_PATH: &str = "/tmp/kes/client.key";
const CA_CERT_PATH: &str = "/tmp/kes/ca.crt";

const DEFAULT_VAULT_PING_SECS: i64 = 10;
const DEFAULT_GEMALTO_RETRY_SECS: i64 = 15;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tls {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub cert: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<TlsProxy>,
}

impl Tls {
    fn server() -> Self {
        Self {
            key: SERVER_KEY_PATH.to_string(),
            cert: SERVER_CERT_PATH.to_string(),
            proxy: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TlsProxy {
    #[serde(default)]
    pub identities: Vec<String>,
    #[serde(default)]
    pub header: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cache {
    #[serde(default)]
    pub expiry: Expiry,
}

impl Cache {
    fn standard() -> Self {
        Self {
            expiry: Expiry {
                any: Some(KesDuration::from_secs(5 * 60)),
                unused: Some(KesDuration::from_secs(20)),
                offline: None,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Expiry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub any: Option<KesDuration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unused: Option<KesDuration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offline: Option<KesDuration>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Log {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub audit: String,
}

impl Log {
    fn standard() -> Self {
        Self {
            error: "on".to_string(),
            audit: "off".to_string(),
        }
    }
}

/// A parsed or generated `server-config.yaml`.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerConfig {
    V1(v1::ServerConfig),
    V2(v2::ServerConfig),
}

impl ServerConfig {
    pub fn new(version: SchemaVersion, identity: &str, keys: Keys) -> Self {
        match version {
            SchemaVersion::V1 => ServerConfig::V1(v1::ServerConfig::new(identity, keys)),
            SchemaVersion::V2 => ServerConfig::V2(v2::ServerConfig::new(identity, keys)),
        }
    }

    /// Reads a document under `version`.
    pub fn parse(version: SchemaVersion, bytes: &[u8]) -> Result<Self> {
        Ok(match version {
            SchemaVersion::V1 => {
                ServerConfig::V1(serde_yaml_ng::from_slice(bytes).context(InvalidKesConfigSnafu)?)
            }
            SchemaVersion::V2 => {
                ServerConfig::V2(serde_yaml_ng::from_slice(bytes).context(InvalidKesConfigSnafu)?)
            }
        })
    }

    pub fn version(&self) -> SchemaVersion {
        match self {
            ServerConfig::V1(_) => SchemaVersion::V1,
            ServerConfig::V2(_) => SchemaVersion::V2,
        }
    }

    pub fn keys(&self) -> &Keys {
        match self {
            ServerConfig::V1(config) => &config.keys,
            ServerConfig::V2(config) => &config.keystore,
        }
    }

    /// Identities allowed to use the MinIO key.
    pub fn identities(&self) -> Vec<String> {
        match self {
            ServerConfig::V1(config) => config
                .policy
                .values()
                .flat_map(|policy| policy.identities.iter().cloned())
                .collect(),
            ServerConfig::V2(config) => vec![config.admin.identity.clone()],
        }
    }

    pub fn to_yaml(&self) -> Result<Vec<u8>> {
        let rendered = match self {
            ServerConfig::V1(config) => serde_yaml_ng::to_string(config),
            ServerConfig::V2(config) => serde_yaml_ng::to_string(config),
        };
        rendered
            .map(String::into_bytes)
            .map_err(|e| Error::Serialization {
                message: e.to_string(),
            })
    }
}

/// What the encryption composers write for KES.
#[derive(Debug, Clone, PartialEq)]
pub struct KesMaterial {
    pub version: SchemaVersion,
    /// Content of `server-config.yaml`.
    pub server_config: Vec<u8>,
    /// Client material KES presents to the KMS; empty when none was supplied.
    pub client_cert: BTreeMap<String, Vec<u8>>,
}

/// Builds the KES configuration for `config`, run by `image`.
///
/// A raw document is validated under the selected layout and kept verbatim.
pub fn build(config: &EncryptionConfiguration, image: &str) -> Result<KesMaterial> {
    let version = version::select(image)?;
    let backend_count = [
        config.vault.is_some(),
        config.aws.is_some(),
        config.gemalto.is_some(),
        config.gcp.is_some(),
        config.azure.is_some(),
    ]
    .into_iter()
    .filter(|set| *set)
    .count();

    ensure!(
        backend_count <= 1,
        InvalidRequestSnafu {
            message: "only one KMS backend can be configured"
        }
    );

    let raw = config.raw.trim();
    ensure!(backend_count == 1 || !raw.is_empty(), KesMissingCredentialsSnafu);

    let mut client_cert = BTreeMap::new();
    let keys = keys(config, &mut client_cert)?;

    let server_config = if raw.is_empty() {
        ServerConfig::new(version, &identity(config)?, keys).to_yaml()?
    } else {
        ServerConfig::parse(version, config.raw.as_bytes())?;
        config.raw.clone().into_bytes()
    };

    Ok(KesMaterial {
        version,
        server_config,
        client_cert,
    })
}

/// Identity MinIO authenticates to KES with.
///
/// Derived from the MinIO mTLS certificate when present, otherwise the
/// placeholder the operator substitutes.
pub fn identity(config: &EncryptionConfiguration) -> Result<String> {
    let Some(pair) = config.minio_mtls.as_ref().filter(|pair| !pair.crt.is_empty()) else {
        return Ok(IDENTITY_PLACEHOLDER.to_string());
    };

    let name = "minio mTLS certificate";
    let pem = secrets::decode(name, &pair.crt)?;
    tls::public_key_identity(&pem).context(InvalidCertificateSnafu { name })
}

fn seconds(field: &str, value: i64) -> Result<KesDuration> {
    u64::try_from(value)
        .map(KesDuration::from_secs)
        .map_err(|_| Error::invalid_request(format!("{} must not be negative", field)))
}

fn kms_material(
    name: &str,
    value: &str,
    key: &str,
    path: &str,
    client_cert: &mut BTreeMap<String, Vec<u8>>,
) -> Result<String> {
    if value.is_empty() {
        return Ok(String::new());
    }
    client_cert.insert(key.to_string(), secrets::decode(name, value)?);
    Ok(path.to_string())
}

fn keys(config: &EncryptionConfiguration, client_cert: &mut BTreeMap<String, Vec<u8>>) -> Result<Keys> {
    let mut keys = Keys::default();
    let kms_mtls = config.kms_mtls.clone().unwrap_or_default();

    if let Some(vault) = &config.vault {
        let approle = vault.approle.as_ref().context(KesMissingCredentialsSnafu)?;
        let tls = backend::VaultTls {
            cert: kms_material("kmsMtls.crt", &kms_mtls.crt, CLIENT_CERT_KEY, CLIENT_CERT_PATH, client_cert)?,
            key: kms_material("kmsMtls.key", &kms_mtls.key, CLIENT_KEY_KEY, CLIENT_KEY_PATH, client_cert)?,
            ca: kms_material("kmsMtls.ca", &kms_mtls.ca, CA_CERT_KEY, CA_CERT_PATH, client_cert)?,
        };

        keys.vault = Some(backend::Vault {
            endpoint: vault.endpoint.clone(),
            engine: vault.engine.clone(),
            namespace: vault.namespace.clone(),
            prefix: vault.prefix.clone(),
            approle: Some(backend::VaultAppRole {
                engine: approle.engine.clone(),
                id: approle.id.clone(),
                secret: approle.secret.clone(),
                retry: approle
                    .retry
                    .map(|retry| seconds("vault.approle.retry", retry))
                    .transpose()?,
            }),
            tls,
            status: Some(backend::VaultStatus {
                ping: Some(seconds(
                    "vault.statusPing",
                    vault.status_ping.unwrap_or(DEFAULT_VAULT_PING_SECS),
                )?),
            }),
        });
    }

    if let Some(aws) = &config.aws {
        let credentials = aws.credentials.clone().unwrap_or_default();
        keys.aws = Some(backend::Aws {
            secretsmanager: backend::AwsSecretsManager {
                endpoint: aws.endpoint.clone(),
                region: aws.region.clone(),
                kmskey: aws.kms_key.clone(),
                credentials: backend::AwsCredentials {
                    accesskey: credentials.access_key,
                    secretkey: credentials.secret_key,
                    token: credentials.session_token,
                },
            },
        });
    }

    if let Some(gemalto) = &config.gemalto {
        keys.gemalto = Some(backend::Gemalto {
            keysecure: backend::GemaltoKeySecure {
                endpoint: gemalto.endpoint.clone(),
                credentials: backend::GemaltoCredentials {
                    token: gemalto.token.clone(),
                    domain: gemalto.domain.clone(),
                    retry: Some(seconds(
                        "gemalto.retry",
                        gemalto.retry.unwrap_or(DEFAULT_GEMALTO_RETRY_SECS),
                    )?),
                },
                tls: backend::GemaltoTls {
                    ca: kms_material("kmsMtls.ca", &kms_mtls.ca, CA_CERT_KEY, CA_CERT_PATH, client_cert)?,
                },
            },
        });
    }

    if let Some(gcp) = &config.gcp {
        let credentials = gcp.credentials.clone().unwrap_or_default();
        keys.gcp = Some(backend::Gcp {
            secretmanager: backend::GcpSecretManager {
                project_id: gcp.project_id.clone(),
                endpoint: gcp.endpoint.clone(),
                credentials: backend::GcpCredentials {
                    client_email: credentials.client_email,
                    client_id: credentials.client_id,
                    private_key_id: credentials.private_key_id,
                    private_key: credentials.private_key,
                },
            },
        });
    }

    if let Some(azure) = &config.azure {
        keys.azure = Some(backend::Azure {
            keyvault: backend::AzureKeyVault {
                endpoint: azure.endpoint.clone(),
                credentials: backend::AzureCredentials {
                    tenant_id: azure.tenant_id.clone(),
                    client_id: azure.client_id.clone(),
                    client_secret: azure.client_secret.clone(),
                },
            },
        });
    }

    Ok(keys)
}

/// Backend settings read back from a stored configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Backends {
    pub vault: Option<VaultConfiguration>,
    pub aws: Option<AwsConfiguration>,
    pub gemalto: Option<GemaltoConfiguration>,
    pub gcp: Option<GcpConfiguration>,
    pub azure: Option<AzureConfiguration>,
}

fn as_secs(duration: Option<KesDuration>) -> Option<i64> {
    duration.and_then(|d| i64::try_from(d.as_secs()).ok())
}

impl From<&Keys> for Backends {
    fn from(keys: &Keys) -> Self {
        Backends {
            vault: keys.vault.as_ref().map(|vault| VaultConfiguration {
                endpoint: vault.endpoint.clone(),
                engine: vault.engine.clone(),
                namespace: vault.namespace.clone(),
                prefix: vault.prefix.clone(),
                approle: vault.approle.as_ref().map(|approle| VaultAppRole {
                    engine: approle.engine.clone(),
                    id: approle.id.clone(),
                    secret: approle.secret.clone(),
                    retry: as_secs(approle.retry),
                }),
                status_ping: as_secs(vault.status.as_ref().and_then(|s| s.ping)),
            }),
            aws: keys.aws.as_ref().map(|aws| {
                let manager = &aws.secretsmanager;
                let credentials = &manager.credentials;
                AwsConfiguration {
                    endpoint: manager.endpoint.clone(),
                    region: manager.region.clone(),
                    kms_key: manager.kmskey.clone(),
                    credentials: (*credentials != backend::AwsCredentials::default()).then(|| {
                        AwsCredentials {
                            access_key: credentials.accesskey.clone(),
                            secret_key: credentials.secretkey.clone(),
                            session_token: credentials.token.clone(),
                        }
                    }),
                }
            }),
            gemalto: keys.gemalto.as_ref().map(|gemalto| GemaltoConfiguration {
                endpoint: gemalto.keysecure.endpoint.clone(),
                token: gemalto.keysecure.credentials.token.clone(),
                domain: gemalto.keysecure.credentials.domain.clone(),
                retry: as_secs(gemalto.keysecure.credentials.retry),
            }),
            gcp: keys.gcp.as_ref().map(|gcp| {
                let manager = &gcp.secretmanager;
                let credentials = &manager.credentials;
                GcpConfiguration {
                    project_id: manager.project_id.clone(),
                    endpoint: manager.endpoint.clone(),
                    credentials: (*credentials != backend::GcpCredentials::default()).then(|| {
                        GcpCredentials {
                            client_email: credentials.client_email.clone(),
                            client_id: credentials.client_id.clone(),
                            private_key_id: credentials.private_key_id.clone(),
                            private_key: credentials.private_key.clone(),
                        }
                    }),
                }
            }),
            azure: keys.azure.as_ref().map(|azure| AzureConfiguration {
                endpoint: azure.keyvault.endpoint.clone(),
                tenant_id: azure.keyvault.credentials.tenant_id.clone(),
                client_id: azure.keyvault.credentials.client_id.clone(),
                client_secret: azure.keyvault.credentials.client_secret.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::encryption::KmsMtls;
    use crate::models::security::KeyPairConfiguration;
    use crate::tests::{RSA_PKCS8_CERT, RSA_PKCS8_KEY, b64};

    const RSA_IDENTITY: &str = "a2de53d82975f9cc9c7b07f46da558bef9b01815cb5ad4d6b679adeedc6b54c0";

    fn vault() -> VaultConfiguration {
        VaultConfiguration {
            endpoint: "https://vault.vault.svc:8200".to_string(),
            engine: "kv".to_string(),
            approle: Some(VaultAppRole {
                id: "role-id".to_string(),
                secret: "role-secret".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn yaml(material: &KesMaterial) -> serde_yaml_ng::Value {
        serde_yaml_ng::from_slice(&material.server_config).unwrap()
    }

    #[test]
    fn test_vault_on_dated_image_uses_keystore_and_admin_identity() {
        let config = EncryptionConfiguration {
            vault: Some(vault()),
            minio_mtls: Some(KeyPairConfiguration::new(b64(RSA_PKCS8_CERT), b64(RSA_PKCS8_KEY))),
            ..Default::default()
        };

        let material = build(&config, DEFAULT_KES_IMAGE).unwrap();
        assert_eq!(material.version, SchemaVersion::V2);
        assert!(material.client_cert.is_empty());

        let doc = yaml(&material);
        assert_eq!(doc["keystore"]["vault"]["endpoint"].as_str(), Some("https://vault.vault.svc:8200"));
        assert_eq!(doc["keystore"]["vault"]["approle"]["id"].as_str(), Some("role-id"));
        assert_eq!(doc["keystore"]["vault"]["status"]["ping"].as_str(), Some("10s"));
        assert_eq!(doc["admin"]["identity"].as_str(), Some(RSA_IDENTITY));
        assert_eq!(doc["address"].as_str(), Some("0.0.0.0:7373"));
        assert_eq!(doc["tls"]["cert"].as_str(), Some("/tmp/kes/server.crt"));
        assert_eq!(doc["cache"]["expiry"]["any"].as_str(), Some("5m0s"));
        assert_eq!(doc["cache"]["expiry"]["unused"].as_str(), Some("20s"));
        assert!(doc.get("keys").is_none());
        assert!(doc.get("policy").is_none());

        let parsed = ServerConfig::parse(SchemaVersion::V2, &material.server_config).unwrap();
        assert_eq!(parsed.identities(), vec![RSA_IDENTITY.to_string()]);
    }

    #[test]
    fn test_old_image_uses_keys_and_default_policy() {
        let config = EncryptionConfiguration {
            vault: Some(vault()),
            ..Default::default()
        };

        let material = build(&config, "minio/kes:v0.18.0").unwrap();
        assert_eq!(material.version, SchemaVersion::V1);

        let doc = yaml(&material);
        assert_eq!(doc["root"].as_str(), Some("disabled"));
        assert_eq!(doc["keys"]["vault"]["endpoint"].as_str(), Some("https://vault.vault.svc:8200"));
        let policy = &doc["policy"]["default-policy"];
        assert_eq!(policy["identities"][0].as_str(), Some(IDENTITY_PLACEHOLDER));
        assert_eq!(policy["paths"][0].as_str(), Some("/v1/key/create/my-minio-key"));
        assert_eq!(policy["paths"][1].as_str(), Some("/v1/key/generate/my-minio-key"));
        assert_eq!(policy["paths"][2].as_str(), Some("/v1/key/decrypt/my-minio-key"));
        assert!(doc.get("keystore").is_none());
    }

    #[test]
    fn test_vault_kms_mtls_is_mounted() {
        let config = EncryptionConfiguration {
            vault: Some(vault()),
            kms_mtls: Some(KmsMtls {
                crt: b64(RSA_PKCS8_CERT),
                key: b64(RSA_PKCS8_KEY),
                ca: b64(RSA_PKCS8_CERT),
            }),
            ..Default::default()
        };

        let material = build(&config, "minio/kes:latest").unwrap();
        assert_eq!(
            material.client_cert.keys().collect::<Vec<_>>(),
            vec![CA_CERT_KEY, CLIENT_CERT_KEY, CLIENT_KEY_KEY]
        );
        assert_eq!(material.client_cert[CLIENT_CERT_KEY], RSA_PKCS8_CERT.as_bytes());

        let doc = yaml(&material);
        let tls = &doc["keystore"]["vault"]["tls"];
        assert_eq!(tls["cert"].as_str(), Some("/tmp/kes/client.crt"));
        assert_eq!(tls["key"].as_str(), Some("/tmp/kes/client.key"));
        assert_eq!(tls["ca"].as_str(), Some("/tmp/kes/ca.crt"));
    }

    #[test]
    fn test_vault_without_approle_is_missing_credentials() {
        let mut backend = vault();
        backend.approle = None;
        let config = EncryptionConfiguration {
            vault: Some(backend),
            ..Default::default()
        };
        let err = build(&config, DEFAULT_KES_IMAGE).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KesMissingCredentials);
    }

    #[test]
    fn test_gemalto_defaults_retry_and_takes_kms_ca() {
        let config = EncryptionConfiguration {
            gemalto: Some(GemaltoConfiguration {
                endpoint: "https://keysecure:443".to_string(),
                token: "token".to_string(),
                domain: "root".to_string(),
                retry: None,
            }),
            kms_mtls: Some(KmsMtls {
                ca: b64(RSA_PKCS8_CERT),
                ..Default::default()
            }),
            ..Default::default()
        };

        let material = build(&config, DEFAULT_KES_IMAGE).unwrap();
        let doc = yaml(&material);
        let keysecure = &doc["keystore"]["gemalto"]["keysecure"];
        assert_eq!(keysecure["credentials"]["retry"].as_str(), Some("15s"));
        assert_eq!(keysecure["tls"]["ca"].as_str(), Some("/tmp/kes/ca.crt"));
        assert_eq!(material.client_cert.len(), 1);
    }

    #[test]
    fn test_aws_always_emits_credentials() {
        let config = EncryptionConfiguration {
            aws: Some(AwsConfiguration {
                endpoint: "secretsmanager.us-east-1.amazonaws.com".to_string(),
                region: "us-east-1".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };

        let material = build(&config, DEFAULT_KES_IMAGE).unwrap();
        let doc = yaml(&material);
        let credentials = &doc["keystore"]["aws"]["secretsmanager"]["credentials"];
        assert_eq!(credentials["accesskey"].as_str(), Some(""));
        assert!(doc["keystore"]["aws"]["secretsmanager"].get("kmskey").is_none());
    }

    #[test]
    fn test_two_backends_are_rejected() {
        let config = EncryptionConfiguration {
            vault: Some(vault()),
            azure: Some(AzureConfiguration::default()),
            ..Default::default()
        };
        let err = build(&config, DEFAULT_KES_IMAGE).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }

    #[test]
    fn test_no_backend_requires_raw_document() {
        let err = build(&EncryptionConfiguration::default(), DEFAULT_KES_IMAGE).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KesMissingCredentials);

        let raw = "address: 0.0.0.0:7373\nadmin:\n  identity: abc\nkeystore:\n  fs:\n    path: /data\n";
        let config = EncryptionConfiguration {
            raw: raw.to_string(),
            ..Default::default()
        };
        let material = build(&config, DEFAULT_KES_IMAGE).unwrap();
        assert_eq!(material.server_config, raw.as_bytes());
    }

    #[test]
    fn test_malformed_raw_document_is_rejected() {
        let config = EncryptionConfiguration {
            raw: "keystore: [1, 2".to_string(),
            ..Default::default()
        };
        let err = build(&config, DEFAULT_KES_IMAGE).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }

    #[test]
    fn test_unknown_image_fails_before_anything_else() {
        let config = EncryptionConfiguration {
            vault: Some(vault()),
            ..Default::default()
        };
        let err = build(&config, "minio/kes:stable").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownKesImage);
    }

    #[test]
    fn test_backends_read_back() {
        let config = EncryptionConfiguration {
            vault: Some(VaultConfiguration {
                status_ping: Some(30),
                ..vault()
            }),
            ..Default::default()
        };
        let material = build(&config, DEFAULT_KES_IMAGE).unwrap();
        let parsed = ServerConfig::parse(material.version, &material.server_config).unwrap();

        let backends = Backends::from(parsed.keys());
        let vault = backends.vault.unwrap();
        assert_eq!(vault.endpoint, "https://vault.vault.svc:8200");
        assert_eq!(vault.status_ping, Some(30));
        assert_eq!(vault.approle.unwrap().id, "role-id");
        assert!(backends.aws.is_none());
    }

    #[test]
    fn test_v2_offline_expiry_survives_parsing() {
        let raw = b"cache:\n  expiry:\n    any: 5m\n    unused: 20s\n    offline: 1h\nkeystore:\n  fs:\n    path: /data\n";
        let parsed = ServerConfig::parse(SchemaVersion::V2, raw).unwrap();
        let ServerConfig::V2(config) = &parsed else {
            panic!("expected v2");
        };
        assert_eq!(config.cache.expiry.offline, Some(KesDuration::from_secs(3600)));
        assert_eq!(parsed.keys().backend_count(), 1);
    }
}
