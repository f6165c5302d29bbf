// Copyright 2025 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use rustls::crypto::ring::sign;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::sign::CertifiedKey;
use rustls_pemfile::Item;
use sha2::{Digest, Sha256};
use snafu::{ResultExt, Snafu};
use std::io::{self, Cursor};
use std::net::IpAddr;
use x509_parser::extensions::GeneralName;
use x509_parser::prelude::{FromDer, X509Certificate};

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("parse certificate error"))]
    InvalidCertificate { source: io::Error },

    #[snafu(display("no certificate"))]
    NonCertificate,

    #[snafu(display("malformed certificate: {}", reason))]
    MalformedCertificate { reason: String },

    #[snafu(display("parse private key error"))]
    InvalidPrivateKey { source: io::Error },

    #[snafu(display("no private key"))]
    NonPrivateKey,

    #[snafu(display("key pair match failed"))]
    MatchFailed { source: rustls::Error },

    #[snafu(display("no supported sign type"))]
    NoSupportedSignType { source: rustls::Error },

    #[snafu(display("no supported pem type"))]
    NoSupportedPEMType,
}

/// Facts read from one X.509 certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateDetails {
    /// Decimal serial number.
    pub serial_number: String,
    /// Subject common name.
    pub name: String,
    /// Common name followed by DNS and IP subject alternative names.
    pub domains: Vec<String>,
    /// `notAfter` in RFC 3339, UTC.
    pub expiry: String,
}

// load certificates from PEM file
fn load_certs(cert: &[u8]) -> Result<Vec<CertificateDer<'static>>, Error> {
    let certs = rustls_pemfile::certs(&mut Cursor::new(cert))
        .collect::<Result<Vec<CertificateDer<'static>>, _>>()
        .context(InvalidCertificateSnafu)?;

    if certs.is_empty() {
        return NonCertificateSnafu.fail();
    }

    Ok(certs)
}

fn load_private_key(private_key: &[u8]) -> Result<PrivateKeyDer<'static>, Error> {
    let item = rustls_pemfile::read_one(&mut Cursor::new(private_key))
        .context(InvalidPrivateKeySnafu)?
        .ok_or(Error::NonPrivateKey)?;

    // only pkcs8/pkcs1/sec1 supported
    Ok(match item {
        Item::Pkcs8Key(key) => key.into(),
        Item::Pkcs1Key(key) => key.into(),
        Item::Sec1Key(key) => key.into(),
        _ => return NoSupportedPEMTypeSnafu.fail(),
    })
}

/// Checks that the PEM certificate chain and private key belong together.
pub fn x509_key_pair<T: AsRef<[u8]>>(cert_pem: T, key_pem: T) -> Result<(), Error> {
    let certs = load_certs(cert_pem.as_ref())?;
    let private_key = load_private_key(key_pem.as_ref())?;

    let signing_key = sign::any_supported_type(&private_key).context(NoSupportedSignTypeSnafu)?;

    let certified_key = CertifiedKey::new(certs, signing_key);
    certified_key.keys_match().context(MatchFailedSnafu)
}

fn parse_der<'a>(der: &'a CertificateDer<'_>) -> Result<X509Certificate<'a>, Error> {
    X509Certificate::from_der(der.as_ref())
        .map(|(_, cert)| cert)
        .map_err(|e| Error::MalformedCertificate {
            reason: e.to_string(),
        })
}

/// Reads every certificate of a PEM bundle.
pub fn parse_certificates(cert_pem: &[u8]) -> Result<Vec<CertificateDetails>, Error> {
    load_certs(cert_pem)?
        .iter()
        .map(|der| {
            let cert = parse_der(der)?;
            Ok(describe(&cert))
        })
        .collect()
}

fn describe(cert: &X509Certificate<'_>) -> CertificateDetails {
    let name = cert
        .subject()
        .iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .unwrap_or_default()
        .to_string();

    let mut domains = Vec::new();
    if !name.is_empty() {
        domains.push(name.clone());
    }

    if let Ok(Some(san)) = cert.subject_alternative_name() {
        for general_name in &san.value.general_names {
            match general_name {
                GeneralName::DNSName(dns) => domains.push((*dns).to_string()),
                GeneralName::IPAddress(raw) => {
                    if let Some(ip) = ip_from_bytes(raw) {
                        domains.push(ip.to_string());
                    }
                }
                _ => {}
            }
        }
    }

    let expiry = chrono::DateTime::from_timestamp(cert.validity().not_after.timestamp(), 0)
        .map(|at| at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
        .unwrap_or_default();

    CertificateDetails {
        serial_number: cert.serial.to_string(),
        name,
        domains,
        expiry,
    }
}

fn ip_from_bytes(raw: &[u8]) -> Option<IpAddr> {
    match raw.len() {
        4 => <[u8; 4]>::try_from(raw).ok().map(IpAddr::from),
        16 => <[u8; 16]>::try_from(raw).ok().map(IpAddr::from),
        _ => None,
    }
}

/// Hex SHA-256 over the SubjectPublicKeyInfo of the first certificate in the bundle.
///
/// KES uses this value as the identity of a TLS peer.
pub fn public_key_identity(cert_pem: &[u8]) -> Result<String, Error> {
    let certs = load_certs(cert_pem)?;
    let cert = parse_der(&certs[0])?;
    let digest = Sha256::digest(cert.public_key().raw);

    Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
}
