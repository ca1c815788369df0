//! TLS for the HTTPS listener
//!
//! The certificate and key are mounted as PEM files (typically from a
//! `kubernetes.io/tls` secret) and loaded once at start-up.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use super::config::TlsSettings;

#[derive(Debug, Error)]
pub enum TlsError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse certificate material: {0}")]
    Parse(String),

    #[error("invalid PEM data")]
    InvalidPem,
}

/// PEM-encoded serving certificate chain and private key
#[derive(Clone)]
pub struct CertificateBundle {
    pub server_cert_pem: String,
    pub server_key_pem: String,
}

impl CertificateBundle {
    /// Read the certificate chain and key from disk
    pub fn from_files(cert_path: &Path, key_path: &Path) -> Result<Self, TlsError> {
        let read = |path: &Path| {
            std::fs::read_to_string(path).map_err(|source| TlsError::Read {
                path: path.to_path_buf(),
                source,
            })
        };
        Ok(Self {
            server_cert_pem: read(cert_path)?,
            server_key_pem: read(key_path)?,
        })
    }
}

/// Load the configured certificate files and build a server config
pub fn load_tls_config(settings: &TlsSettings) -> Result<Arc<rustls::ServerConfig>, TlsError> {
    let bundle = CertificateBundle::from_files(&settings.cert_path, &settings.key_path)?;
    let config = build_rustls_config(&bundle)?;
    info!(
        cert = %settings.cert_path.display(),
        "Loaded TLS serving certificate"
    );
    Ok(config)
}

/// Build a rustls ServerConfig from the certificate bundle
pub fn build_rustls_config(
    bundle: &CertificateBundle,
) -> Result<Arc<rustls::ServerConfig>, TlsError> {
    use rustls::pki_types::CertificateDer;
    use rustls_pemfile::{certs, private_key};
    use std::io::BufReader;

    let cert_chain: Vec<CertificateDer<'static>> =
        certs(&mut BufReader::new(bundle.server_cert_pem.as_bytes()))
            .collect::<Result<_, _>>()
            .map_err(|e| TlsError::Parse(format!("certificate chain: {}", e)))?;

    if cert_chain.is_empty() {
        return Err(TlsError::InvalidPem);
    }

    let key = private_key(&mut BufReader::new(bundle.server_key_pem.as_bytes()))
        .map_err(|e| TlsError::Parse(format!("private key: {}", e)))?
        .ok_or(TlsError::InvalidPem)?;

    let config = rustls::ServerConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .map_err(|e| TlsError::Parse(format!("protocol versions: {}", e)))?
    .with_no_client_auth()
    .with_single_cert(cert_chain, key)
    .map_err(|e| TlsError::Parse(format!("server config: {}", e)))?;

    Ok(Arc::new(config))
}
