//! Tests for TLS configuration loading

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::config::TlsSettings;
use super::tls::*;
use std::path::PathBuf;

fn self_signed() -> CertificateBundle {
    let cert = rcgen::generate_simple_self_signed(vec!["deployconfig.default.svc".to_string()])
        .expect("generate certificate");
    CertificateBundle {
        server_cert_pem: cert.cert.pem(),
        server_key_pem: cert.key_pair.serialize_pem(),
    }
}

fn write_temp(contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("deployconfig-tls-{}.pem", uuid::Uuid::new_v4()));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_build_rustls_config_from_self_signed_bundle() {
    let config = build_rustls_config(&self_signed());
    assert!(config.is_ok(), "Should build TLS config");
}

#[test]
fn test_empty_certificate_is_invalid_pem() {
    let mut bundle = self_signed();
    bundle.server_cert_pem = String::new();

    assert!(matches!(
        build_rustls_config(&bundle),
        Err(TlsError::InvalidPem)
    ));
}

#[test]
fn test_missing_key_is_invalid_pem() {
    let mut bundle = self_signed();
    bundle.server_key_pem = "not a key".to_string();

    assert!(matches!(
        build_rustls_config(&bundle),
        Err(TlsError::InvalidPem)
    ));
}

#[test]
fn test_load_tls_config_from_files() {
    let bundle = self_signed();
    let settings = TlsSettings {
        port: 8443,
        cert_path: write_temp(&bundle.server_cert_pem),
        key_path: write_temp(&bundle.server_key_pem),
    };

    let result = load_tls_config(&settings);

    let _ = std::fs::remove_file(&settings.cert_path);
    let _ = std::fs::remove_file(&settings.key_path);
    assert!(result.is_ok());
}

#[test]
fn test_missing_file_reports_path() {
    let settings = TlsSettings {
        port: 8443,
        cert_path: PathBuf::from("/nonexistent/tls.crt"),
        key_path: PathBuf::from("/nonexistent/tls.key"),
    };

    let err = load_tls_config(&settings).unwrap_err();

    assert!(matches!(err, TlsError::Read { ref path, .. } if path == &settings.cert_path));
    assert!(err.to_string().contains("/nonexistent/tls.crt"));
}
