//! TLS-terminating listener for serving the webhook with a (self-signed)
//! certificate, without a reverse proxy in front.

use anyhow::{anyhow, Context, Result};
use std::io;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::rustls::pki_types::pem::PemObject;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tokio_rustls::rustls::ServerConfig;
use tokio_rustls::server::TlsStream;
use tokio_rustls::TlsAcceptor;
use tracing::{debug, warn};

use crate::config::TlsSettings;

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Build a TLS acceptor from PEM certificate chain and private key files
pub fn load_acceptor(tls: &TlsSettings) -> Result<TlsAcceptor> {
    let certs = load_certs(&tls.cert_path)?;
    let key = PrivateKeyDer::from_pem_file(&tls.key_path)
        .with_context(|| format!("Failed to read private key {}", tls.key_path.display()))?;

    let config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .context("Certificate and private key do not form a valid TLS identity")?;

    Ok(TlsAcceptor::from(Arc::new(config)))
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>> {
    let certs = CertificateDer::pem_file_iter(path)
        .with_context(|| format!("Failed to open certificate {}", path.display()))?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to parse certificate {}", path.display()))?;

    if certs.is_empty() {
        return Err(anyhow!("No certificate found in {}", path.display()));
    }
    Ok(certs)
}

/// [`axum::serve::Listener`] yielding TLS streams
///
/// Connections that fail the handshake are dropped and never reach the router.
pub struct TlsListener {
    inner: TcpListener,
    acceptor: TlsAcceptor,
}

impl TlsListener {
    pub async fn bind(address: SocketAddr, acceptor: TlsAcceptor) -> io::Result<Self> {
        let inner = TcpListener::bind(address).await?;
        Ok(Self { inner, acceptor })
    }
}

impl axum::serve::Listener for TlsListener {
    type Io = TlsStream<TcpStream>;
    type Addr = SocketAddr;

    async fn accept(&mut self) -> (Self::Io, Self::Addr) {
        loop {
            let (stream, peer) = match self.inner.accept().await {
                Ok(connection) => connection,
                Err(e) => {
                    warn!(error = %e, "Failed to accept webhook connection");
                    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    continue;
                }
            };

            match tokio::time::timeout(HANDSHAKE_TIMEOUT, self.acceptor.accept(stream)).await {
                Ok(Ok(tls_stream)) => return (tls_stream, peer),
                Ok(Err(e)) => debug!(peer = %peer, error = %e, "TLS handshake failed"),
                Err(_) => debug!(peer = %peer, "TLS handshake timed out"),
            }
        }
    }

    fn local_addr(&self) -> io::Result<Self::Addr> {
        self.inner.local_addr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::serve::Listener;
    use std::path::PathBuf;
    use tempfile::TempDir;

    // Self-signed P-256 certificate for CN=localhost and its key
    const CERT_PEM: &str = include_str!("../tests/fixtures/tls/cert.pem");
    const KEY_PEM: &str = include_str!("../tests/fixtures/tls/key.pem");
    const OTHER_KEY_PEM: &str = include_str!("../tests/fixtures/tls/other_key.pem");

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn settings(dir: &TempDir, cert: &str, key: &str) -> TlsSettings {
        TlsSettings {
            cert_path: write(dir, "cert.pem", cert),
            key_path: write(dir, "key.pem", key),
        }
    }

    #[test]
    fn test_matching_pair_builds_acceptor() {
        let dir = TempDir::new().unwrap();
        assert!(load_acceptor(&settings(&dir, CERT_PEM, KEY_PEM)).is_ok());
    }

    #[test]
    fn test_empty_certificate_file() {
        let dir = TempDir::new().unwrap();
        let err = load_acceptor(&settings(&dir, "", KEY_PEM)).err().expect("expected an error");
        assert!(err.to_string().contains("No certificate found"), "{err:#}");
    }

    #[test]
    fn test_missing_certificate_file() {
        let dir = TempDir::new().unwrap();
        let tls = TlsSettings {
            cert_path: dir.path().join("absent.pem"),
            key_path: write(&dir, "key.pem", KEY_PEM),
        };
        let err = load_acceptor(&tls).err().expect("expected an error");
        assert!(err.to_string().contains("Failed to open certificate"), "{err:#}");
    }

    #[test]
    fn test_missing_key_file() {
        let dir = TempDir::new().unwrap();
        let tls = TlsSettings {
            cert_path: write(&dir, "cert.pem", CERT_PEM),
            key_path: dir.path().join("absent.pem"),
        };
        let err = load_acceptor(&tls).err().expect("expected an error");
        assert!(err.to_string().contains("Failed to read private key"), "{err:#}");
    }

    #[test]
    fn test_key_file_without_key() {
        let dir = TempDir::new().unwrap();
        // A certificate where the key should be
        let err = load_acceptor(&settings(&dir, CERT_PEM, CERT_PEM)).err().expect("expected an error");
        assert!(err.to_string().contains("Failed to read private key"), "{err:#}");
    }

    #[test]
    fn test_mismatched_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        let err = load_acceptor(&settings(&dir, CERT_PEM, OTHER_KEY_PEM)).err().expect("expected an error");
        assert!(
            err.to_string().contains("do not form a valid TLS identity"),
            "{err:#}"
        );
    }

    #[tokio::test]
    async fn test_listener_binds_ephemeral_port() {
        let dir = TempDir::new().unwrap();
        let acceptor = load_acceptor(&settings(&dir, CERT_PEM, KEY_PEM)).unwrap();

        let listener = TlsListener::bind(([127, 0, 0, 1], 0).into(), acceptor)
            .await
            .unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }
}
