//! SSL/TLS checker
//!
//! Performs the TLS handshake and hands back the peer certificates. Chain
//! validation is deliberately skipped: hosts are judged by the leaf CN
//! against the pin list. Handshake signatures are still verified, so the
//! peer has to hold the key of the certificate it presents.

use crate::utils::SslError;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, Error as RustlsError, SignatureScheme};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

/// Accepts any certificate chain but checks handshake signatures.
#[derive(Debug)]
struct PinningVerifier {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for PinningVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, RustlsError> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, RustlsError> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, RustlsError> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

/// SSL/TLS checker
///
/// Holds one client configuration, shared by every handshake.
#[derive(Clone)]
pub struct SslChecker {
    connector: TlsConnector,
}

impl SslChecker {
    /// Create a checker using the ring crypto provider
    pub fn new() -> Result<Self, SslError> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let verifier = Arc::new(PinningVerifier {
            provider: Arc::clone(&provider),
        });

        let config = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| SslError::HandshakeFailed {
                message: format!("Failed to build TLS client config: {}", e),
            })?
            .dangerous()
            .with_custom_certificate_verifier(verifier)
            .with_no_client_auth();

        Ok(Self {
            connector: TlsConnector::from(Arc::new(config)),
        })
    }

    /// Validate `hostname` as a TLS server name (used for SNI)
    pub fn server_name(hostname: &str) -> Result<ServerName<'static>, SslError> {
        ServerName::try_from(hostname.to_string()).map_err(|_| SslError::InvalidServerName {
            name: hostname.to_string(),
        })
    }

    /// Run the handshake over `stream` and return the peer certificate chain,
    /// leaf first.
    pub async fn handshake(
        &self,
        server_name: ServerName<'static>,
        stream: TcpStream,
    ) -> Result<Vec<CertificateDer<'static>>, SslError> {
        let tls_stream = self
            .connector
            .connect(server_name, stream)
            .await
            .map_err(|e| SslError::HandshakeFailed {
                message: e.to_string(),
            })?;

        let (_, client_connection) = tls_stream.get_ref();
        tracing::debug!(
            protocol = ?client_connection.protocol_version(),
            cipher = ?client_connection.negotiated_cipher_suite().map(|cs| cs.suite()),
            "tls handshake complete"
        );

        let chain: Vec<CertificateDer<'static>> = client_connection
            .peer_certificates()
            .map(|certs| certs.to_vec())
            .unwrap_or_default();

        if chain.is_empty() {
            return Err(SslError::NoPeerCertificate);
        }
        Ok(chain)
    }
}
