//! Certificate parsing
//!
//! Extracts the identity fields pinning needs from X.509 certificates using
//! x509-parser.

use crate::utils::CertificateError;
use x509_parser::prelude::*;

/// Certificate checker and parser
#[derive(Debug, Clone, Copy, Default)]
pub struct CertificateChecker;

impl CertificateChecker {
    /// Create a new certificate checker
    pub fn new() -> Self {
        Self
    }

    /// Subject CN of the leaf (first) certificate of a DER chain
    pub fn leaf_common_name<C: AsRef<[u8]>>(
        &self,
        chain: &[C],
    ) -> Result<Option<String>, CertificateError> {
        let leaf = chain.first().ok_or(CertificateError::EmptyChain)?;
        self.common_name(leaf.as_ref())
    }

    /// Subject CN of a single DER-encoded certificate
    ///
    /// Returns `Ok(None)` when the subject carries no CN attribute. When there
    /// are several, the first one wins.
    pub fn common_name(&self, der: &[u8]) -> Result<Option<String>, CertificateError> {
        let (_, cert) =
            X509Certificate::from_der(der).map_err(|e| CertificateError::ParseError {
                message: format!("Failed to parse certificate: {:?}", e),
            })?;

        let cn = cert
            .subject()
            .iter_common_name()
            .next()
            .map(|attr| {
                attr.as_str()
                    .map(str::to_string)
                    .map_err(|e| CertificateError::ParseError {
                        message: format!("Unreadable common name: {:?}", e),
                    })
            })
            .transpose()?;

        Ok(cn)
    }
}
