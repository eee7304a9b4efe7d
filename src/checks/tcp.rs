//! TCP connectivity checker
//!
//! Opens the TCP stream a TLS handshake runs over. The caller owns the time
//! budget; this module only classifies why a connect failed.

use crate::utils::TcpError;
use std::io::ErrorKind;
use std::net::SocketAddr;
use tokio::net::TcpStream;

/// TCP connectivity checker
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpChecker;

impl TcpChecker {
    pub fn new() -> Self {
        Self
    }

    /// Connect to the first address that accepts.
    ///
    /// Addresses are tried in order; when all fail, the error of the last
    /// attempt is returned.
    pub async fn connect(&self, addrs: &[SocketAddr]) -> Result<TcpStream, TcpError> {
        let mut last_error = TcpError::NoAddresses;

        for addr in addrs {
            match TcpStream::connect(addr).await {
                Ok(stream) => {
                    tracing::debug!(%addr, "tcp connected");
                    return Ok(stream);
                }
                Err(e) => {
                    tracing::debug!(%addr, error = %e, "tcp connect failed");
                    last_error = classify(*addr, &e);
                }
            }
        }

        Err(last_error)
    }
}

fn classify(addr: SocketAddr, err: &std::io::Error) -> TcpError {
    match err.kind() {
        ErrorKind::ConnectionRefused => TcpError::ConnectionRefused { addr },
        ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted => {
            TcpError::ConnectionReset { addr }
        }
        _ => {
            let error_str = err.to_string().to_lowercase();
            if error_str.contains("network") && error_str.contains("unreachable") {
                TcpError::NetworkUnreachable
            } else if error_str.contains("unreachable") {
                TcpError::HostUnreachable { addr }
            } else {
                TcpError::ConnectionFailed {
                    addr,
                    message: err.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_local_listener() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let stream = TcpChecker::new().connect(&[addr]).await;
        assert!(stream.is_ok());
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // Bind then drop to get a port nothing listens on
        let addr = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        let result = TcpChecker::new().connect(&[addr]).await;
        assert!(matches!(result, Err(TcpError::ConnectionRefused { .. })));
    }

    #[tokio::test]
    async fn test_falls_through_to_next_address() {
        let dead = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let live = listener.local_addr().unwrap();

        let stream = TcpChecker::new().connect(&[dead, live]).await.unwrap();
        assert_eq!(stream.peer_addr().unwrap(), live);
    }

    #[tokio::test]
    async fn test_no_addresses() {
        let result = TcpChecker::new().connect(&[]).await;
        assert_eq!(result.unwrap_err(), TcpError::NoAddresses);
    }
}
