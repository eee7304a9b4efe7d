//! HTTP landing check
//!
//! After a successful handshake, fetches `/` with redirects followed and
//! records where the host finally lands. The request is pinned to the
//! address the handshake used, so DNS is not consulted a second time for
//! the probed host.

use crate::utils::HttpError;
use reqwest::redirect::Policy;
use std::net::SocketAddr;
use std::time::Duration;

const MAX_REDIRECTS: usize = 10;

/// Final response of a redirect chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Landing {
    pub status: u16,
    pub final_url: String,
}

/// HTTP checker
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpChecker;

impl HttpChecker {
    pub fn new() -> Self {
        Self
    }

    /// GET `https://<hostname>/` via `addr`, following redirects
    pub async fn fetch(
        &self,
        hostname: &str,
        addr: SocketAddr,
        timeout: Duration,
    ) -> Result<Landing, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(true)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .resolve(hostname, addr)
            .no_proxy()
            .build()
            .map_err(|e| HttpError::ClientSetup {
                message: e.to_string(),
            })?;

        let response = client
            .get(landing_url(hostname, addr.port()))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    HttpError::Timeout
                } else {
                    HttpError::RequestFailed {
                        message: e.to_string(),
                    }
                }
            })?;

        Ok(Landing {
            status: response.status().as_u16(),
            final_url: response.url().to_string(),
        })
    }
}

fn landing_url(hostname: &str, port: u16) -> String {
    if port == 443 {
        format!("https://{}/", hostname)
    } else {
        format!("https://{}:{}/", hostname, port)
    }
}
