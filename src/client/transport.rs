//! Transport abstraction
//!
//! The executor owns retries, timeouts and masking. A [`Transport`] only turns
//! a [`TrustRoute`] into a client and moves bytes.

use super::RequestContext;
use crate::tls::TrustRoute;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Certificate;
use std::collections::HashMap;
use thiserror::Error;

/// Failure below the HTTP layer
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Client configuration failed: {0}")]
    Configure(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Whether another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Connect(_) | Self::Request(_)
        )
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else if err.is_request() || err.is_body() {
            Self::Request(err.to_string())
        } else {
            Self::Other(err.to_string())
        }
    }
}

/// Raw response as received from the wire
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

/// Sends prepared requests
#[async_trait]
pub trait Transport: Send + Sync {
    /// Per-call client built from the resolved route
    type Client: Send + Sync;

    fn configure(&self, route: &TrustRoute) -> Result<Self::Client, TransportError>;

    async fn send(
        &self,
        client: &Self::Client,
        request: &RequestContext,
    ) -> Result<TransportResponse, TransportError>;
}

/// reqwest-backed transport
#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestTransport;

impl ReqwestTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    type Client = reqwest::Client;

    fn configure(&self, route: &TrustRoute) -> Result<reqwest::Client, TransportError> {
        let mut builder = reqwest::Client::builder();

        if !route.verify_host {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(material) = &route.trust_material {
            match std::fs::read(&material.path) {
                Ok(pem) => {
                    for cert in parse_pem_bundle(&pem)? {
                        builder = builder.add_root_certificate(cert);
                    }
                    tracing::debug!(
                        pattern = %material.pattern,
                        path = %material.path.display(),
                        "Using custom trust material"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        pattern = %material.pattern,
                        path = %material.path.display(),
                        "Trust store unreadable, using platform roots: {}",
                        e
                    );
                }
            }
        }

        builder = match &route.proxy {
            Some(proxy) => {
                let proxy = reqwest::Proxy::all(proxy.url())
                    .map_err(|e| TransportError::Configure(e.to_string()))?;
                builder.proxy(proxy)
            }
            None => builder.no_proxy(),
        };

        builder
            .build()
            .map_err(|e| TransportError::Configure(e.to_string()))
    }

    async fn send(
        &self,
        client: &reqwest::Client,
        request: &RequestContext,
    ) -> Result<TransportResponse, TransportError> {
        let mut builder = client.request(request.method.into(), request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();

        let mut headers: HashMap<String, String> = HashMap::new();
        for (name, value) in response.headers() {
            let Ok(value) = value.to_str() else {
                continue;
            };
            headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }

        let body = response.bytes().await?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

/// Load every certificate of a PEM bundle. A bundle with no certificate or
/// a malformed one is a configuration error.
fn parse_pem_bundle(pem: &[u8]) -> Result<Vec<Certificate>, TransportError> {
    let certs = Certificate::from_pem_bundle(pem)
        .map_err(|e| TransportError::Configure(format!("Invalid trust store: {}", e)))?;

    if certs.is_empty() {
        return Err(TransportError::Configure(
            "Trust store contains no certificates".to_string(),
        ));
    }
    Ok(certs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tls::{ProxyRoute, TrustMaterial};
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_retryable_kinds() {
        assert!(TransportError::Timeout("t".into()).is_retryable());
        assert!(TransportError::Connect("c".into()).is_retryable());
        assert!(TransportError::Request("r".into()).is_retryable());
        assert!(!TransportError::Configure("x".into()).is_retryable());
        assert!(!TransportError::InvalidUrl("x".into()).is_retryable());
        assert!(!TransportError::Other("x".into()).is_retryable());
    }

    #[test]
    fn test_configure_default_route() {
        assert!(ReqwestTransport::new()
            .configure(&TrustRoute::default())
            .is_ok());
    }

    #[test]
    fn test_configure_insecure_with_proxy() {
        let route = TrustRoute {
            trust_material: None,
            verify_host: false,
            proxy: Some(ProxyRoute {
                host: "proxy.company.com".to_string(),
                port: 3128,
            }),
        };
        assert!(ReqwestTransport::new().configure(&route).is_ok());
    }

    #[test]
    fn test_missing_trust_store_falls_back() {
        let route = TrustRoute {
            trust_material: Some(TrustMaterial {
                pattern: "api.example.com".to_string(),
                path: PathBuf::from("/nonexistent/ca.pem"),
            }),
            ..TrustRoute::default()
        };
        assert!(ReqwestTransport::new().configure(&route).is_ok());
    }

    #[test]
    fn test_malformed_trust_store_is_configure_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not a certificate").unwrap();

        let route = TrustRoute {
            trust_material: Some(TrustMaterial {
                pattern: "api.example.com".to_string(),
                path: file.path().to_path_buf(),
            }),
            ..TrustRoute::default()
        };
        let err = ReqwestTransport::new().configure(&route).unwrap_err();
        assert!(matches!(err, TransportError::Configure(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_pem_bundle_errors() {
        assert!(matches!(
            parse_pem_bundle(b"no certificates here"),
            Err(TransportError::Configure(_))
        ));

        let corrupt = b"-----BEGIN CERTIFICATE-----\n!!not base64!!\n-----END CERTIFICATE-----\n";
        assert!(matches!(
            parse_pem_bundle(corrupt),
            Err(TransportError::Configure(_))
        ));
    }
}
