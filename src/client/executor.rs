//! Privacy-aware HTTP executor
//!
//! Drives one outbound call through its lifecycle:
//!
//! ```text
//! INIT ─▶ ROUTING ─▶ SENDING ─┬─▶ COMPLETED (any HTTP status)
//!                      ▲      │
//!                      └─ RETRYING (transport failure, attempts left)
//!                             │
//!                             └─▶ FAILED (status 0)
//! ```
//!
//! Outbound bytes are never masked. Masking only feeds diagnostics and the
//! audit decision.

use super::correlation::CorrelationIdManager;
use super::request::{HttpMethod, RequestContext};
use super::response::HttpResponse;
use super::transport::{ReqwestTransport, Transport, TransportError, TransportResponse};
use crate::audit::{AuditPublisher, AuditSink, TracingAuditSink};
use crate::config::SafeHttpConfig;
use crate::error::Result;
use crate::privacy::{mask_headers, JsonBodyMasker, PiiClassifier, RegexPiiDetector};
use crate::tls::TlsRouteResolver;
use bytes::Bytes;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::Level;

/// Operation name attached to audit events for executor calls
pub const HTTP_CLIENT_CALL: &str = "HTTP_CLIENT_CALL";

/// Outbound HTTP client with masking, retries, trust routing and audit
pub struct HttpExecutor<T: Transport = ReqwestTransport> {
    config: Arc<SafeHttpConfig>,
    transport: T,
    resolver: TlsRouteResolver,
    correlation: CorrelationIdManager,
    classifier: Arc<PiiClassifier>,
    detector: Arc<RegexPiiDetector>,
    masker: JsonBodyMasker,
    audit: AuditPublisher,
}

impl HttpExecutor<ReqwestTransport> {
    pub fn builder() -> HttpExecutorBuilder<ReqwestTransport> {
        HttpExecutorBuilder::new()
    }
}

impl<T: Transport> HttpExecutor<T> {
    pub fn config(&self) -> &SafeHttpConfig {
        &self.config
    }

    pub async fn get<R>(
        &self,
        url: &str,
        params: &[(&str, &str)],
        headers: &HashMap<String, String>,
    ) -> HttpResponse<R>
    where
        R: DeserializeOwned + Serialize,
    {
        self.execute::<(), R>(HttpMethod::Get, url, params, headers, None)
            .await
    }

    pub async fn post<B, R>(
        &self,
        url: &str,
        params: &[(&str, &str)],
        headers: &HashMap<String, String>,
        body: &B,
    ) -> HttpResponse<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned + Serialize,
    {
        self.execute(HttpMethod::Post, url, params, headers, Some(body))
            .await
    }

    pub async fn put<B, R>(
        &self,
        url: &str,
        params: &[(&str, &str)],
        headers: &HashMap<String, String>,
        body: &B,
    ) -> HttpResponse<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned + Serialize,
    {
        self.execute(HttpMethod::Put, url, params, headers, Some(body))
            .await
    }

    pub async fn patch<B, R>(
        &self,
        url: &str,
        params: &[(&str, &str)],
        headers: &HashMap<String, String>,
        body: &B,
    ) -> HttpResponse<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned + Serialize,
    {
        self.execute(HttpMethod::Patch, url, params, headers, Some(body))
            .await
    }

    pub async fn delete<R>(
        &self,
        url: &str,
        params: &[(&str, &str)],
        headers: &HashMap<String, String>,
    ) -> HttpResponse<R>
    where
        R: DeserializeOwned + Serialize,
    {
        self.execute::<(), R>(HttpMethod::Delete, url, params, headers, None)
            .await
    }

    /// Run one call of any method. Never fails: infrastructure errors come
    /// back as a status-0 envelope.
    pub async fn execute<B, R>(
        &self,
        method: HttpMethod,
        url: &str,
        params: &[(&str, &str)],
        headers: &HashMap<String, String>,
        body: Option<&B>,
    ) -> HttpResponse<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned + Serialize,
    {
        let correlation_id = self
            .correlation
            .get_or_create(self.correlation.find_in(headers));
        let mut headers = headers.clone();
        self.correlation.apply(&mut headers, &correlation_id);

        let scope_id = correlation_id.clone();
        CorrelationIdManager::scope(scope_id, async move {
            let prepared = self.prepare(method, url, params, headers, body, &correlation_id);
            let (client, request) = match prepared {
                Ok(prepared) => prepared,
                Err(e) => {
                    tracing::error!(
                        "HTTP infrastructure failure cid={} attempt=0: {}",
                        correlation_id,
                        e
                    );
                    return HttpResponse::transport_failure(correlation_id);
                }
            };

            match self.send_with_retry(&client, request).await {
                Ok((request, response)) => self.complete(&request, url, response),
                Err((request, e)) => {
                    tracing::error!(
                        "HTTP infrastructure failure cid={} attempt={}: {}",
                        request.correlation_id,
                        request.attempt_count,
                        e
                    );
                    HttpResponse::transport_failure(correlation_id)
                }
            }
        })
        .await
    }

    /// ROUTING: build the final URL, resolve trust and serialize the body.
    fn prepare<B>(
        &self,
        method: HttpMethod,
        url: &str,
        params: &[(&str, &str)],
        mut headers: HashMap<String, String>,
        payload: Option<&B>,
        correlation_id: &str,
    ) -> std::result::Result<(T::Client, RequestContext), TransportError>
    where
        B: Serialize + ?Sized,
    {
        let url = if params.is_empty() {
            Url::parse(url)
        } else {
            Url::parse_with_params(url, params)
        }
        .map_err(|e| TransportError::InvalidUrl(format!("{}: {}", url, e)))?;

        let host = url
            .host_str()
            .ok_or_else(|| TransportError::InvalidUrl(format!("{}: missing host", url)))?;

        let route = self.resolver.resolve(host);
        tracing::debug!(
            host = %host,
            verify_host = route.verify_host,
            trust = ?route.trust_material.as_ref().map(|m| &m.pattern),
            proxy = ?route.proxy.as_ref().map(|p| p.url()),
            "Resolved trust route"
        );
        let client = self.transport.configure(&route)?;

        let body = match payload {
            Some(payload) => {
                let bytes = serde_json::to_vec(payload)
                    .map_err(|e| TransportError::Other(format!("Unserializable body: {}", e)))?;
                if !headers
                    .keys()
                    .any(|name| name.eq_ignore_ascii_case("content-type"))
                {
                    headers.insert("Content-Type".to_string(), "application/json".to_string());
                }
                Some(Bytes::from(bytes))
            }
            None => None,
        };

        if tracing::enabled!(Level::TRACE) {
            let masked = self.masker.mask(payload);
            tracing::trace!(
                method = %method,
                url = %url,
                headers = ?self.masked_headers(&headers),
                body = masked.masked_value().unwrap_or(""),
                pii_level = %masked.highest_level(),
                "Outbound request"
            );
        }

        let request = RequestContext {
            method,
            url,
            headers,
            body,
            correlation_id: correlation_id.to_string(),
            attempt_count: 0,
        };
        Ok((client, request))
    }

    /// SENDING / RETRYING: at most `max_retries + 1` sends, each bounded by the
    /// configured timeout. Only transport failures are retried.
    async fn send_with_retry(
        &self,
        client: &T::Client,
        mut request: RequestContext,
    ) -> std::result::Result<
        (RequestContext, TransportResponse),
        (RequestContext, TransportError),
    > {
        let max_attempts = self.config.client.max_attempts();
        let timeout = self.config.client.timeout();

        loop {
            request.attempt_count += 1;
            tracing::debug!(
                attempt = request.attempt_count,
                method = %request.method,
                url = %request.url,
                "Sending request"
            );

            let result = match tokio::time::timeout(timeout, self.transport.send(client, &request))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(TransportError::Timeout(format!(
                    "no response within {}ms",
                    timeout.as_millis()
                ))),
            };

            match result {
                Ok(response) => return Ok((request, response)),
                Err(e) if e.is_retryable() && request.attempt_count < max_attempts => {
                    tracing::warn!(
                        attempt = request.attempt_count,
                        max_attempts,
                        "Retrying after transport failure: {}",
                        e
                    );
                    let backoff = self.config.client.retry_backoff();
                    if !backoff.is_zero() {
                        tokio::time::sleep(backoff).await;
                    }
                }
                Err(e) => return Err((request, e)),
            }
        }
    }

    /// COMPLETED: deserialize, mask, audit and wrap.
    fn complete<R>(
        &self,
        request: &RequestContext,
        audit_url: &str,
        response: TransportResponse,
    ) -> HttpResponse<R>
    where
        R: DeserializeOwned + Serialize,
    {
        let body: Option<R> = if response.body.is_empty() {
            None
        } else {
            match serde_json::from_slice(&response.body) {
                Ok(body) => Some(body),
                Err(e) => {
                    tracing::debug!(
                        status = response.status,
                        "Response body not deserializable: {}",
                        e
                    );
                    None
                }
            }
        };

        let masking = self.masker.mask(body.as_ref());

        if tracing::enabled!(Level::TRACE) {
            tracing::trace!(
                status = response.status,
                attempts = request.attempt_count,
                headers = ?self.masked_headers(&response.headers),
                body = masking.masked_value().unwrap_or(""),
                pii_level = %masking.highest_level(),
                "Inbound response"
            );
        }

        let audited = self.audit.publish_if_required(
            HTTP_CLIENT_CALL,
            request.method.as_str(),
            audit_url,
            response.status,
            &request.correlation_id,
            masking.highest_level(),
        );
        tracing::debug!(
            status = response.status,
            attempts = request.attempt_count,
            pii_level = %masking.highest_level(),
            audit_events = audited,
            "Request completed"
        );

        HttpResponse::from_parts(
            response.status,
            response.headers,
            body,
            request.correlation_id.clone(),
        )
    }

    fn masked_headers(&self, headers: &HashMap<String, String>) -> impl std::fmt::Debug {
        mask_headers(
            headers,
            &self.classifier,
            &self.detector,
            self.masker.mask_token(),
        )
    }
}

/// Builder for [`HttpExecutor`]
pub struct HttpExecutorBuilder<T: Transport = ReqwestTransport> {
    config: SafeHttpConfig,
    sink: Option<Arc<dyn AuditSink>>,
    transport: T,
}

impl HttpExecutorBuilder<ReqwestTransport> {
    /// Create a new builder with default config and transport
    pub fn new() -> Self {
        Self {
            config: SafeHttpConfig::default(),
            sink: None,
            transport: ReqwestTransport::new(),
        }
    }
}

impl Default for HttpExecutorBuilder<ReqwestTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> HttpExecutorBuilder<T> {
    /// Set the configuration
    pub fn config(mut self, config: SafeHttpConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the audit sink (defaults to [`TracingAuditSink`])
    pub fn sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Swap the transport
    pub fn transport<U: Transport>(self, transport: U) -> HttpExecutorBuilder<U> {
        HttpExecutorBuilder {
            config: self.config,
            sink: self.sink,
            transport,
        }
    }

    /// Validate the configuration, compile rules and build the executor
    pub fn build(self) -> Result<HttpExecutor<T>> {
        self.config.validate()?;

        let detector = Arc::new(RegexPiiDetector::new(&self.config.pii.content_rules)?);
        let classifier = Arc::new(PiiClassifier::from_config(&self.config.pii));
        let masker = JsonBodyMasker::new(
            classifier.clone(),
            detector.clone(),
            self.config.pii.mask.clone(),
        );
        let sink = self
            .sink
            .unwrap_or_else(|| Arc::new(TracingAuditSink) as Arc<dyn AuditSink>);
        let audit = AuditPublisher::new(sink, self.config.audit.clone());
        let resolver = TlsRouteResolver::new(&self.config.tls, &self.config.client);
        let correlation = CorrelationIdManager::new(self.config.correlation_id.header.clone());

        tracing::debug!(
            timeout_ms = self.config.client.timeout_ms,
            max_retries = self.config.client.max_retries,
            content_rules = detector.rules().len(),
            audit = self.config.audit.enabled,
            "HTTP executor ready"
        );

        Ok(HttpExecutor {
            config: Arc::new(self.config),
            transport: self.transport,
            resolver,
            correlation,
            classifier,
            detector,
            masker,
            audit,
        })
    }
}
