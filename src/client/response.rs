//! Response envelope

use serde::Serialize;
use std::collections::HashMap;

/// Result of one executor call.
///
/// `status_code == 0` means no HTTP response was ever received.
#[derive(Debug, Clone, Serialize)]
pub struct HttpResponse<T> {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    /// Deserialized body, unmasked. `None` when empty or not of type `T`.
    pub body: Option<T>,
    pub success: bool,
    pub correlation_id: String,
}

impl<T> HttpResponse<T> {
    /// Envelope for a received HTTP response
    pub fn from_parts(
        status_code: u16,
        headers: HashMap<String, String>,
        body: Option<T>,
        correlation_id: impl Into<String>,
    ) -> Self {
        Self {
            status_code,
            headers,
            body,
            success: status_code < 400,
            correlation_id: correlation_id.into(),
        }
    }

    /// Envelope for a call that never got a response
    pub fn transport_failure(correlation_id: impl Into<String>) -> Self {
        Self {
            status_code: 0,
            headers: HashMap::new(),
            body: None,
            success: false,
            correlation_id: correlation_id.into(),
        }
    }

    pub fn is_transport_failure(&self) -> bool {
        self.status_code == 0
    }
}
