//! Correlation id propagation
//!
//! Each call runs inside a task-local scope holding its correlation id, and a
//! `http_call` tracing span carrying the same id, so every log line emitted on
//! the call path is tagged with it.

use std::collections::HashMap;
use std::future::Future;
use tracing::Instrument;
use uuid::Uuid;

tokio::task_local! {
    static CORRELATION_ID: String;
}

/// Resolves, propagates and scopes correlation ids
#[derive(Debug, Clone)]
pub struct CorrelationIdManager {
    header: String,
}

impl CorrelationIdManager {
    /// Create a new manager for the given header name
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }

    pub fn header_name(&self) -> &str {
        &self.header
    }

    /// Incoming value if non-blank, else the id of the enclosing call scope,
    /// else a fresh UUID v4.
    pub fn get_or_create(&self, incoming: Option<&str>) -> String {
        incoming
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .or_else(Self::current)
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }

    /// Id bound to the current task, if any
    pub fn current() -> Option<String> {
        CORRELATION_ID.try_with(|id| id.clone()).ok()
    }

    /// Look up the correlation header in `headers`, ignoring case
    pub fn find_in<'a>(&self, headers: &'a HashMap<String, String>) -> Option<&'a str> {
        headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&self.header))
            .map(|(_, value)| value.as_str())
    }

    /// Write `id` under the configured header name, dropping copies that only
    /// differ in case
    pub fn apply(&self, headers: &mut HashMap<String, String>, id: &str) {
        headers.retain(|name, _| !name.eq_ignore_ascii_case(&self.header));
        headers.insert(self.header.clone(), id.to_string());
    }

    /// Run `fut` with `id` as the current correlation id
    pub async fn scope<F>(id: String, fut: F) -> F::Output
    where
        F: Future,
    {
        let span = tracing::info_span!("http_call", correlation_id = %id);
        CORRELATION_ID.scope(id, fut.instrument(span)).await
    }
}

impl Default for CorrelationIdManager {
    fn default() -> Self {
        Self::new("X-Correlation-Id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incoming_wins() {
        let manager = CorrelationIdManager::default();
        assert_eq!(manager.get_or_create(Some(" abc-123 ")), "abc-123");
    }

    #[test]
    fn test_blank_incoming_generates_uuid() {
        let manager = CorrelationIdManager::default();
        let id = manager.get_or_create(Some("   "));
        assert!(Uuid::parse_str(&id).is_ok());

        let id = manager.get_or_create(None);
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let manager = CorrelationIdManager::default();
        assert_ne!(manager.get_or_create(None), manager.get_or_create(None));
    }

    #[test]
    fn test_scope_binds_current() {
        assert!(CorrelationIdManager::current().is_none());

        let manager = CorrelationIdManager::default();
        let inherited = tokio_test::block_on(CorrelationIdManager::scope(
            "outer-id".to_string(),
            async { manager.get_or_create(None) },
        ));
        assert_eq!(inherited, "outer-id");

        assert!(CorrelationIdManager::current().is_none());
    }

    #[tokio::test]
    async fn test_scope_incoming_overrides_current() {
        let manager = CorrelationIdManager::default();
        let id = CorrelationIdManager::scope("outer-id".to_string(), async {
            manager.get_or_create(Some("explicit"))
        })
        .await;
        assert_eq!(id, "explicit");
    }

    #[test]
    fn test_find_and_apply_header() {
        let manager = CorrelationIdManager::default();
        let mut headers = HashMap::new();
        headers.insert("x-correlation-id".to_string(), "from-caller".to_string());
        headers.insert("Accept".to_string(), "application/json".to_string());

        assert_eq!(manager.find_in(&headers), Some("from-caller"));

        manager.apply(&mut headers, "from-caller");
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("X-Correlation-Id").unwrap(), "from-caller");
        assert!(!headers.contains_key("x-correlation-id"));
    }

    #[test]
    fn test_custom_header_name() {
        let manager = CorrelationIdManager::new("X-Request-Id");
        assert_eq!(manager.header_name(), "X-Request-Id");

        let mut headers = HashMap::new();
        manager.apply(&mut headers, "r-1");
        assert_eq!(headers.get("X-Request-Id").unwrap(), "r-1");
    }
}
