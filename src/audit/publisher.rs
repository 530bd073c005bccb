//! Audit publisher
//!
//! Applies [`AuditPolicy`] under the configured feature flags and emits zero,
//! one or two events per completed request.

use super::{AuditCategory, AuditEvent, AuditPolicy, AuditSink};
use crate::config::AuditConfig;
use crate::privacy::PiiLevel;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;

/// Decides whether and what to hand to the audit sink
#[derive(Clone)]
pub struct AuditPublisher {
    sink: Arc<dyn AuditSink>,
    policy: AuditPolicy,
    config: AuditConfig,
}

impl AuditPublisher {
    pub fn new(sink: Arc<dyn AuditSink>, config: AuditConfig) -> Self {
        Self {
            sink,
            policy: AuditPolicy,
            config,
        }
    }

    /// Publish GDPR and/or PCI events for one call when required.
    ///
    /// The two checks are independent. Returns the number of events handed to
    /// the sink.
    pub fn publish_if_required(
        &self,
        operation: &str,
        method: &str,
        url: &str,
        status: u16,
        correlation_id: &str,
        pii_level: PiiLevel,
    ) -> usize {
        if !self.config.enabled {
            return 0;
        }

        let mut published = 0;

        if self.config.gdpr_enabled && self.policy.requires_gdpr_audit(pii_level) {
            self.sink.publish(self.build_event(
                AuditCategory::Gdpr,
                operation,
                method,
                url,
                status,
                correlation_id,
                pii_level,
            ));
            published += 1;
        }

        if self.config.pci_enabled && self.policy.requires_pci_audit(pii_level) {
            self.sink.publish(self.build_event(
                AuditCategory::Pci,
                operation,
                method,
                url,
                status,
                correlation_id,
                pii_level,
            ));
            published += 1;
        }

        published
    }

    #[allow(clippy::too_many_arguments)]
    fn build_event(
        &self,
        category: AuditCategory,
        operation: &str,
        method: &str,
        url: &str,
        status: u16,
        correlation_id: &str,
        level: PiiLevel,
    ) -> AuditEvent {
        AuditEvent {
            timestamp: Utc::now(),
            category,
            severity: self.policy.severity(level),
            service_name: self.config.service_name.clone(),
            operation: operation.to_string(),
            correlation_id: correlation_id.to_string(),
            http_method: method.to_string(),
            url: url.to_string(),
            http_status: status,
            pii_level: level,
            metadata: HashMap::new(),
        }
    }
}

impl std::fmt::Debug for AuditPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditPublisher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
