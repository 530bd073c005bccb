//! Audit sinks
//!
//! A sink receives finished [`AuditEvent`]s. Publishing is fire-and-forget:
//! a sink must never block the request path or report failure back to it.

use super::AuditEvent;
use tokio::sync::mpsc;

/// Destination for audit events
pub trait AuditSink: Send + Sync {
    /// Hand one event to the sink
    fn publish(&self, event: AuditEvent);
}

/// Writes each event as one structured log line on target `safehttp::audit`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn publish(&self, event: AuditEvent) {
        tracing::info!(
            target: "safehttp::audit",
            category = %event.category,
            severity = %event.severity,
            service = %event.service_name,
            operation = %event.operation,
            method = %event.http_method,
            url = %event.url,
            status = event.http_status,
            pii_level = %event.pii_level,
            cid = %event.correlation_id,
            metadata = ?event.metadata,
            "AUDIT"
        );
    }
}

/// Forwards events to a bounded channel for an out-of-band consumer
/// (database writer, message publisher). Full or closed channels drop the
/// event with a warning.
#[derive(Debug, Clone)]
pub struct ChannelAuditSink {
    tx: mpsc::Sender<AuditEvent>,
}

impl ChannelAuditSink {
    /// Create a sink and the receiver its events arrive on
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<AuditEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl AuditSink for ChannelAuditSink {
    fn publish(&self, event: AuditEvent) {
        if let Err(e) = self.tx.try_send(event) {
            let (reason, event) = match e {
                mpsc::error::TrySendError::Full(event) => ("channel full", event),
                mpsc::error::TrySendError::Closed(event) => ("channel closed", event),
            };
            tracing::warn!(
                category = %event.category,
                cid = %event.correlation_id,
                "Dropping audit event: {}",
                reason
            );
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Keeps every published event for assertions
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        events: Mutex<Vec<AuditEvent>>,
    }

    impl RecordingSink {
        pub fn events(&self) -> Vec<AuditEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl AuditSink for RecordingSink {
        fn publish(&self, event: AuditEvent) {
            self.events.lock().unwrap().push(event);
        }
    }
}
