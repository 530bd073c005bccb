//! Compliance audit
//!
//! Turns the highest PII level seen on a call into GDPR / PCI audit records:
//!
//! ```text
//! PiiLevel ─▶ AuditPolicy ─▶ AuditPublisher (feature flags) ─▶ AuditSink
//!              GDPR ≥ MEDIUM          0, 1 or 2 events         log line / channel
//!              PCI  ≥ HIGH
//! ```

pub mod event;
pub mod policy;
pub mod publisher;
pub mod sink;

pub use event::{AuditCategory, AuditEvent, AuditSeverity};
pub use policy::AuditPolicy;
pub use publisher::AuditPublisher;
pub use sink::{AuditSink, ChannelAuditSink, TracingAuditSink};
