//! SafeHttp - Privacy-Aware Outbound HTTP Client
//!
//! SafeHttp sends JSON requests to external services while keeping
//! personally identifiable information out of logs, tagging every call with a
//! correlation id and recording GDPR / PCI audit events when sensitive data
//! crosses the wire.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          HttpExecutor                             │
//! │                                                                   │
//! │  caller ──▶ CorrelationIdManager ──▶ TlsRouteResolver             │
//! │             (task-local + span)      (trust store, verify, proxy) │
//! │                                              │                    │
//! │                                              ▼                    │
//! │                     ┌──────────── Transport (reqwest) ◀──┐        │
//! │                     │        timeout per attempt         │ retry  │
//! │                     ▼                                    │        │
//! │              TransportResponse ─────── failure ──────────┘        │
//! │                     │                                             │
//! │                     ▼                                             │
//! │  ┌──────────────────────────────┐    ┌──────────────────────────┐ │
//! │  │ JsonBodyMasker               │    │ AuditPublisher           │ │
//! │  │  PiiClassifier (names)       │───▶│  AuditPolicy             │ │
//! │  │  RegexPiiDetector (content)  │    │  AuditSink (log/channel) │ │
//! │  └──────────────────────────────┘    └──────────────────────────┘ │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Request and response bytes are never altered. Masked copies exist only
//! for TRACE diagnostics and to compute the PII level that drives auditing.
//!
//! ## Modules
//!
//! - [`client`]: Executor, transport abstraction and correlation ids
//! - [`privacy`]: PII levels, classification, detection and masking
//! - [`tls`]: Per-host trust routing
//! - [`audit`]: Compliance policy, publisher and sinks
//! - [`config`]: Configuration management

pub mod audit;
pub mod client;
pub mod config;
pub mod error;
pub mod privacy;
pub mod tls;

pub use client::{HttpExecutor, HttpExecutorBuilder, HttpMethod, HttpResponse};
pub use config::SafeHttpConfig;
pub use error::{Error, Result};
pub use privacy::PiiLevel;
