//! Audit event types

use crate::privacy::PiiLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Compliance framework an event is recorded for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditCategory {
    /// GDPR: EU personal data
    Gdpr,
    /// PCI-DSS: payment card data
    Pci,
}

impl std::fmt::Display for AuditCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gdpr => write!(f, "GDPR"),
            Self::Pci => write!(f, "PCI"),
        }
    }
}

/// Severity attached to an audit event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditSeverity {
    Info,
    Warn,
    Critical,
}

impl std::fmt::Display for AuditSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// One compliance record for a completed outbound call.
///
/// Built by the publisher per qualifying category and handed straight to the
/// sink; the crate never stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub timestamp: DateTime<Utc>,
    pub category: AuditCategory,
    pub severity: AuditSeverity,
    pub service_name: String,
    pub operation: String,
    pub correlation_id: String,
    pub http_method: String,
    pub url: String,
    pub http_status: u16,
    pub pii_level: PiiLevel,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}
