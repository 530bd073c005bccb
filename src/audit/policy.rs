//! Audit decision policy
//!
//! Maps a PII level to the compliance categories that must be notified and
//! the severity of the resulting record.

use super::AuditSeverity;
use crate::privacy::PiiLevel;

/// Pure level → audit decision functions
#[derive(Debug, Clone, Copy, Default)]
pub struct AuditPolicy;

impl AuditPolicy {
    /// GDPR covers MEDIUM and above (contact data, identifiers)
    pub fn requires_gdpr_audit(&self, level: PiiLevel) -> bool {
        level >= PiiLevel::Medium
    }

    /// PCI covers HIGH and above (credentials, card data)
    pub fn requires_pci_audit(&self, level: PiiLevel) -> bool {
        level >= PiiLevel::High
    }

    pub fn severity(&self, level: PiiLevel) -> AuditSeverity {
        match level {
            PiiLevel::Secret => AuditSeverity::Critical,
            PiiLevel::High => AuditSeverity::Warn,
            PiiLevel::None | PiiLevel::Low | PiiLevel::Medium => AuditSeverity::Info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_gdpr_audit() {
        let policy = AuditPolicy;
        assert!(!policy.requires_gdpr_audit(PiiLevel::None));
        assert!(!policy.requires_gdpr_audit(PiiLevel::Low));
        assert!(policy.requires_gdpr_audit(PiiLevel::Medium));
        assert!(policy.requires_gdpr_audit(PiiLevel::High));
        assert!(policy.requires_gdpr_audit(PiiLevel::Secret));
    }

    #[test]
    fn test_requires_pci_audit() {
        let policy = AuditPolicy;
        assert!(!policy.requires_pci_audit(PiiLevel::None));
        assert!(!policy.requires_pci_audit(PiiLevel::Low));
        assert!(!policy.requires_pci_audit(PiiLevel::Medium));
        assert!(policy.requires_pci_audit(PiiLevel::High));
        assert!(policy.requires_pci_audit(PiiLevel::Secret));
    }

    #[test]
    fn test_severity() {
        let policy = AuditPolicy;
        assert_eq!(policy.severity(PiiLevel::Secret), AuditSeverity::Critical);
        assert_eq!(policy.severity(PiiLevel::High), AuditSeverity::Warn);
        assert_eq!(policy.severity(PiiLevel::Medium), AuditSeverity::Info);
        assert_eq!(policy.severity(PiiLevel::Low), AuditSeverity::Info);
        assert_eq!(policy.severity(PiiLevel::None), AuditSeverity::Info);
    }
}
