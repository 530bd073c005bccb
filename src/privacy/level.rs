//! PII sensitivity levels

use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// Sensitivity of a piece of data, ordered from least to most sensitive.
///
/// All "more sensitive than" comparisons go through the derived `Ord`, which
/// follows declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PiiLevel {
    /// No sensitive information
    #[default]
    None,
    /// Correlation ids, request ids
    Low,
    /// Email addresses, phone numbers
    Medium,
    /// Tokens, API keys
    High,
    /// Passwords, secrets, card numbers
    Secret,
}

impl PiiLevel {
    /// All levels in ascending order
    pub const ALL: [PiiLevel; 5] = [
        PiiLevel::None,
        PiiLevel::Low,
        PiiLevel::Medium,
        PiiLevel::High,
        PiiLevel::Secret,
    ];

    /// Whether data at this level must be redacted before it is logged
    pub fn requires_masking(self) -> bool {
        self >= PiiLevel::High
    }

    /// Upper-case name, as used in configuration and audit records
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Secret => "SECRET",
        }
    }
}

impl std::fmt::Display for PiiLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PiiLevel {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(Self::None),
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            "SECRET" => Ok(Self::Secret),
            other => Err(crate::Error::Privacy(format!(
                "Unknown PII level '{}'",
                other
            ))),
        }
    }
}

// Case-insensitive, same as `FromStr`.
impl<'de> Deserialize<'de> for PiiLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_order() {
        for (i, a) in PiiLevel::ALL.iter().enumerate() {
            for (j, b) in PiiLevel::ALL.iter().enumerate() {
                assert_eq!(a.cmp(b), i.cmp(&j));
                let expected = if i >= j { *a } else { *b };
                assert_eq!((*a).max(*b), expected);
            }
        }
    }

    #[test]
    fn test_requires_masking() {
        assert!(!PiiLevel::None.requires_masking());
        assert!(!PiiLevel::Low.requires_masking());
        assert!(!PiiLevel::Medium.requires_masking());
        assert!(PiiLevel::High.requires_masking());
        assert!(PiiLevel::Secret.requires_masking());
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("secret".parse::<PiiLevel>().unwrap(), PiiLevel::Secret);
        assert_eq!(" Medium ".parse::<PiiLevel>().unwrap(), PiiLevel::Medium);
        assert!("critical".parse::<PiiLevel>().is_err());
    }

    #[test]
    fn test_serde_upper_case() {
        let json = serde_json::to_string(&PiiLevel::High).unwrap();
        assert_eq!(json, "\"HIGH\"");
        let level: PiiLevel = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(level, PiiLevel::Low);
        assert!(serde_json::from_str::<PiiLevel>("\"extreme\"").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(PiiLevel::Secret.to_string(), "SECRET");
        assert_eq!(PiiLevel::default(), PiiLevel::None);
    }
}
