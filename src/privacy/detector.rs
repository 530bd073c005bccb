//! Regex-based PII content detection
//!
//! Scans raw string values for shapes that are sensitive regardless of the
//! field they appear in (card numbers, national ids). Rules are evaluated in
//! a fixed priority order and the first match decides the level.

use super::PiiLevel;
use crate::config::ContentRuleConfig;
use crate::error::{Error, Result};
use regex::Regex;

/// Visa, MasterCard, Amex and Discover PAN shapes
const CREDIT_CARD_PATTERN: &str = concat!(
    r"\b(?:4[0-9]{12}(?:[0-9]{3})?",
    r"|5[1-5][0-9]{14}",
    r"|3[47][0-9]{13}",
    r"|6(?:011|5[0-9]{2})[0-9]{12})\b",
);

/// US Social Security Number
const SSN_PATTERN: &str = r"\b\d{3}-\d{2}-\d{4}\b";

/// Kind of data a content rule detects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegexPiiType {
    /// Payment card number
    CreditCard,
    /// National id (US SSN)
    Ssn,
    /// User-configured rule
    Custom,
}

/// A compiled content rule
#[derive(Debug, Clone)]
pub struct RegexPiiRule {
    pub rule_type: RegexPiiType,
    pub name: String,
    pub pattern: Regex,
    pub level: PiiLevel,
}

impl RegexPiiRule {
    fn compile(rule_type: RegexPiiType, name: &str, pattern: &str, level: PiiLevel) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| {
            Error::Privacy(format!("Invalid regex pattern for rule '{}': {}", name, e))
        })?;
        Ok(Self {
            rule_type,
            name: name.to_string(),
            pattern,
            level,
        })
    }
}

/// Ordered content rule set
#[derive(Debug, Clone)]
pub struct RegexPiiDetector {
    rules: Vec<RegexPiiRule>,
}

impl RegexPiiDetector {
    /// Built-in card and SSN rules followed by `extra` in the given order
    pub fn new(extra: &[ContentRuleConfig]) -> Result<Self> {
        let mut rules = vec![
            RegexPiiRule::compile(
                RegexPiiType::CreditCard,
                "credit_card",
                CREDIT_CARD_PATTERN,
                PiiLevel::Secret,
            )?,
            RegexPiiRule::compile(RegexPiiType::Ssn, "ssn", SSN_PATTERN, PiiLevel::Secret)?,
        ];

        for rule in extra {
            rules.push(RegexPiiRule::compile(
                RegexPiiType::Custom,
                &rule.name,
                &rule.pattern,
                rule.level,
            )?);
        }

        Ok(Self { rules })
    }

    /// Level of the first rule that matches `value`, or NONE.
    ///
    /// Rules are not combined: a later, more sensitive rule never overrides
    /// an earlier match.
    pub fn detect(&self, value: &str) -> PiiLevel {
        if value.trim().is_empty() {
            return PiiLevel::None;
        }

        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(value))
            .map(|rule| rule.level)
            .unwrap_or(PiiLevel::None)
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &[RegexPiiRule] {
        &self.rules
    }
}
