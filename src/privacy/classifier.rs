//! Name-based PII classifier for headers and JSON fields

use super::PiiLevel;
use crate::config::PiiConfig;
use std::collections::HashMap;

/// Resolves the sensitivity of header names and JSON field names against the
/// configured tables. Lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct PiiClassifier {
    headers: HashMap<String, PiiLevel>,
    fields: HashMap<String, PiiLevel>,
}

impl PiiClassifier {
    /// Create a classifier from explicit name tables
    pub fn new(headers: &HashMap<String, PiiLevel>, fields: &HashMap<String, PiiLevel>) -> Self {
        Self {
            headers: normalize(headers),
            fields: normalize(fields),
        }
    }

    /// Create a classifier from the `pii` config section
    pub fn from_config(config: &PiiConfig) -> Self {
        Self::new(&config.headers, &config.json)
    }

    /// Classify an HTTP header name
    pub fn classify_header(&self, name: &str) -> PiiLevel {
        resolve(&self.headers, name)
    }

    /// Classify a JSON field name
    pub fn classify_field(&self, path: &str) -> PiiLevel {
        resolve(&self.fields, path)
    }
}

fn resolve(table: &HashMap<String, PiiLevel>, key: &str) -> PiiLevel {
    table
        .get(&key.to_lowercase())
        .copied()
        .unwrap_or(PiiLevel::None)
}

/// Lower-case all keys. Keys that collide keep the more sensitive level.
fn normalize(rules: &HashMap<String, PiiLevel>) -> HashMap<String, PiiLevel> {
    let mut out: HashMap<String, PiiLevel> = HashMap::with_capacity(rules.len());
    for (name, level) in rules {
        let entry = out.entry(name.to_lowercase()).or_insert(*level);
        *entry = (*entry).max(*level);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, PiiLevel)]) -> HashMap<String, PiiLevel> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }

    fn create_test_classifier() -> PiiClassifier {
        PiiClassifier::new(
            &table(&[
                ("Authorization", PiiLevel::Secret),
                ("x-api-key", PiiLevel::High),
            ]),
            &table(&[
                ("password", PiiLevel::Secret),
                ("email", PiiLevel::Medium),
                ("requestId", PiiLevel::Low),
            ]),
        )
    }

    #[test]
    fn test_classify_header_case_insensitive() {
        let classifier = create_test_classifier();
        assert_eq!(classifier.classify_header("authorization"), PiiLevel::Secret);
        assert_eq!(classifier.classify_header("AUTHORIZATION"), PiiLevel::Secret);
        assert_eq!(classifier.classify_header("X-Api-Key"), PiiLevel::High);
        assert_eq!(classifier.classify_header("Accept"), PiiLevel::None);
    }

    #[test]
    fn test_classify_field_case_insensitive() {
        let classifier = create_test_classifier();
        assert_eq!(
            classifier.classify_field("Password"),
            classifier.classify_field("password")
        );
        assert_eq!(classifier.classify_field("PASSWORD"), PiiLevel::Secret);
        assert_eq!(classifier.classify_field("requestid"), PiiLevel::Low);
        assert_eq!(classifier.classify_field("EMAIL"), PiiLevel::Medium);
    }

    #[test]
    fn test_unknown_names() {
        let classifier = create_test_classifier();
        assert_eq!(classifier.classify_field("name"), PiiLevel::None);
        assert_eq!(classifier.classify_field(""), PiiLevel::None);
        // Header and field tables are separate
        assert_eq!(classifier.classify_field("authorization"), PiiLevel::None);
        assert_eq!(classifier.classify_header("password"), PiiLevel::None);
    }

    #[test]
    fn test_colliding_keys_keep_highest() {
        let classifier = PiiClassifier::new(
            &HashMap::new(),
            &table(&[("Token", PiiLevel::Low), ("token", PiiLevel::High)]),
        );
        assert_eq!(classifier.classify_field("TOKEN"), PiiLevel::High);
    }

    #[test]
    fn test_from_default_config() {
        let classifier = PiiClassifier::from_config(&PiiConfig::default());
        assert_eq!(classifier.classify_header("Cookie"), PiiLevel::Secret);
        assert_eq!(classifier.classify_field("cardnumber"), PiiLevel::Secret);
        assert_eq!(classifier.classify_field("phone"), PiiLevel::Medium);
    }
}
