//! Recursive JSON body masking
//!
//! Walks a JSON tree, redacts every field whose name or string content is
//! classified at or above HIGH, and reports the highest level seen anywhere
//! in the tree, masked or not.
//!
//! ```text
//! {"user": {"email": "a@b.c", "password": "hunter2"}, "cards": [{"pan": "4111111111111111"}]}
//!     ↓
//! {"user": {"email": "a@b.c", "password": "***"}, "cards": [{"pan": "***"}]}   level = SECRET
//! ```

use super::{PiiClassifier, PiiLevel, RegexPiiDetector};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Masked value reported for bodies that are not a JSON object or array
pub const UNPARSEABLE_BODY: &str = "<unparseable-body>";

/// Outcome of one masking pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskingResult {
    masked_value: Option<String>,
    highest_level: PiiLevel,
}

impl MaskingResult {
    fn new(masked_value: Option<String>, highest_level: PiiLevel) -> Self {
        Self {
            masked_value,
            highest_level,
        }
    }

    /// Absent body
    fn empty() -> Self {
        Self::new(None, PiiLevel::None)
    }

    /// Fail-safe for bodies whose shape cannot be inspected
    fn unparseable() -> Self {
        Self::new(Some(UNPARSEABLE_BODY.to_string()), PiiLevel::High)
    }

    /// Serialized masked body, `None` when there was no body
    pub fn masked_value(&self) -> Option<&str> {
        self.masked_value.as_deref()
    }

    /// Highest level observed in the original body
    pub fn highest_level(&self) -> PiiLevel {
        self.highest_level
    }
}

/// Redacts sensitive fields of JSON bodies for logging
#[derive(Debug, Clone)]
pub struct JsonBodyMasker {
    classifier: Arc<PiiClassifier>,
    detector: Arc<RegexPiiDetector>,
    mask: String,
}

impl JsonBodyMasker {
    pub fn new(
        classifier: Arc<PiiClassifier>,
        detector: Arc<RegexPiiDetector>,
        mask: impl Into<String>,
    ) -> Self {
        Self {
            classifier,
            detector,
            mask: mask.into(),
        }
    }

    /// Token written in place of redacted values
    pub fn mask_token(&self) -> &str {
        &self.mask
    }

    /// Mask any serializable body. The caller's value is never modified.
    pub fn mask<T: Serialize + ?Sized>(&self, body: Option<&T>) -> MaskingResult {
        let Some(body) = body else {
            return MaskingResult::empty();
        };

        match serde_json::to_value(body) {
            Ok(value) => self.mask_value(&value),
            Err(_) => MaskingResult::unparseable(),
        }
    }

    /// Mask an already-parsed JSON tree
    pub fn mask_value(&self, value: &Value) -> MaskingResult {
        match value {
            Value::Null => MaskingResult::empty(),
            Value::Object(_) | Value::Array(_) => {
                let mut root = value.clone();
                let highest = self.mask_node(&mut root);
                match serde_json::to_string(&root) {
                    Ok(masked) => MaskingResult::new(Some(masked), highest),
                    Err(_) => MaskingResult::unparseable(),
                }
            }
            _ => MaskingResult::unparseable(),
        }
    }

    fn mask_node(&self, node: &mut Value) -> PiiLevel {
        let mut max = PiiLevel::None;

        match node {
            Value::Object(fields) => {
                for (name, value) in fields.iter_mut() {
                    let field_level = self.classifier.classify_field(name);
                    let content_level = match value {
                        Value::String(text) => self.detector.detect(text),
                        _ => PiiLevel::None,
                    };
                    let effective = field_level.max(content_level);
                    max = max.max(effective);

                    if effective.requires_masking() {
                        // Whole subtree is replaced, never walked
                        *value = Value::String(self.mask.clone());
                    } else {
                        max = max.max(self.mask_node(value));
                    }
                }
            }
            Value::Array(items) => {
                for item in items.iter_mut() {
                    max = max.max(self.mask_node(item));
                }
            }
            _ => {}
        }

        max
    }
}

/// Copy of `headers` with every value at or above HIGH replaced by `mask`.
///
/// A header is sensitive when its name is classified HIGH or when its value
/// matches a content rule at HIGH. Sorted for stable log output.
pub fn mask_headers(
    headers: &HashMap<String, String>,
    classifier: &PiiClassifier,
    detector: &RegexPiiDetector,
    mask: &str,
) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            let level = classifier
                .classify_header(name)
                .max(detector.detect(value));
            let shown = if level.requires_masking() {
                mask.to_string()
            } else {
                value.clone()
            };
            (name.clone(), shown)
        })
        .collect()
}
