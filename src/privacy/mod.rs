//! PII classification and masking
//!
//! Decides how sensitive a piece of data is and redacts it before anything
//! reaches a log line. Includes:
//! - Ordered sensitivity levels (`PiiLevel`)
//! - Name-based classification of headers and JSON fields
//! - Regex content detection (card numbers, SSNs, custom rules)
//! - Recursive JSON body masking with highest-level tracking

pub mod classifier;
pub mod detector;
pub mod level;
pub mod masker;

pub use classifier::PiiClassifier;
pub use detector::{RegexPiiDetector, RegexPiiRule, RegexPiiType};
pub use level::PiiLevel;
pub use masker::{mask_headers, JsonBodyMasker, MaskingResult, UNPARSEABLE_BODY};
