//! SafeHttp configuration management
//!
//! One immutable [`SafeHttpConfig`] is loaded at startup and shared by every
//! component through `Arc`. All sections carry defaults so a partial TOML
//! file is enough.

use crate::error::{Error, Result};
use crate::privacy::PiiLevel;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main SafeHttp configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SafeHttpConfig {
    /// Outbound client behaviour (timeouts, retries, proxy)
    pub client: ClientConfig,

    /// TLS trust routing
    pub tls: TlsConfig,

    /// PII classification and masking
    pub pii: PiiConfig,

    /// Compliance audit flags
    pub audit: AuditConfig,

    /// Correlation id propagation
    pub correlation_id: CorrelationIdConfig,
}

impl SafeHttpConfig {
    /// Load configuration from a TOML file and validate it
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no component can work with
    pub fn validate(&self) -> Result<()> {
        if self.client.timeout_ms == 0 {
            return Err(Error::Config("client.timeout_ms must be > 0".to_string()));
        }
        if self.pii.mask.is_empty() {
            return Err(Error::Config("pii.mask must not be empty".to_string()));
        }
        if self.correlation_id.header.trim().is_empty() {
            return Err(Error::Config(
                "correlation_id.header must not be empty".to_string(),
            ));
        }
        for pattern in self.tls.trust_stores.keys() {
            if pattern.contains('*') {
                let valid = pattern
                    .strip_prefix("*.")
                    .map(|suffix| !suffix.is_empty() && !suffix.contains('*'))
                    .unwrap_or(false);
                if !valid {
                    return Err(Error::Config(format!(
                        "Invalid trust store pattern '{}': wildcards must look like '*.example.com'",
                        pattern
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Outbound client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Per-attempt timeout in milliseconds
    pub timeout_ms: u64,

    /// Retries after the first attempt on transport failure
    pub max_retries: u32,

    /// Fixed wait between attempts in milliseconds
    pub retry_backoff_ms: u64,

    /// Proxy host (proxy is disabled when unset or empty)
    pub proxy_host: Option<String>,

    /// Proxy port
    pub proxy_port: u16,

    /// Target hosts that go through the proxy
    pub proxy_domains: BTreeSet<String>,
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Total number of sends a call may make
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            max_retries: 3,
            retry_backoff_ms: 100,
            proxy_host: None,
            proxy_port: 8080,
            proxy_domains: BTreeSet::new(),
        }
    }
}

/// TLS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Hosts that skip certificate verification (development only)
    pub insecure_domains: BTreeSet<String>,

    /// Trust material per host. Keys are exact hosts or `*.suffix` patterns.
    pub trust_stores: BTreeMap<String, TrustStoreConfig>,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            insecure_domains: ["localhost", "127.0.0.1"]
                .into_iter()
                .map(String::from)
                .collect(),
            trust_stores: BTreeMap::new(),
        }
    }
}

/// Trust material reference for one host pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustStoreConfig {
    /// Path to a PEM bundle of CA certificates
    pub path: PathBuf,
}

/// PII classification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PiiConfig {
    /// Header name → level
    pub headers: HashMap<String, PiiLevel>,

    /// JSON field name → level
    pub json: HashMap<String, PiiLevel>,

    /// Replacement for redacted values
    pub mask: String,

    /// Content rules evaluated after the built-in card/SSN rules
    pub content_rules: Vec<ContentRuleConfig>,
}

impl Default for PiiConfig {
    fn default() -> Self {
        Self {
            headers: default_header_rules(),
            json: default_json_rules(),
            mask: "***".to_string(),
            content_rules: Vec::new(),
        }
    }
}

/// User-defined regex content rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRuleConfig {
    /// Rule name (shown in diagnostics)
    pub name: String,

    /// Regex pattern
    pub pattern: String,

    /// Level reported on match
    pub level: PiiLevel,
}

/// Default header classification table
pub fn default_header_rules() -> HashMap<String, PiiLevel> {
    [
        ("authorization", PiiLevel::Secret),
        ("proxy-authorization", PiiLevel::Secret),
        ("cookie", PiiLevel::Secret),
        ("set-cookie", PiiLevel::Secret),
        ("x-api-key", PiiLevel::High),
        ("x-auth-token", PiiLevel::High),
        ("x-correlation-id", PiiLevel::Low),
    ]
    .into_iter()
    .map(|(name, level)| (name.to_string(), level))
    .collect()
}

/// Default JSON field classification table
pub fn default_json_rules() -> HashMap<String, PiiLevel> {
    [
        ("password", PiiLevel::Secret),
        ("secret", PiiLevel::Secret),
        ("cardNumber", PiiLevel::Secret),
        ("cvv", PiiLevel::Secret),
        ("token", PiiLevel::High),
        ("accessToken", PiiLevel::High),
        ("apiKey", PiiLevel::High),
        ("email", PiiLevel::Medium),
        ("phone", PiiLevel::Medium),
        ("requestId", PiiLevel::Low),
    ]
    .into_iter()
    .map(|(name, level)| (name.to_string(), level))
    .collect()
}

/// Audit configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Global audit switch
    pub enabled: bool,

    /// Emit GDPR events
    pub gdpr_enabled: bool,

    /// Emit PCI events
    pub pci_enabled: bool,

    /// Service name stamped on every event
    pub service_name: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            gdpr_enabled: false,
            pci_enabled: false,
            service_name: "unknown-service".to_string(),
        }
    }
}

/// Correlation id configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationIdConfig {
    /// Header carrying the correlation id
    pub header: String,
}

impl Default for CorrelationIdConfig {
    fn default() -> Self {
        Self {
            header: "X-Correlation-Id".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = SafeHttpConfig::default();
        assert_eq!(config.client.timeout_ms, 5000);
        assert_eq!(config.client.max_retries, 3);
        assert_eq!(config.client.max_attempts(), 4);
        assert_eq!(config.pii.mask, "***");
        assert!(!config.audit.enabled);
        assert_eq!(config.audit.service_name, "unknown-service");
        assert_eq!(config.correlation_id.header, "X-Correlation-Id");
        assert!(config.tls.insecure_domains.contains("localhost"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: SafeHttpConfig = toml::from_str(
            r#"
            [client]
            max_retries = 1

            [audit]
            enabled = true
            pci_enabled = true
            service_name = "payments"

            [pii.json]
            iban = "high"
            "#,
        )
        .unwrap();

        assert_eq!(config.client.max_retries, 1);
        assert_eq!(config.client.timeout_ms, 5000);
        assert!(config.audit.enabled);
        assert!(!config.audit.gdpr_enabled);
        assert_eq!(config.audit.service_name, "payments");
        assert_eq!(config.pii.json.get("iban"), Some(&PiiLevel::High));
        assert_eq!(config.pii.mask, "***");
    }

    #[test]
    fn test_trust_stores_and_proxy() {
        let config: SafeHttpConfig = toml::from_str(
            r#"
            [client]
            proxy_host = "proxy.company.com"
            proxy_port = 3128
            proxy_domains = ["api.partner.com"]

            [tls.trust_stores."*.example.com"]
            path = "certs/example.pem"

            [tls.trust_stores."api.example.com"]
            path = "certs/api.pem"
            "#,
        )
        .unwrap();

        assert_eq!(config.client.proxy_port, 3128);
        assert!(config.client.proxy_domains.contains("api.partner.com"));
        assert_eq!(config.tls.trust_stores.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = SafeHttpConfig::default();
        config.client.timeout_ms = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = SafeHttpConfig::default();
        config.pii.mask.clear();
        assert!(config.validate().is_err());

        let mut config = SafeHttpConfig::default();
        config.correlation_id.header = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = SafeHttpConfig::default();
        config.tls.trust_stores.insert(
            "api.*.com".to_string(),
            TrustStoreConfig {
                path: PathBuf::from("x.pem"),
            },
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[correlation_id]\nheader = \"X-Request-Id\"\n\n[pii]\nmask = \"[REDACTED]\""
        )
        .unwrap();

        let config = SafeHttpConfig::load(file.path()).unwrap();
        assert_eq!(config.correlation_id.header, "X-Request-Id");
        assert_eq!(config.pii.mask, "[REDACTED]");
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[client]\ntimeout_ms = 0").unwrap();
        assert!(matches!(
            SafeHttpConfig::load(file.path()),
            Err(Error::Config(_))
        ));

        assert!(matches!(
            SafeHttpConfig::load("/nonexistent/safehttp.toml"),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_config_roundtrip_toml() {
        let config = SafeHttpConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: SafeHttpConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.pii.json.len(), config.pii.json.len());
        assert_eq!(parsed.client.retry_backoff_ms, 100);
    }
}
