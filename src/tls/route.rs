//! Per-host trust routing
//!
//! Picks trust material, host verification and proxy settings for a target
//! host. Resolution is pure: no file access and no caching.

use crate::config::{ClientConfig, TlsConfig};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Trust material selected for a host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrustMaterial {
    /// Config key that matched (exact host or `*.suffix`)
    pub pattern: String,
    /// PEM bundle location
    pub path: PathBuf,
}

/// Proxy to route a host through
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyRoute {
    pub host: String,
    pub port: u16,
}

impl ProxyRoute {
    /// Proxy URL understood by the HTTP stack
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Outcome of trust resolution for one host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrustRoute {
    /// `None` means platform default roots
    pub trust_material: Option<TrustMaterial>,
    /// `false` only for allow-listed insecure hosts
    pub verify_host: bool,
    pub proxy: Option<ProxyRoute>,
}

impl Default for TrustRoute {
    fn default() -> Self {
        Self {
            trust_material: None,
            verify_host: true,
            proxy: None,
        }
    }
}

#[derive(Debug, Clone)]
enum StorePattern {
    Exact(String),
    /// Stored without the leading `*.`
    Wildcard(String),
}

#[derive(Debug, Clone)]
struct StoreEntry {
    key: String,
    pattern: StorePattern,
    path: PathBuf,
}

/// Resolves [`TrustRoute`]s from TLS and proxy configuration.
///
/// Wildcard trust-store keys match whole labels only: `*.example.com` covers
/// `api.example.com` but not the apex `example.com` (nor `badexample.com`), so
/// a plain `ends_with` on the suffix is deliberately not used. An apex host
/// needs its own exact entry.
#[derive(Debug, Clone)]
pub struct TlsRouteResolver {
    insecure: BTreeSet<String>,
    stores: Vec<StoreEntry>,
    proxy: Option<ProxyRoute>,
    proxy_domains: BTreeSet<String>,
}

impl TlsRouteResolver {
    /// Create a new resolver from configuration
    pub fn new(tls: &TlsConfig, client: &ClientConfig) -> Self {
        let stores = tls
            .trust_stores
            .iter()
            .map(|(key, store)| {
                let lowered = key.trim().to_lowercase();
                let pattern = match lowered.strip_prefix("*.") {
                    Some(suffix) => StorePattern::Wildcard(suffix.to_string()),
                    None => StorePattern::Exact(lowered),
                };
                StoreEntry {
                    key: key.clone(),
                    pattern,
                    path: store.path.clone(),
                }
            })
            .collect();

        let proxy = client
            .proxy_host
            .as_deref()
            .map(str::trim)
            .filter(|host| !host.is_empty())
            .map(|host| ProxyRoute {
                host: host.to_string(),
                port: client.proxy_port,
            });

        Self {
            insecure: lowercase_set(&tls.insecure_domains),
            stores,
            proxy,
            proxy_domains: lowercase_set(&client.proxy_domains),
        }
    }

    /// Resolve the route for `host`
    pub fn resolve(&self, host: &str) -> TrustRoute {
        let host = host.trim().to_lowercase();

        let mut route = if self.insecure.contains(&host) {
            TrustRoute {
                trust_material: None,
                verify_host: false,
                proxy: None,
            }
        } else {
            TrustRoute {
                trust_material: self.find_store(&host),
                verify_host: true,
                proxy: None,
            }
        };

        if self.proxy_domains.contains(&host) {
            route.proxy = self.proxy.clone();
        }

        route
    }

    fn find_store(&self, host: &str) -> Option<TrustMaterial> {
        let exact = self
            .stores
            .iter()
            .find(|entry| matches!(&entry.pattern, StorePattern::Exact(h) if h == host));

        let entry = exact.or_else(|| {
            let mut best: Option<(&StoreEntry, usize)> = None;
            for entry in &self.stores {
                let StorePattern::Wildcard(suffix) = &entry.pattern else {
                    continue;
                };
                if !matches_wildcard(host, suffix) {
                    continue;
                }
                // Strictly longer wins, so equal lengths keep pattern order
                if best.map_or(true, |(_, len)| suffix.len() > len) {
                    best = Some((entry, suffix.len()));
                }
            }
            best.map(|(entry, _)| entry)
        })?;

        Some(TrustMaterial {
            pattern: entry.key.clone(),
            path: entry.path.clone(),
        })
    }
}

/// `*.example.com` covers `api.example.com` and `a.b.example.com`, never
/// `example.com` or `badexample.com`.
fn matches_wildcard(host: &str, suffix: &str) -> bool {
    host.len() > suffix.len() + 1
        && host.ends_with(suffix)
        && host.as_bytes()[host.len() - suffix.len() - 1] == b'.'
}

fn lowercase_set(set: &BTreeSet<String>) -> BTreeSet<String> {
    set.iter().map(|s| s.trim().to_lowercase()).collect()
}
