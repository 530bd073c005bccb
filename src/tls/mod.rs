//! TLS trust routing
//!
//! Maps a target host to the trust material, verification mode and proxy the
//! transport should use for it.

pub mod route;

pub use route::{ProxyRoute, TlsRouteResolver, TrustMaterial, TrustRoute};
