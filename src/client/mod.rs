//! Outbound HTTP client
//!
//! [`HttpExecutor`] is the entry point. It composes correlation handling,
//! trust routing, a pluggable [`Transport`], body masking and audit.

pub mod correlation;
pub mod executor;
pub mod request;
pub mod response;
pub mod transport;

pub use correlation::CorrelationIdManager;
pub use executor::{HttpExecutor, HttpExecutorBuilder, HTTP_CLIENT_CALL};
pub use request::{HttpMethod, RequestContext};
pub use response::HttpResponse;
pub use transport::{ReqwestTransport, Transport, TransportError, TransportResponse};
