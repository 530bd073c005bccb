//! Outbound request types

use bytes::Bytes;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// HTTP verbs the executor exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            other => Err(crate::Error::Config(format!(
                "Unsupported HTTP method: {}",
                other
            ))),
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One prepared outbound call, shared by every attempt
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: HttpMethod,
    /// Target including query parameters
    pub url: Url,
    /// Outgoing headers, correlation header included
    pub headers: HashMap<String, String>,
    /// Serialized JSON body, sent unmasked
    pub body: Option<Bytes>,
    pub correlation_id: String,
    /// Sends made so far
    pub attempt_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_display_and_parse() {
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!(" Delete ".parse::<HttpMethod>().unwrap(), HttpMethod::Delete);
        assert!("TRACE".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_method_into_reqwest() {
        let method: reqwest::Method = HttpMethod::Put.into();
        assert_eq!(method, reqwest::Method::PUT);
    }
}
