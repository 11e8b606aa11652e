//! Client configuration.
//!
//! # Design
//! One configuration shape covers every way of building a client: a base URL,
//! the three content-negotiation headers, an optional authorization header and
//! a map of extra headers. `RestClient` takes the config by value, so it can't
//! change after construction.
//!
//! Blank `user_agent`, `content_type` and `accept_type` values are allowed and
//! fall back to the defaults when headers are built, so a config deserialized
//! from a sparse JSON document behaves the same as one built in code.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RestError, Result};

pub const DEFAULT_USER_AGENT: &str = "rest-core";
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";
pub const DEFAULT_ACCEPT_TYPE: &str = "application/json";

/// `Authorization` header split into scheme and credentials.
///
/// Only attached when both parts are non-blank.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationHeader {
    pub scheme: String,
    pub value: String,
}

impl AuthorizationHeader {
    pub fn new(scheme: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            value: value.into(),
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self::new("Bearer", token)
    }

    /// Header value (`"{scheme} {value}"`), or `None` if either part is blank.
    pub fn header_value(&self) -> Option<String> {
        let scheme = self.scheme.trim();
        let value = self.value.trim();
        if scheme.is_empty() || value.is_empty() {
            return None;
        }
        Some(format!("{scheme} {value}"))
    }
}

impl fmt::Debug for AuthorizationHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationHeader")
            .field("scheme", &self.scheme)
            .field("value", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default = "default_accept_type")]
    pub accept_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<AuthorizationHeader>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_headers: BTreeMap<String, String>,
    /// Whole-request timeout in milliseconds applied by `ReqwestTransport`.
    /// Zero means no timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_content_type() -> String {
    DEFAULT_CONTENT_TYPE.to_string()
}

fn default_accept_type() -> String {
    DEFAULT_ACCEPT_TYPE.to_string()
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            user_agent: default_user_agent(),
            content_type: default_content_type(),
            accept_type: default_accept_type(),
            authorization: None,
            custom_headers: BTreeMap::new(),
            timeout_ms: None,
        }
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn accept_type(mut self, accept_type: impl Into<String>) -> Self {
        self.accept_type = accept_type.into();
        self
    }

    pub fn authorization(mut self, header: AuthorizationHeader) -> Self {
        self.authorization = Some(header);
        self
    }

    pub fn bearer(self, token: impl Into<String>) -> Self {
        self.authorization(AuthorizationHeader::bearer(token))
    }

    /// Add a custom header. Names compare case-insensitively, so setting the
    /// same name twice keeps the last value whatever its spelling.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.custom_headers
            .retain(|existing, _| !existing.trim().eq_ignore_ascii_case(name.trim()));
        self.custom_headers.insert(name, value.into());
        self
    }

    /// Sub-millisecond parts are rounded down; a zero timeout disables it.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout_ms.filter(|ms| *ms > 0).map(Duration::from_millis)
    }

    /// Reject configurations that can never produce a request.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(RestError::ConfigError("base_url is required".to_string()));
        }
        Ok(())
    }

    pub(crate) fn effective_user_agent(&self) -> &str {
        non_blank_or(&self.user_agent, DEFAULT_USER_AGENT)
    }

    pub(crate) fn effective_content_type(&self) -> &str {
        non_blank_or(&self.content_type, DEFAULT_CONTENT_TYPE)
    }

    pub(crate) fn effective_accept_type(&self) -> &str {
        non_blank_or(&self.accept_type, DEFAULT_ACCEPT_TYPE)
    }
}

fn non_blank_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback
    } else {
        trimmed
    }
}
