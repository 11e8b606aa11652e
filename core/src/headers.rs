//! Default header set attached to every request.
//!
//! Built once from a `ClientConfig` when the client is constructed. Names and
//! values are checked against the HTTP grammar up front so a bad header is a
//! configuration error rather than a failure on the first request.

use reqwest::header::{HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{RestError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultHeaders {
    entries: Vec<(String, String)>,
}

impl DefaultHeaders {
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut headers = Self { entries: Vec::new() };

        headers.set(ACCEPT.as_str(), config.effective_accept_type())?;
        headers.set(USER_AGENT.as_str(), config.effective_user_agent())?;
        headers.set(CONTENT_TYPE.as_str(), config.effective_content_type())?;
        if let Some(value) = config.authorization.as_ref().and_then(|auth| auth.header_value()) {
            headers.set(AUTHORIZATION.as_str(), &value)?;
        }

        let defaults = headers.entries.len();
        for (name, value) in &config.custom_headers {
            let name = name.trim();
            if headers.entries[..defaults].iter().any(|(key, _)| key.eq_ignore_ascii_case(name)) {
                debug!(header = %name, "custom header skipped, already set by client defaults");
                continue;
            }
            headers.set(name, value)?;
        }

        Ok(headers)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn to_vec(&self) -> Vec<(String, String)> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace `name`, keeping the position of an earlier entry.
    fn set(&mut self, name: &str, value: &str) -> Result<()> {
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|e| RestError::ConfigError(format!("invalid header name {name:?}: {e}")))?;
        HeaderValue::from_str(value)
            .map_err(|e| RestError::ConfigError(format!("invalid value for header {name}: {e}")))?;

        let name = name.as_str().to_string();
        match self.entries.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(&name)) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((name, value.to_string())),
        }
        Ok(())
    }
}
