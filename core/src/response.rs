//! Uniform response wrappers and the parsers that produce them.
//!
//! # Design
//! Every verb returns status metadata whether or not the call succeeded. A
//! non-2xx status is data, not an error: `parse_status` and `parse_typed`
//! only fail when a *successful* body can't be decoded. `parse_string` is the
//! exception and errors on non-success, mirroring how callers use it (they
//! want the body or nothing).

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;

use crate::error::{RestError, Result};
use crate::http::HttpResponse;

/// Status metadata common to every response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestResponse {
    pub status_code: u16,
    /// `true` for 2xx statuses.
    pub is_success: bool,
    pub reason_phrase: String,
    /// Lower-cased header names; repeated headers keep arrival order.
    pub headers: BTreeMap<String, Vec<String>>,
}

impl RestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

/// Status metadata plus an optional decoded payload.
///
/// `data` is `Some` only when the status was 2xx and the body was non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedResponse<T> {
    pub response: RestResponse,
    pub data: Option<T>,
}

impl<T> TypedResponse<T> {
    pub fn is_success(&self) -> bool {
        self.response.is_success
    }

    pub fn status_code(&self) -> u16 {
        self.response.status_code
    }

    pub fn reason_phrase(&self) -> &str {
        &self.response.reason_phrase
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

pub fn parse_status(response: &HttpResponse) -> RestResponse {
    let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in &response.headers {
        headers
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value.clone());
    }
    RestResponse {
        status_code: response.status,
        is_success: (200..300).contains(&response.status),
        reason_phrase: response.reason.clone(),
        headers,
    }
}

pub fn parse_typed<T: DeserializeOwned>(response: HttpResponse) -> Result<TypedResponse<T>> {
    let status = parse_status(&response);
    let data = if status.is_success && !response.body.trim().is_empty() {
        let value = serde_json::from_str(&response.body)
            .map_err(|e| RestError::DeserializationError(e.to_string()))?;
        Some(value)
    } else {
        None
    };
    Ok(TypedResponse {
        response: status,
        data,
    })
}

pub fn parse_string(response: HttpResponse) -> Result<String> {
    if (200..300).contains(&response.status) {
        return Ok(response.body);
    }
    Err(RestError::HttpError {
        status: response.status,
        reason: response.reason,
        body: response.body,
    })
}
