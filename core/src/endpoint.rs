//! Stateless HTTP request builder.
//!
//! # Design
//! `Endpoint` holds only the base URL and the default header set, both fixed
//! at construction. It turns a route (plus an optional body) into an
//! `HttpRequest` without touching the network, so the request side of the
//! client can be tested and reused with any transport.

use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::{RestError, Result};
use crate::headers::DefaultHeaders;
use crate::http::{HttpMethod, HttpRequest};

#[derive(Debug, Clone)]
pub struct Endpoint {
    base_url: String,
    headers: DefaultHeaders,
}

impl Endpoint {
    /// Validate `config` and build the default headers once.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            headers: DefaultHeaders::from_config(config)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn headers(&self) -> &DefaultHeaders {
        &self.headers
    }

    /// Absolute URL for `route`. Absolute routes are used as-is.
    pub fn url(&self, route: &str) -> String {
        let route = route.trim();
        if route.starts_with("http://") || route.starts_with("https://") {
            return route.to_string();
        }
        let route = route.trim_start_matches('/');
        if route.is_empty() {
            return self.base_url.clone();
        }
        format!("{}/{route}", self.base_url)
    }

    /// Request without a body.
    pub fn build(&self, method: HttpMethod, route: &str) -> HttpRequest {
        HttpRequest {
            method,
            url: self.url(route),
            headers: self.headers.to_vec(),
            body: None,
        }
    }

    /// Request with `body` serialized as JSON.
    pub fn build_json<B>(&self, method: HttpMethod, route: &str, body: &B) -> Result<HttpRequest>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_string(body).map_err(|e| RestError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            body: Some(body),
            ..self.build(method, route)
        })
    }
}
