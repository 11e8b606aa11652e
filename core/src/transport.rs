//! Transport adapter: the only place that performs network I/O.
//!
//! `RestClient` is generic over `Transport`, so tests can inject a scripted
//! implementation while production code uses `ReqwestTransport`.

use async_trait::async_trait;
use hyper::ext::ReasonPhrase;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Send one request and wait for its response.
///
/// Implementations return `Ok` for every status code; interpreting the status
/// is the client's job. Dropping the returned future must abort the request.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `Transport` backed by a pooled `reqwest::Client`.
///
/// Cloning is cheap and clones share the connection pool.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Transport honouring `config.timeout_ms`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout_duration() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.client.request(method.into(), &url);
        for (name, value) in &headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let reason = reason_phrase(status, response.extensions().get::<ReasonPhrase>());
        let headers = collect_headers(response.headers());
        let body = response.text().await?;

        Ok(HttpResponse {
            status: status.as_u16(),
            reason,
            headers,
            body,
        })
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

/// Reason phrase from the status line. hyper only records it when it differs
/// from the canonical one.
fn reason_phrase(status: StatusCode, sent: Option<&ReasonPhrase>) -> String {
    match sent {
        Some(phrase) => String::from_utf8_lossy(phrase.as_bytes()).into_owned(),
        None => status.canonical_reason().unwrap_or_default().to_string(),
    }
}

fn collect_headers(map: &HeaderMap) -> Vec<(String, String)> {
    map.iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::header::HeaderValue;

    use super::*;

    #[test]
    fn method_mapping_keeps_patch_token() {
        let method: reqwest::Method = HttpMethod::Patch.into();
        assert_eq!(method.as_str(), "PATCH");
        let method: reqwest::Method = HttpMethod::Delete.into();
        assert_eq!(method, reqwest::Method::DELETE);
    }

    #[test]
    fn repeated_headers_are_all_collected() {
        let mut map = HeaderMap::new();
        map.append("set-cookie", HeaderValue::from_static("a=1"));
        map.append("set-cookie", HeaderValue::from_static("b=2"));
        let headers = collect_headers(&map);
        assert_eq!(headers.len(), 2);
        assert!(headers.iter().all(|(name, _)| name == "set-cookie"));
    }

    #[test]
    fn server_reason_phrase_wins_over_canonical() {
        let sent = ReasonPhrase::from_static(b"Station Offline");
        assert_eq!(reason_phrase(StatusCode::SERVICE_UNAVAILABLE, Some(&sent)), "Station Offline");
        assert_eq!(reason_phrase(StatusCode::NOT_FOUND, None), "Not Found");

        let unregistered = StatusCode::from_u16(599).unwrap();
        assert_eq!(reason_phrase(unregistered, None), "");
        let sent = ReasonPhrase::from_static(b"Network Connect Timeout");
        assert_eq!(reason_phrase(unregistered, Some(&sent)), "Network Connect Timeout");
    }

    #[test]
    fn from_config_builds_with_timeout() {
        let config = ClientConfig::new("http://localhost").timeout(Duration::from_secs(3));
        assert!(ReqwestTransport::from_config(&config).is_ok());
        let config = ClientConfig::new("http://localhost").timeout(Duration::ZERO);
        assert!(ReqwestTransport::from_config(&config).is_ok());
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        // Nothing listens on the loopback discard port.
        let transport = ReqwestTransport::default();
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: "http://127.0.0.1:9/".to_string(),
            headers: Vec::new(),
            body: None,
        };
        let err = transport.send(request).await.unwrap_err();
        assert!(matches!(err, TransportError::Connect(_) | TransportError::Other(_)));
    }
}
