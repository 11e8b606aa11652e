//! Async REST client composed of an `Endpoint` and a `Transport`.
//!
//! # Design
//! Each call is one round-trip: build the request (serializing the body if
//! there is one), hand it to the transport, then map the raw response into a
//! `RestResponse` or `TypedResponse`. There are no retries. Configuration
//! and default headers are fixed at construction and only read afterwards,
//! so a client can be shared between tasks without locking.
//!
//! Cancellation goes through `RestClient::cancellable`, which borrows the
//! client together with a `CancellationToken` and exposes the same verbs.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::endpoint::Endpoint;
use crate::error::{RestError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::response::{parse_status, parse_string, parse_typed, RestResponse, TypedResponse};
use crate::transport::{ReqwestTransport, Transport};

#[derive(Debug, Clone)]
pub struct RestClient<T = ReqwestTransport> {
    endpoint: Endpoint,
    transport: T,
}

impl RestClient<ReqwestTransport> {
    /// Client for `base_url` with default headers and the reqwest transport.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(ClientConfig::new(base_url))
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::from_config(&config)?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> RestClient<T> {
    /// Client using a caller-supplied transport.
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self> {
        let endpoint = Endpoint::new(&config)?;
        debug!(base_url = endpoint.base_url(), "rest client created");
        Ok(Self { endpoint, transport })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Borrow this client with `token` attached to every call made through it.
    pub fn cancellable<'a>(&'a self, token: &'a CancellationToken) -> Cancellable<'a, T> {
        Cancellable { client: self, token }
    }

    pub async fn get<R: DeserializeOwned>(&self, route: &str) -> Result<TypedResponse<R>> {
        self.fetch(self.endpoint.build(HttpMethod::Get, route), None).await
    }

    pub async fn get_status(&self, route: &str) -> Result<RestResponse> {
        self.fetch_status(self.endpoint.build(HttpMethod::Get, route), None).await
    }

    /// Raw body of a GET. Unlike the other verbs, a non-2xx status is an error.
    pub async fn get_string(&self, route: &str) -> Result<String> {
        self.fetch_string(self.endpoint.build(HttpMethod::Get, route), None).await
    }

    pub async fn post<B, R>(&self, route: &str, body: &B) -> Result<TypedResponse<R>>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.endpoint.build_json(HttpMethod::Post, route, body)?;
        self.fetch(request, None).await
    }

    pub async fn post_status<B>(&self, route: &str, body: &B) -> Result<RestResponse>
    where
        B: Serialize + ?Sized,
    {
        let request = self.endpoint.build_json(HttpMethod::Post, route, body)?;
        self.fetch_status(request, None).await
    }

    pub async fn put<B, R>(&self, route: &str, body: &B) -> Result<TypedResponse<R>>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.endpoint.build_json(HttpMethod::Put, route, body)?;
        self.fetch(request, None).await
    }

    pub async fn put_status<B>(&self, route: &str, body: &B) -> Result<RestResponse>
    where
        B: Serialize + ?Sized,
    {
        let request = self.endpoint.build_json(HttpMethod::Put, route, body)?;
        self.fetch_status(request, None).await
    }

    pub async fn patch<B, R>(&self, route: &str, body: &B) -> Result<TypedResponse<R>>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.endpoint.build_json(HttpMethod::Patch, route, body)?;
        self.fetch(request, None).await
    }

    pub async fn patch_status<B>(&self, route: &str, body: &B) -> Result<RestResponse>
    where
        B: Serialize + ?Sized,
    {
        let request = self.endpoint.build_json(HttpMethod::Patch, route, body)?;
        self.fetch_status(request, None).await
    }

    pub async fn delete<R: DeserializeOwned>(&self, route: &str) -> Result<TypedResponse<R>> {
        self.fetch(self.endpoint.build(HttpMethod::Delete, route), None).await
    }

    pub async fn delete_status(&self, route: &str) -> Result<RestResponse> {
        self.fetch_status(self.endpoint.build(HttpMethod::Delete, route), None).await
    }

    async fn fetch<R: DeserializeOwned>(
        &self,
        request: HttpRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<TypedResponse<R>> {
        parse_typed(self.execute(request, cancel).await?)
    }

    async fn fetch_status(&self, request: HttpRequest, cancel: Option<&CancellationToken>) -> Result<RestResponse> {
        Ok(parse_status(&self.execute(request, cancel).await?))
    }

    async fn fetch_string(&self, request: HttpRequest, cancel: Option<&CancellationToken>) -> Result<String> {
        parse_string(self.execute(request, cancel).await?)
    }

    async fn execute(&self, request: HttpRequest, cancel: Option<&CancellationToken>) -> Result<HttpResponse> {
        let method = request.method;
        let url = redact_query(&request.url);
        debug!(%method, %url, "sending request");

        let result = match cancel {
            None => self.transport.send(request).await,
            Some(token) if token.is_cancelled() => {
                debug!(%method, %url, "request cancelled before send");
                return Err(RestError::Cancelled);
            }
            Some(token) => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => {
                        debug!(%method, %url, "request cancelled in flight");
                        return Err(RestError::Cancelled);
                    }
                    result = self.transport.send(request) => result,
                }
            }
        };

        match result {
            Ok(response) => {
                debug!(%method, %url, status = response.status, "response received");
                Ok(response)
            }
            Err(e) => {
                warn!(%method, %url, error = %e, "transport failure");
                Err(e.into())
            }
        }
    }
}

/// `url` with its query string masked, for log output.
fn redact_query(url: &str) -> String {
    match url.split_once('?') {
        Some((path, _)) => format!("{path}?<redacted>"),
        None => url.to_string(),
    }
}

/// A `RestClient` borrowed together with a cancellation token.
///
/// Cancelling the token aborts the in-flight request and the call returns
/// `RestError::Cancelled`.
#[derive(Debug, Clone, Copy)]
pub struct Cancellable<'a, T> {
    client: &'a RestClient<T>,
    token: &'a CancellationToken,
}

impl<T: Transport> Cancellable<'_, T> {
    pub async fn get<R: DeserializeOwned>(&self, route: &str) -> Result<TypedResponse<R>> {
        let request = self.client.endpoint.build(HttpMethod::Get, route);
        self.client.fetch(request, Some(self.token)).await
    }

    pub async fn get_status(&self, route: &str) -> Result<RestResponse> {
        let request = self.client.endpoint.build(HttpMethod::Get, route);
        self.client.fetch_status(request, Some(self.token)).await
    }

    pub async fn get_string(&self, route: &str) -> Result<String> {
        let request = self.client.endpoint.build(HttpMethod::Get, route);
        self.client.fetch_string(request, Some(self.token)).await
    }

    pub async fn post<B, R>(&self, route: &str, body: &B) -> Result<TypedResponse<R>>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.client.endpoint.build_json(HttpMethod::Post, route, body)?;
        self.client.fetch(request, Some(self.token)).await
    }

    pub async fn post_status<B>(&self, route: &str, body: &B) -> Result<RestResponse>
    where
        B: Serialize + ?Sized,
    {
        let request = self.client.endpoint.build_json(HttpMethod::Post, route, body)?;
        self.client.fetch_status(request, Some(self.token)).await
    }

    pub async fn put<B, R>(&self, route: &str, body: &B) -> Result<TypedResponse<R>>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.client.endpoint.build_json(HttpMethod::Put, route, body)?;
        self.client.fetch(request, Some(self.token)).await
    }

    pub async fn put_status<B>(&self, route: &str, body: &B) -> Result<RestResponse>
    where
        B: Serialize + ?Sized,
    {
        let request = self.client.endpoint.build_json(HttpMethod::Put, route, body)?;
        self.client.fetch_status(request, Some(self.token)).await
    }

    pub async fn patch<B, R>(&self, route: &str, body: &B) -> Result<TypedResponse<R>>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.client.endpoint.build_json(HttpMethod::Patch, route, body)?;
        self.client.fetch(request, Some(self.token)).await
    }

    pub async fn patch_status<B>(&self, route: &str, body: &B) -> Result<RestResponse>
    where
        B: Serialize + ?Sized,
    {
        let request = self.client.endpoint.build_json(HttpMethod::Patch, route, body)?;
        self.client.fetch_status(request, Some(self.token)).await
    }

    pub async fn delete<R: DeserializeOwned>(&self, route: &str) -> Result<TypedResponse<R>> {
        let request = self.client.endpoint.build(HttpMethod::Delete, route);
        self.client.fetch(request, Some(self.token)).await
    }

    pub async fn delete_status(&self, route: &str) -> Result<RestResponse> {
        let request = self.client.endpoint.build(HttpMethod::Delete, route);
        self.client.fetch_status(request, Some(self.token)).await
    }
}
