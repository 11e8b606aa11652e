//! Small typed REST client.
//!
//! # Overview
//! Wraps an HTTP transport with base-URL composition, default headers
//! (accept, content type, user agent, authorization, custom headers), JSON
//! (de)serialization and a uniform response type carrying the status code,
//! success flag, reason phrase, headers and an optional decoded payload.
//!
//! # Design
//! - `Endpoint` builds `HttpRequest` values and the `parse_*` functions
//!   consume `HttpResponse` values without touching the network, so the
//!   I/O boundary is explicit and the request/response mapping is testable
//!   on its own.
//! - `Transport` is the only I/O seam; `ReqwestTransport` is the default and
//!   tests inject their own.
//! - `RestClient` glues the two together and adds cancellation.
//! - A non-2xx status is data (`is_success == false`), never an error, except
//!   for `get_string`.
//!
//! ```no_run
//! # async fn demo() -> rest_core::Result<()> {
//! use rest_core::{ClientConfig, RestClient};
//!
//! #[derive(serde::Deserialize)]
//! struct Forecast { summary: String }
//!
//! let client = RestClient::with_config(ClientConfig::new("https://api.example.com/v1").bearer("token"))?;
//! let response = client.get::<Forecast>("forecast/london").await?;
//! if let Some(forecast) = response.data {
//!     println!("{}", forecast.summary);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod factory;
pub mod headers;
pub mod http;
pub mod response;
pub mod transport;

pub use client::{Cancellable, RestClient};
pub use config::{AuthorizationHeader, ClientConfig};
pub use endpoint::Endpoint;
pub use error::{RestError, Result, TransportError};
pub use factory::RestClientFactory;
pub use headers::DefaultHeaders;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use response::{parse_status, parse_string, parse_typed, RestResponse, TypedResponse};
pub use transport::{ReqwestTransport, Transport};

pub use tokio_util::sync::CancellationToken;
