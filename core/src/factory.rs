//! Creates clients that share one transport.
//!
//! Handy when a program talks to several base URLs: every client made by the
//! same factory reuses the transport's connection pool.

use crate::client::RestClient;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::transport::{ReqwestTransport, Transport};

#[derive(Debug, Clone, Default)]
pub struct RestClientFactory<T = ReqwestTransport> {
    transport: T,
}

impl<T: Transport + Clone> RestClientFactory<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn create(&self, base_url: &str) -> Result<RestClient<T>> {
        self.create_with_config(ClientConfig::new(base_url))
    }

    /// `config.timeout_ms` is ignored here; the shared transport decides timeouts.
    pub fn create_with_config(&self, config: ClientConfig) -> Result<RestClient<T>> {
        RestClient::with_transport(config, self.transport.clone())
    }
}
