//! Request wrapper: merges options, sends one request and returns a uniform
//! response envelope or a typed error.
//!
//! # Structure
//!
//! - `options` - Per-call and default options and their merge
//! - `config` - Validation, URL assembly, body encoding and header defaults
//! - `user_agent` - The composed user-agent string
//! - `response` - Response envelope and body decoding
//! - `error` - Validation and status errors

mod config;
mod error;
mod options;
mod response;
mod user_agent;

use anyhow::{Context, Result};
use log::debug;
use serde::de::DeserializeOwned;

use crate::transport::{ReqwestTransport, Transport};

pub use config::{RequestConfig, build_url, encode_params};
pub use error::{RequestError, ValidationError};
pub use options::{ParamValue, RequestData, ResponseType, StatusCheck, VetchOptions};
pub use response::{RequestInfo, ResponseData, VetchResponse};
pub use user_agent::{RUNTIME_VERSION, SDK_IDENTIFIER, user_agent};

/// HTTP request wrapper holding immutable defaults and a transport.
///
/// Each call merges its options over the defaults into a fresh
/// [`RequestConfig`], so concurrent calls never share mutable state.
#[derive(Clone, Debug)]
pub struct Vetch<T = ReqwestTransport> {
    transport: T,
    defaults: VetchOptions,
}

impl Vetch<ReqwestTransport> {
    /// Creates a wrapper with no defaults other than a `json` response type.
    pub fn new() -> Self {
        Self::with_defaults(VetchOptions::default())
    }

    pub fn with_defaults(defaults: VetchOptions) -> Self {
        Self::with_transport(ReqwestTransport::default(), defaults)
    }
}

impl Default for Vetch<ReqwestTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> Vetch<T> {
    /// Creates a wrapper over the given transport. An unset response type in
    /// `defaults` becomes `json`.
    pub fn with_transport(transport: T, mut defaults: VetchOptions) -> Self {
        defaults.response_type.get_or_insert(ResponseType::Json);
        Self {
            transport,
            defaults,
        }
    }

    pub fn defaults(&self) -> &VetchOptions {
        &self.defaults
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends one request.
    ///
    /// Fails with [`ValidationError`] before anything is sent when the merged
    /// options have no URL, with the transport's own error when the exchange
    /// fails or times out, and with [`RequestError`] when the status check
    /// rejects the response. Nothing is retried.
    #[tracing::instrument(skip(self, options))]
    pub async fn request(&self, options: VetchOptions) -> Result<VetchResponse> {
        let config = RequestConfig::resolve(self.defaults.merge(options))?;

        debug!("api request {:?}", config);

        let response = self.dispatch(config).await?;

        debug!(
            "api response {} {} from {}",
            response.status, response.status_text, response.request.response_url
        );

        if !response.config.check_status.check(response.status) {
            return Err(RequestError::new(response).into());
        }

        Ok(response)
    }

    /// Sends one request and deserializes the decoded data into `D`.
    #[tracing::instrument(skip(self, options))]
    pub async fn request_as<D: DeserializeOwned>(
        &self,
        options: VetchOptions,
    ) -> Result<VetchResponse<D>> {
        self.request(options).await?.json()
    }

    /// Runs the exchange, under the configured timeout if there is one.
    /// Dropping the exchange on timeout aborts it and releases its timer.
    async fn dispatch(&self, config: RequestConfig) -> Result<VetchResponse> {
        let exchange = self.transport.fetch(config.transport_request());

        let response = match config.timeout {
            Some(timeout) => tokio::time::timeout(timeout, exchange)
                .await
                .with_context(|| {
                    format!(
                        "Request to {} aborted after {}ms",
                        config.url,
                        timeout.as_millis()
                    )
                })??,
            None => exchange.await?,
        };

        Ok(VetchResponse::from_transport(config, response))
    }
}
