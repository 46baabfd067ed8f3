//! Transport abstraction over the HTTP client.
//!
//! [`crate::Vetch`] only builds requests and shapes responses; the network
//! round trip goes through a [`Transport`], which makes it replaceable in
//! tests and lets callers share one pooled client across every request.

mod client;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;

pub use client::ReqwestTransport;

/// What to send.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

/// What came back, with the body fully read.
#[derive(Debug, Clone, Default)]
pub struct TransportResponse {
    pub status: u16,
    pub status_text: String,
    /// Final URL, after redirects.
    pub url: String,
    /// Header pairs as received. Names may repeat.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs one exchange. Errors are network failures only; any HTTP
    /// status is a successful exchange.
    async fn fetch(&self, request: TransportRequest) -> Result<TransportResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn fetch(&self, request: TransportRequest) -> Result<TransportResponse> {
        (**self).fetch(request).await
    }
}
