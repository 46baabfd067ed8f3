//! Per-call and default request options.

use reqwest::Method;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// How the response body is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseType {
    /// Parse as JSON, falling back to the raw text when parsing fails.
    #[default]
    Json,
    /// Raw text.
    Text,
    /// Raw bytes.
    Stream,
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseType::Json => write!(f, "json"),
            ResponseType::Text => write!(f, "text"),
            ResponseType::Stream => write!(f, "stream"),
        }
    }
}

impl FromStr for ResponseType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ResponseType::Json),
            "text" => Ok(ResponseType::Text),
            "stream" => Ok(ResponseType::Stream),
            other => Err(anyhow::anyhow!(
                "Unknown response type '{}', expected json, text or stream",
                other
            )),
        }
    }
}

/// A query parameter value. Multiple values repeat the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Single(String),
    Multiple(Vec<String>),
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Single(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Single(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        ParamValue::Multiple(values)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(values: Vec<&str>) -> Self {
        ParamValue::Multiple(values.into_iter().map(str::to_string).collect())
    }
}

/// Request payload.
///
/// `Json` is serialized and sent with `Content-Type: application/json`;
/// `Raw` goes out untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestData {
    Json(serde_json::Value),
    Raw(Vec<u8>),
}

impl RequestData {
    /// Converts a dynamic value into a payload.
    ///
    /// Objects and arrays become JSON and other scalars are sent as their text
    /// form. Falsy values (`null`, `false`, `0`, `""`) mean no payload at all.
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null | serde_json::Value::Bool(false) => None,
            serde_json::Value::String(s) if s.is_empty() => None,
            serde_json::Value::Number(n) if n.as_f64() == Some(0.0) => None,
            serde_json::Value::String(s) => Some(RequestData::Raw(s.into_bytes())),
            serde_json::Value::Bool(b) => Some(RequestData::Raw(b.to_string().into_bytes())),
            serde_json::Value::Number(n) => Some(RequestData::Raw(n.to_string().into_bytes())),
            structured => Some(RequestData::Json(structured)),
        }
    }
}

impl From<&str> for RequestData {
    fn from(value: &str) -> Self {
        RequestData::Raw(value.as_bytes().to_vec())
    }
}

impl From<String> for RequestData {
    fn from(value: String) -> Self {
        RequestData::Raw(value.into_bytes())
    }
}

impl From<Vec<u8>> for RequestData {
    fn from(value: Vec<u8>) -> Self {
        RequestData::Raw(value)
    }
}

/// Predicate deciding whether a status code counts as success.
#[derive(Clone)]
pub struct StatusCheck(Arc<dyn Fn(u16) -> bool + Send + Sync>);

impl StatusCheck {
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(u16) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(check))
    }

    pub fn check(&self, status: u16) -> bool {
        (self.0)(status)
    }
}

impl Default for StatusCheck {
    /// Accepts any 2xx status.
    fn default() -> Self {
        Self::new(|status| (200..300).contains(&status))
    }
}

impl fmt::Debug for StatusCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StatusCheck(..)")
    }
}

/// Options for a single request, or the defaults a [`crate::Vetch`] applies
/// to every request.
///
/// Every field is optional so that defaults and per-call options can be
/// merged with [`VetchOptions::merge`].
#[derive(Debug, Clone, Default)]
pub struct VetchOptions {
    pub url: Option<String>,
    /// Prefix for `url`. Settable as `base_url` or `base_url_alias` (`baseURL`).
    pub base_url: Option<String>,
    pub method: Option<Method>,
    pub headers: BTreeMap<String, String>,
    /// Query parameters in insertion order.
    pub params: Vec<(String, ParamValue)>,
    pub data: Option<RequestData>,
    pub response_type: Option<ResponseType>,
    pub timeout: Option<Duration>,
    pub append_user_agent: Option<String>,
    pub check_status: Option<StatusCheck>,
}

impl VetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Same as [`VetchOptions::base_url`]; kept for callers using the `baseURL` spelling.
    pub fn base_url_alias(self, base_url: impl Into<String>) -> Self {
        self.base_url(base_url)
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Adds a query parameter, replacing any earlier value for the same key.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        upsert_param(&mut self.params, key.into(), value.into());
        self
    }

    pub fn params<K, V, I>(mut self, params: I) -> Self
    where
        K: Into<String>,
        V: Into<ParamValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in params {
            upsert_param(&mut self.params, key.into(), value.into());
        }
        self
    }

    pub fn data(mut self, data: impl Into<RequestData>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Sets the payload from a dynamic value, see [`RequestData::from_value`].
    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.data = RequestData::from_value(value);
        self
    }

    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = Some(response_type);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn append_user_agent(mut self, suffix: impl Into<String>) -> Self {
        self.append_user_agent = Some(suffix.into());
        self
    }

    pub fn check_status<F>(mut self, check: F) -> Self
    where
        F: Fn(u16) -> bool + Send + Sync + 'static,
    {
        self.check_status = Some(StatusCheck::new(check));
        self
    }

    /// Merges `overrides` on top of `self`.
    ///
    /// Scalar fields take the override when it is set. Headers and params are
    /// merged per key with the override winning.
    pub fn merge(&self, overrides: VetchOptions) -> VetchOptions {
        let mut headers = self.headers.clone();
        headers.extend(overrides.headers);

        let mut params = self.params.clone();
        for (key, value) in overrides.params {
            upsert_param(&mut params, key, value);
        }

        VetchOptions {
            url: overrides.url.or_else(|| self.url.clone()),
            base_url: overrides.base_url.or_else(|| self.base_url.clone()),
            method: overrides.method.or_else(|| self.method.clone()),
            headers,
            params,
            data: overrides.data.or_else(|| self.data.clone()),
            response_type: overrides.response_type.or(self.response_type),
            timeout: overrides.timeout.or(self.timeout),
            append_user_agent: overrides
                .append_user_agent
                .or_else(|| self.append_user_agent.clone()),
            check_status: overrides.check_status.or_else(|| self.check_status.clone()),
        }
    }
}

fn upsert_param(params: &mut Vec<(String, ParamValue)>, key: String, value: ParamValue) {
    match params.iter_mut().find(|(k, _)| *k == key) {
        Some((_, slot)) => *slot = value,
        None => params.push((key, value)),
    }
}
