//! Resolution of merged options into the configuration a request is sent with.

use anyhow::Result;
use reqwest::Method;
use std::collections::BTreeMap;
use std::time::Duration;

use super::error::ValidationError;
use super::options::{ParamValue, RequestData, ResponseType, StatusCheck, VetchOptions};
use super::user_agent::user_agent;
use crate::transport::TransportRequest;

/// The fully resolved configuration of one request.
///
/// Built fresh for every call and handed back inside the response envelope.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Final URL, base URL and query string included.
    pub url: String,
    pub base_url: Option<String>,
    pub method: Method,
    pub headers: BTreeMap<String, String>,
    pub params: Vec<(String, ParamValue)>,
    pub data: Option<RequestData>,
    /// Encoded payload.
    pub body: Option<Vec<u8>>,
    pub response_type: ResponseType,
    pub timeout: Option<Duration>,
    pub append_user_agent: Option<String>,
    pub check_status: StatusCheck,
}

impl RequestConfig {
    /// Validates merged options and resolves them into a request configuration.
    ///
    /// Fails with [`ValidationError::MissingUrl`] when no non-empty `url` is set.
    pub fn resolve(options: VetchOptions) -> Result<Self> {
        let url = match options.url.as_deref() {
            Some(url) if !url.is_empty() => url,
            _ => return Err(ValidationError::MissingUrl.into()),
        };

        let url = build_url(options.base_url.as_deref(), url, &options.params);
        let response_type = options.response_type.unwrap_or_default();
        let mut headers = options.headers;

        let body = match &options.data {
            Some(RequestData::Json(value)) => {
                set_header(&mut headers, "Content-Type", "application/json");
                Some(value.to_string().into_bytes())
            }
            Some(RequestData::Raw(bytes)) => Some(bytes.clone()),
            None => None,
        };

        if response_type == ResponseType::Json && !has_header(&headers, "Accept") {
            headers.insert("Accept".to_string(), "application/json".to_string());
        }

        set_header(
            &mut headers,
            "user-agent",
            &user_agent(options.append_user_agent.as_deref()),
        );

        Ok(Self {
            url,
            base_url: options.base_url,
            method: options.method.unwrap_or(Method::GET),
            headers,
            params: options.params,
            data: options.data,
            body,
            response_type,
            timeout: options.timeout.filter(|t| !t.is_zero()),
            append_user_agent: options.append_user_agent,
            check_status: options.check_status.unwrap_or_default(),
        })
    }

    /// Builds what the transport needs to perform this request.
    pub fn transport_request(&self) -> TransportRequest {
        TransportRequest {
            method: self.method.clone(),
            url: self.url.clone(),
            headers: self
                .headers
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            body: self.body.clone(),
        }
    }
}

/// Joins the base URL and URL, then appends the encoded params with `?` or
/// `&` depending on whether a query string is already present.
pub fn build_url(base_url: Option<&str>, url: &str, params: &[(String, ParamValue)]) -> String {
    let mut full = match base_url.filter(|base| !base.is_empty()) {
        Some(base) => format!("{}{}", base, url),
        None => url.to_string(),
    };

    let query = encode_params(params);
    if !query.is_empty() {
        full.push(if full.contains('?') { '&' } else { '?' });
        full.push_str(&query);
    }

    full
}

/// Form-encodes params in order. Multiple values repeat the key.
pub fn encode_params(params: &[(String, ParamValue)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        match value {
            ParamValue::Single(v) => {
                serializer.append_pair(key, v);
            }
            ParamValue::Multiple(values) => {
                for v in values {
                    serializer.append_pair(key, v);
                }
            }
        }
    }
    serializer.finish()
}

fn has_header(headers: &BTreeMap<String, String>, name: &str) -> bool {
    headers.keys().any(|k| k.eq_ignore_ascii_case(name))
}

/// Inserts a header, dropping any existing entry that differs only in case.
fn set_header(headers: &mut BTreeMap<String, String>, name: &str, value: &str) {
    headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
    headers.insert(name.to_string(), value.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vetch::user_agent::SDK_IDENTIFIER;
    use serde_json::json;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, ParamValue)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), ParamValue::from(*v)))
            .collect()
    }

    #[test]
    fn test_resolve_missing_url() {
        let err = RequestConfig::resolve(VetchOptions::new()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::MissingUrl)
        );
    }

    #[test]
    fn test_resolve_empty_url() {
        let err = RequestConfig::resolve(VetchOptions::new().url("")).unwrap_err();
        assert!(err.downcast_ref::<ValidationError>().is_some());
        assert_eq!(err.to_string(), "URL is required.");
    }

    #[test]
    fn test_resolve_base_url_does_not_replace_url() {
        let opts = VetchOptions::new().base_url("https://api.example.com");
        assert!(RequestConfig::resolve(opts).is_err());
    }

    #[test]
    fn test_build_url_with_base_url() {
        assert_eq!(
            build_url(Some("https://api.example.com"), "/v2/sessions", &[]),
            "https://api.example.com/v2/sessions"
        );
        assert_eq!(build_url(Some(""), "/v2/sessions", &[]), "/v2/sessions");
        assert_eq!(build_url(None, "/v2/sessions", &[]), "/v2/sessions");
    }

    #[test]
    fn test_build_url_params_without_query() {
        assert_eq!(build_url(None, "/a", &params(&[("y", "2")])), "/a?y=2");
    }

    #[test]
    fn test_build_url_params_with_existing_query() {
        assert_eq!(
            build_url(None, "/a?x=1", &params(&[("y", "2")])),
            "/a?x=1&y=2"
        );
    }

    #[test]
    fn test_build_url_empty_params() {
        assert_eq!(build_url(None, "/a", &[]), "/a");
    }

    #[test]
    fn test_encode_params_form_encoding() {
        assert_eq!(
            encode_params(&params(&[("name", "a b&c"), ("q", "ü")])),
            "name=a+b%26c&q=%C3%BC"
        );
    }

    #[test]
    fn test_encode_params_repeats_multiple_values() {
        let params = vec![(
            "id".to_string(),
            ParamValue::from(vec!["1", "2"]),
        )];
        assert_eq!(encode_params(&params), "id=1&id=2");
    }

    #[test]
    fn test_resolve_json_body() {
        let config = RequestConfig::resolve(VetchOptions::new().url("/a").json(json!({"a": 1}))).unwrap();
        assert_eq!(config.body.as_deref(), Some(br#"{"a":1}"#.as_slice()));
        assert_eq!(config.headers.get("Content-Type").unwrap(), "application/json");
    }

    #[test]
    fn test_resolve_json_body_replaces_content_type_any_case() {
        let opts = VetchOptions::new()
            .url("/a")
            .header("content-type", "text/plain")
            .json(json!({"a": 1}));
        let config = RequestConfig::resolve(opts).unwrap();
        assert_eq!(config.headers.get("Content-Type").unwrap(), "application/json");
        assert!(!config.headers.contains_key("content-type"));
    }

    #[test]
    fn test_resolve_raw_body() {
        let config = RequestConfig::resolve(VetchOptions::new().url("/a").data("raw")).unwrap();
        assert_eq!(config.body.as_deref(), Some(b"raw".as_slice()));
        assert!(!config.headers.contains_key("Content-Type"));
    }

    #[test]
    fn test_resolve_no_body() {
        let config = RequestConfig::resolve(VetchOptions::new().url("/a")).unwrap();
        assert!(config.body.is_none());
    }

    #[test]
    fn test_resolve_falsy_data_sends_no_body() {
        for value in [json!(false), json!(0), json!("")] {
            let config = RequestConfig::resolve(VetchOptions::new().url("/a").json(value)).unwrap();
            assert!(config.data.is_none());
            assert!(config.body.is_none());
            assert!(!config.headers.contains_key("Content-Type"));
        }
    }

    #[test]
    fn test_resolve_accept_default_for_json() {
        let config = RequestConfig::resolve(VetchOptions::new().url("/a")).unwrap();
        assert_eq!(config.response_type, ResponseType::Json);
        assert_eq!(config.headers.get("Accept").unwrap(), "application/json");
    }

    #[test]
    fn test_resolve_keeps_caller_accept() {
        let opts = VetchOptions::new().url("/a").header("accept", "application/xml");
        let config = RequestConfig::resolve(opts).unwrap();
        assert_eq!(config.headers.get("accept").unwrap(), "application/xml");
        assert!(!config.headers.contains_key("Accept"));
    }

    #[test]
    fn test_resolve_no_accept_for_text() {
        let opts = VetchOptions::new().url("/a").response_type(ResponseType::Text);
        let config = RequestConfig::resolve(opts).unwrap();
        assert!(!config.headers.contains_key("Accept"));
    }

    #[test]
    fn test_resolve_sets_user_agent() {
        let opts = VetchOptions::new()
            .url("/a")
            .header("User-Agent", "custom")
            .append_user_agent("my-app/1.0");
        let config = RequestConfig::resolve(opts).unwrap();
        let ua = config.headers.get("user-agent").unwrap();
        assert!(ua.starts_with(SDK_IDENTIFIER));
        assert!(ua.ends_with(" my-app/1.0"));
        assert!(!config.headers.contains_key("User-Agent"));
    }

    #[test]
    fn test_resolve_defaults() {
        let config = RequestConfig::resolve(VetchOptions::new().url("/a")).unwrap();
        assert_eq!(config.method, Method::GET);
        assert!(config.timeout.is_none());
        assert!(config.check_status.check(200));
        assert!(!config.check_status.check(400));
    }

    #[test]
    fn test_resolve_zero_timeout_is_disabled() {
        let opts = VetchOptions::new().url("/a").timeout(Duration::ZERO);
        let config = RequestConfig::resolve(opts).unwrap();
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_transport_request() {
        let opts = VetchOptions::new()
            .url("/a")
            .base_url("http://localhost")
            .method(Method::POST)
            .param("x", "1")
            .data("payload");
        let request = RequestConfig::resolve(opts).unwrap().transport_request();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url, "http://localhost/a?x=1");
        assert_eq!(request.body.as_deref(), Some(b"payload".as_slice()));
        assert!(request.headers.iter().any(|(name, _)| name == "user-agent"));
    }
}
