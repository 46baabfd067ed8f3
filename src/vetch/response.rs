//! Response envelope and body decoding.

use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

use super::config::RequestConfig;
use super::options::ResponseType;
use crate::transport::TransportResponse;

/// Decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseData {
    Json(serde_json::Value),
    Text(String),
    Binary(Vec<u8>),
}

impl ResponseData {
    /// Decodes a body according to the declared response type.
    ///
    /// A `json` body that does not parse is returned as text.
    pub fn decode(response_type: ResponseType, body: Vec<u8>) -> Self {
        match response_type {
            ResponseType::Stream => ResponseData::Binary(body),
            ResponseType::Json => {
                let text = into_text(body);
                match serde_json::from_str(&text) {
                    Ok(value) => ResponseData::Json(value),
                    Err(_) => ResponseData::Text(text),
                }
            }
            ResponseType::Text => ResponseData::Text(into_text(body)),
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseData::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseData::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ResponseData::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Text that was not valid JSON becomes a JSON string. Binary data has no
    /// JSON form.
    pub fn into_value(self) -> Result<serde_json::Value> {
        match self {
            ResponseData::Json(value) => Ok(value),
            ResponseData::Text(text) => Ok(serde_json::Value::String(text)),
            ResponseData::Binary(_) => bail!("Binary response data cannot be read as JSON"),
        }
    }
}

fn into_text(body: Vec<u8>) -> String {
    String::from_utf8(body)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// Where the response actually came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    /// Final URL, after redirects.
    pub response_url: String,
}

/// The normalized result of one completed exchange.
#[derive(Debug, Clone)]
pub struct VetchResponse<T = ResponseData> {
    pub config: RequestConfig,
    pub data: T,
    pub headers: BTreeMap<String, String>,
    pub status: u16,
    pub status_text: String,
    pub request: RequestInfo,
}

impl<T> VetchResponse<T> {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn map<U, F>(self, f: F) -> VetchResponse<U>
    where
        F: FnOnce(T) -> U,
    {
        VetchResponse {
            config: self.config,
            data: f(self.data),
            headers: self.headers,
            status: self.status,
            status_text: self.status_text,
            request: self.request,
        }
    }
}

impl VetchResponse<ResponseData> {
    /// Builds the envelope, decoding the body per the config's response type.
    /// Repeated header values are joined with `", "`.
    pub fn from_transport(config: RequestConfig, response: TransportResponse) -> Self {
        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in response.headers {
            headers
                .entry(name)
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert_with(|| value.clone());
        }

        let data = ResponseData::decode(config.response_type, response.body);

        Self {
            config,
            data,
            headers,
            status: response.status,
            status_text: response.status_text,
            request: RequestInfo {
                response_url: response.url,
            },
        }
    }

    /// Deserializes the data into `D`, keeping the rest of the envelope.
    pub fn json<D: DeserializeOwned>(self) -> Result<VetchResponse<D>> {
        let value = self.data.clone().into_value()?;
        let data = serde_json::from_value(value).context("Failed to parse JSON response")?;
        Ok(self.map(|_| data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vetch::options::VetchOptions;
    use serde_json::json;

    fn config(response_type: ResponseType) -> RequestConfig {
        RequestConfig::resolve(VetchOptions::new().url("/a").response_type(response_type)).unwrap()
    }

    #[test]
    fn test_decode_json() {
        let data = ResponseData::decode(ResponseType::Json, br#"{"id": 7}"#.to_vec());
        assert_eq!(data, ResponseData::Json(json!({"id": 7})));
    }

    #[test]
    fn test_decode_malformed_json_falls_back_to_text() {
        let data = ResponseData::decode(ResponseType::Json, b"not-json".to_vec());
        assert_eq!(data, ResponseData::Text("not-json".to_string()));
    }

    #[test]
    fn test_decode_empty_json_body() {
        let data = ResponseData::decode(ResponseType::Json, Vec::new());
        assert_eq!(data.as_text(), Some(""));
    }

    #[test]
    fn test_decode_text_keeps_json_as_text() {
        let data = ResponseData::decode(ResponseType::Text, br#"{"id": 7}"#.to_vec());
        assert_eq!(data.as_text(), Some(r#"{"id": 7}"#));
    }

    #[test]
    fn test_decode_stream_keeps_bytes() {
        let data = ResponseData::decode(ResponseType::Stream, vec![0xff, 0x00, 0x10]);
        assert_eq!(data.as_bytes(), Some([0xff, 0x00, 0x10].as_slice()));
    }

    #[test]
    fn test_decode_invalid_utf8_text_is_lossy() {
        let data = ResponseData::decode(ResponseType::Text, vec![b'o', b'k', 0xff]);
        assert_eq!(data.as_text(), Some("ok\u{fffd}"));
    }

    #[test]
    fn test_from_transport_envelope() {
        let response = VetchResponse::from_transport(
            config(ResponseType::Json),
            TransportResponse {
                status: 201,
                status_text: "Created".to_string(),
                url: "http://localhost/final".to_string(),
                headers: vec![
                    ("content-type".to_string(), "application/json".to_string()),
                    ("set-cookie".to_string(), "a=1".to_string()),
                    ("set-cookie".to_string(), "b=2".to_string()),
                ],
                body: br#"{"ok": true}"#.to_vec(),
            },
        );

        assert_eq!(response.status, 201);
        assert_eq!(response.status_text, "Created");
        assert_eq!(response.request.response_url, "http://localhost/final");
        assert_eq!(response.headers.get("set-cookie").unwrap(), "a=1, b=2");
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert_eq!(response.data, ResponseData::Json(json!({"ok": true})));
        assert_eq!(response.config.url, "/a");
    }

    #[test]
    fn test_json_into_typed_envelope() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Session {
            id: String,
        }

        let response = VetchResponse::from_transport(
            config(ResponseType::Json),
            TransportResponse {
                status: 200,
                body: br#"{"id": "abc"}"#.to_vec(),
                ..Default::default()
            },
        );
        let typed = response.json::<Session>().unwrap();
        assert_eq!(typed.data, Session { id: "abc".to_string() });
        assert_eq!(typed.status, 200);
    }

    #[test]
    fn test_json_text_into_string() {
        let response = VetchResponse::from_transport(
            config(ResponseType::Text),
            TransportResponse {
                body: b"hello".to_vec(),
                ..Default::default()
            },
        );
        let typed = response.json::<String>().unwrap();
        assert_eq!(typed.data, "hello");
    }

    #[test]
    fn test_json_binary_fails() {
        let response = VetchResponse::from_transport(
            config(ResponseType::Stream),
            TransportResponse {
                body: vec![1, 2, 3],
                ..Default::default()
            },
        );
        assert!(response.json::<serde_json::Value>().is_err());
    }
}
