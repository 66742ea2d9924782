// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP request types and POST payload encoding

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use std::time::Duration;
use url::Url;

use super::headers;

/// Content type declared for every non-empty POST payload
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// POST body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Payload {
    /// No body at all
    #[default]
    Empty,
    /// Field map, percent-encoded as `key=value&key=value`
    Form(Vec<(String, String)>),
    /// Pre-formed urlencoded body, sent verbatim
    Encoded(String),
}

impl Payload {
    /// Build a form payload from key/value pairs
    pub fn form<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Payload::Form(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Check if no body will be sent
    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }

    /// Encode to wire bytes (None = no body)
    pub fn encode(&self) -> Option<Bytes> {
        match self {
            Payload::Empty => None,
            Payload::Form(fields) => Some(Bytes::from(encode_form(fields))),
            Payload::Encoded(body) => Some(Bytes::from(body.clone())),
        }
    }
}

/// HTTP request representation
#[derive(Debug, Clone)]
pub struct Request {
    /// Request method
    pub method: Method,
    /// Request URL
    pub url: Url,
    /// Request headers
    pub headers: HeaderMap,
    /// Request body
    pub body: Option<Bytes>,
    /// Per-request timeout, overriding the client's
    pub timeout: Option<Duration>,
}

impl Request {
    /// Create a new request with arbitrary method
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        }
    }

    /// Create a new GET request
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Create a new POST request
    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    /// Set a header
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Set the request body
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Attach a POST payload with its content type
    pub fn payload(mut self, payload: &Payload) -> Self {
        match payload.encode() {
            Some(body) => {
                self.body = Some(body);
                self.header(headers::CONTENT_TYPE, FORM_CONTENT_TYPE)
            }
            None => {
                self.body = None;
                self
            }
        }
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Encode fields as `key=value&key=value`
pub fn encode_form(fields: &[(String, String)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Percent-encode everything outside the RFC 3986 unreserved set
pub fn percent_encode(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(byte as char)
            }
            _ => result.push_str(&format!("%{:02X}", byte)),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://portal.kcisec.com/DSAI/save.asp").unwrap()
    }

    #[test]
    fn test_request_creation() {
        let req = Request::get(url());
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.url.host_str(), Some("portal.kcisec.com"));
        assert!(req.body.is_none());
    }

    #[test]
    fn test_request_headers() {
        let req = Request::get(url()).header("x-custom", "value");
        assert_eq!(
            req.headers.get("x-custom").map(|v| v.to_str().unwrap()),
            Some("value")
        );
    }

    #[test]
    fn test_form_encoding() {
        let payload = Payload::form([("a", "1"), ("b", "x y")]);
        assert_eq!(payload.encode().unwrap(), Bytes::from("a=1&b=x%20y"));
    }

    #[test]
    fn test_percent_encode_utf8_and_reserved() {
        assert_eq!(percent_encode("留校"), "%E7%95%99%E6%A0%A1");
        assert_eq!(percent_encode("a&b=c/d"), "a%26b%3Dc%2Fd");
        assert_eq!(percent_encode("A-z_0.9~"), "A-z_0.9~");
    }

    #[test]
    fn test_payload_content_type() {
        let req = Request::post(url()).payload(&Payload::form([("a", "1")]));
        assert_eq!(
            req.headers.get(headers::CONTENT_TYPE).unwrap(),
            FORM_CONTENT_TYPE
        );
        assert_eq!(req.body.unwrap(), Bytes::from("a=1"));

        let req = Request::post(url()).payload(&Payload::Encoded("x=%20".to_string()));
        assert_eq!(req.body.unwrap(), Bytes::from("x=%20"));
    }

    #[test]
    fn test_empty_payload() {
        let req = Request::post(url()).payload(&Payload::Empty);
        assert!(req.body.is_none());
        assert!(req.headers.get(headers::CONTENT_TYPE).is_none());

        // An empty field map still sends a (zero-length) form body
        let req = Request::post(url()).payload(&Payload::form(Vec::<(String, String)>::new()));
        assert_eq!(req.body.unwrap().len(), 0);
    }
}
