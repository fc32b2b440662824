//! Request and response types passed through the capability registry
//!
//! These are deliberately plain data so handlers can be driven directly from
//! tests without an HTTP listener.

use std::collections::HashMap;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::core::CapsError;

/// An inbound request addressed to a capability path
#[derive(Debug, Clone)]
pub struct CapsRequest {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl CapsRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: HashMap::new(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Non-empty query parameter value
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Non-empty header value as text
    pub fn header(&self, name: &HeaderName) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
    }
}

/// A fully buffered response produced by a capability handler
#[derive(Debug, Clone)]
pub struct CapsResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl CapsResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    /// Status only, empty body
    pub fn blank(status: StatusCode) -> Self {
        Self::new(status)
    }

    /// Binary body with a content type
    pub fn bytes(status: StatusCode, content_type: &str, body: Vec<u8>) -> Self {
        Self::new(status)
            .with_header(header::CONTENT_TYPE, content_type)
            .with_body(body)
    }

    /// Plain-text diagnostic body
    pub fn text(status: StatusCode, message: &str) -> Self {
        Self::bytes(status, "text/plain", message.as_bytes().to_vec())
    }

    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    pub fn header(&self, name: &HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl IntoResponse for CapsResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Failures answer with a blank body; only 416 carries a header
impl From<CapsError> for CapsResponse {
    fn from(err: CapsError) -> Self {
        let response = CapsResponse::blank(err.status_code());
        match err {
            CapsError::RangeUnsatisfiable { length } => response
                .with_header(header::CONTENT_RANGE, &format!("bytes */{}", length)),
            _ => response,
        }
    }
}
