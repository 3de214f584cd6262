//! Incoming hosting request, detached from the hyper body type.

use crate::http::{all_headers, first_header, Method};
use bytes::Bytes;

/// A request that matched a rewrite and is about to be forwarded.
///
/// The method is carried as received, extension methods included.
#[derive(Debug, Clone)]
pub struct HostingRequest {
    pub method: Method,
    /// Path and query, exactly as received (e.g. `/api/users?page=2`).
    pub url: String,
    /// Headers in arrival order; a name may repeat.
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl HostingRequest {
    /// Create a new request.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Append a header, keeping earlier values of the same name.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Set the request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// First value of a header.
    pub fn get_header(&self, key: &str) -> Option<&str> {
        first_header(&self.headers, key)
    }

    /// Every value of a header.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        all_headers(&self.headers, key)
    }

    /// Path component of the URL, without the query.
    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or("/")
    }
}

impl Default for HostingRequest {
    fn default() -> Self {
        Self::new(Method::GET, "/")
    }
}
