//! Response handed back to the hosting client.

use crate::http::{all_headers, first_header, StatusCode};
use bytes::Bytes;
use serde::Serialize;

/// Response produced by a rewrite handler or by the hosting server itself.
#[derive(Debug, Clone)]
pub struct HostingResponse {
    pub status: StatusCode,
    /// Headers in the order the backend sent them; a name may repeat.
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl HostingResponse {
    /// Empty response with the given status.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Copy status, headers and body from a backend response.
    ///
    /// Header values that are not visible ASCII are dropped.
    pub async fn from_upstream(upstream: reqwest::Response) -> Result<Self, reqwest::Error> {
        let mut response = Self::new(upstream.status());
        response.headers = upstream
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = upstream.bytes().await?;
        if !body.is_empty() {
            response.body = Some(body);
        }
        Ok(response)
    }

    /// JSON response.
    pub fn json<T: Serialize>(data: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(data)?;
        Ok(Self::new(StatusCode::OK)
            .header("Content-Type", "application/json")
            .body(body))
    }

    /// Plain-text 200 response.
    pub fn text(content: impl Into<String>) -> Self {
        Self::error(StatusCode::OK, content)
    }

    /// Plain-text response with any status.
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status)
            .header("Content-Type", "text/plain")
            .body(message.into())
    }

    /// Append a header, keeping earlier values of the same name.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Set the response body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// First value of a header.
    pub fn get_header(&self, key: &str) -> Option<&str> {
        first_header(&self.headers, key)
    }

    /// Every value of a header, e.g. all `set-cookie` lines.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        all_headers(&self.headers, key)
    }

    /// Body as text if present.
    pub fn text_body(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_appends() {
        let response = HostingResponse::new(StatusCode::OK)
            .header("set-cookie", "a=1")
            .header("Set-Cookie", "b=2");

        assert_eq!(response.get_all("set-cookie"), vec!["a=1", "b=2"]);
        assert_eq!(response.get_header("SET-COOKIE"), Some("a=1"));
    }

    #[test]
    fn test_error_is_plain_text() {
        let response = HostingResponse::error(StatusCode::BAD_GATEWAY, "down");

        assert_eq!(response.status, StatusCode::BAD_GATEWAY);
        assert_eq!(response.get_header("content-type"), Some("text/plain"));
        assert_eq!(response.text_body(), Some("down".to_string()));
    }
}
