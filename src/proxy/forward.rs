//! HTTP forwarding to the resolved backend.

use crate::error::{HostingError, HostingResult};
use crate::http::{HostingRequest, HostingResponse};
use crate::proxy::{ProxyBuilder, RequestHandler};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, error};

/// Headers that only make sense for a single hop.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// The only cookie passed through to functions.
const SESSION_COOKIE: &str = "__session";

fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.iter().any(|h| name.eq_ignore_ascii_case(h))
}

/// Keep only the `__session` cookie from a `Cookie` header value.
fn session_cookie(cookies: &str) -> Option<String> {
    cookies
        .split(';')
        .map(str::trim)
        .find(|c| {
            c.split_once('=')
                .is_some_and(|(name, _)| name.trim() == SESSION_COOKIE)
        })
        .map(str::to_string)
}

/// Headers sent upstream for a request.
fn forwarded_headers(request: &HostingRequest) -> Vec<(String, String)> {
    let mut headers = Vec::with_capacity(request.headers.len() + 1);

    for (name, value) in &request.headers {
        if is_hop_by_hop(name)
            || name.eq_ignore_ascii_case("host")
            || name.eq_ignore_ascii_case("content-length")
        {
            continue;
        }

        if name.eq_ignore_ascii_case("cookie") {
            if let Some(cookie) = session_cookie(value) {
                headers.push(("cookie".to_string(), cookie));
            }
            continue;
        }

        headers.push((name.clone(), value.clone()));
    }

    if let Some(host) = request.get_header("host") {
        headers.push(("x-forwarded-host".to_string(), host.to_string()));
    }

    headers
}

/// Builds [`ProxyRequestHandler`]s sharing one HTTP client.
#[derive(Debug, Clone)]
pub struct HttpProxy {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpProxy {
    /// Create a proxy whose upstream requests time out after `timeout`.
    pub fn new(timeout: Duration) -> HostingResult<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| {
                HostingError::configuration(format!("Cannot build HTTP client: {}", e))
            })?;
        Ok(Self { client, timeout })
    }
}

impl ProxyBuilder for HttpProxy {
    type Handler = ProxyRequestHandler;

    fn build(&self, target_url: &str, label: &str) -> ProxyRequestHandler {
        ProxyRequestHandler {
            client: self.client.clone(),
            target: target_url.trim_end_matches('/').to_string(),
            label: label.to_string(),
            timeout: self.timeout,
        }
    }
}

/// Forwards requests to one backend URL.
#[derive(Debug, Clone)]
pub struct ProxyRequestHandler {
    client: reqwest::Client,
    target: String,
    label: String,
    timeout: Duration,
}

impl ProxyRequestHandler {
    /// Full upstream URL for a request: target followed by the original path and query.
    pub fn destination(&self, request: &HostingRequest) -> String {
        if request.url.starts_with('/') {
            format!("{}{}", self.target, request.url)
        } else {
            format!("{}/{}", self.target, request.url)
        }
    }

    async fn forward(&self, request: HostingRequest) -> HostingResult<HostingResponse> {
        let url = self.destination(&request);
        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .timeout(self.timeout);

        for (name, value) in forwarded_headers(&request) {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let upstream = builder.send().await.map_err(|e| self.upstream_error(e))?;
        let mut response = HostingResponse::from_upstream(upstream)
            .await
            .map_err(|e| self.upstream_error(e))?;
        response.headers.retain(|(name, _)| !is_hop_by_hop(name));
        Ok(response)
    }

    fn upstream_error(&self, err: reqwest::Error) -> HostingError {
        if err.is_timeout() {
            HostingError::Timeout(self.timeout.as_secs())
        } else {
            HostingError::Upstream(err.to_string())
        }
    }
}

#[async_trait]
impl RequestHandler for ProxyRequestHandler {
    async fn handle(&self, request: HostingRequest) -> HostingResponse {
        let method = request.method.clone();
        let path = request.url.clone();

        match self.forward(request).await {
            Ok(response) => {
                debug!(
                    dest = %self.label,
                    status = response.status.as_u16(),
                    "{} {} proxied to {}",
                    method,
                    path,
                    self.target
                );
                response
            }
            Err(e) => {
                error!(dest = %self.label, error = %e, "Error proxying {} {}", method, path);
                let message = match &e {
                    HostingError::Timeout(_) => format!("Timed out proxying for {}\n", self.label),
                    _ => format!(
                        "An internal error occurred while proxying for {}\n",
                        self.label
                    ),
                };
                HostingResponse::error(e.status(), message)
            }
        }
    }

    fn target(&self) -> &str {
        &self.target
    }

    fn label(&self) -> &str {
        &self.label
    }
}
