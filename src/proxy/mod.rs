//! Reverse-proxy seam between rewrite dispatch and the HTTP transport.
//!
//! Dispatch only decides *where* a request goes; a [`ProxyBuilder`] turns
//! that decision into a handler, and the handler does the forwarding.

mod forward;

use crate::http::{HostingRequest, HostingResponse};
use async_trait::async_trait;

pub use forward::{HttpProxy, ProxyRequestHandler};

/// Builds request handlers bound to a target URL.
pub trait ProxyBuilder: Send + Sync {
    /// Handler type produced for each target.
    type Handler: Send + Sync;

    /// Build a handler that forwards to `target_url`, tagging diagnostics
    /// with `label`.
    fn build(&self, target_url: &str, label: &str) -> Self::Handler;
}

/// Handles a request that matched a rewrite.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// Serve the request. Transport failures become error responses.
    async fn handle(&self, request: HostingRequest) -> HostingResponse;

    /// URL requests are forwarded to.
    fn target(&self) -> &str;

    /// Human-readable description of the destination.
    fn label(&self) -> &str;
}
