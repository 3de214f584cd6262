//! Hosting emulator HTTP server.

use crate::emulator::EmulatorRegistry;
use crate::error::HostingResult;
use crate::hosting::config::HostingConfig;
use crate::hosting::functions_proxy::FunctionsProxy;
use crate::hosting::project::ProjectResolver;
use crate::hosting::rewrite::RewriteTable;
use crate::http::{HostingRequest, HostingResponse, StatusCode};
use crate::proxy::{ProxyBuilder, RequestHandler};
use bytes::Bytes;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// Paths under this prefix are served by the emulator itself and never
/// reach a rewrite, like the reserved `/__/` namespace of deployed hosting.
pub const RESERVED_PREFIX: &str = "/__/";

/// Hosting emulator server.
///
/// Requests matching a function rewrite are forwarded to the backend that
/// rewrite resolves to at the time the request arrives. Diagnostics live
/// under [`RESERVED_PREFIX`]: `/__/health` and `/__/emulators`.
pub struct HostingServer<P> {
    config: HostingConfig,
    rewrites: RewriteTable,
    registry: Arc<EmulatorRegistry>,
    functions: FunctionsProxy<P>,
}

impl<P> HostingServer<P>
where
    P: ProxyBuilder + 'static,
    P::Handler: RequestHandler + 'static,
{
    /// Create a server reading running emulators from `registry`.
    pub fn new(config: HostingConfig, registry: Arc<EmulatorRegistry>, proxy: P) -> Self {
        let rewrites = RewriteTable::new(config.rewrites.clone());
        let functions = FunctionsProxy::new(config.routing(), registry.clone(), proxy);
        Self {
            config,
            rewrites,
            registry,
            functions,
        }
    }

    /// Replace the project resolver used for function rewrites.
    pub fn with_project_resolver(mut self, projects: Arc<dyn ProjectResolver>) -> Self {
        self.functions = self.functions.with_project_resolver(projects);
        self
    }

    /// Server configuration.
    pub fn config(&self) -> &HostingConfig {
        &self.config
    }

    /// Bind to the configured address and serve until an accept error.
    pub async fn run(self) -> HostingResult<()> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        self.serve(listener).await
    }

    /// Serve connections from an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> HostingResult<()> {
        info!(
            "Hosting emulator listening on {} ({} rewrites)",
            listener.local_addr()?,
            self.rewrites.len()
        );

        let server = Arc::new(self);

        loop {
            let (stream, remote_addr) = listener.accept().await?;
            let io = TokioIo::new(stream);
            let server = server.clone();

            tokio::task::spawn(async move {
                let service = service_fn(move |req| {
                    let server = server.clone();
                    async move { server.handle_request(req, remote_addr).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    error!("Error serving connection: {:?}", err);
                }
            });
        }
    }

    /// Route a request to a rewrite handler.
    pub async fn dispatch(&self, request: HostingRequest) -> HostingResponse {
        let path = request.path().to_string();

        if let Some(reserved) = path.strip_prefix(RESERVED_PREFIX) {
            return match reserved {
                "health" => HostingResponse::text("OK"),
                "emulators" => HostingResponse::json(&self.registry.list())
                    .unwrap_or_else(|_| HostingResponse::text("[]")),
                _ => HostingResponse::error(StatusCode::NOT_FOUND, "Not Found\n"),
            };
        }

        let Some(rewrite) = self.rewrites.find(&path) else {
            return HostingResponse::error(StatusCode::NOT_FOUND, "Not Found\n");
        };

        // Resolved per request so emulator start/stop is observed.
        match self.functions.handler(&rewrite.rule) {
            Ok(handler) => {
                debug!(
                    dest = %handler.label(),
                    "{} {} -> {}",
                    request.method,
                    path,
                    handler.target()
                );
                handler.handle(request).await
            }
            Err(e) => {
                error!(
                    function = %rewrite.rule.function,
                    region = %rewrite.rule.region,
                    "Cannot serve rewrite: {}",
                    e
                );
                e.into()
            }
        }
    }

    async fn handle_request(
        &self,
        req: Request<Incoming>,
        remote_addr: SocketAddr,
    ) -> Result<Response<Full<Bytes>>, hyper::Error> {
        debug!("Handling request: {} {} from {}", req.method(), req.uri(), remote_addr);

        let request = match convert_request(req, self.config.max_body_size).await {
            Ok(request) => request,
            Err(message) => {
                warn!("Failed to read request: {}", message);
                return Ok(build_response(HostingResponse::error(
                    StatusCode::PAYLOAD_TOO_LARGE,
                    message,
                )));
            }
        };

        Ok(build_response(self.dispatch(request).await))
    }
}

/// Convert a hyper request into a [`HostingRequest`].
async fn convert_request(
    req: Request<Incoming>,
    max_body_size: usize,
) -> Result<HostingRequest, String> {
    let method = req.method().clone();
    let url = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    let headers = req
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    let body_bytes = Limited::new(req.into_body(), max_body_size)
        .collect()
        .await
        .map_err(|e| format!("Request body rejected: {}", e))?
        .to_bytes();
    let body = if body_bytes.is_empty() {
        None
    } else {
        Some(body_bytes)
    };

    Ok(HostingRequest {
        method,
        url,
        headers,
        body,
    })
}

/// Build a hyper response from a [`HostingResponse`].
fn build_response(response: HostingResponse) -> Response<Full<Bytes>> {
    let status = response.status;

    // `header` appends, so repeated names such as set-cookie are kept.
    let mut builder = Response::builder().status(status);
    for (name, value) in response.headers {
        if name.eq_ignore_ascii_case("content-length") {
            continue;
        }
        builder = builder.header(name, value);
    }

    let body = response.body.unwrap_or_default();
    builder.body(Full::new(body.clone())).unwrap_or_else(|e| {
        warn!("Dropping invalid response headers: {}", e);
        let mut fallback = Response::new(Full::new(body));
        *fallback.status_mut() = status;
        fallback
    })
}
