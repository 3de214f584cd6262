//! # emuroute - function rewrites for a local hosting emulator
//!
//! A hosting emulator serves a site locally and forwards requests that match
//! a *function rewrite* (a source pattern mapped to a function and region) to
//! a function backend. Which backend depends on what is running right now:
//!
//! ```text
//!                  ┌────────────────────────────────┐
//!  GET /api/users →│    Hosting emulator (:5000)    │
//!                  │ RewriteTable → FunctionsProxy  │
//!                  └───────────────┬────────────────┘
//!                                  │ EmulatorRegistry::get(Functions)
//!                ┌─────────────────┴─────────────────┐
//!                ▼ running + "functions" target      ▼ otherwise
//!  http://localhost:5001/{project}/{region}/{fn}
//!                                      https://{region}-{project}.cloudfunctions.net/{fn}
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use emuroute::prelude::*;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), HostingError> {
//!     let registry = Arc::new(EmulatorRegistry::new());
//!     registry.register(EmulatorInfo::new(Emulators::Functions, "localhost", 5001))?;
//!
//!     let config = HostingConfig::new()
//!         .project("demo")
//!         .target("functions")
//!         .rewrite(Rewrite::new("/api/**", RewriteRule::new("api", "us-central1")));
//!
//!     let proxy = HttpProxy::new(Duration::from_secs(config.request_timeout))?;
//!     HostingServer::new(config, registry, proxy).run().await
//! }
//! ```

pub mod emulator;
pub mod error;
pub mod hosting;
pub mod http;
pub mod proxy;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::emulator::{EmulatorInfo, EmulatorLookup, EmulatorRegistry, Emulators};
    pub use crate::error::{HostingError, HostingResult};
    pub use crate::hosting::{
        resolve_backend, BackendKind, DefaultProjectResolver, FunctionsProxy, HostingConfig,
        HostingServer, ProjectResolver, ResolvedBackend, Rewrite, RewriteRule, RoutingConfig,
    };
    pub use crate::http::{HostingRequest, HostingResponse, Method, StatusCode};
    pub use crate::proxy::{HttpProxy, ProxyBuilder, RequestHandler};
}

pub use emulator::{EmulatorRegistry, Emulators};
pub use error::{HostingError, HostingResult};
pub use hosting::{FunctionsProxy, HostingConfig, HostingServer, ResolvedBackend, RewriteRule};
