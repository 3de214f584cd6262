//! Hosting emulator: rewrite matching, project resolution and the
//! local/live functions dispatch.

mod config;
pub mod functions_proxy;
mod project;
mod rewrite;
mod server;

pub use config::{HostingConfig, RoutingConfig};
pub use functions_proxy::{resolve_backend, BackendKind, FunctionsProxy, ResolvedBackend};
pub use project::{DefaultProjectResolver, ProjectResolver};
pub use rewrite::{Rewrite, RewriteRule, RewriteTable, DEFAULT_REGION};
pub use server::HostingServer;
