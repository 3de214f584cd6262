//! Local/live dispatch for function rewrites.
//!
//! A rewrite names a function and a region. When the `functions` target was
//! requested *and* the functions emulator is currently running, requests go
//! to the emulator; otherwise they go to the deployed function:
//!
//! ```text
//! live:  https://{region}-{project}.cloudfunctions.net/{function}
//! local: FunctionsEmulator::http_function_url(host, port, project, function, region)
//! ```
//!
//! The registry is consulted on every resolution, so an emulator that starts
//! or stops after the router was built is picked up by the next handler.
//!
//! Only the region named by the rewrite is considered; there is no fallback
//! to other regions the emulator may be serving.

use crate::emulator::{EmulatorLookup, Emulators, FunctionsEmulator};
use crate::error::HostingResult;
use crate::hosting::config::RoutingConfig;
use crate::hosting::project::{DefaultProjectResolver, ProjectResolver};
use crate::hosting::rewrite::RewriteRule;
use crate::proxy::ProxyBuilder;
use std::sync::Arc;
use tracing::debug;

/// Where a rewrite is dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// The locally running functions emulator.
    Local,
    /// The deployed production function.
    Live,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Local => "local",
            BackendKind::Live => "live",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of resolving one rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBackend {
    /// Whether the backend is local or live.
    pub kind: BackendKind,
    /// URL requests are forwarded to.
    pub url: String,
    /// Diagnostic label, e.g. `local Function us-central1/api`.
    pub label: String,
}

/// Resolve the backend for a rewrite.
///
/// Performs exactly one registry lookup, and only when the `functions`
/// target is set. Project resolution failures are returned unchanged.
pub fn resolve_backend(
    rewrite: &RewriteRule,
    config: &RoutingConfig,
    emulators: &dyn EmulatorLookup,
    projects: &dyn ProjectResolver,
) -> HostingResult<ResolvedBackend> {
    let project_id = projects.resolve(config, false)?;

    let mut kind = BackendKind::Live;
    let mut url = format!(
        "https://{}-{}.cloudfunctions.net/{}",
        rewrite.region, project_id, rewrite.function
    );

    if config.has_target(Emulators::Functions.as_str()) {
        if let Some(info) = emulators.get(Emulators::Functions) {
            kind = BackendKind::Local;
            url = FunctionsEmulator::http_function_url(
                &info.host,
                info.port,
                &project_id,
                &rewrite.function,
                &rewrite.region,
            );
        }
    }

    let label = format!("{} Function {}/{}", kind, rewrite.region, rewrite.function);
    debug!(
        function = %rewrite.function,
        region = %rewrite.region,
        dest = %kind,
        "Resolved function rewrite to {}",
        url
    );

    Ok(ResolvedBackend { kind, url, label })
}

/// Produces request handlers for function rewrites.
///
/// The routing config, registry handle and proxy builder are captured once;
/// every call to [`FunctionsProxy::handler`] resolves afresh.
pub struct FunctionsProxy<P> {
    config: RoutingConfig,
    emulators: Arc<dyn EmulatorLookup>,
    projects: Arc<dyn ProjectResolver>,
    proxy: P,
}

impl<P: ProxyBuilder> FunctionsProxy<P> {
    /// Create a factory using the [`DefaultProjectResolver`].
    pub fn new(config: RoutingConfig, emulators: Arc<dyn EmulatorLookup>, proxy: P) -> Self {
        Self {
            config,
            emulators,
            projects: Arc::new(DefaultProjectResolver::new()),
            proxy,
        }
    }

    /// Replace the project resolver.
    pub fn with_project_resolver(mut self, projects: Arc<dyn ProjectResolver>) -> Self {
        self.projects = projects;
        self
    }

    /// The routing config captured at construction.
    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Resolve the backend a rewrite currently dispatches to.
    pub fn resolve(&self, rewrite: &RewriteRule) -> HostingResult<ResolvedBackend> {
        resolve_backend(
            rewrite,
            &self.config,
            self.emulators.as_ref(),
            self.projects.as_ref(),
        )
    }

    /// Build a handler for a rewrite, bound to its current backend.
    pub fn handler(&self, rewrite: &RewriteRule) -> HostingResult<P::Handler> {
        let backend = self.resolve(rewrite)?;
        Ok(self.proxy.build(&backend.url, &backend.label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::{EmulatorInfo, EmulatorRegistry};
    use crate::error::HostingError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Proxy builder that just records what it was asked to build.
    struct RecordingProxy;

    impl ProxyBuilder for RecordingProxy {
        type Handler = (String, String);

        fn build(&self, target_url: &str, label: &str) -> (String, String) {
            (target_url.to_string(), label.to_string())
        }
    }

    /// Lookup that counts how often it is consulted.
    #[derive(Default)]
    struct CountingLookup {
        calls: AtomicUsize,
    }

    impl EmulatorLookup for CountingLookup {
        fn get(&self, _kind: Emulators) -> Option<EmulatorInfo> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Some(EmulatorInfo::new(Emulators::Functions, "localhost", 5001))
        }
    }

    fn rule() -> RewriteRule {
        RewriteRule::new("api", "us-central1")
    }

    fn running_functions() -> EmulatorRegistry {
        let registry = EmulatorRegistry::new();
        registry
            .register(EmulatorInfo::new(Emulators::Functions, "localhost", 5001))
            .unwrap();
        registry
    }

    #[test]
    fn test_live_without_functions_target() {
        let config = RoutingConfig::new(5000).project("demo");
        let backend = resolve_backend(
            &rule(),
            &config,
            &running_functions(),
            &DefaultProjectResolver::new(),
        )
        .unwrap();

        assert_eq!(backend.kind, BackendKind::Live);
        assert_eq!(backend.url, "https://us-central1-demo.cloudfunctions.net/api");
        assert_eq!(backend.label, "live Function us-central1/api");
    }

    #[test]
    fn test_registry_not_consulted_without_functions_target() {
        let lookup = CountingLookup::default();
        let config = RoutingConfig::new(5000).project("demo").target("hosting");

        resolve_backend(&rule(), &config, &lookup, &DefaultProjectResolver::new()).unwrap();

        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_live_when_emulator_not_running() {
        let config = RoutingConfig::new(5000).project("demo").target("functions");
        let backend = resolve_backend(
            &rule(),
            &config,
            &EmulatorRegistry::new(),
            &DefaultProjectResolver::new(),
        )
        .unwrap();

        assert_eq!(backend.kind, BackendKind::Live);
        assert_eq!(backend.url, "https://us-central1-demo.cloudfunctions.net/api");
        assert_eq!(backend.label, "live Function us-central1/api");
    }

    #[test]
    fn test_local_when_emulator_running() {
        let lookup = CountingLookup::default();
        let config = RoutingConfig::new(5000).project("demo").target("functions");
        let backend =
            resolve_backend(&rule(), &config, &lookup, &DefaultProjectResolver::new()).unwrap();

        assert_eq!(backend.kind, BackendKind::Local);
        assert_eq!(
            backend.url,
            FunctionsEmulator::http_function_url("localhost", 5001, "demo", "api", "us-central1")
        );
        assert_eq!(backend.label, "local Function us-central1/api");
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_project_error_propagates() {
        let config = RoutingConfig::new(5000).target("functions");
        let result = resolve_backend(
            &rule(),
            &config,
            &running_functions(),
            &DefaultProjectResolver::new(),
        );

        assert!(matches!(result, Err(HostingError::Configuration(_))));
    }

    #[test]
    fn test_factory_builds_with_resolved_backend() {
        let registry = Arc::new(running_functions());
        let proxy = FunctionsProxy::new(
            RoutingConfig::new(5000).project("demo").target("functions"),
            registry,
            RecordingProxy,
        );

        let (url, label) = proxy.handler(&RewriteRule::new("hello", "europe-west1")).unwrap();

        assert_eq!(url, "http://localhost:5001/demo/europe-west1/hello");
        assert_eq!(label, "local Function europe-west1/hello");
    }

    #[test]
    fn test_factory_uses_injected_project_resolver() {
        let proxy = FunctionsProxy::new(
            RoutingConfig::new(5000),
            Arc::new(EmulatorRegistry::new()),
            RecordingProxy,
        )
        .with_project_resolver(Arc::new(DefaultProjectResolver::with_fallback("env-project")));

        let (url, _) = proxy.handler(&rule()).unwrap();

        assert_eq!(url, "https://us-central1-env-project.cloudfunctions.net/api");
    }

    #[test]
    fn test_backend_kind_display() {
        assert_eq!(BackendKind::Local.to_string(), "local");
        assert_eq!(BackendKind::Live.to_string(), "live");
    }
}
