//! Active project resolution.

use crate::error::{HostingError, HostingResult};
use crate::hosting::config::RoutingConfig;

/// Determines which project the hosting emulator serves.
pub trait ProjectResolver: Send + Sync {
    /// Resolve the active project id.
    ///
    /// Fails with [`HostingError::Configuration`] when no project can be
    /// determined.
    fn resolve(&self, config: &RoutingConfig, interactive: bool) -> HostingResult<String>;
}

/// Uses the configured project, then a fallback (e.g. from the environment).
#[derive(Debug, Clone, Default)]
pub struct DefaultProjectResolver {
    fallback: Option<String>,
}

impl DefaultProjectResolver {
    /// Resolver without a fallback project.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver that falls back to the given project.
    pub fn with_fallback(project: impl Into<String>) -> Self {
        Self {
            fallback: Some(project.into()),
        }
    }

    /// Resolver whose fallback is read from an environment variable, if set.
    pub fn from_env(var: &str) -> Self {
        Self {
            fallback: std::env::var(var).ok().filter(|p| !p.is_empty()),
        }
    }
}

impl ProjectResolver for DefaultProjectResolver {
    fn resolve(&self, config: &RoutingConfig, interactive: bool) -> HostingResult<String> {
        if let Some(project) = config.project.as_deref().filter(|p| !p.is_empty()) {
            return Ok(project.to_string());
        }

        if let Some(project) = &self.fallback {
            return Ok(project.clone());
        }

        // Prompting is not supported; interactive callers only get a friendlier hint.
        let hint = if interactive {
            "Set \"project\" in the hosting config to choose one."
        } else {
            "Pass a project explicitly in the hosting config."
        };
        Err(HostingError::configuration(format!(
            "No currently active project. {}",
            hint
        )))
    }
}
