//! Hosting emulator configuration.

use crate::error::{HostingError, HostingResult};
use crate::hosting::rewrite::Rewrite;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Options the functions dispatch reads when resolving a rewrite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Port the hosting emulator listens on.
    pub port: u16,
    /// Explicitly selected project, if any.
    #[serde(default)]
    pub project: Option<String>,
    /// Emulator targets the user asked to run (e.g. `functions`).
    #[serde(default)]
    pub targets: BTreeSet<String>,
}

impl RoutingConfig {
    /// Create a routing config with no project and no targets.
    pub fn new(port: u16) -> Self {
        Self {
            port,
            ..Self::default()
        }
    }

    /// Set the project.
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Add a target.
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.targets.insert(target.into());
        self
    }

    /// Check whether a target was requested.
    pub fn has_target(&self, target: &str) -> bool {
        self.targets.contains(target)
    }
}

/// Configuration for the hosting emulator server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostingConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Explicitly selected project.
    pub project: Option<String>,
    /// Emulator targets to route locally when they are running.
    pub targets: BTreeSet<String>,
    /// Function rewrites, in match order.
    pub rewrites: Vec<Rewrite>,
    /// Upstream request timeout in seconds.
    pub request_timeout: u64,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for HostingConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            project: None,
            targets: BTreeSet::new(),
            rewrites: Vec::new(),
            request_timeout: 60,
            max_body_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

impl HostingConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON config document.
    pub fn from_json_str(json: &str) -> HostingResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| HostingError::configuration(format!("Invalid hosting config: {}", e)))
    }

    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> HostingResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            HostingError::configuration(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    /// Set the host address.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the project.
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Add an emulator target.
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.targets.insert(target.into());
        self
    }

    /// Append a rewrite.
    pub fn rewrite(mut self, rewrite: Rewrite) -> Self {
        self.rewrites.push(rewrite);
        self
    }

    /// Set the upstream request timeout in seconds.
    pub fn request_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout = seconds;
        self
    }

    /// Get the bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The subset of options the functions dispatch needs.
    pub fn routing(&self) -> RoutingConfig {
        RoutingConfig {
            port: self.port,
            project: self.project.clone(),
            targets: self.targets.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hosting_config_from_json() {
        let config = HostingConfig::from_json_str(
            r#"{
                "port": 5005,
                "project": "demo",
                "targets": ["functions", "hosting"],
                "rewrites": [
                    { "source": "/api/**", "function": "api" },
                    { "source": "/eu", "function": "eu", "region": "europe-west1" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5005);
        assert_eq!(config.request_timeout, 60);
        assert_eq!(config.rewrites.len(), 2);
        assert_eq!(config.rewrites[0].rule.region, "us-central1");
        assert_eq!(config.rewrites[1].rule.region, "europe-west1");

        let routing = config.routing();
        assert_eq!(routing.port, 5005);
        assert_eq!(routing.project.as_deref(), Some("demo"));
        assert!(routing.has_target("functions"));
    }

    #[test]
    fn test_hosting_config_invalid_json() {
        let result = HostingConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(HostingError::Configuration(_))));
    }

    #[test]
    fn test_hosting_config_missing_file() {
        let result = HostingConfig::load("/nonexistent/emuroute.json");
        assert!(matches!(result, Err(HostingError::Configuration(_))));
    }

    #[test]
    fn test_routing_config_builder() {
        let routing = RoutingConfig::new(5000).project("demo").target("functions");

        assert_eq!(routing.port, 5000);
        assert_eq!(routing.project.as_deref(), Some("demo"));
        assert!(routing.has_target("functions"));
        assert!(!routing.has_target("firestore"));
    }

    #[test]
    fn test_bind_addr() {
        let config = HostingConfig::new().host("0.0.0.0").port(8080);
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }
}
