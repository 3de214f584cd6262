//! Function rewrites: which request paths are served by which function.

use serde::{Deserialize, Serialize};

/// Region a rewrite targets when none is configured.
pub const DEFAULT_REGION: &str = "us-central1";

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

/// The function a matched request is dispatched to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRule {
    /// Function name.
    pub function: String,
    /// Region the function is deployed in.
    #[serde(default = "default_region")]
    pub region: String,
}

impl RewriteRule {
    /// Create a rewrite rule.
    pub fn new(function: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            region: region.into(),
        }
    }
}

/// A source pattern paired with the function it rewrites to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewrite {
    /// Path pattern (e.g. `/api/**`, `/users/:id`, `/exact`).
    pub source: String,
    #[serde(flatten)]
    pub rule: RewriteRule,
}

impl Rewrite {
    /// Create a rewrite.
    pub fn new(source: impl Into<String>, rule: RewriteRule) -> Self {
        Self {
            source: source.into(),
            rule,
        }
    }

    /// Check if this rewrite's source matches the given path.
    pub fn matches(&self, path: &str) -> bool {
        let source = self.source.as_str();

        if source == "**" {
            return true;
        }

        if let Some(prefix) = source.strip_suffix("/**") {
            return prefix.is_empty()
                || path == prefix
                || path
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('/'));
        }

        if let Some(prefix) = source.strip_suffix("/*") {
            return path
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix('/'))
                .is_some_and(|segment| !segment.is_empty() && !segment.contains('/'));
        }

        if source.contains(':') {
            let source_segments: Vec<&str> = source.split('/').collect();
            let path_segments: Vec<&str> = path.split('/').collect();

            if source_segments.len() != path_segments.len() {
                return false;
            }

            return source_segments
                .iter()
                .zip(path_segments.iter())
                .all(|(s, p)| (s.starts_with(':') && !p.is_empty()) || s == p);
        }

        source == path
    }
}

/// Ordered rewrites; the first matching source wins.
#[derive(Debug, Clone, Default)]
pub struct RewriteTable {
    rewrites: Vec<Rewrite>,
}

impl RewriteTable {
    /// Create a table from rewrites in match order.
    pub fn new(rewrites: Vec<Rewrite>) -> Self {
        Self { rewrites }
    }

    /// Find the first rewrite matching the path.
    pub fn find(&self, path: &str) -> Option<&Rewrite> {
        self.rewrites.iter().find(|r| r.matches(path))
    }

    /// Number of rewrites.
    pub fn len(&self) -> usize {
        self.rewrites.len()
    }

    /// Whether the table has no rewrites.
    pub fn is_empty(&self) -> bool {
        self.rewrites.is_empty()
    }
}
