//! Registry of running emulators, keyed by emulator kind.

use crate::error::{HostingError, HostingResult};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Kinds of emulators that can run alongside the hosting emulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emulators {
    Functions,
    Firestore,
    Database,
    Hosting,
    PubSub,
    Auth,
}

impl Emulators {
    /// Target name used in `--only`-style target lists.
    pub fn as_str(&self) -> &'static str {
        match self {
            Emulators::Functions => "functions",
            Emulators::Firestore => "firestore",
            Emulators::Database => "database",
            Emulators::Hosting => "hosting",
            Emulators::PubSub => "pubsub",
            Emulators::Auth => "auth",
        }
    }
}

impl std::fmt::Display for Emulators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address of a running emulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmulatorInfo {
    /// Which emulator this is.
    pub name: Emulators,
    /// Host the emulator listens on.
    pub host: String,
    /// Port the emulator listens on.
    pub port: u16,
}

impl EmulatorInfo {
    /// Create a new emulator info.
    pub fn new(name: Emulators, host: impl Into<String>, port: u16) -> Self {
        Self {
            name,
            host: host.into(),
            port,
        }
    }
}

/// Read-only view of the running emulators.
///
/// Lookups are synchronous and never fail: `None` means "not running".
pub trait EmulatorLookup: Send + Sync {
    /// Get the running emulator of the given kind, if any.
    fn get(&self, kind: Emulators) -> Option<EmulatorInfo>;
}

/// In-memory registry of running emulators.
#[derive(Debug, Default)]
pub struct EmulatorRegistry {
    running: RwLock<HashMap<Emulators, EmulatorInfo>>,
}

impl EmulatorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an emulator as running.
    pub fn register(&self, info: EmulatorInfo) -> HostingResult<()> {
        let mut running = self.running.write();

        if running.contains_key(&info.name) {
            return Err(HostingError::AlreadyRunning(info.name));
        }

        info!(
            emulator = %info.name,
            "Registered emulator at {}:{}",
            info.host,
            info.port
        );
        running.insert(info.name, info);
        Ok(())
    }

    /// Forget a running emulator, returning what was registered.
    pub fn remove(&self, kind: Emulators) -> Option<EmulatorInfo> {
        let removed = self.running.write().remove(&kind);
        match &removed {
            Some(_) => info!(emulator = %kind, "Removed emulator"),
            None => debug!(emulator = %kind, "Emulator was not registered"),
        }
        removed
    }

    /// Check whether an emulator of this kind is running.
    pub fn is_running(&self, kind: Emulators) -> bool {
        self.running.read().contains_key(&kind)
    }

    /// List all running emulators.
    pub fn list(&self) -> Vec<EmulatorInfo> {
        let mut infos: Vec<EmulatorInfo> = self.running.read().values().cloned().collect();
        infos.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));
        infos
    }
}

impl EmulatorLookup for EmulatorRegistry {
    fn get(&self, kind: Emulators) -> Option<EmulatorInfo> {
        self.running.read().get(&kind).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_register_and_get() {
        let registry = EmulatorRegistry::new();
        registry
            .register(EmulatorInfo::new(Emulators::Functions, "localhost", 5001))
            .unwrap();

        let info = registry.get(Emulators::Functions).unwrap();
        assert_eq!(info.host, "localhost");
        assert_eq!(info.port, 5001);
        assert!(registry.is_running(Emulators::Functions));
        assert!(registry.get(Emulators::Firestore).is_none());
    }

    #[test]
    fn test_registry_duplicate_register() {
        let registry = EmulatorRegistry::new();
        let info = EmulatorInfo::new(Emulators::Functions, "localhost", 5001);

        registry.register(info.clone()).unwrap();
        let result = registry.register(info);

        assert!(matches!(
            result,
            Err(HostingError::AlreadyRunning(Emulators::Functions))
        ));
    }

    #[test]
    fn test_registry_remove() {
        let registry = EmulatorRegistry::new();
        registry
            .register(EmulatorInfo::new(Emulators::Functions, "localhost", 5001))
            .unwrap();

        let removed = registry.remove(Emulators::Functions);
        assert_eq!(removed.map(|i| i.port), Some(5001));
        assert!(!registry.is_running(Emulators::Functions));
        assert!(registry.remove(Emulators::Functions).is_none());
    }

    #[test]
    fn test_registry_list_sorted() {
        let registry = EmulatorRegistry::new();
        registry
            .register(EmulatorInfo::new(Emulators::Hosting, "localhost", 5000))
            .unwrap();
        registry
            .register(EmulatorInfo::new(Emulators::Firestore, "localhost", 8080))
            .unwrap();

        let names: Vec<Emulators> = registry.list().into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec![Emulators::Firestore, Emulators::Hosting]);
    }

    #[test]
    fn test_emulator_target_names() {
        assert_eq!(Emulators::Functions.as_str(), "functions");
        assert_eq!(Emulators::PubSub.to_string(), "pubsub");
    }
}
