//! emuroute - hosting emulator front door.
//!
//! Environment:
//! - `EMUROUTE_CONFIG`: path to a JSON hosting config (defaults are used if unset)
//! - `EMUROUTE_PROJECT`: project used when the config does not name one
//! - `FUNCTIONS_EMULATOR_HOST`: `host:port` of a running functions emulator

use emuroute::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Parse `host:port`, allowing a bracketed IPv6 host.
fn parse_host_port(value: &str) -> Option<(String, u16)> {
    let (host, port) = value.rsplit_once(':')?;
    let port = port.parse().ok()?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        return None;
    }
    Some((host.to_string(), port))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::var("EMUROUTE_CONFIG") {
        Ok(path) => {
            tracing::info!("Loading hosting config from {}", path);
            HostingConfig::load(path)?
        }
        Err(_) => HostingConfig::new(),
    };

    let registry = Arc::new(EmulatorRegistry::new());
    if let Ok(addr) = std::env::var("FUNCTIONS_EMULATOR_HOST") {
        match parse_host_port(&addr) {
            Some((host, port)) => {
                registry.register(EmulatorInfo::new(Emulators::Functions, host, port))?;
            }
            None => tracing::warn!("Ignoring malformed FUNCTIONS_EMULATOR_HOST: {}", addr),
        }
    }

    for rewrite in &config.rewrites {
        tracing::info!(
            "Rewrite {} -> function {}/{}",
            rewrite.source,
            rewrite.rule.region,
            rewrite.rule.function
        );
    }

    let proxy = HttpProxy::new(Duration::from_secs(config.request_timeout))?;
    let server = HostingServer::new(config, registry, proxy)
        .with_project_resolver(Arc::new(DefaultProjectResolver::from_env("EMUROUTE_PROJECT")));

    tokio::select! {
        res = server.run() => res?,
        _ = tokio::signal::ctrl_c() => tracing::info!("Shutdown signal received"),
    }

    Ok(())
}
