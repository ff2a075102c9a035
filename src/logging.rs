//! Console logging for the CLI.
//!
//! The subscriber is installed before the configuration is read, so messages
//! from config loading are not lost. Its filter is swapped for the configured
//! level afterwards unless RUST_LOG or `--verbose` already decided it.

use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry};

const STARTUP_LEVEL: &str = "info";

pub type LogHandle = reload::Handle<EnvFilter, Registry>;

/// Filter used until the configuration is known
pub fn startup_directive(verbose: bool, rust_log: Option<&str>) -> String {
    match rust_log {
        Some(directive) if !directive.trim().is_empty() => directive.to_string(),
        _ if verbose => "debug".to_string(),
        _ => STARTUP_LEVEL.to_string(),
    }
}

/// Filter to switch to once the configuration is loaded, if any
pub fn configured_directive(verbose: bool, rust_log: Option<&str>, log_level: &str) -> Option<String> {
    let env_set = rust_log.map_or(false, |d| !d.trim().is_empty());
    if verbose || env_set {
        None
    } else {
        Some(log_level.to_string())
    }
}

pub fn init(verbose: bool) -> LogHandle {
    let rust_log = std::env::var("RUST_LOG").ok();
    let directive = startup_directive(verbose, rust_log.as_deref());
    let (filter, handle) = reload::Layer::new(EnvFilter::new(directive));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .init();

    handle
}

/// Applies the configured level to an installed subscriber.
pub fn apply_config_level(handle: &LogHandle, verbose: bool, log_level: &str) {
    let rust_log = std::env::var("RUST_LOG").ok();
    if let Some(directive) = configured_directive(verbose, rust_log.as_deref(), log_level) {
        if let Err(e) = handle.reload(EnvFilter::new(&directive)) {
            warn!("Failed to apply log level {:?}: {}", directive, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_directive() {
        assert_eq!(startup_directive(false, None), "info");
        assert_eq!(startup_directive(true, None), "debug");
        assert_eq!(startup_directive(true, Some("warn")), "warn");
        assert_eq!(startup_directive(false, Some("  ")), "info");
    }

    #[test]
    fn test_config_level_applies_only_without_overrides() {
        assert_eq!(configured_directive(false, None, "warn").as_deref(), Some("warn"));
        assert_eq!(configured_directive(true, None, "warn"), None);
        assert_eq!(configured_directive(false, Some("debug"), "warn"), None);
        assert_eq!(configured_directive(false, Some(""), "error").as_deref(), Some("error"));
    }

    #[test]
    fn test_reload_handle_swaps_filter() {
        // Not installed globally; only the handle is exercised.
        let (layer, handle): (reload::Layer<EnvFilter, Registry>, LogHandle) =
            reload::Layer::new(EnvFilter::new("info"));
        let _subscriber = tracing_subscriber::registry().with(layer);
        apply_config_level(&handle, true, "error");
        assert!(handle.reload(EnvFilter::new("error")).is_ok());
    }
}
