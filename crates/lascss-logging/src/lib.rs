// ABOUTME: Logging for the LASCSS language server and catalog built on tracing
// ABOUTME: Installs the stderr/file subscriber and exposes runtime level updates

pub mod config;
pub mod layers;
pub mod performance;
pub mod reload;
pub mod subscriber;

// Re-export tracing macros for convenience
pub use tracing::{Level, debug, error, field, info, span, trace, warn};

use std::sync::OnceLock;

pub use config::{LogFormat, LogLevel, LoggingConfig, LoggingSettings, parse_log_level};
pub use reload::LoggingReloadHandle;
pub use subscriber::init_subscriber_with_reload;
pub use performance::{PerfStats, PerfTimer};

use anyhow::Result;

/// Global reload handle for runtime log level updates
static GLOBAL_RELOAD_HANDLE: OnceLock<LoggingReloadHandle> = OnceLock::new();

/// Initialize logging with hot-reload support using custom configuration.
///
/// The handle is also stored globally so configuration changes arriving over
/// the protocol can adjust the level without threading it through the server.
pub fn init_logging_with_reload(config: LoggingConfig) -> Result<LoggingReloadHandle> {
    let handle = init_subscriber_with_reload(config)?;
    let _ = GLOBAL_RELOAD_HANDLE.set(handle.clone());
    Ok(handle)
}

/// Update log level at runtime using the global reload handle.
pub fn update_log_level(level: Level) -> Result<()> {
    match GLOBAL_RELOAD_HANDLE.get() {
        Some(handle) => handle.update_log_level(level),
        None => anyhow::bail!("Logging not initialized with reload support"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_without_reload_handle_fails() {
        // Tests never install the global handle
        assert!(update_log_level(Level::DEBUG).is_err());
    }
}
