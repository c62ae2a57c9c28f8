// ABOUTME: Runtime log level reloading driven by workspace/didChangeConfiguration
// ABOUTME: Rebuilds the env filter from the tracked config and swaps it into the subscriber

use anyhow::{Context, Result};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, Registry, reload};

use crate::config::LoggingConfig;
use crate::layers::create_env_filter;

/// Handle for updating the log level at runtime
#[derive(Clone)]
pub struct LoggingReloadHandle {
    filter_handle: reload::Handle<EnvFilter, Registry>,
    current_config: Arc<RwLock<LoggingConfig>>,
}

impl LoggingReloadHandle {
    pub fn new(filter_handle: reload::Handle<EnvFilter, Registry>, config: LoggingConfig) -> Self {
        Self {
            filter_handle,
            current_config: Arc::new(RwLock::new(config)),
        }
    }

    /// Update the global log level; per-target directives are kept.
    pub fn update_log_level(&self, level: tracing::Level) -> Result<()> {
        let mut config = self.current_config.write();
        if config.level.0 == level {
            return Ok(());
        }

        let new_filter = create_env_filter(&LoggingConfig {
            level: level.into(),
            ..config.clone()
        })
        .context("Failed to create new environment filter")?;
        self.filter_handle
            .reload(new_filter)
            .context("Failed to reload log filter")?;
        config.level = level.into();

        tracing::info!(new_level = %level, "Log level updated at runtime");
        Ok(())
    }
}
