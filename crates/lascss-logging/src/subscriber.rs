// ABOUTME: Installs the global tracing subscriber behind a reloadable filter
// ABOUTME: Combines the stderr and optional file layers built from LoggingConfig

use anyhow::{Context, Result};
use tracing_subscriber::{
    EnvFilter, Registry, layer::Layered, prelude::*, reload, util::SubscriberInitExt,
};

use crate::config::LoggingConfig;
use crate::layers::{build_layers, create_env_filter};
use crate::reload::LoggingReloadHandle;

type ReloadFiltered = Layered<reload::Layer<EnvFilter, Registry>, Registry>;

/// Initialize the global tracing subscriber with hot-reload support.
///
/// Returns a LoggingReloadHandle that can be used to update log levels at runtime.
pub fn init_subscriber_with_reload(config: LoggingConfig) -> Result<LoggingReloadHandle> {
    let env_filter = create_env_filter(&config).context("Failed to create environment filter")?;
    let (filter_layer, filter_handle) = reload::Layer::new(env_filter);
    let layers = build_layers::<ReloadFiltered>(&config)?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(layers)
        .try_init()
        .context("Failed to install global tracing subscriber")?;

    tracing::info!(
        log_level = %config.level.0,
        format = ?config.format,
        log_file = ?config.file,
        "LASCSS logging initialized"
    );
    Ok(LoggingReloadHandle::new(filter_handle, config))
}
