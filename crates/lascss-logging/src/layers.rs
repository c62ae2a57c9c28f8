// ABOUTME: Output layers for the language server: stderr in one of three formats plus an optional file
// ABOUTME: Also builds the env filter that the reload handle swaps at runtime

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::Subscriber;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    registry::LookupSpan,
};

use crate::config::{LogFormat, LoggingConfig};

pub type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Stderr layer. Stdout carries the language server protocol.
pub fn create_stderr_layer<S>(format: LogFormat) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true);

    match format {
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Pretty => layer.with_span_events(FmtSpan::CLOSE).pretty().boxed(),
        LogFormat::Json => layer
            .json()
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
    }
}

/// Plain-text file layer with daily rotation.
pub fn create_file_layer<S>(path: &Path) -> Result<BoxedLayer<S>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .context("Invalid log file path")?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create log directory: {}", directory.display()))?;

    let (writer, guard) = non_blocking(rolling::daily(directory, file_name));

    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .boxed();

    // The writer must outlive every log call in the process.
    std::mem::forget(guard);

    Ok(layer)
}

/// Every output layer the configuration asks for.
pub fn build_layers<S>(config: &LoggingConfig) -> Result<Vec<BoxedLayer<S>>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let mut layers = vec![create_stderr_layer(config.format)];
    if let Some(path) = &config.file {
        layers.push(create_file_layer(path)?);
    }
    Ok(layers)
}

pub fn create_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let mut filter = EnvFilter::new(config.level.0.to_string());
    for (target, level) in &config.module_levels {
        let directive = format!("{target}={}", level.0)
            .parse()
            .with_context(|| format!("Invalid filter directive for '{target}'"))?;
        filter = filter.add_directive(directive);
    }
    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;
    use tempfile::tempdir;
    use tracing::Level;
    use tracing_subscriber::Registry;

    #[test]
    fn test_file_layer_creates_directory() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("logs").join("lascss-lsp.log");

        assert!(create_file_layer::<Registry>(&path).is_ok());
        assert!(temp_dir.path().join("logs").is_dir());
    }

    #[test]
    fn test_build_layers_adds_file_only_when_configured() {
        let mut config = LoggingConfig {
            format: LogFormat::Json,
            ..Default::default()
        };
        assert_eq!(build_layers::<Registry>(&config).unwrap().len(), 1);

        let temp_dir = tempdir().unwrap();
        config.file = Some(temp_dir.path().join("lascss-lsp.log"));
        assert_eq!(build_layers::<Registry>(&config).unwrap().len(), 2);
    }

    #[test]
    fn test_create_env_filter() {
        let mut config = LoggingConfig {
            level: LogLevel(Level::DEBUG),
            ..Default::default()
        };
        config
            .module_levels
            .insert("lascss_catalog".to_string(), LogLevel(Level::TRACE));

        let rendered = create_env_filter(&config).unwrap().to_string();
        assert!(rendered.contains("lascss_catalog=trace"));
        assert!(rendered.contains("debug"));
    }
}
