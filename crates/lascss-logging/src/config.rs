// ABOUTME: Logging settings from the server config file plus environment overrides
// ABOUTME: Resolves level, stderr format and optional log file into one LoggingConfig

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use tracing::Level;

/// A `tracing::Level` that reads and writes as its lowercase name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLevel(pub Level);

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel(Level::INFO)
    }
}

impl Serialize for LogLevel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let name = match self.0 {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        serializer.serialize_str(name)
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> Result<LogLevel, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_log_level(&s)
            .map(LogLevel)
            .map_err(serde::de::Error::custom)
    }
}

impl From<Level> for LogLevel {
    fn from(level: Level) -> Self {
        LogLevel(level)
    }
}

/// How events are rendered on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => anyhow::bail!("Invalid log format: {name}. Must be one of: compact, pretty, json"),
        }
    }
}

/// The `[logging]` section of the server configuration.
///
/// Every field is optional; unset fields fall back to [`LoggingConfig::default`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: Option<LogLevel>,
    pub format: Option<LogFormat>,
    /// Also write to this file, rotated daily.
    pub file: Option<PathBuf>,
}

/// Fully resolved logging setup used to build the subscriber.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: LogLevel,
    /// Per-target overrides, as given by `RUST_LOG` directives.
    pub module_levels: BTreeMap<String, LogLevel>,
    pub format: LogFormat,
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    pub fn from_settings(settings: &LoggingSettings) -> Self {
        Self {
            level: settings.level.unwrap_or_default(),
            module_levels: BTreeMap::new(),
            format: settings.format.unwrap_or_default(),
            file: settings.file.clone(),
        }
    }

    /// Apply `LASCSS_LOG`, `RUST_LOG`, `LASCSS_LOG_FORMAT` and `LASCSS_LOG_FILE`.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    pub(crate) fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<()> {
        // LASCSS_LOG wins over RUST_LOG
        if let Some(level) = lookup("LASCSS_LOG") {
            self.level = LogLevel(parse_log_level(&level).context("Invalid LASCSS_LOG level")?);
        } else if let Some(directives) = lookup("RUST_LOG") {
            self.parse_rust_log(&directives)?;
        }

        if let Some(format) = lookup("LASCSS_LOG_FORMAT") {
            self.format = LogFormat::parse(&format).context("Invalid LASCSS_LOG_FORMAT")?;
        }
        if let Some(path) = lookup("LASCSS_LOG_FILE").filter(|path| !path.trim().is_empty()) {
            self.file = Some(PathBuf::from(path));
        }
        Ok(())
    }

    /// Parse RUST_LOG format (e.g. "debug" or "lascss_catalog=debug,info").
    fn parse_rust_log(&mut self, rust_log: &str) -> Result<()> {
        for directive in rust_log.split(',').map(str::trim) {
            if directive.is_empty() {
                continue;
            }

            if let Some((target, level)) = directive.split_once('=') {
                let level = parse_log_level(level)
                    .with_context(|| format!("Invalid log level '{level}' for '{target}'"))?;
                self.module_levels.insert(target.to_string(), LogLevel(level));
            } else {
                self.level = LogLevel(
                    parse_log_level(directive)
                        .with_context(|| format!("Invalid global log level '{directive}'"))?,
                );
            }
        }
        Ok(())
    }
}

/// Parse a log level string (case-insensitive).
pub fn parse_log_level(level_str: &str) -> Result<Level> {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "Invalid log level: {level_str}. Must be one of: trace, debug, info, warn, error"
        ),
    }
}
