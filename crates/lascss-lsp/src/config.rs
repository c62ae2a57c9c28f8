// ABOUTME: Configuration for the LASCSS language server with TOML file and client overrides
// ABOUTME: Layers defaults, the config file, initializationOptions and didChangeConfiguration

use anyhow::{Context, Result};
use lascss_catalog::InstallationLayout;
use lascss_logging::LoggingSettings;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LspConfig {
    pub server: ServerConfig,
    pub installation: InstallationLayout,
    pub completion: CompletionConfig,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
    /// Upper bound on items returned for one completion request.
    pub max_completions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Attribute names whose values hold class lists.
    pub attributes: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "lascss-lsp".to_string(),
            max_completions: 500,
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            attributes: vec!["class".to_string(), "className".to_string()],
        }
    }
}

impl LspConfig {
    /// Defaults, overlaid with the user config file when one exists.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// `<config_dir>/lascss/lascss-lsp.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lascss").join("lascss-lsp.toml"))
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay a partial JSON object of the same shape onto this config.
    ///
    /// Keys absent from `overrides` keep their current values; `null` resets
    /// a value to its default.
    pub fn merge_json(&mut self, overrides: &Value) -> Result<()> {
        if !overrides.is_object() {
            return Ok(());
        }
        let mut merged = serde_json::to_value(&*self)?;
        merge_values(&mut merged, overrides);
        *self = serde_json::from_value(merged).context("Invalid LASCSS settings")?;
        Ok(())
    }

    /// Largest completion list, never zero.
    pub fn max_completions(&self) -> usize {
        self.server.max_completions.max(1)
    }
}

fn merge_values(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                if value.is_null() {
                    // Missing fields deserialize to their defaults
                    base.remove(key);
                    continue;
                }
                match base.get_mut(key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}
