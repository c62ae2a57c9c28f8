// ABOUTME: Error types for locating a LASCSS installation and loading its stylesheets
// ABOUTME: Only I/O-facing failures live here; catalog generation itself never fails

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Cannot locate the LASCSS installation from {start}")]
    InstallationNotFound { start: PathBuf },

    #[error("LASCSS installation found but required stylesheet is missing: {path}")]
    ArtifactMissing { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CatalogError {
    pub fn installation_not_found(start: impl Into<PathBuf>) -> Self {
        Self::InstallationNotFound {
            start: start.into(),
        }
    }

    pub fn artifact_missing(path: impl Into<PathBuf>) -> Self {
        Self::ArtifactMissing { path: path.into() }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Stable identity of the underlying cause, used to report each distinct
    /// problem to the user only once.
    pub fn cause_key(&self) -> String {
        match self {
            // Every document under the same tree hits the same missing install,
            // but the start directory varies, so the kind alone is the key.
            Self::InstallationNotFound { .. } => "installation-not-found".to_string(),
            Self::ArtifactMissing { path } => format!("artifact-missing:{}", path.display()),
            Self::Io { path, .. } => format!("io:{}", path.display()),
        }
    }

    /// Whether this failure should be surfaced to the user rather than only logged.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::InstallationNotFound { .. } | Self::ArtifactMissing { .. }
        )
    }
}
