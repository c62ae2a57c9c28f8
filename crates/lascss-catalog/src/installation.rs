// ABOUTME: Locates a LASCSS installation on disk by walking up from a starting directory
// ABOUTME: Resolves the metadata and utility stylesheet paths from a configurable layout

use std::path::{Path, PathBuf};

use lascss_logging::debug;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};

/// Upper bound on ancestors visited while searching for the package directory.
const MAX_ANCESTOR_DEPTH: usize = 64;

/// Where an installation lives and where its generated artifacts sit inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallationLayout {
    /// Explicit installation root. Relative paths are taken from the start directory.
    pub path: Option<PathBuf>,
    /// Package directory searched for in each ancestor.
    pub package_dir: PathBuf,
    /// Metadata stylesheet, relative to the installation root.
    pub meta_stylesheet: PathBuf,
    /// Compiled utility stylesheet, relative to the installation root.
    pub utility_stylesheet: PathBuf,
}

impl Default for InstallationLayout {
    fn default() -> Self {
        Self {
            path: None,
            package_dir: PathBuf::from("node_modules/lascss"),
            meta_stylesheet: PathBuf::from("dist/lascss.meta.css"),
            utility_stylesheet: PathBuf::from("dist/lascss.css"),
        }
    }
}

/// A located installation with its artifact paths resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    pub root: PathBuf,
    pub meta_stylesheet: PathBuf,
    pub utility_stylesheet: PathBuf,
}

impl Installation {
    pub fn new(root: impl Into<PathBuf>, layout: &InstallationLayout) -> Self {
        let root = root.into();
        Self {
            meta_stylesheet: root.join(&layout.meta_stylesheet),
            utility_stylesheet: root.join(&layout.utility_stylesheet),
            root,
        }
    }

    /// Find the installation that serves files under `start_dir`.
    ///
    /// An explicit `layout.path` wins when it is a directory. Otherwise the
    /// nearest ancestor (including `start_dir` itself) containing
    /// `layout.package_dir` is used.
    pub fn locate(start_dir: &Path, layout: &InstallationLayout) -> Result<Self> {
        if let Some(path) = &layout.path {
            let root = if path.is_absolute() {
                path.clone()
            } else {
                start_dir.join(path)
            };
            if root.is_dir() {
                debug!(root = %root.display(), "Using configured installation path");
                return Ok(Self::new(root, layout));
            }
            return Err(CatalogError::installation_not_found(root));
        }

        start_dir
            .ancestors()
            .take(MAX_ANCESTOR_DEPTH)
            .map(|ancestor| ancestor.join(&layout.package_dir))
            .find(|candidate| candidate.is_dir())
            .map(|root| {
                debug!(
                    start = %start_dir.display(),
                    root = %root.display(),
                    "Located installation"
                );
                Self::new(root, layout)
            })
            .ok_or_else(|| CatalogError::installation_not_found(start_dir))
    }

    /// Both stylesheets must exist before the catalog can be built.
    pub fn check_artifacts(&self) -> Result<()> {
        for artifact in [&self.meta_stylesheet, &self.utility_stylesheet] {
            if !artifact.is_file() {
                return Err(CatalogError::artifact_missing(artifact.clone()));
            }
        }
        Ok(())
    }
}
