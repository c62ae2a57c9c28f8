// ABOUTME: Session-scoped memoization of catalogs keyed by canonical installation root
// ABOUTME: Concurrent requests for the same root share one in-flight computation

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use lascss_logging::{debug, info};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::installation::Installation;

type Slot = Arc<OnceCell<Arc<Catalog>>>;

/// Per-installation catalog cache.
///
/// Entries live until [`CatalogCache::clear`] is called. Nothing watches the
/// stylesheets, so edits to them are only seen after clearing.
#[derive(Debug, Default)]
pub struct CatalogCache {
    slots: Mutex<HashMap<PathBuf, Slot>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the catalog for `installation`, building it on first use.
    ///
    /// Failures are returned to the caller and not remembered; the next call
    /// tries again.
    pub fn get_or_load(&self, installation: &Installation) -> Result<Arc<Catalog>> {
        self.get_or_try_init(installation, || {
            installation.check_artifacts()?;
            Catalog::load(installation)
        })
    }

    fn get_or_try_init<F>(&self, installation: &Installation, load: F) -> Result<Arc<Catalog>>
    where
        F: FnOnce() -> Result<Catalog>,
    {
        let key = cache_key(installation);

        // Only the map lookup happens under the lock; the load blocks on the slot
        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(slots.entry(key.clone()).or_default())
        };

        if let Some(catalog) = slot.get() {
            debug!(root = %key.display(), "Catalog cache hit");
            return Ok(Arc::clone(catalog));
        }

        let catalog = slot.get_or_try_init(|| load().map(Arc::new))?;
        Ok(Arc::clone(catalog))
    }

    /// Drop every cached catalog.
    pub fn clear(&self) {
        let mut slots = self.slots.lock();
        let dropped = slots.len();
        slots.clear();
        info!(dropped, "Catalog cache cleared");
    }

    /// Number of installations with a completed catalog.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn cache_key(installation: &Installation) -> PathBuf {
    installation
        .root
        .canonicalize()
        .unwrap_or_else(|_| installation.root.clone())
}
