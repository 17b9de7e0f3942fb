//! Scoped mutation windows over the host's write-protected biome catalog.
//!
//! The catalog is frozen whenever no window is open. Opening a window
//! lifts the protection through the active adapter, runs a single action,
//! and re-freezes on every exit path, including early returns and panics.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use verdant_adapter::VersionAdapter;
use verdant_world::{BiomeDescriptor, BiomeEntry, BiomeId, Host, HostCatalog, HostError};

use crate::error::CatalogError;

/// Brackets catalog mutations with unlock / re-freeze.
///
/// Clones share the same window, so at most one window is open per host no
/// matter how many handles exist.
#[derive(Clone)]
pub struct BiomeCatalogGuard {
    host: Arc<dyn Host>,
    adapter: Arc<dyn VersionAdapter>,
    window_open: Arc<AtomicBool>,
}

impl BiomeCatalogGuard {
    /// Creates a guard for `host` using `adapter`'s lock primitive.
    pub fn new(host: Arc<dyn Host>, adapter: Arc<dyn VersionAdapter>) -> Self {
        Self {
            host,
            adapter,
            window_open: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Runs `action` with the catalog unlocked.
    ///
    /// The catalog is frozen again before this returns, whatever the
    /// outcome of `action`.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::AlreadyUnlocked`] if a window is already open.
    /// - [`CatalogError::Unlock`] if the adapter could not lift protection.
    /// - [`CatalogError::Action`] if `action` failed.
    pub fn with_unlocked_catalog<T>(
        &self,
        action: impl FnOnce(&dyn Host) -> Result<T, HostError>,
    ) -> Result<T, CatalogError> {
        if self
            .window_open
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::error!("Rejected nested biome catalog unlock");
            return Err(CatalogError::AlreadyUnlocked);
        }
        let _window = Window { guard: self };

        self.set_locked(false).map_err(CatalogError::Unlock)?;
        tracing::trace!("Biome catalog unlocked");

        action(&*self.host).map_err(CatalogError::Action)
    }

    /// Flips catalog write protection through the adapter, outside any
    /// window. Prefer [`with_unlocked_catalog`](Self::with_unlocked_catalog);
    /// unlocking here leaves the catalog open until it is locked again.
    ///
    /// # Errors
    ///
    /// Propagates the host's refusal.
    pub fn set_locked(&self, locked: bool) -> Result<(), HostError> {
        self.adapter.lock_catalog(&*self.host, locked)
    }

    /// Registers `id`, or replaces its descriptor if already present, inside
    /// a mutation window.
    ///
    /// # Errors
    ///
    /// See [`with_unlocked_catalog`](Self::with_unlocked_catalog).
    pub fn register_or_replace(
        &self,
        id: BiomeId,
        descriptor: BiomeDescriptor,
    ) -> Result<BiomeEntry, CatalogError> {
        let entry = self.with_unlocked_catalog(|host| host.register_biome(id, descriptor))?;
        tracing::info!("Registered biome {} (raw id {})", entry.id(), entry.raw_id());
        Ok(entry)
    }

    /// Resolves `id` against the live catalog. No window is needed.
    pub fn resolve(&self, id: &BiomeId) -> Option<BiomeEntry> {
        self.adapter.resolve_catalog(&*self.host, id)
    }

    /// Returns `true` while a window is open.
    pub fn is_unlocked(&self) -> bool {
        self.window_open.load(Ordering::Acquire)
    }
}

/// Re-freezes the catalog and closes the window on drop.
struct Window<'a> {
    guard: &'a BiomeCatalogGuard,
}

impl Drop for Window<'_> {
    fn drop(&mut self) {
        self.guard.adapter.freeze_catalog(&*self.guard.host);
        self.guard.window_open.store(false, Ordering::Release);
        tracing::trace!("Biome catalog frozen");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
