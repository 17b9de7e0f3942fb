//! Process-scoped adapter selection with an init-once contract.
//!
//! The first successful [`AdapterRegistry::init`] installs an adapter for the
//! rest of the registry's life. Later calls return the installed adapter
//! without re-reading the banner, even if the host would now report a
//! different version; adapters are never swapped.

use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use verdant_world::HostWorld;

use crate::adapter::VersionAdapter;
use crate::error::VersionError;
use crate::revision::Revision;
use crate::version::RuntimeVersion;

static GLOBAL: AdapterRegistry = AdapterRegistry::new();

/// Holds the detected version and the selected adapter.
pub struct AdapterRegistry {
    version: OnceLock<RuntimeVersion>,
    adapter: OnceLock<Arc<dyn VersionAdapter>>,
    /// Serializes concurrent `init` calls.
    init_lock: Mutex<()>,
}

impl AdapterRegistry {
    /// Creates an empty registry. Most code wants [`global`] instead.
    pub const fn new() -> Self {
        Self {
            version: OnceLock::new(),
            adapter: OnceLock::new(),
            init_lock: Mutex::new(()),
        }
    }

    /// Parses the host's banner, caching the first successful result.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::Parse`] if the banner carries no version.
    pub fn detect_version<H: HostWorld + ?Sized>(
        &self,
        host: &H,
    ) -> Result<RuntimeVersion, VersionError> {
        if let Some(version) = self.version.get() {
            return Ok(*version);
        }
        let version = RuntimeVersion::from_banner(&host.version_banner())?;
        Ok(*self.version.get_or_init(|| version))
    }

    /// Maps a version to a freshly built adapter through the revision table.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::Unsupported`] naming the version if no
    /// revision matches.
    pub fn select_adapter(
        version: &RuntimeVersion,
    ) -> Result<Arc<dyn VersionAdapter>, VersionError> {
        Revision::for_version(version)
            .map(Revision::build_adapter)
            .ok_or(VersionError::Unsupported(*version))
    }

    /// Detects the version and installs the matching adapter. A no-op
    /// returning the installed adapter once [`is_ready`](Self::is_ready).
    ///
    /// # Errors
    ///
    /// Propagates [`VersionError`]; nothing is installed on failure.
    pub fn init<H: HostWorld + ?Sized>(
        &self,
        host: &H,
    ) -> Result<Arc<dyn VersionAdapter>, VersionError> {
        if let Some(adapter) = self.adapter.get() {
            return Ok(Arc::clone(adapter));
        }
        let _guard = self.init_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(adapter) = self.adapter.get() {
            return Ok(Arc::clone(adapter));
        }

        let version = self.detect_version(host)?;
        let adapter = Self::select_adapter(&version).inspect_err(|e| {
            tracing::error!("{}", e);
        })?;
        tracing::info!(
            "Host version {} detected, using adapter {}",
            version,
            adapter.revision()
        );
        Ok(Arc::clone(self.adapter.get_or_init(|| adapter)))
    }

    /// Returns `true` once an adapter is installed.
    pub fn is_ready(&self) -> bool {
        self.adapter.get().is_some()
    }

    /// The installed adapter, if any.
    pub fn adapter(&self) -> Option<Arc<dyn VersionAdapter>> {
        self.adapter.get().cloned()
    }

    /// The detected version, if detection has succeeded.
    pub fn version(&self) -> Option<RuntimeVersion> {
        self.version.get().copied()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide registry.
pub fn global() -> &'static AdapterRegistry {
    &GLOBAL
}

/// Startup entry point: selects the process-wide adapter for `host`.
///
/// # Errors
///
/// See [`AdapterRegistry::init`]. Callers must abort startup on error.
pub fn detect_and_select_adapter<H: HostWorld + ?Sized>(
    host: &H,
) -> Result<Arc<dyn VersionAdapter>, VersionError> {
    GLOBAL.init(host)
}

/// Runs `f` with the process-wide adapter if one is installed.
pub fn with_adapter<R>(f: impl FnOnce(&dyn VersionAdapter) -> R) -> Option<R> {
    GLOBAL.adapter.get().map(|adapter| f(&**adapter))
}

#[cfg(test)]
mod tests {
    use verdant_world::MemoryHost;

    use super::*;

    #[test]
    fn test_init_selects_matching_revision() {
        let registry = AdapterRegistry::new();
        assert!(!registry.is_ready());
        let adapter = registry
            .init(&MemoryHost::new("git-Paper-496 (MC: 1.20.4)"))
            .unwrap();
        assert_eq!(adapter.revision(), Revision::V1_20_R3);
        assert!(registry.is_ready());
        assert_eq!(registry.version(), Some(RuntimeVersion::new(1, 20, Some(4))));
    }

    #[test]
    fn test_init_is_idempotent_and_never_swaps() {
        let registry = AdapterRegistry::new();
        registry.init(&MemoryHost::new("(MC: 1.19.2)")).unwrap();
        let again = registry.init(&MemoryHost::new("(MC: 1.21)")).unwrap();
        assert_eq!(again.revision(), Revision::V1_19_R1);
        assert_eq!(registry.version(), Some(RuntimeVersion::new(1, 19, Some(2))));
    }

    #[test]
    fn test_unsupported_version_installs_nothing() {
        let registry = AdapterRegistry::new();
        let err = registry.init(&MemoryHost::new("(MC: 1.18.2)")).unwrap_err();
        assert_eq!(
            err,
            VersionError::Unsupported(RuntimeVersion::new(1, 18, Some(2)))
        );
        assert!(err.to_string().contains("1.18.2"));
        assert!(!registry.is_ready());
        assert!(registry.adapter().is_none());
    }

    #[test]
    fn test_unparseable_banner_fails() {
        let registry = AdapterRegistry::new();
        let err = registry.init(&MemoryHost::new("Bukkit")).unwrap_err();
        assert_eq!(err, VersionError::Parse("Bukkit".to_string()));
        assert_eq!(registry.version(), None);
    }

    #[test]
    fn test_detected_version_is_cached() {
        let registry = AdapterRegistry::new();
        let first = registry
            .detect_version(&MemoryHost::new("(MC: 1.20.6)"))
            .unwrap();
        let second = registry
            .detect_version(&MemoryHost::new("(MC: 1.19)"))
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_select_adapter_is_pure() {
        let a = AdapterRegistry::select_adapter(&RuntimeVersion::new(1, 21, None)).unwrap();
        assert_eq!(a.revision(), Revision::V1_21_R1);
        assert!(AdapterRegistry::select_adapter(&RuntimeVersion::new(1, 22, None)).is_err());
    }

    #[test]
    fn test_global_registry_round_trip() {
        let host = MemoryHost::new("(MC: 1.20.2)");
        let installed = detect_and_select_adapter(&host).unwrap();
        assert!(global().is_ready());
        let seen = with_adapter(|a| a.revision());
        assert_eq!(seen, Some(installed.revision()));
    }
}
