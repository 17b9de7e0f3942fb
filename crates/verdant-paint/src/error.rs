//! Error types for catalog mutation and painting.

use verdant_world::{BiomeId, HostError, WorldId};

/// Failures of a guarded catalog mutation window.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Another unlock window is already open. Windows neither nest nor
    /// overlap; this is a caller bug.
    #[error("biome catalog is already unlocked by another operation")]
    AlreadyUnlocked,

    /// The host refused to lift write protection.
    #[error("failed to unlock biome catalog: {0}")]
    Unlock(#[source] HostError),

    /// The action run inside the window failed. The catalog was re-frozen.
    #[error("biome catalog mutation failed: {0}")]
    Action(#[source] HostError),
}

/// Per-call painting failures. Nothing is written when one is returned.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PaintError {
    /// The identifier does not resolve in the live catalog.
    #[error("biome {0} is not registered")]
    BiomeNotFound(BiomeId),

    /// Region corners were given in two different worlds.
    #[error("region corners are in different worlds ({from} and {to})")]
    CrossWorld { from: WorldId, to: WorldId },

    /// The target world does not exist on the host.
    #[error("world {0} does not exist")]
    UnknownWorld(WorldId),
}
