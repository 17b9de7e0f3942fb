//! Live biome repainting: the catalog guard, the region painter, and the
//! [`BiomeService`] operation surface tying them to observer sync.
//!
//! All painting must happen on the thread that owns the host's world state.

pub mod error;
pub mod guard;
pub mod painter;
pub mod service;

pub use error::{CatalogError, PaintError};
pub use guard::BiomeCatalogGuard;
pub use painter::{PaintReport, RegionBiomePainter};
pub use service::BiomeService;
