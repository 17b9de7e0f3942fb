//! Version adapters: one implementation of the low-level biome mutation
//! primitives per supported host revision, selected once at startup from the
//! host's version banner.

pub mod adapter;
pub mod error;
pub mod registry;
pub mod revision;
pub mod v1_19;
pub mod v1_20;
pub mod v1_21;
pub mod version;

pub use adapter::VersionAdapter;
pub use error::VersionError;
pub use registry::{AdapterRegistry, detect_and_select_adapter, global, with_adapter};
pub use revision::{Family, Revision};
pub use version::RuntimeVersion;
