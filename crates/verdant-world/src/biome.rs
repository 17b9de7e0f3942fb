//! Biome identifiers, descriptors, and resolved catalog entries.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Namespace assumed when an identifier is written without one.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

// ---------------------------------------------------------------------------
// BiomeId
// ---------------------------------------------------------------------------

/// Namespaced biome identifier (`namespace:key`), compared by value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BiomeId {
    namespace: String,
    key: String,
}

/// Errors produced when parsing a [`BiomeId`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BiomeIdError {
    /// The namespace part was empty (e.g. `":crystal_caves"`).
    #[error("biome id `{0}` has an empty namespace")]
    EmptyNamespace(String),
    /// The key part was empty (e.g. `"custom:"`).
    #[error("biome id `{0}` has an empty key")]
    EmptyKey(String),
}

impl BiomeId {
    /// Builds an id from its two parts without validation.
    pub fn new(namespace: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
        }
    }

    /// The namespace part.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The key (path) part.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for BiomeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.key)
    }
}

impl FromStr for BiomeId {
    type Err = BiomeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, key) = s.split_once(':').unwrap_or((DEFAULT_NAMESPACE, s));
        if namespace.is_empty() {
            return Err(BiomeIdError::EmptyNamespace(s.to_string()));
        }
        if key.is_empty() {
            return Err(BiomeIdError::EmptyKey(s.to_string()));
        }
        Ok(Self::new(namespace, key))
    }
}

impl TryFrom<String> for BiomeId {
    type Error = BiomeIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BiomeId> for String {
    fn from(id: BiomeId) -> Self {
        id.to_string()
    }
}

// ---------------------------------------------------------------------------
// BiomeDescriptor
// ---------------------------------------------------------------------------

/// Visual and climate properties of a custom biome.
///
/// Treated as opaque by the repaint pipeline; only the host interprets it.
/// Colors are packed `0xRRGGBB`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomeDescriptor {
    pub fog_color: u32,
    pub water_color: u32,
    pub water_fog_color: u32,
    pub sky_color: u32,
    /// Overrides the temperature-derived foliage tint when set.
    pub foliage_color: Option<u32>,
    /// Overrides the temperature-derived grass tint when set.
    pub grass_color: Option<u32>,
    pub temperature: f32,
    pub downfall: f32,
    pub has_precipitation: bool,
}

impl Default for BiomeDescriptor {
    fn default() -> Self {
        Self {
            fog_color: 0xC0D8FF,
            water_color: 0x3F76E4,
            water_fog_color: 0x050533,
            sky_color: 0x78A7FF,
            foliage_color: None,
            grass_color: None,
            temperature: 0.8,
            downfall: 0.4,
            has_precipitation: true,
        }
    }
}

// ---------------------------------------------------------------------------
// BiomeEntry
// ---------------------------------------------------------------------------

/// A biome resolved against the live catalog.
///
/// `raw_id` is the host's compact index for the biome and is what biome grid
/// cells actually store.
#[derive(Clone, Debug)]
pub struct BiomeEntry {
    id: BiomeId,
    raw_id: u32,
    descriptor: Arc<BiomeDescriptor>,
}

impl BiomeEntry {
    /// Creates an entry. Called by hosts when registering or resolving.
    pub fn new(id: BiomeId, raw_id: u32, descriptor: Arc<BiomeDescriptor>) -> Self {
        Self {
            id,
            raw_id,
            descriptor,
        }
    }

    /// The identifier this entry was registered under.
    pub fn id(&self) -> &BiomeId {
        &self.id
    }

    /// The host's compact index for this biome.
    pub fn raw_id(&self) -> u32 {
        self.raw_id
    }

    /// The descriptor the biome was registered with.
    pub fn descriptor(&self) -> &BiomeDescriptor {
        &self.descriptor
    }
}

impl PartialEq for BiomeEntry {
    fn eq(&self, other: &Self) -> bool {
        self.raw_id == other.raw_id && self.id == other.id
    }
}

impl Eq for BiomeEntry {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
