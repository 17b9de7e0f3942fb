//! Configuration error types.

use verdant_world::BiomeId;

/// Errors from loading, saving, or checking `config.ron`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    ReadError(#[source] std::io::Error),

    #[error("failed to write config: {0}")]
    WriteError(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] ron::Error),

    /// The build height range covers no voxels.
    #[error("invalid build height: min {min} must be below max {max}")]
    EmptyBuildHeight { min: i32, max: i32 },

    /// The same biome is declared twice in `biomes`.
    #[error("biome {0} is declared more than once")]
    DuplicateBiome(BiomeId),
}
