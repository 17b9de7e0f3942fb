//! Configuration structs with defaults and RON persistence.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use verdant_world::{BiomeDescriptor, BiomeId, HeightRange};

use crate::error::ConfigError;

const FILE_NAME: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// The in-process host the demo runs against.
    pub host: HostConfig,
    /// Painting defaults.
    pub painter: PainterConfig,
    /// Observer re-sync queue.
    pub sync: SyncSettings,
    /// Debug/development settings.
    pub debug: DebugConfig,
    /// Custom biomes registered at startup, in order.
    pub biomes: Vec<BiomeDefinition>,
}

/// Host settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HostConfig {
    /// Version banner the host announces, e.g. `"git-Paper-196 (MC: 1.20.4)"`.
    pub version_banner: String,
    /// Name of the world to create.
    pub world: String,
    /// Lowest buildable Y (inclusive).
    pub min_build_height: i32,
    /// Build height limit (exclusive).
    pub max_build_height: i32,
    /// Observer view distance in chunks.
    pub view_distance: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PainterConfig {
    /// Whether painting calls re-sync observers unless told otherwise.
    pub update_observers: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SyncSettings {
    /// Maximum distinct columns waiting for the sync worker.
    pub queue_capacity: usize,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

/// A custom biome to register: identifier plus its opaque descriptor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BiomeDefinition {
    /// `namespace:key`; a bare key lands in `minecraft`.
    pub id: BiomeId,
    #[serde(default)]
    pub descriptor: BiomeDescriptor,
}

// --- Default implementations ---

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            version_banner: "git-Paper-196 (MC: 1.20.4)".to_string(),
            world: "world".to_string(),
            min_build_height: -64,
            max_build_height: 320,
            view_distance: 10,
        }
    }
}

impl HostConfig {
    /// The configured build height as a half-open range.
    pub fn build_height(&self) -> HeightRange {
        HeightRange::new(self.min_build_height, self.max_build_height)
    }
}

impl Default for PainterConfig {
    fn default() -> Self {
        Self {
            update_observers: true,
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(FILE_NAME);

        if config_path.exists() {
            let config = Self::read(config_dir)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(FILE_NAME), serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Re-reads the file: `Some(new_config)` if it changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(config_dir)?;
        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    fn read(config_dir: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(config_dir.join(FILE_NAME)).map_err(ConfigError::ReadError)?;
        let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the service cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.build_height().is_empty() {
            return Err(ConfigError::EmptyBuildHeight {
                min: self.host.min_build_height,
                max: self.host.max_build_height,
            });
        }
        let mut seen = HashSet::new();
        for biome in &self.biomes {
            if !seen.insert(&biome.id) {
                return Err(ConfigError::DuplicateBiome(biome.id.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(4))
                .unwrap();
        assert!(ron_str.contains("min_build_height: -64"));
        assert!(ron_str.contains("queue_capacity: 1024"));
    }

    #[test]
    fn test_missing_field_uses_default() {
        let config: Config = ron::from_str("(host: (world: \"w1\"))").unwrap();
        assert_eq!(config.host.world, "w1");
        assert_eq!(config.host.max_build_height, 320);
        assert_eq!(config.sync, SyncSettings::default());
        assert!(config.biomes.is_empty());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_biome_definitions_parse() {
        let ron_str = r#"(
            biomes: [
                (id: "custom:crystal_caves", descriptor: (fog_color: 0x8040FF)),
                (id: "ashlands"),
            ],
        )"#;
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.biomes[0].id, BiomeId::new("custom", "crystal_caves"));
        assert_eq!(config.biomes[0].descriptor.fog_color, 0x8040FF);
        assert_eq!(config.biomes[1].id, BiomeId::new("minecraft", "ashlands"));
        assert_eq!(config.biomes[1].descriptor, BiomeDescriptor::default());
    }

    #[test]
    fn test_malformed_biome_id_fails_to_parse() {
        let result: Result<Config, _> = ron::from_str("(biomes: [(id: \"custom:\")])");
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.host.version_banner = "(MC: 1.19.2)".to_string();
        config.painter.update_observers = false;
        config.biomes.push(BiomeDefinition {
            id: BiomeId::new("custom", "crystal_caves"),
            descriptor: BiomeDescriptor::default(),
        });

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join(FILE_NAME).exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());

        let mut modified = config.clone();
        modified.sync.queue_capacity = 16;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().sync.queue_capacity, 16);
    }

    #[test]
    fn test_validate_rejects_empty_height() {
        let mut config = Config::default();
        config.host.min_build_height = 100;
        config.host.max_build_height = 100;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyBuildHeight { min: 100, max: 100 })
        ));
    }

    #[test]
    fn test_load_rejects_duplicate_biomes() {
        let dir = tempfile::tempdir().unwrap();
        let ron_str = "(biomes: [(id: \"custom:a\"), (id: \"custom:a\")])";
        std::fs::write(dir.path().join(FILE_NAME), ron_str).unwrap();
        let err = Config::load_or_create(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateBiome(id) if id == BiomeId::new("custom", "a")));
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(FILE_NAME), "{{not valid}}").unwrap();
        assert!(matches!(
            Config::load_or_create(dir.path()),
            Err(ConfigError::ParseError(_))
        ));
    }
}
