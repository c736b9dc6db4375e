//! Configuration loading and typed config structures for Coinfield.
//!
//! The configuration lives in `coinfield-config.yaml`. Every field has a
//! default, so an empty file (or no file at all) yields a playable world
//! centered on the default start position.

use std::path::{Path, PathBuf};

use coinfield_types::LatLng;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is outside its allowed range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level game configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GameConfig {
    /// Grid and generation settings.
    #[serde(default)]
    pub world: WorldConfig,

    /// Persistence settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl GameConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `COINFIELD_STORAGE_DIR` overrides `storage.directory`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.storage.apply_env_overrides();
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let world = &self.world;
        if !(world.tile_width.is_finite() && world.tile_width > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "world.tile_width must be positive and finite, got {}",
                world.tile_width
            )));
        }
        if !(0.0..=1.0).contains(&world.spawn_probability) {
            return Err(ConfigError::Invalid(format!(
                "world.spawn_probability must be within [0, 1], got {}",
                world.spawn_probability
            )));
        }
        if world.max_coins_per_cache == 0 {
            return Err(ConfigError::Invalid(
                "world.max_coins_per_cache must be at least 1".to_owned(),
            ));
        }
        if world.visibility_radius == 0 {
            return Err(ConfigError::Invalid(
                "world.visibility_radius must be at least 1".to_owned(),
            ));
        }
        if !world.start.is_finite() {
            return Err(ConfigError::Invalid(
                "world.start must be a finite coordinate".to_owned(),
            ));
        }
        if self.storage.slot.is_empty() {
            return Err(ConfigError::Invalid("storage.slot must not be empty".to_owned()));
        }
        Ok(())
    }
}

/// Grid and cache generation settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldConfig {
    /// Cell edge length in degrees.
    #[serde(default = "default_tile_width")]
    pub tile_width: f64,

    /// Half-width, in cells, of the square of cells visible around the player.
    #[serde(default = "default_visibility_radius")]
    pub visibility_radius: u32,

    /// Probability that a given cell holds a cache.
    #[serde(default = "default_spawn_probability")]
    pub spawn_probability: f64,

    /// Upper bound on coins in a freshly generated cache.
    #[serde(default = "default_max_coins_per_cache")]
    pub max_coins_per_cache: u32,

    /// Distance in cells the player may walk from the registry anchor before
    /// the canonical-cell registry is cleared.
    #[serde(default = "default_registry_reset_distance")]
    pub registry_reset_distance: u32,

    /// Player position for a new game.
    #[serde(default = "default_start")]
    pub start: LatLng,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            tile_width: default_tile_width(),
            visibility_radius: default_visibility_radius(),
            spawn_probability: default_spawn_probability(),
            max_coins_per_cache: default_max_coins_per_cache(),
            registry_reset_distance: default_registry_reset_distance(),
            start: default_start(),
        }
    }
}

/// Persistence settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the save slots.
    #[serde(default = "default_storage_directory")]
    pub directory: PathBuf,

    /// Key of the slot holding the serialized session.
    #[serde(default = "default_slot")]
    pub slot: String,
}

impl StorageConfig {
    /// Apply environment variable overrides (`COINFIELD_STORAGE_DIR`).
    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("COINFIELD_STORAGE_DIR") {
            self.directory = PathBuf::from(dir);
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            directory: default_storage_directory(),
            slot: default_slot(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

const fn default_tile_width() -> f64 {
    1e-4
}
const fn default_visibility_radius() -> u32 {
    8
}
const fn default_spawn_probability() -> f64 {
    0.1
}
const fn default_max_coins_per_cache() -> u32 {
    5
}
const fn default_registry_reset_distance() -> u32 {
    64
}
const fn default_start() -> LatLng {
    LatLng::new(36.989_67, -122.062_83)
}
fn default_storage_directory() -> PathBuf {
    PathBuf::from(".coinfield")
}
fn default_slot() -> String {
    "gameState".to_owned()
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_gives_defaults() {
        let config = GameConfig::parse("{}");
        assert!(config.is_ok());
        let config = config.unwrap_or_default();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.world.tile_width, 1e-4);
        assert_eq!(config.world.visibility_radius, 8);
        assert_eq!(config.world.max_coins_per_cache, 5);
        assert_eq!(config.storage.slot, "gameState");
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let yaml = "world:\n  spawn_probability: 0.25\n  start: { lat: 1.5, lng: -2.5 }\n";
        let config = GameConfig::parse(yaml).unwrap_or_default();
        assert_eq!(config.world.spawn_probability, 0.25);
        assert_eq!(config.world.start, LatLng::new(1.5, -2.5));
        assert_eq!(config.world.max_coins_per_cache, 5);
    }

    #[test]
    fn rejects_non_positive_tile_width() {
        let result = GameConfig::parse("world:\n  tile_width: 0.0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_probability_above_one() {
        let result = GameConfig::parse("world:\n  spawn_probability: 1.5\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_zero_max_coins() {
        let result = GameConfig::parse("world:\n  max_coins_per_cache: 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_malformed_yaml() {
        let result = GameConfig::parse("world: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = GameConfig::from_file(Path::new("/nonexistent/coinfield-config.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
