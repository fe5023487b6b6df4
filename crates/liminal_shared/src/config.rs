//! # Facility Configuration
//!
//! Loaded once at startup from TOML. Every key is optional; missing keys
//! fall back to the defaults below.
//!
//! ```toml
//! room_min = -5000
//! room_max = 5000
//! floor_height = 5
//! max_levels = 3
//! wall_height = 4
//! exit_chance = 0.002
//! difficulty_scaling = 1.0
//! enable_light_flicker = true
//! enable_ambient_sounds = true
//! enable_fog_effect = true
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading or validating the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read config {path}: {source}")]
    Io {
        /// Path that was attempted.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or has wrongly-typed keys.
    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The values parse but make no sense together.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Startup configuration of the facility.
///
/// Immutable once loaded; share it behind an `Arc`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FacilityConfig {
    /// Lower containment bound on X and Z (inclusive).
    pub room_min: i32,
    /// Upper containment bound on X and Z (inclusive).
    pub room_max: i32,
    /// Vertical distance between the floors of consecutive levels.
    pub floor_height: i32,
    /// Number of levels (indices `0..max_levels`).
    pub max_levels: u32,
    /// Wall height in voxels, floor and ceiling excluded.
    pub wall_height: i32,
    /// Base probability of an exit voxel per open column.
    pub exit_chance: f64,
    /// Multiplier on ambient hazard probabilities.
    pub difficulty_scaling: f64,
    /// Run the light flicker task.
    pub enable_light_flicker: bool,
    /// Run the ambient sound task.
    pub enable_ambient_sounds: bool,
    /// Run the fog task.
    pub enable_fog_effect: bool,
    /// Seed for gameplay draws. `None` seeds from the clock.
    pub event_seed: Option<u64>,
}

impl Default for FacilityConfig {
    fn default() -> Self {
        Self {
            room_min: -5000,
            room_max: 5000,
            floor_height: 5,
            max_levels: 3,
            wall_height: 4,
            exit_chance: 0.002,
            difficulty_scaling: 1.0,
            enable_light_flicker: true,
            enable_ambient_sounds: true,
            enable_fog_effect: true,
            event_seed: None,
        }
    }
}

impl FacilityConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] for inconsistent values.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise
    /// the errors of [`FacilityConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Checks cross-field consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending key.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.room_min >= self.room_max {
            return Err(ConfigError::Invalid(format!(
                "room_min ({}) must be below room_max ({})",
                self.room_min, self.room_max
            )));
        }
        if self.max_levels == 0 {
            return Err(ConfigError::Invalid("max_levels must be at least 1".into()));
        }
        if self.wall_height < 1 {
            return Err(ConfigError::Invalid(format!(
                "wall_height must be at least 1, got {}",
                self.wall_height
            )));
        }
        if self.floor_height < 0 {
            return Err(ConfigError::Invalid(format!(
                "floor_height must not be negative, got {}",
                self.floor_height
            )));
        }
        if !(0.0..=1.0).contains(&self.exit_chance) {
            return Err(ConfigError::Invalid(format!(
                "exit_chance must lie in [0, 1], got {}",
                self.exit_chance
            )));
        }
        if !(self.difficulty_scaling >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "difficulty_scaling must not be negative, got {}",
                self.difficulty_scaling
            )));
        }
        Ok(())
    }

    /// Index of the deepest level.
    #[must_use]
    pub const fn deepest_level(&self) -> u32 {
        self.max_levels - 1
    }

    /// Returns true if `(x, z)` lies inside the containment square.
    #[must_use]
    pub const fn contains(&self, x: i32, z: i32) -> bool {
        x >= self.room_min && x <= self.room_max && z >= self.room_min && z <= self.room_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = FacilityConfig::from_toml_str("").unwrap();
        assert_eq!(config, FacilityConfig::default());
        assert_eq!(config.deepest_level(), 2);
    }

    #[test]
    fn test_partial_document_overrides() {
        let config = FacilityConfig::from_toml_str(
            "max_levels = 5\nexit_chance = 0.01\nenable_fog_effect = false\nevent_seed = 7\n",
        )
        .unwrap();
        assert_eq!(config.max_levels, 5);
        assert!((config.exit_chance - 0.01).abs() < f64::EPSILON);
        assert!(!config.enable_fog_effect);
        assert_eq!(config.event_seed, Some(7));
        assert_eq!(config.room_max, 5000);
    }

    #[test]
    fn test_rejects_inverted_room() {
        let err = FacilityConfig::from_toml_str("room_min = 10\nroom_max = 10\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_zero_levels_and_bad_chance() {
        assert!(FacilityConfig::from_toml_str("max_levels = 0").is_err());
        assert!(FacilityConfig::from_toml_str("exit_chance = 1.5").is_err());
        assert!(FacilityConfig::from_toml_str("wall_height = 0").is_err());
    }

    #[test]
    fn test_rejects_wrong_types() {
        let err = FacilityConfig::from_toml_str("max_levels = \"three\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = FacilityConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_contains_is_inclusive() {
        let config = FacilityConfig::default();
        assert!(config.contains(5000, -5000));
        assert!(!config.contains(5001, 0));
        assert!(!config.contains(0, -5001));
    }
}
