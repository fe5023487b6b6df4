//! # Level Profiles
//!
//! Everything the generator needs to know about one level, derived once
//! from the configuration and immutable afterwards.
//!
//! Levels fall into three strata:
//!
//! | stratum      | levels | walls                        | feel                     |
//! |--------------|--------|------------------------------|--------------------------|
//! | `Lobby`      | 0      | 8-grid, 15% gaps             | the classic yellow rooms |
//! | `Decay`      | 1      | 7-grid, noise-flipped, 30%   | darker, damaged          |
//! | `Overgrowth` | 2+     | 6-grid, joint noise, 40%     | abandoned, flooded       |

use liminal_shared::FacilityConfig;

use crate::chunk::Material;

/// Y of the level 0 floor.
pub const BASE_ELEVATION: i32 = 60;

/// Structural family of a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Stratum {
    /// Level 0.
    Lobby = 0,
    /// Level 1.
    Decay = 1,
    /// Level 2 and below.
    Overgrowth = 2,
}

impl Stratum {
    /// Stratum of a level index.
    #[must_use]
    pub const fn of(level: u32) -> Self {
        match level {
            0 => Self::Lobby,
            1 => Self::Decay,
            _ => Self::Overgrowth,
        }
    }

    /// Materials as `(floor, wall, ceiling, light)`.
    #[must_use]
    pub const fn palette(self) -> Palette {
        match self {
            Self::Lobby => Palette {
                floor: Material::YELLOW_CONCRETE,
                wall: Material::YELLOW_TERRACOTTA,
                ceiling: Material::YELLOW_STAINED_GLASS,
                light: Material::GLOWSTONE,
            },
            Self::Decay => Palette {
                floor: Material::YELLOW_TERRACOTTA,
                wall: Material::YELLOW_CONCRETE,
                ceiling: Material::YELLOW_WOOL,
                light: Material::REDSTONE_LAMP,
            },
            Self::Overgrowth => Palette {
                floor: Material::YELLOW_CONCRETE_POWDER,
                wall: Material::STRIPPED_BIRCH_WOOD,
                ceiling: Material::BIRCH_PLANKS,
                light: Material::LANTERN,
            },
        }
    }

    /// Grid period of the wall lattice. Shrinks with depth.
    #[must_use]
    pub const fn wall_period(self) -> i32 {
        match self {
            Self::Lobby => 8,
            Self::Decay => 7,
            Self::Overgrowth => 6,
        }
    }

    /// Probability that a wall column has crumbled away.
    #[must_use]
    pub const fn erosion_chance(self) -> f64 {
        match self {
            Self::Lobby => 0.15,
            Self::Decay => 0.3,
            Self::Overgrowth => 0.4,
        }
    }

    /// Whether the two noise samples invert the wall lattice here.
    #[must_use]
    pub fn noise_inverts(self, n1: f64, n2: f64) -> bool {
        match self {
            Self::Lobby => false,
            Self::Decay => n1 > 0.65 || n2 > 0.65,
            Self::Overgrowth => (n1 > 0.6 && n2 > 0.3) || (n2 > 0.6 && n1 > 0.3),
        }
    }

    /// Whether the column sits on the ceiling light lattice.
    ///
    /// The deep stratum additionally gates each fixture with a draw, which
    /// [`Stratum::light_gate`] reports.
    #[must_use]
    pub const fn on_light_lattice(self, abs_x: i32, abs_z: i32) -> bool {
        match self {
            Self::Lobby => abs_x % 8 == 4 && abs_z % 8 == 4,
            Self::Decay => abs_x % 7 == 3 && abs_z % 7 == 3,
            Self::Overgrowth => abs_x % 6 == 3 && abs_z % 6 == 3,
        }
    }

    /// Probability a lattice light is actually installed, if gated.
    #[must_use]
    pub const fn light_gate(self) -> Option<f64> {
        match self {
            Self::Lobby | Self::Decay => None,
            Self::Overgrowth => Some(0.7),
        }
    }

    /// Short label, for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Lobby => "lobby",
            Self::Decay => "decay",
            Self::Overgrowth => "overgrowth",
        }
    }
}

/// Per-level materials.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    /// Floor layer.
    pub floor: Material,
    /// Wall columns.
    pub wall: Material,
    /// Ceiling layer.
    pub ceiling: Material,
    /// Ceiling light fixtures.
    pub light: Material,
}

/// Geometry, materials and probabilities of one level.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelProfile {
    /// Level index.
    pub level: u32,
    /// Structural family.
    pub stratum: Stratum,
    /// Materials.
    pub palette: Palette,
    /// Y of the floor layer.
    pub base_y: i32,
    /// Wall height between floor and ceiling.
    pub wall_height: i32,
    /// Whether stairs-down may be generated (false on the deepest level).
    pub has_stairs: bool,
    /// Per-column exit probability on this level.
    pub exit_chance: f64,
    /// Per-column stairs probability on this level.
    pub stairs_chance: f64,
    /// Per-column probability of entering the floor-damage branch.
    pub damage_chance: f64,
}

impl LevelProfile {
    /// Derives the profile of `level` from the configuration.
    ///
    /// # Panics
    ///
    /// Panics if `level >= config.max_levels`. Asking for a level that does
    /// not exist is a caller bug.
    #[must_use]
    pub fn new(level: u32, config: &FacilityConfig) -> Self {
        assert!(
            level < config.max_levels,
            "level {level} out of range (max_levels = {})",
            config.max_levels
        );
        let stratum = Stratum::of(level);

        Self {
            level,
            stratum,
            palette: stratum.palette(),
            base_y: BASE_ELEVATION + level as i32 * config.floor_height,
            wall_height: config.wall_height,
            has_stairs: level < config.deepest_level(),
            exit_chance: config.exit_chance / f64::from(level + 1),
            stairs_chance: config.exit_chance / 3.0,
            damage_chance: 0.05 * f64::from(level),
        }
    }

    /// Y of the ceiling layer.
    #[must_use]
    pub const fn ceiling_y(&self) -> i32 {
        self.base_y + self.wall_height + 1
    }

    /// Y a player stands at: one above the floor.
    #[must_use]
    pub const fn standing_y(&self) -> i32 {
        self.base_y + 1
    }

    /// Number of voxel layers a chunk of this level stores.
    #[must_use]
    pub const fn band_height(&self) -> usize {
        (self.wall_height + 2) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_defaults() {
        let config = FacilityConfig::default();
        let lobby = LevelProfile::new(0, &config);
        let deep = LevelProfile::new(2, &config);

        assert_eq!(lobby.base_y, 60);
        assert_eq!(lobby.ceiling_y(), 65);
        assert_eq!(lobby.standing_y(), 61);
        assert_eq!(lobby.band_height(), 6);
        assert_eq!(deep.base_y, 70);
        assert_eq!(deep.stratum, Stratum::Overgrowth);
    }

    #[test]
    fn test_stairs_only_above_deepest() {
        let config = FacilityConfig::default();
        assert!(LevelProfile::new(0, &config).has_stairs);
        assert!(LevelProfile::new(1, &config).has_stairs);
        assert!(!LevelProfile::new(2, &config).has_stairs);

        let single = FacilityConfig { max_levels: 1, ..FacilityConfig::default() };
        assert!(!LevelProfile::new(0, &single).has_stairs);
    }

    #[test]
    fn test_probabilities_scale_with_depth() {
        let config = FacilityConfig::default();
        let l0 = LevelProfile::new(0, &config);
        let l2 = LevelProfile::new(2, &config);

        assert!((l0.exit_chance - 0.002).abs() < 1e-12);
        assert!((l2.exit_chance - 0.002 / 3.0).abs() < 1e-12);
        assert!(l0.damage_chance.abs() < f64::EPSILON);
        assert!((l2.damage_chance - 0.1).abs() < 1e-12);
        assert!(Stratum::Lobby.erosion_chance() < Stratum::Overgrowth.erosion_chance());
        assert!(Stratum::Lobby.wall_period() > Stratum::Overgrowth.wall_period());
    }

    #[test]
    fn test_deeper_levels_reuse_deep_stratum() {
        assert_eq!(Stratum::of(7), Stratum::Overgrowth);
    }

    #[test]
    fn test_noise_inversion_rules() {
        assert!(!Stratum::Lobby.noise_inverts(1.0, 1.0));
        assert!(Stratum::Decay.noise_inverts(0.7, -1.0));
        assert!(!Stratum::Decay.noise_inverts(0.6, 0.6));
        assert!(Stratum::Overgrowth.noise_inverts(0.61, 0.31));
        assert!(!Stratum::Overgrowth.noise_inverts(0.9, 0.2));
    }

    #[test]
    fn test_light_lattice_uses_truncating_remainder() {
        assert!(Stratum::Lobby.on_light_lattice(4, 12));
        // -4 % 8 == -4 in two's-complement truncation: no light there
        assert!(!Stratum::Lobby.on_light_lattice(-4, 4));
        assert!(Stratum::Decay.on_light_lattice(10, 3));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_invalid_level_is_contract_violation() {
        let _ = LevelProfile::new(3, &FacilityConfig::default());
    }
}
