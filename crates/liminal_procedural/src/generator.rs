//! # Terrain Generator
//!
//! Fills one chunk of one level. Per column, in this exact order:
//!
//! 1. floor at `base`, ceiling at `base + wall_height + 1`
//! 2. floor damage (draw `< 0.05 * level`, then `< 0.5`), and in the deep
//!    stratum a flood draw (`< 0.03`) inside the same branch
//! 3. wall decision: grid lattice, noise inversion, erosion draw
//! 4. wall or air from `base + 1` to `base + wall_height`
//! 5. ceiling light on the lattice (deep stratum: gated by a draw)
//! 6. exit draw (`< exit_chance / (level + 1)`)
//! 7. stairs draw (`< exit_chance / 3`), not on the deepest level
//! 8. decorative overlay draw (level 1 lamps, deep mushrooms/cobwebs)
//!
//! Every draw comes from the chunk's own [`ChunkRng`]. The draw order is
//! part of the world format.

use crate::chunk::{Chunk, ChunkCoord, Material, CHUNK_SIZE};
use crate::level::{LevelProfile, Stratum};
use crate::noise::{NoiseSeed, OctaveParams, SimplexNoise};
use crate::rng::ChunkRng;

/// Probability a damaged-floor roll actually crumbles the floor.
const CRUMBLE_CHANCE: f64 = 0.5;
/// Probability a damaged deep floor is flooded.
const FLOOD_CHANCE: f64 = 0.03;
/// Probability of a fallen lamp on a level 1 floor.
const FALLEN_LAMP_CHANCE: f64 = 0.005;
/// Probability of decay growth on a deep floor.
const DECAY_GROWTH_CHANCE: f64 = 0.01;

/// Per-level chunk generator.
///
/// Holds the level profile and its noise field; generation itself is pure
/// and takes `&self`, so one generator serves any number of threads.
pub struct TerrainGenerator {
    profile: LevelProfile,
    noise: SimplexNoise,
    octaves: OctaveParams,
}

impl TerrainGenerator {
    /// Creates the generator for a level.
    #[must_use]
    pub fn new(profile: LevelProfile) -> Self {
        Self {
            noise: SimplexNoise::new(NoiseSeed::for_level(profile.level)),
            octaves: OctaveParams::WALL_PERTURBATION,
            profile,
        }
    }

    /// The level profile this generator builds.
    #[must_use]
    pub const fn profile(&self) -> &LevelProfile {
        &self.profile
    }

    /// Generates a chunk at the given coordinates.
    #[must_use]
    pub fn generate(&self, coord: ChunkCoord) -> Chunk {
        let profile = &self.profile;
        let mut chunk = Chunk::new(profile.level, coord, profile.base_y, profile.band_height());
        let mut rng = ChunkRng::for_chunk(profile.level, coord);

        let world_x = coord.world_x();
        let world_z = coord.world_z();

        // x-major to match the draw order of the world format
        for local_x in 0..CHUNK_SIZE {
            for local_z in 0..CHUNK_SIZE {
                let abs_x = world_x + local_x as i32;
                let abs_z = world_z + local_z as i32;
                self.generate_column(&mut chunk, &mut rng, local_x, local_z, abs_x, abs_z);
            }
        }

        chunk
    }

    /// Decides whether the column at `(abs_x, abs_z)` is a wall.
    ///
    /// Consumes the erosion draw when the lattice (after noise inversion)
    /// says wall.
    fn is_wall(&self, rng: &mut ChunkRng, abs_x: i32, abs_z: i32) -> bool {
        let stratum = self.profile.stratum;
        let period = stratum.wall_period();

        let mut wall = abs_x % period == 0 || abs_z % period == 0;

        let fx = f64::from(abs_x);
        let fz = f64::from(abs_z);
        let n1 = self.noise.sample_octaves(fx, fz, &self.octaves);
        let n2 = self.noise.sample_octaves(fz, fx, &self.octaves);
        if stratum.noise_inverts(n1, n2) {
            wall = !wall;
        }

        if wall && rng.chance(stratum.erosion_chance()) {
            wall = false;
        }

        wall
    }

    fn generate_column(
        &self,
        chunk: &mut Chunk,
        rng: &mut ChunkRng,
        x: usize,
        z: usize,
        abs_x: i32,
        abs_z: i32,
    ) {
        let profile = &self.profile;
        let stratum = profile.stratum;
        let palette = profile.palette;
        let base = profile.base_y;
        let ceiling = profile.ceiling_y();

        chunk.set(x, base, z, palette.floor);
        chunk.set(x, ceiling, z, palette.ceiling);

        if profile.level > 0 && rng.chance(profile.damage_chance) {
            if rng.chance(CRUMBLE_CHANCE) {
                chunk.set(x, base, z, Material::YELLOW_CONCRETE_POWDER);
            }
            if stratum == Stratum::Overgrowth && rng.chance(FLOOD_CHANCE) {
                chunk.set(x, base, z, Material::WATER);
            }
        }

        let wall = self.is_wall(rng, abs_x, abs_z);

        let fill = if wall { palette.wall } else { Material::AIR };
        for y in 1..=profile.wall_height {
            chunk.set(x, base + y, z, fill);
        }

        if wall {
            return;
        }

        if stratum.on_light_lattice(abs_x, abs_z)
            && stratum.light_gate().map_or(true, |p| rng.chance(p))
        {
            chunk.set(x, ceiling, z, palette.light);
        }

        if rng.chance(profile.exit_chance) {
            chunk.set(x, base, z, Material::EXIT);
        }

        // May overwrite an exit placed just above: stairs win.
        if profile.has_stairs && rng.chance(profile.stairs_chance) {
            chunk.set(x, base, z, Material::STAIRS_DOWN);
        }

        match stratum {
            Stratum::Lobby => {}
            Stratum::Decay => {
                if rng.chance(FALLEN_LAMP_CHANCE) {
                    chunk.set(x, base + 1, z, Material::REDSTONE_LAMP);
                }
            }
            Stratum::Overgrowth => {
                if rng.chance(DECAY_GROWTH_CHANCE) {
                    let growth = if rng.next_bool() {
                        Material::BROWN_MUSHROOM
                    } else {
                        Material::COBWEB
                    };
                    chunk.set(x, base + 1, z, growth);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liminal_shared::FacilityConfig;

    fn generator(level: u32, config: &FacilityConfig) -> TerrainGenerator {
        TerrainGenerator::new(LevelProfile::new(level, config))
    }

    #[test]
    fn test_chunk_generation_determinism() {
        let config = FacilityConfig::default();
        for level in 0..3 {
            let gen1 = generator(level, &config);
            let gen2 = generator(level, &config);

            let coord = ChunkCoord::new(5, -10);
            let chunk1 = gen1.generate(coord);
            let chunk2 = gen2.generate(coord);

            assert_eq!(chunk1.as_bytes(), chunk2.as_bytes(), "level {level} not deterministic");
        }
    }

    #[test]
    fn test_floor_and_ceiling_everywhere() {
        let config = FacilityConfig::default();
        let gen = generator(0, &config);
        let chunk = gen.generate(ChunkCoord::new(0, 0));

        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                let floor = chunk.get(x, 60, z);
                assert!(
                    floor == Material::YELLOW_CONCRETE
                        || floor == Material::EXIT
                        || floor == Material::STAIRS_DOWN,
                    "unexpected floor {floor} at ({x}, {z})"
                );
                let ceiling = chunk.get(x, 65, z);
                assert!(ceiling == Material::YELLOW_STAINED_GLASS || ceiling == Material::GLOWSTONE);
            }
        }
    }

    #[test]
    fn test_lobby_walls_only_on_lattice() {
        let config = FacilityConfig::default();
        let gen = generator(0, &config);
        let chunk = gen.generate(ChunkCoord::new(3, 3));

        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                let abs_x = 48 + x as i32;
                let abs_z = 48 + z as i32;
                let wall = chunk.get(x, 61, z) == Material::YELLOW_TERRACOTTA;
                if wall {
                    assert!(abs_x % 8 == 0 || abs_z % 8 == 0, "stray wall at ({abs_x}, {abs_z})");
                    for y in 61..=64 {
                        assert_eq!(chunk.get(x, y, z), Material::YELLOW_TERRACOTTA);
                    }
                }
            }
        }
    }

    #[test]
    fn test_lobby_room_interiors_are_open_and_lit() {
        let config = FacilityConfig::default();
        let gen = generator(0, &config);
        let chunk = gen.generate(ChunkCoord::new(0, 0));

        // (4, 4) and (12, 12) are lattice lights and never on a wall line
        for (x, z) in [(4usize, 4usize), (12, 12), (4, 12)] {
            assert_eq!(chunk.get(x, 62, z), Material::AIR);
            assert_eq!(chunk.get(x, 65, z), Material::GLOWSTONE);
        }
    }

    #[test]
    fn test_erosion_opens_gaps() {
        let config = FacilityConfig::default();
        let gen = generator(0, &config);

        let mut lattice = 0;
        let mut walls = 0;
        for cx in 0..8 {
            let chunk = gen.generate(ChunkCoord::new(cx, 0));
            for x in 0..CHUNK_SIZE {
                for z in 0..CHUNK_SIZE {
                    if x % 8 == 0 || z % 8 == 0 {
                        lattice += 1;
                        if !chunk.get(x, 61, z).is_air() {
                            walls += 1;
                        }
                    }
                }
            }
        }
        let kept = f64::from(walls) / f64::from(lattice);
        assert!(kept > 0.75 && kept < 0.95, "expected ~85% of lattice kept, got {kept:.3}");
    }

    #[test]
    fn test_no_stairs_on_deepest_level() {
        let config = FacilityConfig { exit_chance: 1.0, ..FacilityConfig::default() };
        let gen = generator(2, &config);

        for cz in -2..2 {
            for cx in -2..2 {
                let chunk = gen.generate(ChunkCoord::new(cx, cz));
                assert_eq!(chunk.count(Material::STAIRS_DOWN), 0);
            }
        }
    }

    #[test]
    fn test_stairs_override_exit_in_same_column() {
        // exit_chance = 1: every open lobby column gets an exit, a third of
        // them are then overwritten by stairs
        let config = FacilityConfig { exit_chance: 1.0, ..FacilityConfig::default() };
        let gen = generator(0, &config);
        let chunk = gen.generate(ChunkCoord::new(0, 0));

        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                if chunk.get(x, 61, z).is_air() {
                    let floor = chunk.get(x, 60, z);
                    assert!(floor == Material::EXIT || floor == Material::STAIRS_DOWN);
                }
            }
        }
        assert!(chunk.count(Material::EXIT) > 0);
        assert!(chunk.count(Material::STAIRS_DOWN) > 0);
    }

    #[test]
    fn test_overlays_only_in_their_strata() {
        let config = FacilityConfig::default();
        let lobby = generator(0, &config);
        let deep = generator(2, &config);

        let mut deep_growth = 0;
        for cx in 0..16 {
            let l = lobby.generate(ChunkCoord::new(cx, 1));
            assert_eq!(l.count(Material::BROWN_MUSHROOM) + l.count(Material::COBWEB), 0);
            assert_eq!(l.count(Material::WATER), 0);

            let d = deep.generate(ChunkCoord::new(cx, 1));
            deep_growth += d.count(Material::BROWN_MUSHROOM) + d.count(Material::COBWEB);
            assert_eq!(d.count(Material::REDSTONE_LAMP), 0);
        }
        assert!(deep_growth > 0, "16 deep chunks should grow something");
    }

    #[test]
    fn test_generation_performance() {
        let config = FacilityConfig::default();
        let gen = generator(1, &config);

        let start = std::time::Instant::now();
        for z in 0..20 {
            for x in 0..20 {
                let _ = gen.generate(ChunkCoord::new(x, z));
            }
        }
        let elapsed = start.elapsed();
        println!("Generated 400 chunks in {elapsed:?}");
        assert!(elapsed.as_secs_f64() < 10.0, "400 chunks took {elapsed:?}");
    }
}
