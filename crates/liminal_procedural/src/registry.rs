//! # Level Registry
//!
//! Lazily creates level contexts and materializes their chunks.
//!
//! Each chunk slot is a `OnceLock`: the first thread to ask for a chunk
//! generates it, concurrent askers block on the same slot and then share
//! the result. A chunk is therefore generated at most once per run.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use liminal_shared::{BlockPos, FacilityConfig};
use parking_lot::RwLock;

use crate::chunk::{Chunk, ChunkCoord, Material, CHUNK_SIZE};
use crate::generator::TerrainGenerator;
use crate::level::LevelProfile;

type ChunkSlot = Arc<OnceLock<Arc<Chunk>>>;

/// One level: its generator and the chunks materialized so far.
pub struct LevelContext {
    generator: TerrainGenerator,
    chunks: RwLock<HashMap<ChunkCoord, ChunkSlot>>,
    generated: AtomicU64,
}

impl LevelContext {
    fn new(profile: LevelProfile) -> Self {
        Self {
            generator: TerrainGenerator::new(profile),
            chunks: RwLock::new(HashMap::new()),
            generated: AtomicU64::new(0),
        }
    }

    /// The level's profile.
    #[must_use]
    pub fn profile(&self) -> &LevelProfile {
        self.generator.profile()
    }

    /// Returns the chunk at `coord`, generating it on first request.
    pub fn chunk(&self, coord: ChunkCoord) -> Arc<Chunk> {
        let slot = self.slot(coord);
        Arc::clone(slot.get_or_init(|| {
            let chunk = self.generator.generate(coord);
            self.generated.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(
                "Generated chunk ({}, {}) on level {}",
                coord.x,
                coord.z,
                self.profile().level
            );
            Arc::new(chunk)
        }))
    }

    fn slot(&self, coord: ChunkCoord) -> ChunkSlot {
        if let Some(slot) = self.chunks.read().get(&coord) {
            return Arc::clone(slot);
        }
        let mut chunks = self.chunks.write();
        Arc::clone(chunks.entry(coord).or_default())
    }

    /// Whether the chunk at `coord` has been generated.
    #[must_use]
    pub fn is_materialized(&self, coord: ChunkCoord) -> bool {
        self.chunks
            .read()
            .get(&coord)
            .is_some_and(|slot| slot.get().is_some())
    }

    /// Number of chunks generated on this level.
    #[must_use]
    pub fn generated_count(&self) -> u64 {
        self.generated.load(Ordering::Relaxed)
    }

    /// Material at world block coordinates, materializing the chunk if
    /// needed.
    pub fn material_at(&self, pos: BlockPos) -> Material {
        let chunk = self.chunk(ChunkCoord::from_block_pos(pos.x, pos.z));
        let size = CHUNK_SIZE as i32;
        chunk.get(
            pos.x.rem_euclid(size) as usize,
            pos.y,
            pos.z.rem_euclid(size) as usize,
        )
    }
}

/// All levels of the facility.
pub struct LevelRegistry {
    config: Arc<FacilityConfig>,
    levels: RwLock<HashMap<u32, Arc<LevelContext>>>,
}

impl LevelRegistry {
    /// Creates an empty registry. Levels are created on first use.
    #[must_use]
    pub fn new(config: Arc<FacilityConfig>) -> Self {
        Self {
            config,
            levels: RwLock::new(HashMap::new()),
        }
    }

    /// The configuration levels are derived from.
    #[must_use]
    pub fn config(&self) -> &FacilityConfig {
        &self.config
    }

    /// Returns the context of `level`, creating it on first use.
    ///
    /// # Panics
    ///
    /// Panics if `level >= max_levels`.
    pub fn level(&self, level: u32) -> Arc<LevelContext> {
        if let Some(ctx) = self.levels.read().get(&level) {
            return Arc::clone(ctx);
        }

        let mut levels = self.levels.write();
        let ctx = levels.entry(level).or_insert_with(|| {
            let profile = LevelProfile::new(level, &self.config);
            tracing::info!(
                "Level {} ({}) ready at y={}",
                level,
                profile.stratum.name(),
                profile.base_y
            );
            Arc::new(LevelContext::new(profile))
        });
        Arc::clone(ctx)
    }

    /// Profile of `level`.
    ///
    /// # Panics
    ///
    /// Panics if `level >= max_levels`.
    #[must_use]
    pub fn profile(&self, level: u32) -> LevelProfile {
        self.level(level).profile().clone()
    }

    /// Returns the chunk of `level` at `coord`, generating it on first request.
    pub fn chunk(&self, level: u32, coord: ChunkCoord) -> Arc<Chunk> {
        self.level(level).chunk(coord)
    }

    /// Material at world block coordinates on `level`.
    pub fn material_at(&self, level: u32, pos: BlockPos) -> Material {
        self.level(level).material_at(pos)
    }

    /// Whether a chunk has been generated, without generating anything.
    #[must_use]
    pub fn is_materialized(&self, level: u32, coord: ChunkCoord) -> bool {
        self.levels
            .read()
            .get(&level)
            .is_some_and(|ctx| ctx.is_materialized(coord))
    }

    /// Total chunks generated across all levels.
    #[must_use]
    pub fn generated_count(&self) -> u64 {
        self.levels.read().values().map(|ctx| ctx.generated_count()).sum()
    }

    /// Number of level contexts created so far.
    #[must_use]
    pub fn active_levels(&self) -> usize {
        self.levels.read().len()
    }
}
