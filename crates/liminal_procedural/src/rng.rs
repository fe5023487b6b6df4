//! # Chunk Draw Streams
//!
//! [`ChunkRng`]: one stream per `(level, chunkX, chunkZ)`, seeded by a fixed
//! linear formula. Terrain depends on nothing else, so a chunk comes out
//! identical regardless of who asks first or what was generated before.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::chunk::ChunkCoord;

/// Chunk X multiplier in the seed formula.
pub const SEED_CHUNK_X: i64 = 341_873_911;
/// Chunk Z multiplier in the seed formula.
pub const SEED_CHUNK_Z: i64 = 132_897_777;
/// Level multiplier in the seed formula.
pub const SEED_LEVEL: i64 = 2_654_435_761;

/// Generation seed of one chunk of one level.
///
/// `seed = chunkX * C1 + chunkZ * C2 + level * C3` in wrapping 64-bit
/// arithmetic. Part of the world format; never change the constants.
#[inline]
#[must_use]
pub const fn chunk_seed(level: u32, coord: ChunkCoord) -> u64 {
    (coord.x as i64)
        .wrapping_mul(SEED_CHUNK_X)
        .wrapping_add((coord.z as i64).wrapping_mul(SEED_CHUNK_Z))
        .wrapping_add((level as i64).wrapping_mul(SEED_LEVEL)) as u64
}

/// Deterministic draw stream for one chunk.
///
/// Two streams built from the same `(level, chunk)` yield identical
/// sequences for identical call sequences.
pub struct ChunkRng {
    inner: ChaCha8Rng,
}

impl ChunkRng {
    /// Creates the stream for a chunk of a level.
    #[must_use]
    pub fn for_chunk(level: u32, coord: ChunkCoord) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(chunk_seed(level, coord)),
        }
    }

    /// Uniform double in `[0, 1)`.
    #[inline]
    pub fn next_double(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Fair coin.
    #[inline]
    pub fn next_bool(&mut self) -> bool {
        self.inner.gen::<bool>()
    }

    /// Draws once and returns true with probability `p`.
    #[inline]
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_double() < p
    }
}
