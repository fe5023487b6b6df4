//! # LIMINAL Procedural Generation
//!
//! Deterministic facility generation: an endless maze of yellow rooms,
//! stacked into levels.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: a chunk depends only on `(level, chunkX, chunkZ)`
//! 2. **Chunked**: levels are generated in 16x16 column footprints
//! 3. **Lazy**: nothing exists until a chunk is first requested
//! 4. **At-most-once**: concurrent requests for one chunk share one generation
//!
//! ## Core Components
//!
//! - `SimplexNoise`: seeded octave noise for wall perturbation
//! - `ChunkRng`: per-chunk draw stream
//! - `LevelProfile`: geometry, palette and probabilities of a level
//! - `TerrainGenerator`: fills one chunk of one level
//! - `LevelRegistry`: lazy level contexts and chunk cache
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use liminal_procedural::{ChunkCoord, LevelRegistry};
//! use liminal_shared::FacilityConfig;
//!
//! let registry = LevelRegistry::new(Arc::new(FacilityConfig::default()));
//! let chunk = registry.chunk(0, ChunkCoord::new(0, 0));
//! assert_eq!(chunk.level, 0);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod chunk;
pub mod generator;
pub mod level;
pub mod noise;
pub mod registry;
pub mod rng;

pub use chunk::{Chunk, ChunkCoord, Material, CHUNK_SIZE};
pub use generator::TerrainGenerator;
pub use level::{LevelProfile, Palette, Stratum, BASE_ELEVATION};
pub use noise::{NoiseSeed, OctaveParams, SimplexNoise};
pub use registry::{LevelContext, LevelRegistry};
pub use rng::{chunk_seed, ChunkRng};
