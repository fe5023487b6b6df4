//! # Chunk System
//!
//! Each level is organized into 16x16 voxel footprints ("chunks").
//!
//! ## Chunk Format
//!
//! A facility level only occupies a thin horizontal band: the floor layer,
//! `wall_height` layers of walls or air, and the ceiling layer. A chunk
//! stores exactly that band as a dense `[y][z][x]` array of [`Material`]s;
//! everything above or below it reads as air.
//!
//! Chunks are written once during generation and read-only afterwards.

use bytemuck::{Pod, Zeroable};

/// Chunk width/depth in voxels.
pub const CHUNK_SIZE: usize = 16;

/// Chunk coordinate (identifies a chunk in a level's grid).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    /// X coordinate (in chunks, not blocks).
    pub x: i32,
    /// Z coordinate (in chunks, not blocks).
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Converts world block coordinates to chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn from_block_pos(block_x: i32, block_z: i32) -> Self {
        Self {
            x: block_x.div_euclid(CHUNK_SIZE as i32),
            z: block_z.div_euclid(CHUNK_SIZE as i32),
        }
    }

    /// Returns the world X coordinate of the chunk's origin (corner).
    #[inline]
    #[must_use]
    pub const fn world_x(self) -> i32 {
        self.x * CHUNK_SIZE as i32
    }

    /// Returns the world Z coordinate of the chunk's origin.
    #[inline]
    #[must_use]
    pub const fn world_z(self) -> i32 {
        self.z * CHUNK_SIZE as i32
    }
}

/// Material identifier of one voxel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct Material(pub u16);

impl Material {
    /// Empty space.
    pub const AIR: Self = Self(0);
    /// Level 0 floor, level 1 wall.
    pub const YELLOW_CONCRETE: Self = Self(1);
    /// Level 0 wall, level 1 floor.
    pub const YELLOW_TERRACOTTA: Self = Self(2);
    /// Level 0 ceiling.
    pub const YELLOW_STAINED_GLASS: Self = Self(3);
    /// Level 0 light fixture.
    pub const GLOWSTONE: Self = Self(4);
    /// Level 1 ceiling.
    pub const YELLOW_WOOL: Self = Self(5);
    /// Level 1 light fixture and fallen-lamp overlay.
    pub const REDSTONE_LAMP: Self = Self(6);
    /// Deep floor and the damaged-floor variant everywhere.
    pub const YELLOW_CONCRETE_POWDER: Self = Self(7);
    /// Deep wall.
    pub const STRIPPED_BIRCH_WOOD: Self = Self(8);
    /// Deep ceiling.
    pub const BIRCH_PLANKS: Self = Self(9);
    /// Deep light fixture.
    pub const LANTERN: Self = Self(10);
    /// Exit marker (emerald block): ascend, or escape from level 0.
    pub const EXIT: Self = Self(11);
    /// Stairs-down marker (mossy cobblestone): descend one level.
    pub const STAIRS_DOWN: Self = Self(12);
    /// Flooded floor.
    pub const WATER: Self = Self(13);
    /// Organic decay overlay.
    pub const BROWN_MUSHROOM: Self = Self(14);
    /// Cobweb overlay.
    pub const COBWEB: Self = Self(15);

    /// Returns true if this is air.
    #[inline]
    #[must_use]
    pub const fn is_air(self) -> bool {
        self.0 == 0
    }

    /// Human-readable name, for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self.0 {
            0 => "air",
            1 => "yellow_concrete",
            2 => "yellow_terracotta",
            3 => "yellow_stained_glass",
            4 => "glowstone",
            5 => "yellow_wool",
            6 => "redstone_lamp",
            7 => "yellow_concrete_powder",
            8 => "stripped_birch_wood",
            9 => "birch_planks",
            10 => "lantern",
            11 => "emerald_block",
            12 => "mossy_cobblestone",
            13 => "water",
            14 => "brown_mushroom",
            15 => "cobweb",
            _ => "unknown",
        }
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Generated voxel content of one chunk of one level.
#[derive(Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Chunk position in the level.
    pub coord: ChunkCoord,
    /// Level this chunk belongs to.
    pub level: u32,
    /// World Y of the lowest stored layer (the floor).
    min_y: i32,
    /// Number of stored layers.
    height: usize,
    /// Voxel data, indexed as `[y][z][x]`.
    blocks: Box<[Material]>,
}

impl Chunk {
    /// Creates an all-air chunk covering layers `min_y .. min_y + height`.
    #[must_use]
    pub fn new(level: u32, coord: ChunkCoord, min_y: i32, height: usize) -> Self {
        Self {
            coord,
            level,
            min_y,
            height,
            blocks: vec![Material::AIR; CHUNK_SIZE * CHUNK_SIZE * height].into_boxed_slice(),
        }
    }

    #[inline]
    fn index(&self, x: usize, y: i32, z: usize) -> Option<usize> {
        let layer = y.checked_sub(self.min_y)?;
        if x < CHUNK_SIZE && z < CHUNK_SIZE && layer >= 0 && (layer as usize) < self.height {
            Some((layer as usize * CHUNK_SIZE + z) * CHUNK_SIZE + x)
        } else {
            None
        }
    }

    /// Gets a voxel at local `x`/`z` (0-15) and world `y`.
    ///
    /// Anything outside the stored band is air.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: i32, z: usize) -> Material {
        self.index(x, y, z).map_or(Material::AIR, |i| self.blocks[i])
    }

    /// Sets a voxel at local `x`/`z` (0-15) and world `y`.
    ///
    /// Writes outside the stored band are ignored.
    #[inline]
    pub fn set(&mut self, x: usize, y: i32, z: usize, material: Material) {
        if let Some(i) = self.index(x, y, z) {
            self.blocks[i] = material;
        }
    }

    /// World Y of the lowest stored layer.
    #[must_use]
    pub const fn min_y(&self) -> i32 {
        self.min_y
    }

    /// Number of stored layers.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Raw voxel bytes in host byte order, for byte-level comparison
    /// within one process. Use [`Chunk::fingerprint`] across machines.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.blocks[..])
    }

    /// FNV-1a hash of the material ids as little-endian `u16`s.
    ///
    /// Independent of host byte order; golden values of this hash pin the
    /// world format.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in self.blocks.iter().flat_map(|m| m.0.to_le_bytes()) {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        hash
    }

    /// Counts voxels of the given material.
    #[must_use]
    pub fn count(&self, material: Material) -> usize {
        self.blocks.iter().filter(|&&m| m == material).count()
    }

    /// Iterates `(local_x, world_y, local_z, material)` over every stored voxel.
    pub fn voxels(&self) -> impl Iterator<Item = (usize, i32, usize, Material)> + '_ {
        self.blocks.iter().enumerate().map(move |(i, &m)| {
            let x = i % CHUNK_SIZE;
            let z = (i / CHUNK_SIZE) % CHUNK_SIZE;
            let layer = i / (CHUNK_SIZE * CHUNK_SIZE);
            (x, self.min_y + layer as i32, z, m)
        })
    }
}

impl std::fmt::Debug for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chunk")
            .field("coord", &self.coord)
            .field("level", &self.level)
            .field("min_y", &self.min_y)
            .field("height", &self.height)
            .field("fingerprint", &format_args!("{:016x}", self.fingerprint()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_coord_from_block() {
        assert_eq!(ChunkCoord::from_block_pos(0, 0), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::from_block_pos(15, 15), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::from_block_pos(16, 16), ChunkCoord::new(1, 1));
        assert_eq!(ChunkCoord::from_block_pos(-1, -1), ChunkCoord::new(-1, -1));
        assert_eq!(ChunkCoord::from_block_pos(-16, -16), ChunkCoord::new(-1, -1));
        assert_eq!(ChunkCoord::from_block_pos(-17, -17), ChunkCoord::new(-2, -2));
    }

    #[test]
    fn test_band_access() {
        let mut chunk = Chunk::new(0, ChunkCoord::new(0, 0), 60, 6);
        chunk.set(3, 60, 4, Material::YELLOW_CONCRETE);
        chunk.set(3, 65, 4, Material::GLOWSTONE);

        assert_eq!(chunk.get(3, 60, 4), Material::YELLOW_CONCRETE);
        assert_eq!(chunk.get(3, 65, 4), Material::GLOWSTONE);
        assert_eq!(chunk.get(4, 60, 3), Material::AIR);

        // Outside the band
        chunk.set(3, 66, 4, Material::EXIT);
        chunk.set(3, 59, 4, Material::EXIT);
        assert_eq!(chunk.get(3, 66, 4), Material::AIR);
        assert_eq!(chunk.get(3, 59, 4), Material::AIR);
        assert_eq!(chunk.get(16, 60, 0), Material::AIR);
        assert_eq!(chunk.count(Material::EXIT), 0);
    }

    #[test]
    fn test_voxels_iterates_world_coordinates() {
        let mut chunk = Chunk::new(1, ChunkCoord::new(2, -1), 65, 6);
        chunk.set(15, 70, 1, Material::LANTERN);

        let found: Vec<_> = chunk
            .voxels()
            .filter(|&(_, _, _, m)| m == Material::LANTERN)
            .collect();
        assert_eq!(found, vec![(15, 70, 1, Material::LANTERN)]);
        assert_eq!(chunk.voxels().count(), CHUNK_SIZE * CHUNK_SIZE * 6);
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = Chunk::new(0, ChunkCoord::new(0, 0), 60, 6);
        let mut b = a.clone();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.as_bytes().len(), CHUNK_SIZE * CHUNK_SIZE * 6 * 2);

        b.set(0, 60, 0, Material::EXIT);
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_fingerprint_hashes_little_endian_ids() {
        // One layer, cobweb (id 15) in the first voxel: bytes 0f 00 00 00 ...
        let mut chunk = Chunk::new(0, ChunkCoord::new(0, 0), 60, 1);
        chunk.set(0, 60, 0, Material::COBWEB);
        assert_eq!(chunk.fingerprint(), 0x3137_8a4a_2e8f_732a);

        // Big-endian bytes (00 0f ...) would hash differently
        assert_ne!(chunk.fingerprint(), 0x052d_b7b6_b996_e0f0);
    }
}
