//! Positional types shared between the core and its hosts.
//!
//! Entity positions are continuous (`f64`), voxel positions are integral.

/// Continuous position of an entity in some realm.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    /// X component
    pub x: f64,
    /// Y component (vertical)
    pub y: f64,
    /// Z component
    pub z: f64,
}

impl Position {
    /// Creates a new position
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Origin
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Distance on the XZ plane only. Vertical movement is ignored.
    #[must_use]
    pub fn planar_distance(self, other: Self) -> f64 {
        let dx = other.x - self.x;
        let dz = other.z - self.z;
        (dx * dx + dz * dz).sqrt()
    }

    /// The voxel this position is inside of.
    #[must_use]
    pub fn block(self) -> BlockPos {
        BlockPos::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }

    /// Centre of the top face of a voxel column, at height `y`.
    #[must_use]
    pub fn centered(x: i32, y: i32, z: i32) -> Self {
        Self::new(f64::from(x) + 0.5, f64::from(y), f64::from(z) + 0.5)
    }
}

/// Integral voxel coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockPos {
    /// X coordinate
    pub x: i32,
    /// Y coordinate
    pub y: i32,
    /// Z coordinate
    pub z: i32,
}

impl BlockPos {
    /// Creates a new block position
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The voxel directly underneath.
    #[must_use]
    pub const fn below(self) -> Self {
        Self::new(self.x, self.y - 1, self.z)
    }

    /// Offsets by the given deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

impl std::fmt::Display for BlockPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planar_distance_ignores_height() {
        let from = Position::new(0.0, 64.0, 0.0);
        let to = Position::new(3.0, 90.0, 4.0);
        assert!((from.planar_distance(to) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_block_floors_negative_coordinates() {
        let pos = Position::new(-0.5, 61.0, -16.01);
        assert_eq!(pos.block(), BlockPos::new(-1, 61, -17));
        assert_eq!(pos.block().below(), BlockPos::new(-1, 60, -17));
    }
}
