//! Lattice coordinates, directions and axis-aligned regions.

use core::str::FromStr;
use core::{array, fmt};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{SpatialError, SpatialResult};

/// Opaque world identifier.
///
/// Cheap to clone; coordinates in a busy index share the same allocation.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldId(Arc<str>);

impl WorldId {
    /// Create a world identifier from its name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    /// The world's name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WorldId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for WorldId {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl fmt::Debug for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WorldId({:?})", &*self.0)
    }
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A discrete block position in a world.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub world: WorldId,
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub fn new(world: impl Into<WorldId>, x: i64, y: i64, z: i64) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }

    /// The coordinate shifted by the given deltas, in the same world.
    #[must_use]
    pub fn offset(&self, dx: i64, dy: i64, dz: i64) -> Self {
        Self {
            world: self.world.clone(),
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }

    /// The adjacent coordinate one step in `direction`.
    #[must_use]
    pub fn relative(&self, direction: Direction) -> Self {
        let (dx, dy, dz) = direction.offset();
        self.offset(dx, dy, dz)
    }

    #[must_use]
    pub const fn axes(&self) -> [i64; 3] {
        [self.x, self.y, self.z]
    }
}

/// Encodes as `world,x,y,z`.
///
/// The world name may itself contain commas; decoding splits from the right.
/// Only the canonical spelling decodes, so each coordinate has exactly one
/// key.
impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.world, self.x, self.y, self.z)
    }
}

impl FromStr for Coord {
    type Err = SpatialError;

    fn from_str(s: &str) -> SpatialResult<Self> {
        let invalid = || SpatialError::InvalidCoord(s.to_owned());

        let mut parts = s.rsplitn(4, ',');
        let z = parts.next().ok_or_else(invalid)?;
        let y = parts.next().ok_or_else(invalid)?;
        let x = parts.next().ok_or_else(invalid)?;
        let world = parts.next().ok_or_else(invalid)?;

        if world.is_empty() {
            return Err(invalid());
        }

        let axis = |part: &str| part.parse::<i64>().map_err(|_| invalid());
        let coord = Self::new(world, axis(x)?, axis(y)?, axis(z)?);

        // Rejects "01", "+1", "-0" and the like.
        if coord.to_string() != s {
            return Err(invalid());
        }
        Ok(coord)
    }
}

/// One of the six block faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::Up,
        Direction::Down,
    ];

    /// Unit step `(dx, dy, dz)` for this direction.
    #[must_use]
    pub const fn offset(self) -> (i64, i64, i64) {
        match self {
            Self::North => (0, 0, -1),
            Self::South => (0, 0, 1),
            Self::East => (1, 0, 0),
            Self::West => (-1, 0, 0),
            Self::Up => (0, 1, 0),
            Self::Down => (0, -1, 0),
        }
    }

    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}

/// An axis-aligned box of blocks, inclusive on both ends.
///
/// Always normalized: `min[axis] <= max[axis]` for every axis.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    world: WorldId,
    min: [i64; 3],
    max: [i64; 3],
}

impl Region {
    /// Create a region spanning two corners.
    ///
    /// The corners may be given in any order but must share a world.
    pub fn new(a: &Coord, b: &Coord) -> SpatialResult<Self> {
        if a.world != b.world {
            return Err(SpatialError::WorldMismatch(a.world.clone(), b.world.clone()));
        }
        Ok(Self::from_corners(a.world.clone(), a.axes(), b.axes()))
    }

    /// Create a region from raw corner axes, normalizing each axis.
    #[must_use]
    pub fn from_corners(world: impl Into<WorldId>, a: [i64; 3], b: [i64; 3]) -> Self {
        Self {
            world: world.into(),
            min: array::from_fn(|axis| a[axis].min(b[axis])),
            max: array::from_fn(|axis| a[axis].max(b[axis])),
        }
    }

    #[must_use]
    pub const fn world(&self) -> &WorldId {
        &self.world
    }

    /// Lowest corner.
    #[must_use]
    pub fn start(&self) -> Coord {
        Coord::new(self.world.clone(), self.min[0], self.min[1], self.min[2])
    }

    /// Highest corner.
    #[must_use]
    pub fn end(&self) -> Coord {
        Coord::new(self.world.clone(), self.max[0], self.max[1], self.max[2])
    }

    #[must_use]
    pub const fn min(&self) -> [i64; 3] {
        self.min
    }

    #[must_use]
    pub const fn max(&self) -> [i64; 3] {
        self.max
    }

    /// Whether `point` lies inside this region, bounds included.
    #[must_use]
    pub fn contains(&self, point: &Coord) -> bool {
        point.world == self.world
            && point
                .axes()
                .iter()
                .zip(self.min.iter().zip(self.max.iter()))
                .all(|(v, (lo, hi))| lo <= v && v <= hi)
    }

    /// Whether the two regions share at least one block.
    #[must_use]
    pub fn overlaps(&self, other: &Region) -> bool {
        self.world == other.world
            && (0..3).all(|axis| self.min[axis] <= other.max[axis] && other.min[axis] <= self.max[axis])
    }

    /// Number of blocks in the region.
    #[must_use]
    pub fn volume(&self) -> u128 {
        (0..3)
            .map(|axis| (self.max[axis] - self.min[axis]) as u128 + 1)
            .product()
    }
}

/// The footprint of an indexed item: a single block or a region.
#[derive(Clone, Copy, Debug)]
pub enum Shape<'a> {
    Point(&'a Coord),
    Region(&'a Region),
}

impl Shape<'_> {
    #[must_use]
    pub fn world(&self) -> &WorldId {
        match self {
            Self::Point(point) => &point.world,
            Self::Region(region) => region.world(),
        }
    }

    /// Inclusive axis bounds of the shape.
    #[must_use]
    pub fn bounds(&self) -> ([i64; 3], [i64; 3]) {
        match self {
            Self::Point(point) => (point.axes(), point.axes()),
            Self::Region(region) => (region.min, region.max),
        }
    }
}

impl<'a> From<&'a Coord> for Shape<'a> {
    fn from(point: &'a Coord) -> Self {
        Self::Point(point)
    }
}

impl<'a> From<&'a Region> for Shape<'a> {
    fn from(region: &'a Region) -> Self {
        Self::Region(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_key_roundtrip_with_comma_in_world() {
        let coord = Coord::new("my,world", -4, 70, 12);
        let key = coord.to_string();
        assert_eq!(key, "my,world,-4,70,12");
        assert_eq!(key.parse::<Coord>().unwrap(), coord);
    }

    #[test]
    fn test_invalid_coord_keys() {
        for key in ["", "world", "world,1,2", ",1,2,3", "world,1,2,z", "world,1.5,2,3"] {
            assert!(key.parse::<Coord>().is_err(), "{key:?} should not parse");
        }
    }

    #[test]
    fn test_only_canonical_keys_parse() {
        for key in ["w,01,0,0", "w, 1,0,0", "w,1,0,0 ", "w,+1,0,0", "w,-0,0,0"] {
            assert!(key.parse::<Coord>().is_err(), "{key:?} should not parse");
        }
        assert_eq!("w,1,0,-7".parse::<Coord>().unwrap(), Coord::new("w", 1, 0, -7));
    }

    #[test]
    fn test_serde_shapes() {
        let coord = Coord::new("world", -4, 70, 12);
        let json = serde_json::to_value(&coord).unwrap();
        assert_eq!(json, serde_json::json!({ "world": "world", "x": -4, "y": 70, "z": 12 }));
        assert_eq!(serde_json::from_value::<Coord>(json).unwrap(), coord);

        assert_eq!(serde_json::to_string(&Direction::Up).unwrap(), "\"up\"");
        let direction: Direction = serde_json::from_str("\"west\"").unwrap();
        assert_eq!(direction, Direction::West);
        assert!(serde_json::from_str::<Direction>("\"sideways\"").is_err());
    }

    #[test]
    fn test_region_normalizes_corners() {
        let region = Region::new(&Coord::new("w", 9, 0, -3), &Coord::new("w", 0, 9, 3)).unwrap();
        assert_eq!(region.min(), [0, 0, -3]);
        assert_eq!(region.max(), [9, 9, 3]);
        assert_eq!(region.volume(), 10 * 10 * 7);
    }

    #[test]
    fn test_region_world_mismatch() {
        let err = Region::new(&Coord::new("a", 0, 0, 0), &Coord::new("b", 1, 1, 1)).unwrap_err();
        assert_eq!(err, SpatialError::WorldMismatch(WorldId::new("a"), WorldId::new("b")));
    }

    #[test]
    fn test_region_contains_inclusive() {
        let region = Region::from_corners("w", [0, 0, 0], [9, 9, 9]);
        assert!(region.contains(&Coord::new("w", 0, 0, 0)));
        assert!(region.contains(&Coord::new("w", 9, 9, 9)));
        assert!(!region.contains(&Coord::new("w", 10, 0, 0)));
        assert!(!region.contains(&Coord::new("w", 0, -1, 0)));
        assert!(!region.contains(&Coord::new("other", 5, 5, 5)));
    }

    #[test]
    fn test_region_overlap() {
        let a = Region::from_corners("w", [0, 0, 0], [9, 9, 9]);
        let b = Region::from_corners("w", [9, 9, 9], [20, 20, 20]);
        let c = Region::from_corners("w", [10, 0, 0], [20, 9, 9]);
        let d = Region::from_corners("x", [0, 0, 0], [9, 9, 9]);

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
        assert!(!a.overlaps(&d));
    }

    #[test]
    fn test_direction_relative() {
        let origin = Coord::new("w", 0, 64, 0);
        for direction in Direction::ALL {
            let there = origin.relative(direction);
            assert_eq!(there.relative(direction.opposite()), origin);
        }
        assert_eq!(origin.relative(Direction::East), Coord::new("w", 1, 64, 0));
        assert_eq!(origin.relative(Direction::North), Coord::new("w", 0, 64, -1));
    }
}
