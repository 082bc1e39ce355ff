//! Cubic cells that bucket the index.

use crate::{Coord, Shape, WorldId};

/// Identifies one cubic cell: a world plus cell-space coordinates.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CellKey {
    pub world: WorldId,
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl CellKey {
    /// The cell holding `point` for the given cell edge length.
    #[must_use]
    pub fn containing(point: &Coord, cell_size: i64) -> Self {
        Self {
            world: point.world.clone(),
            x: point.x.div_euclid(cell_size),
            y: point.y.div_euclid(cell_size),
            z: point.z.div_euclid(cell_size),
        }
    }
}

/// An inclusive box of cells in one world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellRange {
    world: WorldId,
    min: [i64; 3],
    max: [i64; 3],
}

impl CellRange {
    /// Cells covered by a point or region.
    #[must_use]
    pub fn covering(shape: Shape<'_>, cell_size: i64) -> Self {
        let (lo, hi) = shape.bounds();
        Self::from_block_bounds(shape.world().clone(), lo, hi, cell_size)
    }

    /// Cells touched by the cube of blocks within `radius` of `point` on every axis.
    #[must_use]
    pub fn around(point: &Coord, radius: u32, cell_size: i64) -> Self {
        let r = i64::from(radius);
        let lo = point.axes().map(|v| v.saturating_sub(r));
        let hi = point.axes().map(|v| v.saturating_add(r));
        Self::from_block_bounds(point.world.clone(), lo, hi, cell_size)
    }

    fn from_block_bounds(world: WorldId, lo: [i64; 3], hi: [i64; 3], cell_size: i64) -> Self {
        Self {
            world,
            min: lo.map(|v| v.div_euclid(cell_size)),
            max: hi.map(|v| v.div_euclid(cell_size)),
        }
    }

    /// Number of cells in the range.
    #[must_use]
    pub fn cell_count(&self) -> u128 {
        (0..3)
            .map(|axis| (self.max[axis] - self.min[axis]) as u128 + 1)
            .product()
    }

    #[must_use]
    pub fn contains(&self, key: &CellKey) -> bool {
        key.world == self.world
            && (self.min[0]..=self.max[0]).contains(&key.x)
            && (self.min[1]..=self.max[1]).contains(&key.y)
            && (self.min[2]..=self.max[2]).contains(&key.z)
    }

    /// Every cell in the range, x-major.
    pub fn iter(&self) -> impl Iterator<Item = CellKey> + '_ {
        (self.min[0]..=self.max[0]).flat_map(move |x| {
            (self.min[1]..=self.max[1]).flat_map(move |y| {
                (self.min[2]..=self.max[2]).map(move |z| CellKey {
                    world: self.world.clone(),
                    x,
                    y,
                    z,
                })
            })
        })
    }
}
