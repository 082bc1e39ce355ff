//! Cell-bucketed spatial index.

use core::hash::Hash;
use core::num::NonZeroU32;

use hashbrown::{HashMap, HashSet};

use crate::{CellKey, CellRange, Coord, Shape};

/// Default cell edge length in blocks.
pub const DEFAULT_CELL_SIZE: u32 = 10;

/// Maps points and regions to sets of owner values.
///
/// Each item is referenced from every cell its shape overlaps. Buckets are
/// sets, so inserting the same shape and item twice leaves one reference per
/// cell. Empty buckets are dropped eagerly so enumeration never walks dead
/// cells.
///
/// Items are expected to be small handles (ids), not the owned records.
#[derive(Clone, Debug)]
pub struct SpatialIndex<T> {
    cell_size: i64,
    cells: HashMap<CellKey, HashSet<T>>,
}

impl<T: Eq + Hash + Clone> SpatialIndex<T> {
    /// Create an index with the default cell size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_cell_size(NonZeroU32::new(DEFAULT_CELL_SIZE).unwrap_or(NonZeroU32::MIN))
    }

    /// Create an index with a custom cell edge length.
    #[must_use]
    pub fn with_cell_size(cell_size: NonZeroU32) -> Self {
        Self {
            cell_size: i64::from(cell_size.get()),
            cells: HashMap::new(),
        }
    }

    /// Cell edge length in blocks.
    #[must_use]
    pub fn cell_size(&self) -> u32 {
        self.cell_size as u32
    }

    /// Insert `item` into every cell covered by `shape`.
    pub fn set<'a>(&mut self, shape: impl Into<Shape<'a>>, item: T) {
        let range = CellRange::covering(shape.into(), self.cell_size);
        for key in range.iter() {
            self.cells.entry(key).or_default().insert(item.clone());
        }
    }

    /// Remove `item` from every cell covered by `shape`.
    ///
    /// Removing an item that was never inserted is a no-op.
    pub fn remove<'a>(&mut self, shape: impl Into<Shape<'a>>, item: &T) {
        let range = CellRange::covering(shape.into(), self.cell_size);
        for key in range.iter() {
            if let Some(bucket) = self.cells.get_mut(&key) {
                bucket.remove(item);
                if bucket.is_empty() {
                    self.cells.remove(&key);
                }
            }
        }
    }

    /// Items in the cell containing `point`.
    ///
    /// Region-shaped items are returned whenever their region touches the
    /// cell, even if it does not contain `point` itself.
    pub fn get(&self, point: &Coord) -> impl Iterator<Item = &T> + '_ {
        self.cells
            .get(&CellKey::containing(point, self.cell_size))
            .into_iter()
            .flatten()
    }

    /// Items in every cell touched by the cube of side `2 * radius + 1` centred on `point`.
    ///
    /// A superset of the items within `radius`; callers that need an exact
    /// distance filter apply it themselves.
    pub fn get_nearby(&self, point: &Coord, radius: u32) -> HashSet<T> {
        let range = CellRange::around(point, radius, self.cell_size);

        // Walk whichever side is smaller: the candidate cells or the live ones.
        if range.cell_count() <= self.cells.len() as u128 {
            range
                .iter()
                .filter_map(|key| self.cells.get(&key))
                .flatten()
                .cloned()
                .collect()
        } else {
            self.cells
                .iter()
                .filter(|(key, _)| range.contains(key))
                .flat_map(|(_, bucket)| bucket.iter().cloned())
                .collect()
        }
    }

    /// Every indexed item.
    pub fn get_all(&self) -> HashSet<T> {
        self.cells.values().flatten().cloned().collect()
    }

    /// Whether `item` is referenced from every cell covered by `shape`.
    pub fn contains<'a>(&self, shape: impl Into<Shape<'a>>, item: &T) -> bool {
        CellRange::covering(shape.into(), self.cell_size)
            .iter()
            .all(|key| self.cells.get(&key).is_some_and(|bucket| bucket.contains(item)))
    }

    /// Number of non-empty cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

impl<T: Eq + Hash + Clone> Default for SpatialIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Region;

    fn at(x: i64, y: i64, z: i64) -> Coord {
        Coord::new("w", x, y, z)
    }

    #[test]
    fn test_default_cell_size() {
        let index = SpatialIndex::<u32>::new();
        assert_eq!(index.cell_size(), DEFAULT_CELL_SIZE);
    }

    #[test]
    fn test_set_then_remove_point() {
        let mut index = SpatialIndex::new();
        let c = at(3, 64, -7);

        index.set(&c, 1_u32);
        assert_eq!(index.get(&c).copied().collect::<Vec<_>>(), vec![1]);

        index.remove(&c, &1);
        assert_eq!(index.get(&c).count(), 0);
        assert!(index.is_empty());
    }

    #[test]
    fn test_set_is_idempotent_per_bucket() {
        let mut index = SpatialIndex::new();
        let region = Region::from_corners("w", [0, 0, 0], [19, 9, 9]);

        index.set(&region, 5_u32);
        index.set(&region, 5_u32);
        assert_eq!(index.get(&at(0, 0, 0)).count(), 1);

        // One removal clears every reference.
        index.remove(&region, &5);
        assert!(index.is_empty());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut index = SpatialIndex::new();
        index.set(&at(0, 0, 0), 1_u32);
        index.remove(&at(0, 0, 0), &2);
        index.remove(&at(500, 0, 0), &1);
        assert_eq!(index.get(&at(0, 0, 0)).count(), 1);
    }

    #[test]
    fn test_region_referenced_from_every_overlapping_cell() {
        let mut index = SpatialIndex::new();
        let region = Region::from_corners("w", [-5, 0, 0], [15, 0, 0]);
        index.set(&region, 9_u32);

        assert_eq!(index.cell_count(), 3);
        assert!(index.contains(&region, &9));
        // Coarse: a point in a covered cell but outside the region still sees it.
        assert!(index.get(&at(-9, 0, 0)).any(|id| *id == 9));
        assert!(!region.contains(&at(-9, 0, 0)));
        assert_eq!(index.get(&at(-11, 0, 0)).count(), 0);
    }

    #[test]
    fn test_cells_shared_by_distinct_items() {
        let mut index = SpatialIndex::new();
        index.set(&at(1, 1, 1), 1_u32);
        index.set(&at(2, 2, 2), 2_u32);

        let mut bucket: Vec<_> = index.get(&at(0, 0, 0)).copied().collect();
        bucket.sort_unstable();
        assert_eq!(bucket, vec![1, 2]);

        index.remove(&at(1, 1, 1), &1);
        assert_eq!(index.get(&at(2, 2, 2)).copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_worlds_do_not_share_cells() {
        let mut index = SpatialIndex::new();
        index.set(&Coord::new("a", 0, 0, 0), 1_u32);
        assert_eq!(index.get(&Coord::new("b", 0, 0, 0)).count(), 0);
    }

    #[test]
    fn test_get_nearby_is_superset() {
        let mut index = SpatialIndex::new();
        let region = Region::from_corners("w", [40, 0, 0], [45, 5, 5]);
        index.set(&region, 1_u32);
        index.set(&at(-25, 0, 0), 2_u32);
        index.set(&at(200, 0, 0), 3_u32);

        let nearby = index.get_nearby(&at(0, 0, 0), 40);
        assert!(nearby.contains(&1));
        assert!(nearby.contains(&2));
        assert!(!nearby.contains(&3));
    }

    #[test]
    fn test_get_nearby_scans_live_cells_for_huge_radius() {
        let mut index = SpatialIndex::new();
        index.set(&at(1_000_000, 0, 0), 1_u32);
        index.set(&Coord::new("other", 0, 0, 0), 2_u32);

        let nearby = index.get_nearby(&at(0, 0, 0), u32::MAX);
        assert!(nearby.contains(&1));
        assert!(!nearby.contains(&2));
    }

    #[test]
    fn test_get_all_deduplicates_regions() {
        let mut index = SpatialIndex::new();
        index.set(&Region::from_corners("w", [0, 0, 0], [99, 0, 0]), 1_u32);
        index.set(&at(5, 5, 5), 2_u32);

        let mut all: Vec<_> = index.get_all().into_iter().collect();
        all.sort_unstable();
        assert_eq!(all, vec![1, 2]);
    }

    #[test]
    fn test_custom_cell_size() {
        let mut index = SpatialIndex::with_cell_size(NonZeroU32::new(16).unwrap());
        index.set(&at(15, 0, 0), 1_u32);
        assert!(index.get(&at(0, 0, 0)).any(|id| *id == 1));
        assert_eq!(index.get(&at(16, 0, 0)).count(), 0);
    }
}
