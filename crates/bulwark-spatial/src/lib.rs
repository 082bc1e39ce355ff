//! Bulwark spatial indexing
//!
//! Divides each world into fixed-size cubic cells and buckets owner values by
//! the cells their point or region overlaps. Lookups are a coarse pre-filter:
//! a bucket may hold items whose exact shape does not contain the query point,
//! so callers holding regions re-check containment themselves.
//!
//! ```ignore
//! use bulwark_spatial::{Coord, Region, SpatialIndex};
//!
//! let mut index = SpatialIndex::new();
//! let region = Region::new(&Coord::new("world", 0, 0, 0), &Coord::new("world", 15, 15, 15))?;
//! index.set(&region, 7_u32);
//!
//! assert!(index.get(&Coord::new("world", 3, 4, 5)).any(|id| *id == 7));
//! ```

mod cell;
mod coord;
mod error;
mod grid;

pub use cell::{CellKey, CellRange};
pub use coord::{Coord, Direction, Region, Shape, WorldId};
pub use error::{SpatialError, SpatialResult};
pub use grid::{DEFAULT_CELL_SIZE, SpatialIndex};
