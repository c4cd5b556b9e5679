//! **tilenav-core**: grid types shared by the tilenav pathfinders.
//!
//! This crate provides geometry primitives, the eight-direction table, the
//! terrain classification grid read from the host, and the immutable
//! walkability grid every pathfinder is built on.

pub mod direction;
pub mod error;
pub mod geom;
pub mod terrain;
pub mod walk;

pub use direction::Direction;
pub use error::GridError;
pub use geom::{Point, Range, RangeIter};
pub use terrain::TerrainGrid;
pub use walk::WalkGrid;
