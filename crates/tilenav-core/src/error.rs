//! Construction errors for terrain and walkability grids.

use thiserror::Error;

/// Malformed grid input. Grids are validated once at construction; a grid
/// that fails here cannot back a pathfinder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// No rows, or rows of zero width.
    #[error("grid has no cells")]
    Empty,
    /// A row whose length differs from the first row.
    #[error("grid row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// Dimensions that do not fit the coordinate type.
    #[error("grid dimensions {width}x{height} are too large")]
    TooLarge { width: usize, height: usize },
}
