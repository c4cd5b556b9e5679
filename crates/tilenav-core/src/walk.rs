//! Immutable walkability grid and the movement model shared by all
//! pathfinders.

use std::collections::HashSet;

use crate::direction::Direction;
use crate::error::GridError;
use crate::geom::{Point, Range};
use crate::terrain::TerrainGrid;

/// Boolean occupancy derived once from terrain codes.
///
/// A `WalkGrid` never changes after construction. When the terrain changes,
/// build a new grid (and new pathfinders on top of it).
///
/// Movement is 8-connected and only the destination of a step matters: a
/// diagonal step may cut a wall corner or squeeze between two walls that
/// touch at a corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkGrid {
    cells: Vec<bool>,
    width: i32,
    height: i32,
    walkable: usize,
}

impl WalkGrid {
    /// Derive walkability from `terrain`: a cell is walkable when its code
    /// is one of `pathable`.
    pub fn new(terrain: &TerrainGrid, pathable: &[i32]) -> Self {
        let pathable: HashSet<i32> = pathable.iter().copied().collect();
        let cells: Vec<bool> = terrain.codes().iter().map(|c| pathable.contains(c)).collect();
        Self::from_cells(cells, terrain.width(), terrain.height())
    }

    /// Validate `rows` and derive walkability in one go.
    pub fn from_rows<R: AsRef<[i32]>>(rows: &[R], pathable: &[i32]) -> Result<Self, GridError> {
        let terrain = TerrainGrid::from_rows(rows)?;
        Ok(Self::new(&terrain, pathable))
    }

    /// Build from text: `.` is walkable, anything else is a wall. Handy for fixtures.
    ///
    /// ```
    /// use tilenav_core::{Point, WalkGrid};
    ///
    /// let g = WalkGrid::from_ascii("..#\n...").unwrap();
    /// assert!(!g.is_walkable(Point::new(2, 0)));
    /// assert!(g.is_walkable(Point::new(2, 1)));
    /// ```
    pub fn from_ascii(text: &str) -> Result<Self, GridError> {
        let rows: Vec<Vec<i32>> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| l.chars().map(|c| i32::from(c == '.')).collect())
            .collect();
        Self::from_rows(&rows, &[1])
    }

    /// Build a `width × height` grid from a predicate.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut walkable: impl FnMut(Point) -> bool,
    ) -> Result<Self, GridError> {
        let terrain = TerrainGrid::filled(width, height, 0)?;
        let cells = terrain.bounds().iter().map(&mut walkable).collect();
        Ok(Self::from_cells(cells, terrain.width(), terrain.height()))
    }

    fn from_cells(cells: Vec<bool>, width: i32, height: i32) -> Self {
        let walkable = cells.iter().filter(|&&w| w).count();
        Self {
            cells,
            width,
            height,
            walkable,
        }
    }

    /// Width in cells.
    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height in cells.
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Bounding range `[0, width) × [0, height)`.
    #[inline]
    pub fn bounds(&self) -> Range {
        Range::sized(self.width, self.height)
    }

    /// Total number of cells (walkable or not).
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`: construction rejects empty grids.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of walkable cells.
    #[inline]
    pub fn walkable_count(&self) -> usize {
        self.walkable
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    /// Flat row-major index of `p`, or `None` if out of bounds.
    #[inline]
    pub fn index(&self, p: Point) -> Option<usize> {
        if self.contains(p) {
            Some(p.y as usize * self.width as usize + p.x as usize)
        } else {
            None
        }
    }

    /// Inverse of [`index`](Self::index).
    #[inline]
    pub fn point(&self, idx: usize) -> Point {
        let w = self.width as usize;
        Point::new((idx % w) as i32, (idx / w) as i32)
    }

    /// Whether `p` is inside the grid and walkable. Out-of-bounds cells are
    /// treated as walls.
    #[inline]
    pub fn is_walkable(&self, p: Point) -> bool {
        self.index(p).is_some_and(|i| self.cells[i])
    }

    /// Whether a single step from `from` in `dir` is legal, that is whether
    /// it lands on a walkable cell. The source cell itself is not checked.
    #[inline]
    pub fn can_step(&self, from: Point, dir: Direction) -> bool {
        self.is_walkable(from + dir.offset())
    }

    /// Legal single steps out of `from`, as `(direction, destination)`.
    pub fn steps(&self, from: Point) -> impl Iterator<Item = (Direction, Point)> + '_ {
        Direction::ALL
            .into_iter()
            .filter(move |&d| self.can_step(from, d))
            .map(move |d| (d, from + d.offset()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pathable_codes_select_walkable_cells() {
        let g = WalkGrid::from_rows(&[[1, 2, 3], [4, 5, 6]], &[2, 5, 6]).unwrap();
        assert_eq!(g.walkable_count(), 3);
        assert!(g.is_walkable(Point::new(1, 0)));
        assert!(!g.is_walkable(Point::new(0, 0)));
        assert!(g.is_walkable(Point::new(2, 1)));
    }

    #[test]
    fn out_of_bounds_is_unwalkable() {
        let g = WalkGrid::from_fn(3, 3, |_| true).unwrap();
        for p in [
            Point::new(-1, 0),
            Point::new(0, -1),
            Point::new(3, 0),
            Point::new(0, 3),
        ] {
            assert!(!g.is_walkable(p));
            assert_eq!(g.index(p), None);
        }
    }

    #[test]
    fn index_round_trips() {
        let g = WalkGrid::from_fn(5, 4, |_| true).unwrap();
        for p in g.bounds() {
            assert_eq!(g.point(g.index(p).unwrap()), p);
        }
    }

    #[test]
    fn malformed_rows_fail_fast() {
        let err = WalkGrid::from_rows(&[vec![0, 0, 0], vec![0, 0]], &[0]).unwrap_err();
        assert!(matches!(err, GridError::Ragged { row: 1, .. }));
        assert_eq!(WalkGrid::from_ascii(""), Err(GridError::Empty));
    }

    #[test]
    fn diagonal_steps_may_cut_corners() {
        let g = WalkGrid::from_ascii(
            "
            .#
            #.
            ",
        )
        .unwrap();
        // (0,0) -> (1,1) squeezes between the two walls.
        assert!(g.can_step(Point::new(0, 0), Direction::SouthEast));
        assert!(g.can_step(Point::new(1, 1), Direction::NorthWest));
        assert!(!g.can_step(Point::new(0, 0), Direction::East));
        assert!(!g.can_step(Point::new(0, 0), Direction::South));
        assert!(!g.can_step(Point::new(1, 1), Direction::SouthEast));
        let steps: Vec<_> = g.steps(Point::new(0, 0)).collect();
        assert_eq!(steps, vec![(Direction::SouthEast, Point::new(1, 1))]);

        let open = WalkGrid::from_fn(2, 2, |_| true).unwrap();
        assert_eq!(open.steps(Point::new(0, 0)).count(), 3);
    }
}
