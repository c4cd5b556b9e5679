//! The eight grid directions.

use crate::geom::Point;

/// One of the eight compass directions, numbered clockwise from north.
///
/// The discriminant doubles as an index into per-direction tables, so a
/// direction can address a `[T; 8]` directly.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Direction {
    North = 0,
    NorthEast = 1,
    East = 2,
    SouthEast = 3,
    South = 4,
    SouthWest = 5,
    West = 6,
    NorthWest = 7,
}

impl Direction {
    /// All directions in clockwise order starting from north.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// The four cardinal directions.
    pub const CARDINAL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// The four diagonal directions.
    pub const DIAGONAL: [Direction; 4] = [
        Direction::NorthEast,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::NorthWest,
    ];

    /// Direction with the given table index (taken modulo 8).
    #[inline]
    pub const fn from_index(i: usize) -> Self {
        Self::ALL[i % 8]
    }

    /// Table index in `0..8`.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Unit offset of one step in this direction.
    #[inline]
    pub const fn offset(self) -> Point {
        match self {
            Direction::North => Point::new(0, -1),
            Direction::NorthEast => Point::new(1, -1),
            Direction::East => Point::new(1, 0),
            Direction::SouthEast => Point::new(1, 1),
            Direction::South => Point::new(0, 1),
            Direction::SouthWest => Point::new(-1, 1),
            Direction::West => Point::new(-1, 0),
            Direction::NorthWest => Point::new(-1, -1),
        }
    }

    /// Direction of a delta, using only its signs. `None` for the zero delta.
    pub fn from_delta(d: Point) -> Option<Self> {
        let s = d.signum();
        Self::ALL.into_iter().find(|dir| dir.offset() == s)
    }

    #[inline]
    pub const fn is_diagonal(self) -> bool {
        (self as u8) % 2 == 1
    }

    #[inline]
    pub const fn is_cardinal(self) -> bool {
        !self.is_diagonal()
    }

    /// Rotate clockwise by `eighths` steps of 45°. Negative turns
    /// counter-clockwise.
    #[inline]
    pub const fn rotate(self, eighths: i32) -> Self {
        Self::from_index((self as i32 + eighths).rem_euclid(8) as usize)
    }

    /// The opposite direction.
    #[inline]
    pub const fn opposite(self) -> Self {
        self.rotate(4)
    }

    /// The horizontal and vertical components of a diagonal, as
    /// `(horizontal, vertical)`. `None` for cardinal directions.
    pub fn components(self) -> Option<(Direction, Direction)> {
        match self {
            Direction::NorthEast => Some((Direction::East, Direction::North)),
            Direction::SouthEast => Some((Direction::East, Direction::South)),
            Direction::SouthWest => Some((Direction::West, Direction::South)),
            Direction::NorthWest => Some((Direction::West, Direction::North)),
            _ => None,
        }
    }
}
