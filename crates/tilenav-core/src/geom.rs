//! Cell addresses and rectangular cell ranges.
//!
//! X grows to the right and Y grows downwards, so north is `(0, -1)`.

use std::fmt;
use std::ops::{Add, Mul, Sub};

/// A cell address, also used as an offset between cells. Equality and
/// hashing are exact, so points work as map keys.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn shift(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Per-axis sign: each component becomes `-1`, `0` or `1`.
    #[inline]
    pub const fn signum(self) -> Self {
        Self::new(self.x.signum(), self.y.signum())
    }

    /// Chebyshev length of the offset.
    #[inline]
    pub fn max_abs(self) -> i32 {
        self.x.abs().max(self.y.abs())
    }

    /// Number of diagonal moves an octile walk along this offset takes.
    #[inline]
    pub fn min_abs(self) -> i32 {
        self.x.abs().min(self.y.abs())
    }

    /// Mirror across the main diagonal. For a cardinal step this gives one
    /// of the two perpendicular steps.
    #[inline]
    pub const fn transpose(self) -> Self {
        Self::new(self.y, self.x)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for Point {
    type Output = Self;
    #[inline]
    fn add(self, o: Self) -> Self {
        self.shift(o.x, o.y)
    }
}

impl Sub for Point {
    type Output = Self;
    #[inline]
    fn sub(self, o: Self) -> Self {
        self.shift(-o.x, -o.y)
    }
}

/// Scale an offset, e.g. a direction times a jump length.
impl Mul<i32> for Point {
    type Output = Self;
    #[inline]
    fn mul(self, k: i32) -> Self {
        Self::new(self.x * k, self.y * k)
    }
}

/// Cells `min.x..max.x` by `min.y..max.y`. The `max` corner is outside.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    pub min: Point,
    pub max: Point,
}

impl Range {
    /// Range spanned by two opposite corners, given in any order.
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        let (lo_x, hi_x) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let (lo_y, hi_y) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        Self {
            min: Point::new(lo_x, lo_y),
            max: Point::new(hi_x, hi_y),
        }
    }

    /// The bounds of a `width × height` grid. Negative sizes give an empty
    /// range.
    pub fn sized(width: i32, height: i32) -> Self {
        Self {
            min: Point::ZERO,
            max: Point::new(width.max(0), height.max(0)),
        }
    }

    #[inline]
    pub fn width(self) -> i32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(self) -> i32 {
        self.max.y - self.min.y
    }

    /// Number of cells.
    pub fn len(self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.width() as usize * self.height() as usize
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    #[inline]
    pub fn contains(self, p: Point) -> bool {
        (self.min.x..self.max.x).contains(&p.x) && (self.min.y..self.max.y).contains(&p.y)
    }

    /// Cells in row-major order, which is also the storage order of every
    /// grid in this crate.
    pub fn iter(self) -> RangeIter {
        RangeIter {
            next: self.min,
            range: self,
        }
    }
}

impl IntoIterator for Range {
    type Item = Point;
    type IntoIter = RangeIter;

    fn into_iter(self) -> RangeIter {
        self.iter()
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} at {}", self.width(), self.height(), self.min)
    }
}

/// See [`Range::iter`].
#[derive(Clone, Debug)]
pub struct RangeIter {
    range: Range,
    next: Point,
}

impl RangeIter {
    fn remaining(&self) -> usize {
        if self.range.is_empty() || self.next.y >= self.range.max.y {
            return 0;
        }
        let rows_below = (self.range.max.y - self.next.y - 1) as usize;
        (self.range.max.x - self.next.x) as usize + rows_below * self.range.width() as usize
    }
}

impl Iterator for RangeIter {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.remaining() == 0 {
            return None;
        }
        let p = self.next;
        self.next = if p.x + 1 < self.range.max.x {
            p.shift(1, 0)
        } else {
            Point::new(self.range.min.x, p.y + 1)
        };
        Some(p)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl ExactSizeIterator for RangeIter {}
