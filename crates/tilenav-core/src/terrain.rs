//! Terrain classification grid.
//!
//! A [`TerrainGrid`] stores one integer code per cell, as read from the host
//! (path-type, height class, ...). What the codes mean is up to the caller;
//! [`WalkGrid`](crate::WalkGrid) turns them into walkability once.

use crate::error::GridError;
use crate::geom::{Point, Range};

/// A rectangular grid of `i32` classification codes, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TerrainGrid {
    codes: Vec<i32>,
    width: i32,
    height: i32,
}

impl TerrainGrid {
    /// Create a `width × height` grid filled with `code`.
    ///
    /// Fails with [`GridError::Empty`] if either dimension is zero.
    pub fn filled(width: usize, height: usize, code: i32) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::Empty);
        }
        let (w, h) = checked_dims(width, height)?;
        Ok(Self {
            codes: vec![code; width * height],
            width: w,
            height: h,
        })
    }

    /// Build a grid from rows of codes. Row `y` holds the cells `(0..w, y)`.
    ///
    /// Every row must have the same, non-zero length.
    pub fn from_rows<R: AsRef<[i32]>>(rows: &[R]) -> Result<Self, GridError> {
        let Some(first) = rows.first() else {
            return Err(GridError::Empty);
        };
        let width = first.as_ref().len();
        if width == 0 {
            return Err(GridError::Empty);
        }
        let mut codes = Vec::with_capacity(width * rows.len());
        for (row, r) in rows.iter().enumerate() {
            let r = r.as_ref();
            if r.len() != width {
                return Err(GridError::Ragged {
                    row,
                    expected: width,
                    found: r.len(),
                });
            }
            codes.extend_from_slice(r);
        }
        let (w, h) = checked_dims(width, rows.len())?;
        Ok(Self {
            codes,
            width: w,
            height: h,
        })
    }

    /// Parse a grid from text, one row per line, one character per cell.
    /// Digits map to their value, every other character to `-1`. Blank
    /// lines are skipped.
    pub fn from_ascii(text: &str) -> Result<Self, GridError> {
        let rows: Vec<Vec<i32>> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| {
                l.chars()
                    .map(|c| c.to_digit(10).map_or(-1, |d| d as i32))
                    .collect()
            })
            .collect();
        Self::from_rows(&rows)
    }

    /// Bounding range `[0, width) × [0, height)`.
    #[inline]
    pub fn bounds(&self) -> Range {
        Range::sized(self.width, self.height)
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

    #[inline]
    fn index(&self, p: Point) -> Option<usize> {
        if self.bounds().contains(p) {
            Some(p.y as usize * self.width as usize + p.x as usize)
        } else {
            None
        }
    }

    /// The code at `p`, or `None` if out of bounds.
    pub fn at(&self, p: Point) -> Option<i32> {
        self.index(p).map(|i| self.codes[i])
    }

    /// Set the code at `p`. Does nothing if out of bounds.
    pub fn set(&mut self, p: Point, code: i32) {
        if let Some(i) = self.index(p) {
            self.codes[i] = code;
        }
    }

    /// Overwrite every cell with `f(p)`.
    pub fn fill_fn(&mut self, mut f: impl FnMut(Point) -> i32) {
        for p in self.bounds() {
            let i = p.y as usize * self.width as usize + p.x as usize;
            self.codes[i] = f(p);
        }
    }

    /// Count the cells whose code satisfies `f`.
    pub fn count_fn(&self, mut f: impl FnMut(i32) -> bool) -> usize {
        self.codes.iter().filter(|&&c| f(c)).count()
    }

    /// Row-major codes.
    #[inline]
    pub fn codes(&self) -> &[i32] {
        &self.codes
    }

    /// Iterate over `(Point, code)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Point, i32)> + '_ {
        self.bounds().iter().zip(self.codes.iter().copied())
    }
}

fn checked_dims(width: usize, height: usize) -> Result<(i32, i32), GridError> {
    match (i32::try_from(width), i32::try_from(height)) {
        (Ok(w), Ok(h)) if width.checked_mul(height).is_some() => Ok((w, h)),
        _ => Err(GridError::TooLarge { width, height }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_is_row_major() {
        let g = TerrainGrid::from_rows(&[vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        assert_eq!(g.width(), 3);
        assert_eq!(g.height(), 2);
        assert_eq!(g.at(Point::new(2, 0)), Some(3));
        assert_eq!(g.at(Point::new(0, 1)), Some(4));
        assert_eq!(g.at(Point::new(3, 0)), None);
        assert_eq!(g.at(Point::new(0, -1)), None);
    }

    #[test]
    fn empty_input_is_rejected() {
        let none: [Vec<i32>; 0] = [];
        assert_eq!(TerrainGrid::from_rows(&none), Err(GridError::Empty));
        assert_eq!(
            TerrainGrid::from_rows(&[Vec::<i32>::new()]),
            Err(GridError::Empty)
        );
        assert_eq!(TerrainGrid::filled(0, 4, 1), Err(GridError::Empty));
    }

    #[test]
    fn ragged_input_is_rejected() {
        let err = TerrainGrid::from_rows(&[vec![0, 0], vec![0], vec![0, 0]]).unwrap_err();
        assert_eq!(
            err,
            GridError::Ragged {
                row: 1,
                expected: 2,
                found: 1
            }
        );
        assert_eq!(err.to_string(), "grid row 1 has 1 cells, expected 2");
    }

    #[test]
    fn ascii_parsing() {
        let g = TerrainGrid::from_ascii(
            "
            00#
            0#1
            ",
        )
        .unwrap();
        assert_eq!(g.width(), 3);
        assert_eq!(g.height(), 2);
        assert_eq!(g.at(Point::new(2, 0)), Some(-1));
        assert_eq!(g.at(Point::new(2, 1)), Some(1));
        assert_eq!(g.count_fn(|c| c == 0), 3);
    }

    #[test]
    fn set_and_fill() {
        let mut g = TerrainGrid::filled(4, 3, 7).unwrap();
        g.set(Point::new(1, 1), 2);
        g.set(Point::new(9, 9), 2);
        assert_eq!(g.count_fn(|c| c == 2), 1);
        g.fill_fn(|p| p.x);
        let items: Vec<_> = g.iter().take(5).collect();
        assert_eq!(items[4], (Point::new(0, 1), 0));
        assert_eq!(items[3], (Point::new(3, 0), 3));
    }
}
