use tilenav_core::{Direction, Point};

/// Cost of a diagonal step.
pub const SQRT_2: f32 = std::f32::consts::SQRT_2;

/// Cost of one step in `dir`: 1 for cardinal moves, √2 for diagonals.
#[inline]
pub fn step_cost(dir: Direction) -> f32 {
    if dir.is_diagonal() { SQRT_2 } else { 1.0 }
}

/// Octile distance between two points, the exact free-space cost on an
/// 8-connected grid: `max - min + min·√2` over the axis deltas.
#[inline]
pub fn octile(a: Point, b: Point) -> f32 {
    let d = b - a;
    let (lo, hi) = (d.min_abs() as f32, d.max_abs() as f32);
    hi - lo + lo * SQRT_2
}

/// Euclidean length of a path made of unit steps.
///
/// Consecutive points must be 8-neighbours.
pub fn path_cost(path: &[Point]) -> f32 {
    path.windows(2)
        .map(|w| if (w[1] - w[0]).min_abs() == 0 { 1.0 } else { SQRT_2 })
        .sum()
}
