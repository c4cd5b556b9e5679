//! Jump Point Search with precomputed jump distances (JPS+).
//!
//! For every cell and each of the eight directions the [`JumpField`] stores
//! how far one can travel before something interesting happens:
//!
//! - a positive value `n` means a jump point lies `n` steps away;
//! - zero or a negative value `-n` means `n` free steps before a wall or the
//!   grid edge, with no jump point on the way.
//!
//! A query then runs A* over jump points only, which visits a small fraction
//! of the cells a plain A* would.
//!
//! Diagonal moves may cut corners (see [`WalkGrid::can_step`]). Travelling
//! in cardinal direction `d`, cell `v` is a jump point when a wall beside `v`
//! hides an open cell diagonally ahead of it. Travelling diagonally, `v` is a
//! jump point when a wall behind it on one axis hides an open cell ahead on
//! the other, or when a straight run from `v` along either component of the
//! diagonal reaches a jump point.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, trace};
use rayon::prelude::*;
use tilenav_core::{Direction, Point, TerrainGrid, WalkGrid};

use crate::Path;
use crate::distance::{octile, step_cost};
use crate::heap::MinHeap;
use crate::neighbors::pruned;
use crate::traits::PathFinder;

// ---------------------------------------------------------------------------
// JumpField
// ---------------------------------------------------------------------------

/// Precomputed jump distances for every cell in all eight directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpField {
    width: i32,
    height: i32,
    jumps: Vec<[i32; 8]>,
}

/// Whether `v` is a jump point when travelling in cardinal direction `d`.
fn is_jump_point(grid: &WalkGrid, v: Point, d: Direction) -> bool {
    if !grid.is_walkable(v) {
        return false;
    }
    let (ahead, side) = (d.offset(), d.offset().transpose());
    (!grid.is_walkable(v + side) && grid.is_walkable(v + side + ahead))
        || (!grid.is_walkable(v - side) && grid.is_walkable(v - side + ahead))
}

/// Whether `n` has a forced neighbour when reached diagonally, moving `h`
/// horizontally and `v` vertically.
fn is_diagonal_jump_point(grid: &WalkGrid, n: Point, h: Direction, v: Direction) -> bool {
    let (h, v) = (h.offset(), v.offset());
    (!grid.is_walkable(n - h) && grid.is_walkable(n - h + v))
        || (!grid.is_walkable(n - v) && grid.is_walkable(n - v + h))
}

/// Running state of one cardinal sweep, fed cells starting from the edge
/// the direction points toward.
struct Sweep {
    count: i32,
    jump_seen: bool,
}

impl Sweep {
    fn new() -> Self {
        Self {
            count: -1,
            jump_seen: false,
        }
    }

    fn visit(&mut self, walkable: bool, jump_point: bool) -> i32 {
        if !walkable {
            self.count = -1;
            self.jump_seen = false;
            return 0;
        }
        self.count += 1;
        let value = if self.jump_seen { self.count } else { -self.count };
        if jump_point {
            self.count = 0;
            self.jump_seen = true;
        }
        value
    }
}

impl JumpField {
    /// Precompute the jump distances of `grid`.
    pub fn build(grid: &WalkGrid) -> Self {
        let width = grid.width() as usize;
        let height = grid.height() as usize;

        // Bit `d.index()` is set when the cell is a jump point for cardinal `d`.
        let flags: Vec<u8> = (0..grid.len())
            .into_par_iter()
            .map(|i| {
                let p = grid.point(i);
                Direction::CARDINAL
                    .iter()
                    .filter(|&&d| is_jump_point(grid, p, d))
                    .fold(0u8, |acc, d| acc | 1 << d.index())
            })
            .collect();
        let is_jump = |i: usize, d: Direction| flags[i] & (1 << d.index()) != 0;

        let mut jumps = vec![[0i32; 8]; grid.len()];

        jumps.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
            let base = y * width;
            let walkable = |x: usize| grid.is_walkable(Point::new(x as i32, y as i32));
            let west = Direction::West.index();
            let mut sweep = Sweep::new();
            for x in 0..width {
                row[x][west] = sweep.visit(walkable(x), is_jump(base + x, Direction::West));
            }
            let east = Direction::East.index();
            let mut sweep = Sweep::new();
            for x in (0..width).rev() {
                row[x][east] = sweep.visit(walkable(x), is_jump(base + x, Direction::East));
            }
        });

        for x in 0..width {
            let walkable = |y: usize| grid.is_walkable(Point::new(x as i32, y as i32));
            let north = Direction::North.index();
            let mut sweep = Sweep::new();
            for y in 0..height {
                let i = y * width + x;
                jumps[i][north] = sweep.visit(walkable(y), is_jump(i, Direction::North));
            }
            let south = Direction::South.index();
            let mut sweep = Sweep::new();
            for y in (0..height).rev() {
                let i = y * width + x;
                jumps[i][south] = sweep.visit(walkable(y), is_jump(i, Direction::South));
            }
        }

        // Northward diagonals read the row above, southward ones the row below.
        for y in 0..height {
            for x in 0..width {
                let i = y * width + x;
                for d in [Direction::NorthEast, Direction::NorthWest] {
                    jumps[i][d.index()] = diagonal_jump(grid, &jumps, grid.point(i), d);
                }
            }
        }
        for y in (0..height).rev() {
            for x in 0..width {
                let i = y * width + x;
                for d in [Direction::SouthEast, Direction::SouthWest] {
                    jumps[i][d.index()] = diagonal_jump(grid, &jumps, grid.point(i), d);
                }
            }
        }

        Self {
            width: grid.width(),
            height: grid.height(),
            jumps,
        }
    }

    /// Jump distance from `p` in `dir`. Out-of-bounds cells report `0`.
    #[inline]
    pub fn jump_distance(&self, p: Point, dir: Direction) -> i32 {
        if p.x < 0 || p.y < 0 || p.x >= self.width || p.y >= self.height {
            return 0;
        }
        self.jumps[p.y as usize * self.width as usize + p.x as usize][dir.index()]
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }
}

fn diagonal_jump(grid: &WalkGrid, jumps: &[[i32; 8]], c: Point, d: Direction) -> i32 {
    if !grid.is_walkable(c) || !grid.can_step(c, d) {
        return 0;
    }
    let n = c + d.offset();
    let (Some((h, v)), Some(next)) = (d.components(), grid.index(n)) else {
        return 0;
    };
    let ahead = jumps[next];
    if is_diagonal_jump_point(grid, n, h, v) || ahead[h.index()] > 0 || ahead[v.index()] > 0 {
        return 1;
    }
    let j = ahead[d.index()];
    if j > 0 { j + 1 } else { j - 1 }
}

// ---------------------------------------------------------------------------
// Pathfinder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct JumpNode {
    g: f32,
    parent: Point,
    travel: Option<Direction>,
    closed: bool,
}

/// Eager JPS+ pathfinder: all preprocessing happens at construction, every
/// query is answered synchronously.
#[derive(Debug, Clone)]
pub struct JpsPathfinder {
    grid: Arc<WalkGrid>,
    field: Arc<JumpField>,
}

impl JpsPathfinder {
    /// Derive the walkability grid from `terrain` and precompute its jump
    /// distances.
    pub fn build(terrain: &TerrainGrid, pathable: &[i32]) -> Self {
        Self::new(Arc::new(WalkGrid::new(terrain, pathable)))
    }

    pub fn new(grid: Arc<WalkGrid>) -> Self {
        let started = Instant::now();
        let field = Arc::new(JumpField::build(&grid));
        debug!(
            "jps: jump field for {}x{} grid built in {:?}",
            grid.width(),
            grid.height(),
            started.elapsed()
        );
        Self { grid, field }
    }

    #[inline]
    pub fn grid(&self) -> &WalkGrid {
        &self.grid
    }

    #[inline]
    pub fn field(&self) -> &JumpField {
        &self.field
    }

    /// The next node reachable from `cur` moving in `dir`, with its cost.
    fn successor(&self, cur: Point, dir: Direction, target: Point) -> Option<(Point, f32)> {
        let jd = self.field.jump_distance(cur, dir);
        let diff = target - cur;
        let toward = diff.signum() == dir.offset();
        let steps = if dir.is_cardinal() && toward && diff.max_abs() <= jd.abs() {
            diff.max_abs()
        } else if dir.is_diagonal() && toward && diff.min_abs() <= jd.abs() {
            diff.min_abs()
        } else if jd > 0 {
            jd
        } else {
            return None;
        };
        Some((cur + dir.offset() * steps, steps as f32 * step_cost(dir)))
    }

    /// Shortest path from `start` to `target`, both included.
    ///
    /// Returns `None` when either end is off the grid or a wall, or when the
    /// two are not connected. A start equal to the target yields `[start]`.
    pub fn query(&self, start: Point, target: Point) -> Option<Path> {
        if !self.grid.contains(start) || !self.grid.contains(target) {
            return None;
        }
        if start == target {
            return Some(vec![start]);
        }
        if !self.grid.is_walkable(start) || !self.grid.is_walkable(target) {
            return None;
        }

        let mut open = MinHeap::new();
        let mut nodes: HashMap<Point, JumpNode> = HashMap::new();
        nodes.insert(
            start,
            JumpNode {
                g: 0.0,
                parent: start,
                travel: None,
                closed: false,
            },
        );
        open.push(octile(start, target), start);

        while let Some((_, cur)) = open.pop() {
            let Some(node) = nodes.get_mut(&cur) else {
                continue;
            };
            if node.closed {
                continue;
            }
            node.closed = true;
            if cur == target {
                trace!("jps: {} nodes touched from {start} to {target}", nodes.len());
                return self.unwind(&nodes, start, target);
            }
            let (g, travel) = (node.g, node.travel);

            for &dir in pruned(travel) {
                let Some((next, cost)) = self.successor(cur, dir, target) else {
                    continue;
                };
                let ng = g + cost;
                let relaxed = match nodes.get_mut(&next) {
                    Some(n) if n.closed || ng >= n.g => false,
                    Some(n) => {
                        *n = JumpNode {
                            g: ng,
                            parent: cur,
                            travel: Some(dir),
                            closed: false,
                        };
                        true
                    }
                    None => {
                        nodes.insert(
                            next,
                            JumpNode {
                                g: ng,
                                parent: cur,
                                travel: Some(dir),
                                closed: false,
                            },
                        );
                        true
                    }
                };
                if relaxed {
                    open.push(ng + octile(next, target), next);
                }
            }
        }
        trace!("jps: {target} unreachable from {start}");
        None
    }

    /// Rebuild the cell-by-cell path from the jump-point parent chain.
    fn unwind(&self, nodes: &HashMap<Point, JumpNode>, start: Point, target: Point) -> Option<Path> {
        let mut path = vec![target];
        let mut cur = target;
        while cur != start {
            let parent = nodes.get(&cur)?.parent;
            let step = (parent - cur).signum();
            let mut p = cur;
            while p != parent {
                p = p + step;
                path.push(p);
            }
            cur = parent;
        }
        path.reverse();
        Some(path)
    }
}

impl PathFinder for JpsPathfinder {
    /// JPS has no warm-up: the scan is the single final answer, or nothing.
    fn first_scan(&self, start: Point, target: Point) -> Box<dyn Iterator<Item = Path> + Send + '_> {
        Box::new(self.query(start, target).into_iter())
    }

    fn find_path(&self, start: Point, target: Point) -> Option<Path> {
        self.query(start, target)
    }
}
