//! Cave terrain for the demo.
//!
//! Random fill smoothed by cellular automata, then relic sites scattered
//! over the result. Relics on open ground are walkable, relics buried in
//! rock are not.

use rand::{Rng, RngExt};
use tilenav_core::{Point, TerrainGrid};

/// A rule for one pass of cellular automata smoothing.
#[derive(Debug, Clone)]
pub struct CellularAutomataRule {
    /// A cell with at least this many walls among its 8 neighbours becomes
    /// a wall.
    pub w_cutoff1: i32,
    /// A cell with at most this many walls within distance 2 becomes a
    /// wall. Breaks up large open areas.
    pub w_cutoff2: i32,
    /// Whether cells outside the grid count as walls.
    pub walls_out_of_range: bool,
    /// How many times to apply this rule.
    pub reps: usize,
}

impl Default for CellularAutomataRule {
    fn default() -> Self {
        Self {
            w_cutoff1: 5,
            w_cutoff2: 2,
            walls_out_of_range: true,
            reps: 4,
        }
    }
}

pub struct CaveGen<R: Rng> {
    pub rng: R,
    pub terrain: TerrainGrid,
}

impl<R: Rng> CaveGen<R> {
    pub fn new(terrain: TerrainGrid, rng: R) -> Self {
        Self { rng, terrain }
    }

    /// Fill with `wall` at `wall_init_pct` percent, `ground` elsewhere, then
    /// apply each rule. Returns the number of ground cells.
    pub fn cellular_automata_cave(
        &mut self,
        wall: i32,
        ground: i32,
        wall_init_pct: u32,
        rules: &[CellularAutomataRule],
    ) -> usize {
        let rng = &mut self.rng;
        self.terrain.fill_fn(|_| {
            if rng.random_range(0..100) < wall_init_pct {
                wall
            } else {
                ground
            }
        });

        for rule in rules {
            for _ in 0..rule.reps {
                let next: Vec<i32> = self
                    .terrain
                    .bounds()
                    .iter()
                    .map(|p| {
                        let walls1 = self.count_walls(p, 1, wall, rule.walls_out_of_range);
                        let walls2 = self.count_walls(p, 2, wall, rule.walls_out_of_range);
                        if walls1 >= rule.w_cutoff1 || walls2 <= rule.w_cutoff2 {
                            wall
                        } else {
                            ground
                        }
                    })
                    .collect();
                let mut cells = next.into_iter();
                self.terrain.fill_fn(|_| cells.next().unwrap_or(wall));
            }
        }

        self.terrain.count_fn(|c| c == ground)
    }

    /// Wall cells within Chebyshev distance `radius` of `center`.
    fn count_walls(&self, center: Point, radius: i32, wall: i32, out_of_range_is_wall: bool) -> i32 {
        let mut count = 0;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx == 0 && dy == 0 {
                    continue;
                }
                match self.terrain.at(center.shift(dx, dy)) {
                    Some(c) if c == wall => count += 1,
                    Some(_) => {}
                    None if out_of_range_is_wall => count += 1,
                    None => {}
                }
            }
        }
        count
    }

    /// Mark `count` random cells as relics: `on_ground` where the cell was
    /// `ground`, `buried` anywhere else. Returns the relic cells.
    pub fn scatter_relics(
        &mut self,
        ground: i32,
        on_ground: i32,
        buried: i32,
        count: usize,
    ) -> Vec<Point> {
        let (w, h) = (self.terrain.width(), self.terrain.height());
        let mut relics = Vec::with_capacity(count);
        while relics.len() < count.min(self.terrain.codes().len()) {
            let p = Point::new(self.rng.random_range(0..w), self.rng.random_range(0..h));
            let code = match self.terrain.at(p) {
                Some(c) if c == ground => on_ground,
                Some(c) if c == on_ground || c == buried => continue,
                _ => buried,
            };
            self.terrain.set(p, code);
            relics.push(p);
        }
        relics
    }
}
