//! Lazy multi-target flow-field pathfinding.
//!
//! The first search toward a target runs Dijkstra outward from the target
//! and records the exact cost-to-target of every settled cell. Later queries
//! toward the same target walk that field downhill without searching. Once a
//! search has covered everything it can reach, the sparse field may be
//! compacted into a dense one-byte-per-cell direction field.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry as RegistryEntry;
use log::{debug, trace};
use parking_lot::RwLock;
use rayon::prelude::*;
use tilenav_core::{Direction, Point, TerrainGrid, WalkGrid};

use crate::Path;
use crate::cancel::CancelToken;
use crate::config::FlowFieldConfig;
use crate::distance::{path_cost, step_cost};
use crate::heap::MinHeap;
use crate::traits::PathFinder;

// ---------------------------------------------------------------------------
// Per-target fields
// ---------------------------------------------------------------------------

/// Sparse cost-to-target of every settled cell.
#[derive(Debug, Default)]
struct ExactField {
    distances: RwLock<HashMap<Point, f32>>,
    complete: AtomicBool,
}

const UNREACHABLE: u8 = 0;
const ARRIVED: u8 = 9;

/// Dense whole-grid field: for every cell, the first step of an optimal path
/// to the target.
#[derive(Debug, Clone)]
pub struct DirectionField {
    width: i32,
    height: i32,
    steps: Vec<u8>,
}

impl DirectionField {
    fn build(grid: &WalkGrid, target: Point, distances: &HashMap<Point, f32>) -> Self {
        let width = grid.width() as usize;
        let mut steps = vec![UNREACHABLE; grid.len()];
        steps.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
            for (x, slot) in row.iter_mut().enumerate() {
                let p = Point::new(x as i32, y as i32);
                *slot = if p == target {
                    ARRIVED
                } else {
                    match downhill(grid, p, target, |q| distances.get(&q).copied()) {
                        Some(dir) => dir.index() as u8 + 1,
                        None => UNREACHABLE,
                    }
                };
            }
        });
        Self {
            width: grid.width(),
            height: grid.height(),
            steps,
        }
    }

    #[inline]
    fn raw(&self, p: Point) -> u8 {
        if p.x < 0 || p.y < 0 || p.x >= self.width || p.y >= self.height {
            return UNREACHABLE;
        }
        self.steps[p.y as usize * self.width as usize + p.x as usize]
    }

    /// Whether the target can be reached from `p`.
    pub fn is_reachable(&self, p: Point) -> bool {
        self.raw(p) != UNREACHABLE
    }

    /// The first step from `p` toward the target. `None` at the target and
    /// at unreachable cells.
    pub fn step(&self, p: Point) -> Option<Direction> {
        match self.raw(p) {
            UNREACHABLE | ARRIVED => None,
            d => Some(Direction::from_index(d as usize - 1)),
        }
    }

    /// Follow the field from `start` to the target.
    pub fn follow(&self, start: Point) -> Option<Path> {
        let mut path = vec![start];
        let mut cur = start;
        loop {
            match self.raw(cur) {
                ARRIVED => return Some(path),
                UNREACHABLE => return None,
                d => {
                    cur = cur + Direction::from_index(d as usize - 1).offset();
                    path.push(cur);
                    if path.len() > self.steps.len() {
                        return None;
                    }
                }
            }
        }
    }

    /// Heap footprint in bytes.
    pub fn size_bytes(&self) -> usize {
        self.steps.len()
    }
}

/// Best legal step out of `p` on a cost-to-target field: the neighbour `n`
/// with `d(n) < d(p)` minimising `d(n) + step cost`. The target itself may
/// be stepped on even when it is a wall.
fn downhill(
    grid: &WalkGrid,
    p: Point,
    target: Point,
    dist: impl Fn(Point) -> Option<f32>,
) -> Option<Direction> {
    let here = dist(p)?;
    let mut best: Option<(f32, Direction)> = None;
    for dir in Direction::ALL {
        let n = p + dir.offset();
        if n != target && !grid.can_step(p, dir) {
            continue;
        }
        let Some(dn) = dist(n) else {
            continue;
        };
        if dn >= here {
            continue;
        }
        let total = dn + step_cost(dir);
        if best.is_none_or(|(b, _)| total < b) {
            best = Some((total, dir));
        }
    }
    best.map(|(_, dir)| dir)
}

#[derive(Debug, Clone)]
enum TargetField {
    Exact(Arc<ExactField>),
    Direction(Arc<DirectionField>),
}

// ---------------------------------------------------------------------------
// Pathfinder
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Shared {
    grid: Arc<WalkGrid>,
    config: FlowFieldConfig,
    fields: DashMap<Point, TargetField>,
}

/// Flow-field pathfinder over one immutable grid.
///
/// Cloning is cheap and every clone shares the per-target fields, so a
/// clone can be handed to each worker that routes toward some target.
#[derive(Debug, Clone)]
pub struct FlowFieldPathfinder {
    shared: Arc<Shared>,
}

impl FlowFieldPathfinder {
    /// Derive the walkability grid from `terrain` and build a pathfinder on it.
    pub fn build(terrain: &TerrainGrid, pathable: &[i32]) -> Self {
        Self::new(Arc::new(WalkGrid::new(terrain, pathable)))
    }

    pub fn new(grid: Arc<WalkGrid>) -> Self {
        Self::with_config(grid, FlowFieldConfig::default())
    }

    pub fn with_config(grid: Arc<WalkGrid>, config: FlowFieldConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                grid,
                config,
                fields: DashMap::new(),
            }),
        }
    }

    #[inline]
    pub fn grid(&self) -> &WalkGrid {
        &self.shared.grid
    }

    #[inline]
    pub fn config(&self) -> &FlowFieldConfig {
        &self.shared.config
    }

    fn field(&self, target: Point) -> Option<TargetField> {
        self.shared.fields.get(&target).map(|f| f.value().clone())
    }

    /// Start (or skip) the search toward `target`. See [`FlowSearch`].
    pub fn begin_search(&self, start: Point, target: Point) -> FlowSearch {
        self.begin_search_with(start, target, CancelToken::new())
    }

    /// Like [`begin_search`](Self::begin_search), stopping at the next yield
    /// point once `cancel` is cancelled.
    ///
    /// Only the first search toward a given target does any work; every later
    /// call, including concurrent ones, gets a search that yields nothing.
    pub fn begin_search_with(&self, start: Point, target: Point, cancel: CancelToken) -> FlowSearch {
        if !self.shared.grid.contains(target) {
            debug!("flow field: target {target} is off the grid");
            return FlowSearch::inert(&self.shared, start, target, SearchOutcome::Skipped);
        }
        let field = Arc::new(ExactField::default());
        match self.shared.fields.entry(target) {
            RegistryEntry::Occupied(_) => {
                debug!("flow field: search toward {target} already started");
                return FlowSearch::inert(&self.shared, start, target, SearchOutcome::Skipped);
            }
            RegistryEntry::Vacant(slot) => {
                slot.insert(TargetField::Exact(Arc::clone(&field)));
            }
        }
        debug!("flow field: searching from {target} toward {start}");
        FlowSearch::new(Arc::clone(&self.shared), start, target, field, cancel)
    }

    /// The path from `start` to `target` using the field built for `target`.
    ///
    /// Returns `None` when either point is off the grid, when no search
    /// toward `target` has settled `start` yet, or when `start` cannot reach
    /// `target`. A start equal to the target yields `[start]`.
    pub fn query(&self, start: Point, target: Point) -> Option<Path> {
        let grid = &self.shared.grid;
        if !grid.contains(start) || !grid.contains(target) {
            return None;
        }
        if start == target {
            return Some(vec![start]);
        }
        match self.field(target)? {
            TargetField::Direction(field) => field.follow(start),
            TargetField::Exact(field) => {
                let distances = field.distances.read();
                distances.get(&start)?;
                let mut path = vec![start];
                let mut cur = start;
                while cur != target {
                    let dir = downhill(grid, cur, target, |q| distances.get(&q).copied())?;
                    cur = cur + dir.offset();
                    path.push(cur);
                }
                Some(path)
            }
        }
    }

    /// Cost of the optimal path from `start` to `target`, if known.
    pub fn distance(&self, start: Point, target: Point) -> Option<f32> {
        if start == target && self.shared.grid.contains(start) {
            return Some(0.0);
        }
        match self.field(target)? {
            TargetField::Exact(field) => field.distances.read().get(&start).copied(),
            TargetField::Direction(field) => field.follow(start).map(|p| path_cost(&p)),
        }
    }

    /// Whether the search toward `target` has run to exhaustion.
    pub fn is_complete(&self, target: Point) -> bool {
        match self.field(target) {
            Some(TargetField::Exact(field)) => field.complete.load(Ordering::Acquire),
            Some(TargetField::Direction(_)) => true,
            None => false,
        }
    }

    /// Whether the field for `target` has been compacted into a direction
    /// field.
    pub fn is_compacted(&self, target: Point) -> bool {
        matches!(self.field(target), Some(TargetField::Direction(_)))
    }

    /// The compacted direction field for `target`, if there is one.
    pub fn direction_field(&self, target: Point) -> Option<Arc<DirectionField>> {
        match self.field(target)? {
            TargetField::Direction(field) => Some(field),
            TargetField::Exact(_) => None,
        }
    }

    /// Number of targets with a field (finished or not).
    pub fn target_count(&self) -> usize {
        self.shared.fields.len()
    }
}

impl PathFinder for FlowFieldPathfinder {
    fn first_scan(&self, start: Point, target: Point) -> Box<dyn Iterator<Item = Path> + Send + '_> {
        Box::new(self.begin_search(start, target))
    }

    fn find_path(&self, start: Point, target: Point) -> Option<Path> {
        self.query(start, target)
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Where a [`FlowSearch`] stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Still expanding; `start` not settled yet.
    InProgress,
    /// `start` has been settled. The search may still be expanding the rest
    /// of the field.
    Reached,
    /// The frontier ran dry without reaching `start`.
    Unreachable,
    /// Stopped by its cancellation token. The partial field is kept.
    Cancelled,
    /// Another search already owns this target, or the target is off the
    /// grid. Nothing was done.
    Skipped,
}

#[derive(Debug, Clone, Copy)]
struct Node {
    dist: f32,
    parent: Point,
    settled: bool,
}

/// A resumable Dijkstra expansion from a target, consumed as an iterator of
/// path snapshots.
///
/// Each call to `next` expands until one of:
/// - `start` is settled: yields the optimal path `start → target`;
/// - the time slice elapses: yields the best path so far (empty until
///   `start` is reached);
/// - the frontier is exhausted: finalises the field and returns `None`.
///
/// An empty snapshot means "not there yet", not "unreachable". Once the
/// iterator is done, [`outcome`](Self::outcome) tells which it was.
///
/// The search owns a handle on the pathfinder, so it can be moved to a
/// worker thread.
#[derive(Debug)]
pub struct FlowSearch {
    shared: Arc<Shared>,
    start: Point,
    target: Point,
    field: Option<Arc<ExactField>>,
    frontier: MinHeap<f32, Point>,
    nodes: HashMap<Point, Node>,
    settled: usize,
    best: Path,
    cancel: CancelToken,
    outcome: SearchOutcome,
}

impl FlowSearch {
    fn new(
        shared: Arc<Shared>,
        start: Point,
        target: Point,
        field: Arc<ExactField>,
        cancel: CancelToken,
    ) -> Self {
        let mut frontier = MinHeap::new();
        frontier.push(0.0, target);
        let mut nodes = HashMap::new();
        nodes.insert(
            target,
            Node {
                dist: 0.0,
                parent: target,
                settled: false,
            },
        );
        Self {
            shared,
            start,
            target,
            field: Some(field),
            frontier,
            nodes,
            settled: 0,
            best: Vec::new(),
            cancel,
            outcome: SearchOutcome::InProgress,
        }
    }

    fn inert(shared: &Arc<Shared>, start: Point, target: Point, outcome: SearchOutcome) -> Self {
        Self {
            shared: Arc::clone(shared),
            start,
            target,
            field: None,
            frontier: MinHeap::new(),
            nodes: HashMap::new(),
            settled: 0,
            best: Vec::new(),
            cancel: CancelToken::new(),
            outcome,
        }
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn target(&self) -> Point {
        self.target
    }

    pub fn outcome(&self) -> SearchOutcome {
        self.outcome
    }

    /// Whether the search will do no more work.
    pub fn is_finished(&self) -> bool {
        self.field.is_none()
    }

    /// The best path found so far (empty until `start` is settled).
    pub fn best(&self) -> &Path {
        &self.best
    }

    /// Number of cells settled so far.
    pub fn settled(&self) -> usize {
        self.settled
    }

    fn backtrack(&self) -> Path {
        let mut path = vec![self.start];
        let mut cur = self.start;
        while cur != self.target {
            cur = self.nodes[&cur].parent;
            path.push(cur);
        }
        path
    }

    /// Push the walkable neighbours of `cell`. Only the target can be a
    /// wall here, and it still seeds the search.
    fn expand(&mut self, cell: Point, dist: f32) {
        let grid = Arc::clone(&self.shared.grid);
        for (dir, next) in grid.steps(cell) {
            let nd = dist + step_cost(dir);
            match self.nodes.entry(next) {
                Entry::Vacant(slot) => {
                    slot.insert(Node {
                        dist: nd,
                        parent: cell,
                        settled: false,
                    });
                    self.frontier.push(nd, next);
                }
                Entry::Occupied(mut slot) => {
                    let node = slot.get_mut();
                    if !node.settled && nd < node.dist {
                        node.dist = nd;
                        node.parent = cell;
                        self.frontier.push(nd, next);
                    }
                }
            }
        }
    }

    fn finalize(&mut self, field: &ExactField) {
        self.field = None;
        self.frontier.clear();
        self.nodes = HashMap::new();
        if self.outcome == SearchOutcome::InProgress {
            self.outcome = SearchOutcome::Unreachable;
        }

        let grid = &self.shared.grid;
        let config = &self.shared.config;
        let entries = field.distances.read().len();
        if config.should_compact(grid.len(), entries) {
            let started = Instant::now();
            let dirs = DirectionField::build(grid, self.target, &field.distances.read());
            self.shared
                .fields
                .insert(self.target, TargetField::Direction(Arc::new(dirs)));
            debug!(
                "flow field: compacted {entries} entries toward {} into {} bytes in {:?}",
                self.target,
                grid.len(),
                started.elapsed()
            );
        } else {
            field.complete.store(true, Ordering::Release);
            debug!(
                "flow field: keeping {entries} sparse entries toward {}",
                self.target
            );
        }
    }
}

impl Iterator for FlowSearch {
    type Item = Path;

    fn next(&mut self) -> Option<Path> {
        let field = self.field.clone()?;
        if self.cancel.is_cancelled() {
            debug!(
                "flow field: search toward {} cancelled after {} cells",
                self.target, self.settled
            );
            self.field = None;
            self.frontier.clear();
            self.outcome = SearchOutcome::Cancelled;
            return None;
        }

        let slice = Instant::now();
        while let Some((dist, cell)) = self.frontier.pop() {
            let Some(node) = self.nodes.get_mut(&cell) else {
                continue;
            };
            if node.settled || dist > node.dist {
                continue;
            }
            node.settled = true;
            field.distances.write().insert(cell, dist);
            self.settled += 1;
            self.expand(cell, dist);

            if cell == self.start {
                self.outcome = SearchOutcome::Reached;
                self.best = self.backtrack();
                return Some(self.best.clone());
            }
            if slice.elapsed() >= self.shared.config.time_slice {
                trace!(
                    "flow field: {} cells settled toward {}, frontier {}",
                    self.settled,
                    self.target,
                    self.frontier.len()
                );
                return Some(self.best.clone());
            }
        }

        self.finalize(&field);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::{SQRT_2, octile};
    use std::time::Duration;

    fn pathfinder(ascii: &str) -> FlowFieldPathfinder {
        FlowFieldPathfinder::new(Arc::new(WalkGrid::from_ascii(ascii).unwrap()))
    }

    fn with_config(ascii: &str, config: FlowFieldConfig) -> FlowFieldPathfinder {
        FlowFieldPathfinder::with_config(Arc::new(WalkGrid::from_ascii(ascii).unwrap()), config)
    }

    fn assert_steps_are_legal(grid: &WalkGrid, path: &[Point]) {
        for w in path.windows(2) {
            let dir = Direction::from_delta(w[1] - w[0]).unwrap();
            assert_eq!(w[0] + dir.offset(), w[1], "not a unit step: {w:?}");
            assert!(grid.can_step(w[0], dir), "illegal step {w:?}");
        }
    }

    const ROOMS: &str = "
        ..........
        .####.###.
        .#......#.
        .#.####.#.
        ...#..#...
        .#.#..#.#.
        .#......#.
        .########.
        ..........
    ";

    #[test]
    fn two_cell_corridor() {
        let pf = pathfinder("..");
        let (start, target) = (Point::new(1, 0), Point::new(0, 0));
        let snaps: Vec<Path> = pf.begin_search(start, target).collect();
        assert_eq!(snaps.last().unwrap(), &vec![start, target]);
        assert_eq!(pf.query(start, target), Some(vec![start, target]));
        assert_eq!(pf.distance(start, target), Some(1.0));
    }

    #[test]
    fn routes_around_a_block() {
        let pf = pathfinder(
            "
            ...
            .##
            .##
            ",
        );
        let (start, target) = (Point::new(2, 0), Point::new(0, 2));
        let mut search = pf.begin_search(start, target);
        let first = search.next().unwrap();
        assert_eq!(search.outcome(), SearchOutcome::Reached);
        assert_eq!(
            first,
            vec![
                Point::new(2, 0),
                Point::new(1, 0),
                Point::new(0, 1),
                Point::new(0, 2)
            ]
        );
        assert!(search.next().is_none());
        assert!(search.is_finished());
        let cost = pf.distance(start, target).unwrap();
        assert!((cost - (2.0 + SQRT_2)).abs() < 1e-5);
        assert!(cost > octile(start, target));
    }

    #[test]
    fn single_walled_cell_is_its_own_path() {
        let pf = pathfinder("#");
        let p = Point::new(0, 0);
        let snaps: Vec<Path> = pf.begin_search(p, p).collect();
        assert_eq!(snaps, vec![vec![p]]);
        assert_eq!(pf.query(p, p), Some(vec![p]));
        assert_eq!(pf.distance(p, p), Some(0.0));
    }

    #[test]
    fn wall_target_is_reached_from_its_neighbours() {
        let pf = pathfinder(
            "
            ...
            .#.
            ...
            ",
        );
        let (start, target) = (Point::new(0, 0), Point::new(1, 1));
        assert!(!pf.grid().is_walkable(target));
        let snaps: Vec<Path> = pf.begin_search(start, target).collect();
        assert_eq!(snaps.last(), Some(&vec![start, target]));
        assert_eq!(pf.distance(start, target), Some(SQRT_2));
        let side = Point::new(2, 1);
        assert_eq!(pf.query(side, target), Some(vec![side, target]));
    }

    #[test]
    fn off_grid_queries_have_no_path() {
        let pf = pathfinder("...\n...");
        let mut search = pf.begin_search(Point::new(0, 0), Point::new(5, 5));
        assert!(search.next().is_none());
        assert_eq!(search.outcome(), SearchOutcome::Skipped);

        let target = Point::new(2, 1);
        pf.begin_search(Point::new(0, 0), target).for_each(drop);
        assert_eq!(pf.query(Point::new(-1, 0), target), None);
        assert_eq!(pf.query(Point::new(0, 0), Point::new(0, 9)), None);
        assert!(pf.query(Point::new(0, 0), target).is_some());
    }

    #[test]
    fn cold_target_has_no_path() {
        let pf = pathfinder("...");
        assert_eq!(pf.query(Point::new(0, 0), Point::new(2, 0)), None);
        assert!(!pf.is_complete(Point::new(2, 0)));
    }

    #[test]
    fn disconnected_components_are_unreachable() {
        let pf = pathfinder(
            "
            ..#..
            ..#..
            ",
        );
        let (start, target) = (Point::new(0, 0), Point::new(4, 1));
        let mut search = pf.begin_search(start, target);
        let snaps: Vec<Path> = search.by_ref().collect();
        assert!(snaps.iter().all(Vec::is_empty));
        assert_eq!(search.outcome(), SearchOutcome::Unreachable);
        assert!(pf.is_complete(target));
        assert_eq!(pf.query(start, target), None);
        assert_eq!(pf.distance(start, target), None);
    }

    #[test]
    fn repeated_search_is_a_no_op() {
        let pf = pathfinder(ROOMS);
        let target = Point::new(4, 4);
        let first: Vec<Path> = pf.begin_search(Point::new(0, 0), target).collect();
        assert!(!first.is_empty());

        let mut again = pf.begin_search(Point::new(9, 8), target);
        assert!(again.next().is_none());
        assert_eq!(again.outcome(), SearchOutcome::Skipped);
        assert_eq!(pf.target_count(), 1);
    }

    #[test]
    fn warm_queries_are_idempotent() {
        let pf = pathfinder(ROOMS);
        let target = Point::new(5, 5);
        pf.begin_search(Point::new(0, 0), target).for_each(drop);
        for start in pf.grid().bounds() {
            assert_eq!(pf.query(start, target), pf.query(start, target));
        }
    }

    #[test]
    fn path_cost_matches_recorded_distance() {
        let pf = with_config(ROOMS, FlowFieldConfig::default().with_entry_bytes(0));
        let target = Point::new(4, 5);
        pf.begin_search(Point::new(9, 0), target).for_each(drop);
        assert!(pf.is_complete(target));
        assert!(!pf.is_compacted(target));
        let grid = pf.grid().clone();
        for start in grid.bounds() {
            match (pf.query(start, target), pf.distance(start, target)) {
                (Some(path), Some(d)) => {
                    assert_eq!(path.first(), Some(&start));
                    assert_eq!(path.last(), Some(&target));
                    assert_steps_are_legal(&grid, &path);
                    assert!((path_cost(&path) - d).abs() < 1e-4, "{start}");
                }
                (None, None) => assert!(!grid.is_walkable(start)),
                other => panic!("query and distance disagree at {start}: {other:?}"),
            }
        }
    }

    #[test]
    fn direction_field_agrees_with_exact_field() {
        let target = Point::new(2, 2);
        let sparse = with_config(ROOMS, FlowFieldConfig::default().with_entry_bytes(0));
        let dense = with_config(ROOMS, FlowFieldConfig::default().with_entry_bytes(usize::MAX));
        sparse.begin_search(Point::new(0, 0), target).for_each(drop);
        dense.begin_search(Point::new(0, 0), target).for_each(drop);
        assert!(!sparse.is_compacted(target));
        assert!(dense.is_compacted(target));
        assert!(dense.is_complete(target));

        for start in sparse.grid().bounds() {
            let a = sparse.query(start, target).map(|p| path_cost(&p));
            let b = dense.query(start, target).map(|p| path_cost(&p));
            match (a, b) {
                (Some(a), Some(b)) => assert!((a - b).abs() < 1e-4, "{start}: {a} vs {b}"),
                (None, None) => {}
                other => panic!("reachability differs at {start}: {other:?}"),
            }
        }
    }

    #[test]
    fn default_threshold_compacts_large_coverage() {
        // 400 cells, all reachable: 400 < 400 * 20.
        let grid = Arc::new(WalkGrid::from_fn(20, 20, |_| true).unwrap());
        let pf = FlowFieldPathfinder::new(grid);
        let target = Point::new(10, 10);
        pf.begin_search(Point::new(0, 0), target).for_each(drop);
        let field = pf.direction_field(target).unwrap();
        assert_eq!(field.size_bytes(), 400);
        assert_eq!(field.step(target), None);
        assert!(field.is_reachable(Point::new(19, 19)));
        let d = pf.distance(Point::new(0, 0), target).unwrap();
        assert!((d - 10.0 * SQRT_2).abs() < 1e-4);
    }

    #[test]
    fn interim_snapshots_are_empty_until_start_is_settled() {
        let pf = with_config(ROOMS, FlowFieldConfig::default().with_time_slice(Duration::ZERO));
        let (start, target) = (Point::new(9, 8), Point::new(0, 0));
        let snaps: Vec<Path> = pf.begin_search(start, target).collect();
        assert!(snaps.len() > 1);
        let first_full = snaps.iter().position(|s| !s.is_empty()).unwrap();
        assert!(snaps[..first_full].iter().all(Vec::is_empty));
        let full = &snaps[first_full];
        assert_eq!(full.first(), Some(&start));
        assert_eq!(full.last(), Some(&target));
        // Later snapshots never get worse.
        assert!(snaps[first_full..].iter().all(|s| s == full));
    }

    #[test]
    fn cancellation_keeps_partial_field() {
        let pf = with_config(ROOMS, FlowFieldConfig::default().with_time_slice(Duration::ZERO));
        let target = Point::new(0, 0);
        let token = CancelToken::new();
        let mut search = pf.begin_search_with(Point::new(9, 8), target, token.child());
        for _ in 0..5 {
            assert!(search.next().is_some());
        }
        token.cancel();
        assert!(search.next().is_none());
        assert_eq!(search.outcome(), SearchOutcome::Cancelled);
        assert!(!pf.is_complete(target));

        // Settled cells near the target answer with exact paths.
        let near = Point::new(1, 0);
        assert_eq!(pf.query(near, target), Some(vec![near, target]));
        assert_eq!(pf.query(Point::new(9, 8), target), None);
    }

    #[test]
    fn concurrent_first_queries_search_once() {
        let pf = pathfinder(ROOMS);
        let target = Point::new(9, 8);
        let outcomes: Vec<SearchOutcome> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let pf = pf.clone();
                    s.spawn(move || {
                        let mut search = pf.begin_search(Point::new(i, 0), target);
                        search.by_ref().for_each(drop);
                        search.outcome()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        let owners = outcomes
            .iter()
            .filter(|&&o| o != SearchOutcome::Skipped)
            .count();
        assert_eq!(owners, 1);
        assert!(pf.is_complete(target));
    }

    #[test]
    fn different_targets_search_in_parallel() {
        let pf = pathfinder(ROOMS);
        let targets = [Point::new(0, 0), Point::new(9, 0), Point::new(4, 4), Point::new(9, 8)];
        std::thread::scope(|s| {
            for &t in &targets {
                let pf = pf.clone();
                s.spawn(move || pf.begin_search(Point::new(0, 8), t).for_each(drop));
            }
        });
        assert_eq!(pf.target_count(), 4);
        for t in targets {
            assert!(pf.is_complete(t));
            let path = pf.query(Point::new(0, 8), t).unwrap();
            assert_eq!(path.last(), Some(&t));
        }
    }

    #[test]
    fn search_runs_on_a_worker_thread() {
        let pf = pathfinder(ROOMS);
        let search = pf.begin_search(Point::new(0, 0), Point::new(9, 8));
        let last = std::thread::spawn(move || search.filter(|p| !p.is_empty()).last())
            .join()
            .unwrap()
            .unwrap();
        let warm = pf.query(Point::new(0, 0), Point::new(9, 8)).unwrap();
        assert!((path_cost(&last) - path_cost(&warm)).abs() < 1e-4);
    }

    #[test]
    fn trait_object_dispatch() {
        let pf = pathfinder("...");
        let finder: &dyn PathFinder = &pf;
        let snaps: Vec<Path> = finder.first_scan(Point::new(0, 0), Point::new(2, 0)).collect();
        assert_eq!(snaps.len(), 1);
        assert_eq!(finder.find_path(Point::new(0, 0), Point::new(2, 0)).map(|p| p.len()), Some(3));
    }
}
