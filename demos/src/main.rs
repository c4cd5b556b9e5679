//! tilenav demo: carve a cave, cluster relic sites into a few targets, and
//! route to each of them with both pathfinders.
//!
//! Usage: `tilenav-demos [seed]`

mod cave;

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tilenav_cluster::{nearest_walkable, representatives};
use tilenav_core::{Point, TerrainGrid, WalkGrid};
use tilenav_paths::{CancelToken, FlowFieldPathfinder, JpsPathfinder, Path, Route, path_cost};

use cave::{CaveGen, CellularAutomataRule};

const WIDTH: usize = 72;
const HEIGHT: usize = 28;

const WALL: i32 = 0;
const FLOOR: i32 = 1;
const RELIC: i32 = 2;
const BURIED_RELIC: i32 = 3;
const PATHABLE: &[i32] = &[FLOOR, RELIC];

const RELICS: usize = 48;
const CLUSTERS: usize = 6;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let seed: u64 = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 7,
    };

    let mut cave_gen = CaveGen::new(
        TerrainGrid::filled(WIDTH, HEIGHT, WALL)?,
        SmallRng::seed_from_u64(seed),
    );
    let rules = [
        CellularAutomataRule::default(),
        CellularAutomataRule {
            w_cutoff2: -1,
            reps: 3,
            ..CellularAutomataRule::default()
        },
    ];
    let floor = cave_gen.cellular_automata_cave(WALL, FLOOR, 45, &rules);
    let relics = cave_gen.scatter_relics(FLOOR, RELIC, BURIED_RELIC, RELICS);
    let terrain = cave_gen.terrain;

    let grid = Arc::new(WalkGrid::new(&terrain, PATHABLE));
    println!(
        "seed {seed}: {}x{} cave, {floor} floor cells, {} relics",
        grid.width(),
        grid.height(),
        relics.len()
    );

    let walkable = |p: Point| grid.is_walkable(p);
    let center = Point::new(grid.width() / 2, grid.height() / 2);
    let start = if walkable(center) {
        center
    } else {
        nearest_walkable(center, grid.bounds(), walkable).ok_or("the cave has no floor")?
    };
    let targets = representatives(&relics, CLUSTERS, grid.bounds(), walkable)?;
    println!("start {start}, {} targets", targets.len());

    let flow = FlowFieldPathfinder::new(Arc::clone(&grid));
    let jps = JpsPathfinder::new(Arc::clone(&grid));

    // One worker per target warms up its flow field, reporting snapshots
    // as they arrive.
    let stop = CancelToken::new();
    let warmed: Vec<(Point, Option<Path>)> = thread::scope(|s| {
        let handles: Vec<_> = targets
            .iter()
            .map(|&target| {
                let (flow, token) = (&flow, stop.child());
                s.spawn(move || {
                    let mut route = Route::new(flow, target, token);
                    let mut snapshots = 0;
                    route.run_first_scan(start, |_| snapshots += 1);
                    (target, route.path().cloned(), snapshots)
                })
            })
            .collect();
        handles
            .into_iter()
            .filter_map(|h| h.join().ok())
            .map(|(target, path, snapshots)| {
                println!("  warmed {target} with {snapshots} snapshot(s)");
                (target, path)
            })
            .collect()
    });

    println!();
    println!("{:>10}  {:>6}  {:>9}  {:>9}", "target", "steps", "flow", "jps");
    let mut drawn: Vec<Path> = Vec::new();
    for (target, warm) in &warmed {
        let via_flow = flow.query(start, *target);
        let via_jps = jps.query(start, *target);
        let cost = |p: &Option<Path>| {
            p.as_deref()
                .map_or("-".to_string(), |p| format!("{:.2}", path_cost(p)))
        };
        println!(
            "{:>10}  {:>6}  {:>9}  {:>9}",
            target.to_string(),
            warm.as_ref().map_or(0, |p| p.len().saturating_sub(1)),
            cost(&via_flow),
            cost(&via_jps)
        );
        drawn.extend(via_jps);
    }

    println!();
    print!("{}", render(&terrain, &grid, start, &targets, &drawn));

    // Walk a few steps along the first route and refresh it as we go.
    if let Some(path) = drawn.first() {
        if let Some(&goal) = path.last() {
            let mut route = Route::new(&jps, goal, stop.child());
            route.run_first_scan(start, |_| {});
            for &p in path.iter().skip(1).step_by(4) {
                route.refresh(p);
                let left = route.path().map_or(0, |p| p.len().saturating_sub(1));
                println!("at {p}: {left} steps to {goal}");
            }
        }
    }
    stop.cancel();
    Ok(())
}

fn render(
    terrain: &TerrainGrid,
    grid: &WalkGrid,
    start: Point,
    targets: &[Point],
    paths: &[Path],
) -> String {
    let on_path: HashSet<Point> = paths.iter().flatten().copied().collect();
    let mut out = String::with_capacity(grid.len() + grid.height() as usize);
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let p = Point::new(x, y);
            let ch = if p == start {
                '@'
            } else if targets.contains(&p) {
                'X'
            } else if on_path.contains(&p) {
                '*'
            } else {
                match terrain.at(p) {
                    Some(RELIC) => '$',
                    Some(BURIED_RELIC) => '%',
                    _ if grid.is_walkable(p) => '.',
                    _ => '#',
                }
            };
            out.push(ch);
        }
        out.push('\n');
    }
    out
}
