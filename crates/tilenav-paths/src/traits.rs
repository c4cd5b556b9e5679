use tilenav_core::Point;

use crate::Path;

/// Common surface of the pathfinding engines.
///
/// `first_scan` is the first query toward a target: it may produce several
/// snapshots while the engine warms up, the last one being the best answer.
/// `find_path` is the cheap follow-up query once the engine is warm.
pub trait PathFinder {
    /// Snapshots of the path from `start` to `target`, best last.
    fn first_scan(&self, start: Point, target: Point) -> Box<dyn Iterator<Item = Path> + Send + '_>;

    /// The path from `start` to `target`, or `None` if there is none (or the
    /// engine has not been warmed up for `target`).
    fn find_path(&self, start: Point, target: Point) -> Option<Path>;
}
