//! Route tracking toward a fixed target while the walker moves.

use log::debug;
use tilenav_core::Point;

use crate::Path;
use crate::cancel::CancelToken;
use crate::traits::PathFinder;

/// One logical route: a fixed target, a moving start, and the last path
/// handed out.
///
/// A route first drives the engine's warm-up scan with
/// [`run_first_scan`](Self::run_first_scan), then calls
/// [`refresh`](Self::refresh) with the walker's position whenever it likes;
/// only actual moves trigger a new query. Once the route's token is
/// cancelled both calls become no-ops.
#[derive(Debug)]
pub struct Route<'a, F: PathFinder + ?Sized> {
    finder: &'a F,
    target: Point,
    cancel: CancelToken,
    position: Option<Point>,
    path: Option<Path>,
}

impl<'a, F: PathFinder + ?Sized> Route<'a, F> {
    pub fn new(finder: &'a F, target: Point, cancel: CancelToken) -> Self {
        Self {
            finder,
            target,
            cancel,
            position: None,
            path: None,
        }
    }

    pub fn target(&self) -> Point {
        self.target
    }

    /// The last path delivered, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Consume the engine's first scan from `start`, passing every non-empty
    /// snapshot to `sink`.
    ///
    /// Returns `false` if the route was cancelled before the scan finished.
    /// Dropping the scan early leaves a flow-field search partial, which
    /// later queries treat like a cancelled search.
    pub fn run_first_scan(&mut self, start: Point, mut sink: impl FnMut(&Path)) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        self.position = Some(start);
        for snapshot in self.finder.first_scan(start, self.target) {
            if self.cancel.is_cancelled() {
                debug!("route to {}: cancelled during first scan", self.target);
                return false;
            }
            if !snapshot.is_empty() {
                sink(&snapshot);
                self.path = Some(snapshot);
            }
        }
        !self.cancel.is_cancelled()
    }

    /// Re-query from `position` if it differs from the previous one.
    ///
    /// Returns whether a query ran. The new result, which may be `None`,
    /// replaces [`path`](Self::path).
    pub fn refresh(&mut self, position: Point) -> bool {
        if self.cancel.is_cancelled() || self.position == Some(position) {
            return false;
        }
        self.position = Some(position);
        self.path = self.finder.find_path(position, self.target);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flowfield::FlowFieldPathfinder;
    use crate::jps::JpsPathfinder;
    use std::sync::Arc;
    use tilenav_core::WalkGrid;

    const MAP: &str = "
        ........
        .######.
        ........
    ";

    fn grid() -> Arc<WalkGrid> {
        Arc::new(WalkGrid::from_ascii(MAP).unwrap())
    }

    #[test]
    fn first_scan_forwards_only_real_paths() {
        let pf = FlowFieldPathfinder::new(grid());
        let target = Point::new(7, 2);
        let mut route = Route::new(&pf, target, CancelToken::new());
        let mut seen = Vec::new();
        assert!(route.run_first_scan(Point::new(0, 0), |p| seen.push(p.clone())));
        assert!(!seen.is_empty());
        assert!(seen.iter().all(|p| p.first() == Some(&Point::new(0, 0))));
        assert_eq!(route.path(), seen.last());
    }

    #[test]
    fn refresh_only_requeries_after_a_move() {
        let pf = JpsPathfinder::new(grid());
        let mut route = Route::new(&pf, Point::new(7, 0), CancelToken::new());
        assert!(route.run_first_scan(Point::new(0, 2), |_| {}));
        assert!(!route.refresh(Point::new(0, 2)));
        assert!(route.refresh(Point::new(1, 2)));
        assert_eq!(route.path().and_then(|p| p.first()), Some(&Point::new(1, 2)));
        assert!(!route.refresh(Point::new(1, 2)));
        // Walking into a wall loses the path.
        assert!(route.refresh(Point::new(3, 1)));
        assert_eq!(route.path(), None);
    }

    #[test]
    fn cancelled_route_stops_work() {
        let pf = FlowFieldPathfinder::new(grid());
        let all = CancelToken::new();
        let mut route = Route::new(&pf, Point::new(7, 2), all.child());
        all.cancel();
        assert!(route.is_cancelled());
        let mut calls = 0;
        assert!(!route.run_first_scan(Point::new(0, 0), |_| calls += 1));
        assert_eq!(calls, 0);
        assert!(!route.refresh(Point::new(1, 0)));
        assert_eq!(route.path(), None);
    }

    #[test]
    fn works_through_a_trait_object() {
        let pf = FlowFieldPathfinder::new(grid());
        let finder: &dyn PathFinder = &pf;
        let mut route = Route::new(finder, Point::new(0, 2), CancelToken::new());
        assert!(route.run_first_scan(Point::new(7, 0), |_| {}));
        assert!(route.refresh(Point::new(6, 0)));
        let path = route.path().unwrap();
        assert_eq!(path.last(), Some(&Point::new(0, 2)));
    }
}
