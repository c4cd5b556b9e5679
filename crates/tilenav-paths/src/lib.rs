//! Pathfinding engines for tile grids.
//!
//! Two engines answer the same question, "what is the shortest 8-connected
//! path from `start` to `target`?", with different trade-offs:
//!
//! - **Flow field** ([`FlowFieldPathfinder`]): lazy, per target. The first
//!   search toward a target runs Dijkstra outward from it, handing back
//!   interim snapshots as it goes ([`FlowSearch`]); every later query toward
//!   that target is a walk down the finished field.
//! - **Jump point search** ([`JpsPathfinder`]): eager. Jump distances are
//!   precomputed for the whole grid and each query runs A* over jump points.
//!
//! Both implement [`PathFinder`] and share the movement model of
//! [`WalkGrid`](tilenav_core::WalkGrid), so they agree on path costs.
//! [`Route`] keeps a path toward one target current while the walker moves.
//!
//! # Costs
//!
//! | Step | Cost |
//! |---|---|
//! | cardinal | 1 |
//! | diagonal | √2 |

mod cancel;
mod config;
mod distance;
mod flowfield;
mod heap;
mod jps;
mod neighbors;
mod route;
mod traits;

use tilenav_core::Point;

/// A sequence of unit steps from start to target, both included.
pub type Path = Vec<Point>;

pub use cancel::CancelToken;
pub use config::FlowFieldConfig;
pub use distance::{SQRT_2, octile, path_cost, step_cost};
pub use flowfield::{DirectionField, FlowFieldPathfinder, FlowSearch, SearchOutcome};
pub use heap::MinHeap;
pub use jps::{JpsPathfinder, JumpField};
pub use neighbors::pruned;
pub use route::Route;
pub use traits::PathFinder;
