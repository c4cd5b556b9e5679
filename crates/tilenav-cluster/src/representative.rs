//! One walkable target cell per cluster.

use log::debug;
use tilenav_core::{Point, Range};

use crate::error::ClusterError;
use crate::kmeans::kmeans;
use crate::vec2::Vec2;

/// Weight of a walkable cell relative to a wall when averaging a cluster.
const WALKABLE_WEIGHT: f64 = 100.0;

/// Cluster `cells` into `k` groups and pick a walkable representative cell
/// for each.
///
/// The representative is the walkable member nearest to the cluster's
/// centroid, where walkable members pull the centroid 100 times harder
/// than walls. A cluster with no walkable member falls back to the cell
/// under the centroid, or failing that the first walkable cell on a
/// growing square ring around it (see [`nearest_walkable`]). Clusters with
/// nothing walkable anywhere in `bounds` are dropped.
///
/// Duplicate representatives are merged, so the result may hold fewer than
/// `k` cells. An empty input yields an empty result.
pub fn representatives(
    cells: &[Point],
    k: usize,
    bounds: Range,
    is_walkable: impl Fn(Point) -> bool,
) -> Result<Vec<Point>, ClusterError> {
    let points: Vec<Vec2> = cells.iter().map(|&c| Vec2::from(c)).collect();
    let labels = kmeans(&points, k)?;

    // Clusters in order of first appearance.
    let mut groups: Vec<(usize, Vec<Point>)> = Vec::new();
    for (&cell, &label) in cells.iter().zip(&labels) {
        match groups.iter_mut().find(|(l, _)| *l == label) {
            Some((_, members)) => members.push(cell),
            None => groups.push((label, vec![cell])),
        }
    }

    let mut out: Vec<Point> = Vec::with_capacity(groups.len());
    for (label, members) in &groups {
        let Some(rep) = representative(members, bounds, &is_walkable) else {
            debug!("cluster {label}: no walkable cell in {bounds}");
            continue;
        };
        if !out.contains(&rep) {
            out.push(rep);
        }
    }
    debug!(
        "representatives: {} cells, {} clusters, {} targets",
        cells.len(),
        groups.len(),
        out.len()
    );
    Ok(out)
}

fn representative(
    members: &[Point],
    bounds: Range,
    is_walkable: &impl Fn(Point) -> bool,
) -> Option<Point> {
    let mut sum = Vec2::ZERO;
    let mut weight = 0.0;
    for &m in members {
        let w = if is_walkable(m) { WALKABLE_WEIGHT } else { 1.0 };
        sum += Vec2::from(m) * w;
        weight += w;
    }
    let centroid = sum / weight;

    let snapped = members
        .iter()
        .copied()
        .filter(|&m| is_walkable(m))
        .min_by(|&a, &b| {
            let da = (Vec2::from(a) - centroid).length_squared();
            let db = (Vec2::from(b) - centroid).length_squared();
            da.total_cmp(&db)
        });
    if snapped.is_some() {
        return snapped;
    }
    let cell = centroid.truncate();
    if is_walkable(cell) {
        return Some(cell);
    }
    nearest_walkable(cell, bounds, is_walkable)
}

/// First walkable cell on square rings of growing radius around `center`,
/// clipped to `bounds`. Each ring is scanned top and bottom rows first,
/// then the left and right columns. `None` once a ring covers all of
/// `bounds` without a hit.
pub fn nearest_walkable(
    center: Point,
    bounds: Range,
    is_walkable: impl Fn(Point) -> bool,
) -> Option<Point> {
    if bounds.is_empty() {
        return None;
    }
    let (lo, hi) = (bounds.min, bounds.max.shift(-1, -1));
    let mut r = 1;
    loop {
        let x0 = lo.x.max(center.x - r);
        let y0 = lo.y.max(center.y - r);
        let x1 = hi.x.min(center.x + r);
        let y1 = hi.y.min(center.y + r);

        let rows = (x0..=x1).flat_map(|x| [Point::new(x, y0), Point::new(x, y1)]);
        let cols = (y0 + 1..y1).flat_map(|y| [Point::new(x0, y), Point::new(x1, y)]);
        if let Some(p) = rows.chain(cols).find(|&p| bounds.contains(p) && is_walkable(p)) {
            return Some(p);
        }
        if x0 == lo.x && y0 == lo.y && x1 == hi.x && y1 == hi.y {
            return None;
        }
        r += 1;
    }
}
