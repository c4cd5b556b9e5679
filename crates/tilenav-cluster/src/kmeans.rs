//! Lloyd's k-means with deterministic farthest-point seeding.
//!
//! The result is a cluster label per input point. Labels are dense in
//! `0..k` and cluster `0` always contains point `0`.

use log::debug;

use crate::error::ClusterError;
use crate::vec2::Vec2;

/// Partition `points` into `k` clusters, returning one label per point.
///
/// - `k == 0` is an error.
/// - `k >= points.len()` gives every point its own cluster, labelled by
///   index.
/// - Otherwise seeds are chosen by farthest-point traversal from point 0
///   and Lloyd iterations run until the assignment stops changing, a
///   cluster would end up empty, or `10 * n` iterations have passed.
///
/// Every label in `0..k` is used, even when points coincide.
pub fn kmeans(points: &[Vec2], k: usize) -> Result<Vec<usize>, ClusterError> {
    if k == 0 {
        return Err(ClusterError::NoClusters);
    }
    let n = points.len();
    if k >= n {
        return Ok((0..n).collect());
    }

    let mut assignment = seed(points, k);
    let limit = n * 10;
    let mut iterations = 0;
    while iterations < limit {
        iterations += 1;
        if !lloyd_step(points, &mut assignment, k) {
            break;
        }
    }
    debug!("kmeans: {n} points into {k} clusters after {iterations} iterations");
    Ok(assignment)
}

/// One Lloyd iteration: recompute the means of `assignment`, then move
/// every point to its nearest mean.
///
/// Returns `false` when the iteration should be the last one: some cluster
/// is empty (nothing is changed), no point moved, or the moves would leave
/// a cluster empty (the previous assignment is kept). A point is never
/// moved out of a cluster it is the only member of.
pub fn lloyd_step(points: &[Vec2], assignment: &mut [usize], k: usize) -> bool {
    debug_assert_eq!(points.len(), assignment.len());
    match means(points, assignment, k) {
        Some(means) => reassign(points, assignment, &means),
        None => false,
    }
}

/// Farthest-point seeding. Returns the initial assignment of every point
/// to its nearest seed. Seed `i` always labels cluster `i`, so coinciding
/// seeds still leave no cluster empty.
fn seed(points: &[Vec2], k: usize) -> Vec<usize> {
    let mut seeds = vec![0];
    while seeds.len() < k {
        let mut best: Option<(f64, usize)> = None;
        for (i, &p) in points.iter().enumerate() {
            if seeds.contains(&i) {
                continue;
            }
            let d = seeds
                .iter()
                .map(|&s| p.distance(points[s]))
                .fold(f64::INFINITY, f64::min);
            if best.is_none_or(|(bd, _)| d > bd) {
                best = Some((d, i));
            }
        }
        match best {
            Some((_, i)) => seeds.push(i),
            None => break,
        }
    }
    let centers: Vec<Vec2> = seeds.iter().map(|&s| points[s]).collect();
    let mut assignment: Vec<usize> = points.iter().map(|&p| nearest(p, &centers)).collect();
    for (label, &s) in seeds.iter().enumerate() {
        assignment[s] = label;
    }
    assignment
}

/// Index of the center closest to `p`, the lowest one on ties.
fn nearest(p: Vec2, centers: &[Vec2]) -> usize {
    let mut best = (f64::INFINITY, 0);
    for (i, &c) in centers.iter().enumerate() {
        let d = p.distance(c);
        if d < best.0 {
            best = (d, i);
        }
    }
    best.1
}

fn sizes(assignment: &[usize], k: usize) -> Vec<usize> {
    let mut sizes = vec![0; k];
    for &c in assignment {
        sizes[c] += 1;
    }
    sizes
}

fn means(points: &[Vec2], assignment: &[usize], k: usize) -> Option<Vec<Vec2>> {
    let sizes = sizes(assignment, k);
    if sizes.contains(&0) {
        return None;
    }
    let mut sums = vec![Vec2::ZERO; k];
    for (&p, &c) in points.iter().zip(assignment) {
        sums[c] += p;
    }
    Some(sums.into_iter().zip(sizes).map(|(s, n)| s / n as f64).collect())
}

fn reassign(points: &[Vec2], assignment: &mut [usize], means: &[Vec2]) -> bool {
    let mut next = assignment.to_vec();
    let mut sizes = sizes(assignment, means.len());
    let mut moved = false;
    for (&p, label) in points.iter().zip(next.iter_mut()) {
        let best = nearest(p, means);
        if best == *label || sizes[*label] <= 1 {
            continue;
        }
        sizes[*label] -= 1;
        sizes[best] += 1;
        *label = best;
        moved = true;
    }
    if !moved || sizes.contains(&0) {
        return false;
    }
    assignment.copy_from_slice(&next);
    true
}
