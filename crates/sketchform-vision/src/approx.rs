//! Stable polygon approximation by majority vote over several tolerances.
//!
//! A single Douglas-Peucker tolerance is sensitive to stroke jitter: the same
//! square can come out with 4, 5 or 6 vertices depending on the epsilon. The
//! approximator therefore runs every configured epsilon factor, builds a
//! histogram of the resulting vertex counts and keeps the most frequent one.
//! Ties go to the count first produced by the smallest epsilon factor, and the
//! returned polygon is the smallest-epsilon approximation with that count.

use std::collections::BTreeMap;

use log::debug;
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::contour::Contour;
use crate::error::ShapeDetectError;
use crate::params::ApproximationParams;

/// Vertex count produced by one epsilon factor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VertexVote {
    pub epsilon_factor: f64,
    pub vertex_count: usize,
}

/// Reduced polygon chosen by the vote.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolygonApproximation {
    /// Vertices in contour traversal order (start vertex unspecified).
    pub vertices: Vec<Point2<i32>>,
    /// Epsilon factor that produced `vertices`.
    pub epsilon_factor: f64,
    /// Closed perimeter of the source contour.
    pub perimeter: f64,
    /// Every candidate's vertex count, in epsilon order.
    pub votes: Vec<VertexVote>,
}

impl PolygonApproximation {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

/// Pick the winning vote: most frequent vertex count, ties broken by the
/// smallest epsilon factor. Returns the index of the first vote (in
/// increasing epsilon order) carrying the winning count.
pub fn select_stable_vote(votes: &[VertexVote]) -> Option<usize> {
    // count -> (frequency, smallest epsilon producing it)
    let mut hist: BTreeMap<usize, (usize, f64)> = BTreeMap::new();
    for v in votes {
        let entry = hist.entry(v.vertex_count).or_insert((0, f64::INFINITY));
        entry.0 += 1;
        entry.1 = entry.1.min(v.epsilon_factor);
    }

    let (&winner, _) = hist.iter().max_by(|(_, a), (_, b)| {
        a.0.cmp(&b.0).then_with(|| {
            // Smaller epsilon must compare as "greater" to win the tie.
            b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal)
        })
    })?;

    let mut order: Vec<usize> = (0..votes.len()).collect();
    order.sort_by(|&i, &j| {
        votes[i]
            .epsilon_factor
            .partial_cmp(&votes[j].epsilon_factor)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order.into_iter().find(|&i| votes[i].vertex_count == winner)
}

/// Multi-epsilon Douglas-Peucker approximator.
#[derive(Clone, Debug, Default)]
pub struct PolygonApproximator {
    params: ApproximationParams,
}

impl PolygonApproximator {
    pub fn new(params: ApproximationParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ApproximationParams {
        &self.params
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, contour), fields(points = contour.len()))
    )]
    pub fn approximate(&self, contour: &Contour) -> Result<PolygonApproximation, ShapeDetectError> {
        let perimeter = contour.perimeter();
        if !(perimeter.is_finite() && perimeter > 0.0) {
            return Err(ShapeDetectError::ApproximationFailed);
        }

        let candidates: Vec<(f64, Vec<Point2<i32>>)> = self
            .params
            .epsilon_factors
            .iter()
            .map(|&factor| (factor, approximate_closed(&contour.points, factor * perimeter)))
            .collect();

        let votes: Vec<VertexVote> = candidates
            .iter()
            .map(|(factor, poly)| VertexVote {
                epsilon_factor: *factor,
                vertex_count: poly.len(),
            })
            .collect();

        let chosen = select_stable_vote(&votes).ok_or(ShapeDetectError::ApproximationFailed)?;
        let (epsilon_factor, vertices) = candidates
            .into_iter()
            .nth(chosen)
            .ok_or(ShapeDetectError::ApproximationFailed)?;

        debug!(
            "vertex votes {:?} -> {} vertices at epsilon factor {epsilon_factor}",
            votes.iter().map(|v| v.vertex_count).collect::<Vec<_>>(),
            vertices.len()
        );

        Ok(PolygonApproximation {
            vertices,
            epsilon_factor,
            perimeter,
            votes,
        })
    }
}

/// Douglas-Peucker on a closed curve.
///
/// The ring is split at two far-apart anchors (the farthest point from the
/// start, then the farthest point from that one); each half is simplified
/// independently. A final pass removes vertices that lie within `epsilon`
/// of the chord joining their neighbours, which also covers the anchors.
pub fn approximate_closed(points: &[Point2<i32>], epsilon: f64) -> Vec<Point2<i32>> {
    let n = points.len();
    if n <= 2 {
        return points.to_vec();
    }

    let b = farthest_from(points, 0);
    let a = farthest_from(points, b);
    if a == b {
        return vec![points[a]];
    }

    let first = ring_chain(points, a, b);
    let second = ring_chain(points, b, a);

    let mut out = simplify_open(&first, epsilon);
    out.pop();
    let mut back = simplify_open(&second, epsilon);
    back.pop();
    out.extend(back);

    prune_closed(out, epsilon)
}

fn farthest_from(points: &[Point2<i32>], from: usize) -> usize {
    let origin = points[from];
    let mut best = from;
    let mut best_d = 0i64;
    for (i, p) in points.iter().enumerate() {
        let dx = (p.x - origin.x) as i64;
        let dy = (p.y - origin.y) as i64;
        let d = dx * dx + dy * dy;
        if d > best_d {
            best_d = d;
            best = i;
        }
    }
    best
}

/// Points from index `from` to index `to` inclusive, walking forward and
/// wrapping around the ring.
fn ring_chain(points: &[Point2<i32>], from: usize, to: usize) -> Vec<Point2<i32>> {
    let n = points.len();
    let len = (to + n - from) % n + 1;
    (0..len).map(|k| points[(from + k) % n]).collect()
}

fn simplify_open(points: &[Point2<i32>], epsilon: f64) -> Vec<Point2<i32>> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let first = points[0];
    let last = points[points.len() - 1];

    let mut max_dist = 0.0f64;
    let mut max_idx = 0;
    for (i, &p) in points.iter().enumerate().skip(1).take(points.len() - 2) {
        let d = perpendicular_distance(p, first, last);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }

    if max_dist > epsilon {
        let mut left = simplify_open(&points[..=max_idx], epsilon);
        let right = simplify_open(&points[max_idx..], epsilon);
        left.pop();
        left.extend(right);
        left
    } else {
        vec![first, last]
    }
}

fn prune_closed(mut poly: Vec<Point2<i32>>, epsilon: f64) -> Vec<Point2<i32>> {
    loop {
        let n = poly.len();
        if n <= 3 {
            return poly;
        }
        let redundant = (0..n).find(|&i| {
            let prev = poly[(i + n - 1) % n];
            let next = poly[(i + 1) % n];
            perpendicular_distance(poly[i], prev, next) <= epsilon
        });
        match redundant {
            Some(i) => {
                poly.remove(i);
            }
            None => return poly,
        }
    }
}

fn perpendicular_distance(p: Point2<i32>, a: Point2<i32>, b: Point2<i32>) -> f64 {
    let p = p.cast::<f64>();
    let a = a.cast::<f64>();
    let b = b.cast::<f64>();
    let ab: Vector2<f64> = b - a;
    let len = ab.norm();
    if len < 1e-12 {
        return (p - a).norm();
    }
    let ap = p - a;
    (ab.x * ap.y - ab.y * ap.x).abs() / len
}
