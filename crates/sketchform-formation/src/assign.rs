//! Agent-to-target assignment.
//!
//! [`AssignmentStrategy`] is the seam for matching algorithms. The shipped
//! [`GreedyAssignment`] is a nearest-available heuristic: it is fast and
//! deterministic but not a minimum-cost matching. An optimal solver (e.g.
//! the Hungarian method) plugs in as another implementation of the trait.

use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// One agent paired with one target point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Index of the agent in the input order.
    pub agent: usize,
    /// Index of the chosen point in the target list.
    pub target_index: usize,
    pub target: Point2<f64>,
}

/// Pairs agents with targets.
///
/// Implementations must return at most `min(agents.len(), targets.len())`
/// assignments, never reuse a target index, and list assignments in agent
/// order.
pub trait AssignmentStrategy {
    fn name(&self) -> &'static str;

    fn assign(&self, agents: &[Point2<f64>], targets: &[Point2<f64>]) -> Vec<Assignment>;
}

/// Nearest-available-target matching in agent order, without backtracking.
///
/// Ties in distance go to the target that comes first in the remaining pool
/// (which keeps the input order).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GreedyAssignment;

impl AssignmentStrategy for GreedyAssignment {
    fn name(&self) -> &'static str {
        "greedy"
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip_all, fields(agents = agents.len(), targets = targets.len()))
    )]
    fn assign(&self, agents: &[Point2<f64>], targets: &[Point2<f64>]) -> Vec<Assignment> {
        let mut pool: Vec<usize> = (0..targets.len()).collect();
        let mut out = Vec::with_capacity(agents.len().min(targets.len()));

        for (agent, position) in agents.iter().enumerate() {
            let mut best: Option<(usize, f64)> = None;
            for (slot, &ti) in pool.iter().enumerate() {
                let d = (targets[ti] - position).norm();
                if best.is_none_or(|(_, bd)| d < bd) {
                    best = Some((slot, d));
                }
            }
            let Some((slot, _)) = best else {
                break;
            };
            let target_index = pool.remove(slot);
            out.push(Assignment {
                agent,
                target_index,
                target: targets[target_index],
            });
        }

        debug!(
            "greedy assignment: {} pairs, total travel {:.2}",
            out.len(),
            total_travel(agents, &out)
        );
        out
    }
}

/// Targets reordered so the i-th entry belongs to the i-th agent.
pub fn reorder_targets(
    agents: &[Point2<f64>],
    targets: &[Point2<f64>],
    strategy: &dyn AssignmentStrategy,
) -> Vec<Point2<f64>> {
    strategy
        .assign(agents, targets)
        .into_iter()
        .map(|a| a.target)
        .collect()
}

/// Sum of straight-line distances travelled under `assignments`.
pub fn total_travel(agents: &[Point2<f64>], assignments: &[Assignment]) -> f64 {
    assignments
        .iter()
        .filter_map(|a| agents.get(a.agent).map(|p| (a.target - p).norm()))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::collections::HashSet;

    fn pts(raw: &[(f64, f64)]) -> Vec<Point2<f64>> {
        raw.iter().map(|&(x, y)| Point2::new(x, y)).collect()
    }

    #[test]
    fn picks_nearest_available() {
        let agents = pts(&[(0.0, 0.0), (10.0, 0.0)]);
        let targets = pts(&[(11.0, 0.0), (1.0, 0.0)]);
        let out = reorder_targets(&agents, &targets, &GreedyAssignment);
        assert_eq!(out, pts(&[(1.0, 0.0), (11.0, 0.0)]));
    }

    #[test]
    fn greedy_is_not_optimal() {
        // Agent 0 grabs the shared nearest target, leaving agent 1 a long trip.
        let agents = pts(&[(0.0, 0.0), (-1.0, 0.0)]);
        let targets = pts(&[(-1.5, 0.0), (5.0, 0.0)]);
        let out = GreedyAssignment.assign(&agents, &targets);
        assert_eq!(out[0].target_index, 0);
        assert_eq!(out[1].target_index, 1);
        assert_abs_diff_eq!(total_travel(&agents, &out), 1.5 + 6.0, epsilon = 1e-12);
    }

    #[test]
    fn ties_resolve_to_first_target() {
        let agents = pts(&[(0.0, 0.0)]);
        let targets = pts(&[(0.0, 2.0), (2.0, 0.0), (-2.0, 0.0)]);
        let out = GreedyAssignment.assign(&agents, &targets);
        assert_eq!(out[0].target_index, 0);
    }

    #[test]
    fn length_and_uniqueness() {
        let agents = pts(&[(0.0, 0.0), (0.1, 0.0), (0.2, 0.0), (5.0, 5.0), (9.0, 1.0)]);
        let targets = pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        let out = GreedyAssignment.assign(&agents, &targets);
        assert_eq!(out.len(), 3);
        let used: HashSet<usize> = out.iter().map(|a| a.target_index).collect();
        assert_eq!(used.len(), 3);
        assert_eq!(
            out.iter().map(|a| a.agent).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );

        let fewer_targets = GreedyAssignment.assign(&agents[..2], &targets);
        assert_eq!(fewer_targets.len(), 2);
    }

    #[test]
    fn empty_inputs() {
        let some = pts(&[(1.0, 1.0)]);
        assert!(GreedyAssignment.assign(&[], &some).is_empty());
        assert!(GreedyAssignment.assign(&some, &[]).is_empty());
        assert_eq!(GreedyAssignment.name(), "greedy");
    }
}
