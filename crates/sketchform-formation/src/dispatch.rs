use log::{debug, info};
use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};

use crate::assign::AssignmentStrategy;

/// Where one agent should fly.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentTarget {
    pub agent: usize,
    pub position: Point3<f64>,
}

/// Per-agent move orders for one formation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchPlan {
    /// In agent order.
    pub targets: Vec<AgentTarget>,
    /// Agents left without a target; they hold position.
    pub idle_agents: Vec<usize>,
    /// Targets no agent was available for.
    pub unfilled_targets: usize,
}

/// Match `agents` to `targets` with `strategy` and lift the result to
/// `altitude`.
///
/// With fewer agents than targets, only the assigned targets are flown.
/// With more agents than targets, the surplus agents are listed as idle.
pub fn plan_dispatch(
    agents: &[Point2<f64>],
    targets: &[Point2<f64>],
    altitude: f64,
    strategy: &dyn AssignmentStrategy,
) -> DispatchPlan {
    let assignments = strategy.assign(agents, targets);

    let mut assigned = vec![false; agents.len()];
    let mut planned = Vec::with_capacity(assignments.len());
    for a in &assignments {
        if let Some(slot) = assigned.get_mut(a.agent) {
            *slot = true;
        }
        planned.push(AgentTarget {
            agent: a.agent,
            position: Point3::new(a.target.x, a.target.y, altitude),
        });
    }
    planned.sort_by_key(|t| t.agent);

    let idle_agents: Vec<usize> = assigned
        .iter()
        .enumerate()
        .filter_map(|(i, &used)| (!used).then_some(i))
        .collect();
    let unfilled_targets = targets.len().saturating_sub(planned.len());

    if unfilled_targets > 0 {
        info!(
            "{} targets but only {} agents; {unfilled_targets} targets left unfilled",
            targets.len(),
            agents.len()
        );
    }
    if !idle_agents.is_empty() {
        info!("{} agents stay in place", idle_agents.len());
    }
    debug!(
        "{} dispatch: {} moves at altitude {altitude}",
        strategy.name(),
        planned.len()
    );

    DispatchPlan {
        targets: planned,
        idle_agents,
        unfilled_targets,
    }
}
