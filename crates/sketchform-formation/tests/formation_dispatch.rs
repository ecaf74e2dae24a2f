use std::collections::HashSet;

use nalgebra::Point2;
use sketchform_formation::{
    generate_formation, plan_dispatch, reorder_targets, AssignmentStrategy, FormationShape,
    GreedyAssignment,
};

fn line_of_agents(n: usize) -> Vec<Point2<f64>> {
    (0..n).map(|i| Point2::new(i as f64 * 3.0, -20.0)).collect()
}

#[test]
fn every_shape_dispatches_without_reusing_targets() {
    for shape in [
        FormationShape::Triangle,
        FormationShape::Square,
        FormationShape::Pentagon,
        FormationShape::Hexagon,
        FormationShape::Circle,
        FormationShape::Line,
    ] {
        for agents_n in [1, 3, 5, 8] {
            let targets = generate_formation(shape, 6, 20.0).unwrap();
            let agents = line_of_agents(agents_n);
            let assignments = GreedyAssignment.assign(&agents, &targets);

            assert_eq!(assignments.len(), agents_n.min(targets.len()), "{shape}");
            let unique: HashSet<usize> = assignments.iter().map(|a| a.target_index).collect();
            assert_eq!(unique.len(), assignments.len(), "{shape}");

            let plan = plan_dispatch(&agents, &targets, -10.0, &GreedyAssignment);
            assert_eq!(
                plan.targets.len() + plan.idle_agents.len(),
                agents_n,
                "{shape}"
            );
            assert!(plan.targets.iter().all(|t| t.position.z == -10.0));
        }
    }
}

#[test]
fn reordered_targets_follow_agents() {
    let targets = generate_formation(FormationShape::Square, 4, 10.0).unwrap();
    // Agents sitting just outside each corner, listed in reverse.
    let agents: Vec<Point2<f64>> = targets
        .iter()
        .rev()
        .map(|p| Point2::from(p.coords * 1.2))
        .collect();
    let ordered = reorder_targets(&agents, &targets, &GreedyAssignment);
    let expected: Vec<Point2<f64>> = targets.iter().rev().copied().collect();
    assert_eq!(ordered, expected);
}
