//! Bipartite assignment: 2-coloring, padded cost matrix, Munkres.

use serde::Serialize;

use super::bipartite::{bipartition, Bipartition};
use super::cost_matrix::build_cost_matrix;
use super::munkres::{munkres, AssignmentStep};
use super::Mode;
use crate::error::SolverResult;
use crate::graph::Graph;
use crate::report::{Report, Summary, Trace};

/// One chosen pairing, always between two real nodes joined by an edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedPair {
    pub u: String,
    pub v: String,
    pub edge_id: String,
    pub weight: f64,
}

/// Optimal assignment between the two sides of a bipartite graph.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub mode: Mode,
    /// Sides as found by the coloring, without dummy padding
    pub bipartite_sets: Bipartition,
    pub pairs: Vec<AssignedPair>,
    /// Edge ids of `pairs`, for highlighting
    pub assigned_edges: Vec<String>,
    /// Sum of the original weights of the assigned edges
    pub total_cost: f64,
}

impl Summary for Assignment {
    fn summary(&self) -> String {
        format!(
            "Total assignment cost ({}): {}",
            self.mode, self.total_cost
        )
    }
}

/// Solve the assignment problem, recording the Munkres trace into `trace`.
///
/// # Returns
/// * `Err(SolverError::NotBipartite)` if the graph has an odd cycle
/// * `Err(SolverError::InfeasibleAssignment)` if no complete assignment avoids
///   missing edges (minimization only; maximization treats them as zero gain)
pub fn compute_assignment(
    graph: &Graph,
    mode: Mode,
    trace: &mut Trace<AssignmentStep>,
) -> SolverResult<Assignment> {
    let sets = bipartition(graph)?;
    let problem = build_cost_matrix(graph, &sets, mode, trace);
    let positions = munkres(&problem.matrix, trace)?;

    let mut pairs = Vec::new();
    for p in positions {
        if problem.is_dummy(p.row, p.col) {
            continue;
        }
        let Some(e) = problem.edge_at(p.row, p.col) else {
            continue;
        };
        let edge = &graph.edges()[e];
        pairs.push(AssignedPair {
            u: problem.rows[p.row].clone(),
            v: problem.cols[p.col].clone(),
            edge_id: edge.id.clone(),
            weight: edge.weight,
        });
    }

    let total_cost = pairs.iter().map(|p| p.weight).sum();
    let assigned_edges = pairs.iter().map(|p| p.edge_id.clone()).collect();
    log::info!(
        "assignment ({mode}) over {}x{} matrix: {} pairs, total {total_cost}",
        problem.n(),
        problem.n(),
        pairs.len()
    );

    Ok(Assignment {
        mode,
        bipartite_sets: sets,
        pairs,
        assigned_edges,
        total_cost,
    })
}

/// Solve and package the outcome together with the full step trace.
pub fn solve_assignment(graph: &Graph, mode: Mode) -> Report<Assignment, AssignmentStep> {
    let mut trace = Trace::new();
    let result = compute_assignment(graph, mode, &mut trace);
    Report::new(result, trace.into_steps())
}
