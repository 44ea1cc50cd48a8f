//! Critical path method (CPM) over an activity-on-edge network.
//!
//! Edge weights are activity durations. The forward pass computes the
//! earliest event time of each node, the backward pass the latest time that
//! still meets the project duration. Activities with zero slack form the
//! critical path.

use serde::{Deserialize, Serialize};

use super::topo::ActivityNetwork;
use super::EPSILON;
use crate::error::SolverResult;
use crate::graph::Graph;
use crate::report::Summary;

/// Configuration for the critical path computation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CpmConfig {
    /// Slack at or below this magnitude counts as zero
    pub epsilon: f64,
}

impl Default for CpmConfig {
    fn default() -> Self {
        Self { epsilon: EPSILON }
    }
}

/// Event times of one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeTiming {
    pub id: String,
    pub earliest: f64,
    pub latest: f64,
    pub slack: f64,
}

/// Schedule of one activity (edge).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeTiming {
    pub id: String,
    pub source: String,
    pub target: String,
    pub weight: f64,
    pub earliest_start: f64,
    pub earliest_finish: f64,
    pub latest_start: f64,
    pub latest_finish: f64,
    pub slack: f64,
    pub is_critical: bool,
}

/// Result of the critical path analysis.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalPathResult {
    /// Project duration (longest path length)
    pub duration: f64,
    /// Per node, in graph order
    pub node_times: Vec<NodeTiming>,
    /// Per qualifying edge, in graph order
    pub edge_table: Vec<EdgeTiming>,
    /// Critical edge ids ordered by earliest start
    pub critical_edges: Vec<String>,
    /// Endpoints of critical edges, first-seen order
    pub critical_nodes: Vec<String>,
    pub topological_order: Vec<String>,
    pub warnings: Vec<String>,
}

impl CriticalPathResult {
    pub fn node(&self, id: &str) -> Option<&NodeTiming> {
        self.node_times.iter().find(|t| t.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&EdgeTiming> {
        self.edge_table.iter().find(|t| t.id == id)
    }
}

impl Summary for CriticalPathResult {
    fn summary(&self) -> String {
        format!(
            "Project duration: {} ({} critical activities)",
            self.duration,
            self.critical_edges.len()
        )
    }
}

/// Run the forward and backward passes over the qualifying edges.
///
/// Undirected, negative and non-finite edges are skipped and reported in
/// `warnings`.
///
/// # Returns
/// * `Ok(CriticalPathResult)` with node and edge timings
/// * `Err(SolverError::CyclicGraph)` if the qualifying edges contain a cycle
pub fn critical_path(graph: &Graph, config: &CpmConfig) -> SolverResult<CriticalPathResult> {
    let net = ActivityNetwork::build(graph);
    let order = net.topological_order()?;
    let n = net.node_count();

    // Forward pass: earliest event times
    let mut earliest = vec![0.0f64; n];
    for &u in &order {
        for link in &net.out[u] {
            let candidate = earliest[u] + link.weight;
            if candidate > earliest[link.to] {
                earliest[link.to] = candidate;
            }
        }
    }
    let duration = earliest.iter().copied().fold(0.0f64, f64::max);

    // Backward pass: latest event times
    let mut latest: Vec<f64> = (0..n)
        .map(|v| {
            if net.out_degree(v) == 0 {
                duration
            } else {
                f64::INFINITY
            }
        })
        .collect();
    for &u in order.iter().rev() {
        for link in &net.out[u] {
            latest[u] = latest[u].min(latest[link.to] - link.weight);
        }
        if !latest[u].is_finite() {
            // Cannot reach a sink; keep slack defined.
            latest[u] = earliest[u];
        }
    }

    let mut edge_table = Vec::with_capacity(net.edges.len());
    let mut critical_nodes: Vec<String> = Vec::new();
    for &e in &net.edges {
        let edge = &graph.edges()[e];
        let (u, v) = graph.endpoints(e);
        let earliest_start = earliest[u];
        let latest_finish = latest[v];
        let latest_start = latest_finish - edge.weight;
        let slack = latest_start - earliest_start;
        let is_critical = slack.abs() < config.epsilon;

        if is_critical {
            for id in [&edge.source, &edge.target] {
                if !critical_nodes.contains(id) {
                    critical_nodes.push(id.clone());
                }
            }
        }

        edge_table.push(EdgeTiming {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
            weight: edge.weight,
            earliest_start,
            earliest_finish: earliest_start + edge.weight,
            latest_start,
            latest_finish,
            slack,
            is_critical,
        });
    }

    let mut critical: Vec<&EdgeTiming> = edge_table.iter().filter(|t| t.is_critical).collect();
    critical.sort_by(|a, b| a.earliest_start.total_cmp(&b.earliest_start));
    let critical_edges = critical.into_iter().map(|t| t.id.clone()).collect();

    let node_times = graph
        .nodes()
        .iter()
        .enumerate()
        .map(|(i, node)| NodeTiming {
            id: node.id.clone(),
            earliest: earliest[i],
            latest: latest[i],
            slack: latest[i] - earliest[i],
        })
        .collect();

    log::debug!(
        "critical path: duration {duration} over {} activities",
        net.edges.len()
    );

    Ok(CriticalPathResult {
        duration,
        node_times,
        edge_table,
        critical_edges,
        critical_nodes,
        topological_order: net.ids(&order),
        warnings: net.skipped_warning().into_iter().collect(),
    })
}

/// Critical path with default epsilon.
pub fn critical_path_default(graph: &Graph) -> SolverResult<CriticalPathResult> {
    critical_path(graph, &CpmConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolverError;
    use crate::graph::testing::directed;

    fn scenario() -> Graph {
        // e0 A->B, e1 A->C, e2 B->D, e3 C->D
        directed(&[
            ("A", "B", 4.0),
            ("A", "C", 2.0),
            ("B", "D", 1.0),
            ("C", "D", 5.0),
        ])
    }

    #[test]
    fn test_scenario_duration_and_slack() {
        let r = critical_path_default(&scenario()).unwrap();
        assert_eq!(r.duration, 7.0);

        assert_eq!(r.node("A").unwrap().earliest, 0.0);
        assert_eq!(r.node("B").unwrap().earliest, 4.0);
        assert_eq!(r.node("D").unwrap().earliest, 7.0);
        assert_eq!(r.node("B").unwrap().latest, 6.0);
        assert_eq!(r.node("B").unwrap().slack, 2.0);

        assert_eq!(r.edge("e0").unwrap().slack, 2.0);
        assert_eq!(r.edge("e2").unwrap().slack, 2.0);
        assert_eq!(r.edge("e1").unwrap().slack, 0.0);
        assert_eq!(r.edge("e3").unwrap().slack, 0.0);

        assert_eq!(r.critical_edges, vec!["e1", "e3"]);
        assert_eq!(r.critical_nodes, vec!["A", "C", "D"]);
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn test_edge_timing_fields() {
        let r = critical_path_default(&scenario()).unwrap();
        let ab = r.edge("e0").unwrap();
        assert_eq!(ab.earliest_start, 0.0);
        assert_eq!(ab.earliest_finish, 4.0);
        assert_eq!(ab.latest_finish, 6.0);
        assert_eq!(ab.latest_start, 2.0);
        assert!(!ab.is_critical);
    }

    #[test]
    fn test_critical_ordered_by_earliest_start() {
        // the later activity appears first in input order
        let g = directed(&[("B", "C", 2.0), ("A", "B", 3.0)]);
        let r = critical_path_default(&g).unwrap();
        assert_eq!(r.critical_edges, vec!["e1", "e0"]);
    }

    #[test]
    fn test_cycle_rejected() {
        let g = directed(&[("A", "B", 1.0), ("B", "C", 1.0), ("C", "A", 1.0)]);
        assert_eq!(
            critical_path_default(&g).unwrap_err(),
            SolverError::CyclicGraph
        );
    }

    #[test]
    fn test_negative_edges_are_ignored() {
        let g = directed(&[("A", "B", 3.0), ("B", "A", -1.0), ("B", "C", 2.0)]);
        let r = critical_path_default(&g).unwrap();
        assert_eq!(r.duration, 5.0);
        assert_eq!(r.edge_table.len(), 2);
        assert_eq!(r.warnings.len(), 1);
    }

    #[test]
    fn test_isolated_node_gets_full_slack() {
        let mut g = scenario();
        g.add_node("Z", None);
        let r = critical_path_default(&g).unwrap();
        let z = r.node("Z").unwrap();
        assert_eq!(z.earliest, 0.0);
        assert_eq!(z.latest, 7.0);
        assert_eq!(z.slack, 7.0);
    }

    #[test]
    fn test_empty_graph() {
        let r = critical_path_default(&Graph::new()).unwrap();
        assert_eq!(r.duration, 0.0);
        assert!(r.critical_edges.is_empty());
    }

    #[test]
    fn test_parallel_critical_paths() {
        let g = directed(&[
            ("S", "A", 2.0),
            ("S", "B", 2.0),
            ("A", "T", 3.0),
            ("B", "T", 3.0),
        ]);
        let r = critical_path_default(&g).unwrap();
        assert_eq!(r.duration, 5.0);
        assert_eq!(r.critical_edges.len(), 4);
    }

    #[test]
    fn test_summary() {
        let r = critical_path_default(&scenario()).unwrap();
        assert_eq!(r.summary(), "Project duration: 7 (2 critical activities)");
    }
}
