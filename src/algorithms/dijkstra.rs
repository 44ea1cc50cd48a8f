//! Single-source shortest paths with a binary heap.
//!
//! Directed edges are followed one way, undirected edges both ways. Weights
//! must be nonnegative.

use serde::Serialize;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use super::NodeDistance;
use crate::error::{SolverError, SolverResult};
use crate::graph::Graph;
use crate::report::Summary;

/// Shortest distances from one source to every node.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortestPathTree {
    pub source: String,
    pub distances: Vec<NodeDistance>,
    /// Edge id used to reach each node, parallel to `distances`
    pub via: Vec<Option<String>>,
    #[serde(skip)]
    dist: Vec<f64>,
    #[serde(skip)]
    prev: Vec<Option<usize>>,
}

impl ShortestPathTree {
    pub fn distance(&self, id: &str) -> Option<f64> {
        self.distances
            .iter()
            .find(|d| d.id == id)
            .and_then(|d| d.distance)
    }
}

impl Summary for ShortestPathTree {
    fn summary(&self) -> String {
        let reached = self.dist.iter().filter(|d| d.is_finite()).count();
        format!(
            "Shortest paths from {}: {} of {} nodes reachable",
            self.source,
            reached,
            self.dist.len()
        )
    }
}

/// Shortest path between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedPath {
    pub distance: f64,
    pub path: Vec<String>,
    pub edges: Vec<String>,
}

impl Summary for WeightedPath {
    fn summary(&self) -> String {
        format!("Shortest path: {} ({})", self.distance, self.path.join(" -> "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct State {
    dist: f64,
    node: usize,
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist
            .total_cmp(&other.dist)
            .then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Run Dijkstra from `source`.
///
/// # Returns
/// * `Err(SolverError::SourceNotInGraph)` if `source` is unknown
/// * `Err(SolverError::NegativeWeight)` if any edge weight is negative
pub fn dijkstra(graph: &Graph, source: &str) -> SolverResult<ShortestPathTree> {
    let src = graph
        .node_idx(source)
        .ok_or_else(|| SolverError::source_not_in_graph(source))?;

    let n = graph.len();
    let mut adj: Vec<Vec<(usize, usize, f64)>> = vec![Vec::new(); n];
    for (e, edge, from, to) in graph.indexed_edges() {
        if edge.weight < 0.0 {
            return Err(SolverError::NegativeWeight(edge.id.clone()));
        }
        adj[from].push((to, e, edge.weight));
        if !edge.directed {
            adj[to].push((from, e, edge.weight));
        }
    }

    let mut dist = vec![f64::INFINITY; n];
    let mut prev: Vec<Option<usize>> = vec![None; n];
    let mut heap = BinaryHeap::new();
    dist[src] = 0.0;
    heap.push(Reverse(State { dist: 0.0, node: src }));

    while let Some(Reverse(State { dist: d, node: u })) = heap.pop() {
        if d > dist[u] {
            continue;
        }
        for &(v, e, w) in &adj[u] {
            let alt = d + w;
            if alt < dist[v] {
                dist[v] = alt;
                prev[v] = Some(e);
                heap.push(Reverse(State { dist: alt, node: v }));
            }
        }
    }

    let via = prev
        .iter()
        .map(|p| p.map(|e| graph.edges()[e].id.clone()))
        .collect();

    Ok(ShortestPathTree {
        source: source.to_string(),
        distances: NodeDistance::table(graph, &dist),
        via,
        dist,
        prev,
    })
}

/// Shortest path from `source` to `target`.
///
/// # Returns
/// * `Err(SolverError::SourceNotInGraph)` if either endpoint is unknown
/// * `Err(SolverError::NoPath)` if `target` is unreachable
pub fn shortest_path(graph: &Graph, source: &str, target: &str) -> SolverResult<WeightedPath> {
    let dst = graph
        .node_idx(target)
        .ok_or_else(|| SolverError::source_not_in_graph(target))?;
    let tree = dijkstra(graph, source)?;
    if !tree.dist[dst].is_finite() {
        return Err(SolverError::no_path(Some(source), Some(target)));
    }

    let mut edges = Vec::new();
    let mut path = vec![target.to_string()];
    let mut at = dst;
    while let Some(e) = tree.prev[at] {
        let (from, to) = graph.endpoints(e);
        // undirected edges may have been walked target -> source
        at = if to == at { from } else { to };
        edges.push(graph.edges()[e].id.clone());
        path.push(graph.id_of(at).to_string());
    }
    edges.reverse();
    path.reverse();

    Ok(WeightedPath {
        distance: tree.dist[dst],
        path,
        edges,
    })
}
