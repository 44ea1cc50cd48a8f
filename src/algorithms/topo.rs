//! Activity network over the "qualifying" edges of a graph, and Kahn ordering.
//!
//! Scheduling-style solvers (CPM, DAG shortest/longest path, bounded DFS)
//! only look at directed edges with a finite, nonnegative weight. Everything
//! else is skipped and counted, never reported as an error.

use std::collections::VecDeque;

use crate::error::{SolverError, SolverResult};
use crate::graph::{Edge, Graph};

/// Whether an edge takes part in directed path computations.
pub fn qualifies(edge: &Edge) -> bool {
    edge.directed && edge.weight.is_finite() && edge.weight >= 0.0
}

/// Outgoing arc of the activity network.
#[derive(Debug, Clone, Copy)]
pub struct Link {
    /// Index into `Graph::edges()`
    pub edge: usize,
    pub to: usize,
    pub weight: f64,
}

/// Adjacency view of the qualifying edges.
#[derive(Debug)]
pub struct ActivityNetwork<'g> {
    pub graph: &'g Graph,
    /// out[u] = qualifying arcs leaving u, in edge input order
    pub out: Vec<Vec<Link>>,
    pub in_degree: Vec<usize>,
    /// Nodes touched by at least one qualifying edge
    pub involved: Vec<bool>,
    /// Qualifying edge indices in input order
    pub edges: Vec<usize>,
    /// Number of edges left out by the filter
    pub skipped: usize,
}

impl<'g> ActivityNetwork<'g> {
    pub fn build(graph: &'g Graph) -> Self {
        let n = graph.len();
        let mut out: Vec<Vec<Link>> = vec![Vec::new(); n];
        let mut in_degree = vec![0usize; n];
        let mut involved = vec![false; n];
        let mut edges = Vec::new();
        let mut skipped = 0;

        for (e, edge, from, to) in graph.indexed_edges() {
            if !qualifies(edge) {
                skipped += 1;
                continue;
            }
            out[from].push(Link {
                edge: e,
                to,
                weight: edge.weight,
            });
            in_degree[to] += 1;
            involved[from] = true;
            involved[to] = true;
            edges.push(e);
        }

        if skipped > 0 {
            log::debug!("activity network skipped {skipped} undirected, negative or non-finite edges");
        }

        ActivityNetwork {
            graph,
            out,
            in_degree,
            involved,
            edges,
            skipped,
        }
    }

    /// Number of graph nodes, involved or not.
    pub fn node_count(&self) -> usize {
        self.out.len()
    }

    pub fn out_degree(&self, node: usize) -> usize {
        self.out[node].len()
    }

    /// Kahn's algorithm. Nodes caught in (or downstream of) a cycle are missing
    /// from the returned order.
    pub fn kahn_order(&self) -> Vec<usize> {
        let n = self.node_count();
        let mut remaining = self.in_degree.clone();
        let mut queue: VecDeque<usize> = (0..n).filter(|&v| remaining[v] == 0).collect();
        let mut order = Vec::with_capacity(n);

        while let Some(u) = queue.pop_front() {
            order.push(u);
            for link in &self.out[u] {
                remaining[link.to] -= 1;
                if remaining[link.to] == 0 {
                    queue.push_back(link.to);
                }
            }
        }

        order
    }

    /// Topological order, or `CyclicGraph` if it misses any node touched by a
    /// qualifying edge.
    pub fn topological_order(&self) -> SolverResult<Vec<usize>> {
        let order = self.kahn_order();
        let involved_total = self.involved.iter().filter(|&&x| x).count();
        let involved_covered = order.iter().filter(|&&v| self.involved[v]).count();
        if involved_covered != involved_total {
            log::debug!(
                "topological order covers {involved_covered} of {involved_total} involved nodes"
            );
            return Err(SolverError::CyclicGraph);
        }
        Ok(order)
    }

    pub fn ids(&self, order: &[usize]) -> Vec<String> {
        order
            .iter()
            .map(|&v| self.graph.id_of(v).to_string())
            .collect()
    }

    pub fn skipped_warning(&self) -> Option<String> {
        (self.skipped > 0).then(|| {
            format!(
                "{} edge(s) ignored: only directed edges with a finite, nonnegative weight are used",
                self.skipped
            )
        })
    }
}
