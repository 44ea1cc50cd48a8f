//! Minimum / maximum spanning forest (Kruskal).
//!
//! Edge direction is ignored. Non-finite weights count as 0.

use serde::Serialize;

use super::union_find::UnionFind;
use super::Mode;
use crate::graph::Graph;
use crate::report::Summary;

/// Accepted edges of the spanning forest.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanningForest {
    pub mode: Mode,
    /// Accepted edge ids, in acceptance order
    pub edges: Vec<String>,
    pub total_weight: f64,
    /// Connected components of the forest (isolated nodes included)
    pub component_count: usize,
}

impl Summary for SpanningForest {
    fn summary(&self) -> String {
        let kind = match self.mode {
            Mode::Minimize => "Minimum",
            Mode::Maximize => "Maximum",
        };
        format!(
            "{kind} spanning forest: total weight {} over {} edge{}, {} component{}",
            self.total_weight,
            self.edges.len(),
            if self.edges.len() == 1 { "" } else { "s" },
            self.component_count,
            if self.component_count == 1 { "" } else { "s" },
        )
    }
}

fn effective_weight(weight: f64) -> f64 {
    if weight.is_finite() {
        weight
    } else {
        0.0
    }
}

/// Build a spanning forest with Kruskal's algorithm.
///
/// Edges are sorted by weight (ascending for `Minimize`, descending for
/// `Maximize`) with ties broken by edge id, so the result is deterministic.
pub fn spanning_forest(graph: &Graph, mode: Mode) -> SpanningForest {
    let mut order: Vec<(usize, f64)> = graph
        .edges()
        .iter()
        .enumerate()
        .map(|(e, edge)| (e, effective_weight(edge.weight)))
        .collect();
    order.sort_by(|&(a, wa), &(b, wb)| {
        let by_weight = match mode {
            Mode::Minimize => wa.total_cmp(&wb),
            Mode::Maximize => wb.total_cmp(&wa),
        };
        by_weight.then_with(|| graph.edges()[a].id.cmp(&graph.edges()[b].id))
    });

    let mut uf = UnionFind::new(graph.len());
    let mut edges = Vec::new();
    let mut total_weight = 0.0;
    let mut rejected = 0usize;
    for (e, w) in order {
        let (from, to) = graph.endpoints(e);
        if uf.connected(from, to) {
            log::trace!("kruskal: {} would close a cycle", graph.edges()[e].id);
            rejected += 1;
            continue;
        }
        uf.union(from, to);
        edges.push(graph.edges()[e].id.clone());
        total_weight += w;
    }

    log::debug!(
        "kruskal ({mode}): {} of {} edges accepted, {rejected} closed a cycle",
        edges.len(),
        graph.edge_count()
    );

    SpanningForest {
        mode,
        edges,
        total_weight,
        component_count: uf.components(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::testing::{directed, undirected};

    #[test]
    fn test_triangle_minimum() {
        let g = undirected(&[("a", "b", 1.0), ("b", "c", 2.0), ("c", "a", 3.0)]);
        let f = spanning_forest(&g, Mode::Minimize);
        assert_eq!(f.total_weight, 3.0);
        assert_eq!(f.edges, vec!["e0", "e1"]);
        assert_eq!(f.component_count, 1);
    }

    #[test]
    fn test_triangle_maximum() {
        let g = undirected(&[("a", "b", 1.0), ("b", "c", 2.0), ("c", "a", 3.0)]);
        let f = spanning_forest(&g, Mode::Maximize);
        assert_eq!(f.total_weight, 5.0);
        assert_eq!(f.edges, vec!["e2", "e1"]);
    }

    #[test]
    fn test_direction_ignored() {
        let g = directed(&[("a", "b", 1.0), ("c", "b", 1.0)]);
        let f = spanning_forest(&g, Mode::Minimize);
        assert_eq!(f.edges.len(), 2);
        assert_eq!(f.component_count, 1);
    }

    #[test]
    fn test_forest_components() {
        let mut g = undirected(&[("a", "b", 2.0), ("c", "d", 1.0)]);
        g.add_node("e", None);
        let f = spanning_forest(&g, Mode::Minimize);
        assert_eq!(f.component_count, 3);
        assert_eq!(f.edges.len(), g.node_count() - f.component_count);
        assert_eq!(f.summary(), "Minimum spanning forest: total weight 3 over 2 edges, 3 components");
    }

    #[test]
    fn test_ties_broken_by_id() {
        let mut g = Graph::new();
        for id in ["a", "b"] {
            g.add_node(id, None);
        }
        g.add_edge("z", "a", "b", 1.0, Some(false));
        g.add_edge("m", "b", "a", 1.0, Some(false));
        let f = spanning_forest(&g, Mode::Minimize);
        assert_eq!(f.edges, vec!["m"]);
    }

    #[test]
    fn test_non_finite_weight_counts_as_zero() {
        let g = undirected(&[("a", "b", f64::NAN), ("b", "c", 2.0), ("a", "c", 1.0)]);
        let f = spanning_forest(&g, Mode::Minimize);
        assert_eq!(f.edges, vec!["e0", "e2"]);
        assert_eq!(f.total_weight, 1.0);
    }

    #[test]
    fn test_self_loop_never_accepted() {
        let g = undirected(&[("a", "a", 0.5), ("a", "b", 1.0)]);
        let f = spanning_forest(&g, Mode::Minimize);
        assert_eq!(f.edges, vec!["e1"]);
    }
}
