//! Bipartite detection by breadth-first 2-coloring.
//!
//! Edge direction is ignored: every edge links both endpoints.

use serde::Serialize;
use std::collections::VecDeque;

use crate::error::{SolverError, SolverResult};
use crate::graph::Graph;

/// The two sides of a bipartite graph, as node ids in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bipartition {
    pub u: Vec<String>,
    pub v: Vec<String>,
}

/// Color every node with +1 / -1 so that no edge joins equal colors.
///
/// Each uncolored node (in input order) seeds a new BFS with color +1, so
/// isolated nodes end up in `u`.
///
/// # Returns
/// * `Ok(Bipartition)` covering every node exactly once
/// * `Err(SolverError::NotBipartite)` on the first same-colored edge (odd cycle or self-loop)
pub fn bipartition(graph: &Graph) -> SolverResult<Bipartition> {
    let colors = two_coloring(graph)?;

    let mut u = Vec::new();
    let mut v = Vec::new();
    for (node, color) in graph.nodes().iter().zip(colors) {
        if color > 0 {
            u.push(node.id.clone());
        } else {
            v.push(node.id.clone());
        }
    }

    Ok(Bipartition { u, v })
}

/// Per-node color (+1 or -1), indexed like `graph.nodes()`.
pub fn two_coloring(graph: &Graph) -> SolverResult<Vec<i8>> {
    let n = graph.len();
    let neighbors = build_undirected_neighbors(graph);
    let mut color = vec![0i8; n];
    let mut queue = VecDeque::new();

    for start in 0..n {
        if color[start] != 0 {
            continue;
        }
        color[start] = 1;
        queue.push_back(start);

        while let Some(x) = queue.pop_front() {
            for &y in &neighbors[x] {
                if color[y] == 0 {
                    color[y] = -color[x];
                    queue.push_back(y);
                } else if color[y] == color[x] {
                    log::debug!(
                        "odd cycle: {} and {} share a color",
                        graph.id_of(x),
                        graph.id_of(y)
                    );
                    return Err(SolverError::NotBipartite);
                }
            }
        }
    }

    Ok(color)
}

/// Undirected neighbor lists. Self-loops are kept so they fail the coloring.
fn build_undirected_neighbors(graph: &Graph) -> Vec<Vec<usize>> {
    let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); graph.len()];
    for (_, _, from, to) in graph.indexed_edges() {
        neighbors[from].push(to);
        if from != to {
            neighbors[to].push(from);
        }
    }
    neighbors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::testing::{directed, undirected};

    #[test]
    fn test_bipartite_empty() {
        let g = Graph::new();
        let sets = bipartition(&g).unwrap();
        assert!(sets.u.is_empty());
        assert!(sets.v.is_empty());
    }

    #[test]
    fn test_complete_bipartite() {
        let g = undirected(&[
            ("a1", "b1", 1.0),
            ("a1", "b2", 1.0),
            ("a2", "b1", 1.0),
            ("a2", "b2", 1.0),
        ]);
        let sets = bipartition(&g).unwrap();
        assert_eq!(sets.u, vec!["a1", "a2"]);
        assert_eq!(sets.v, vec!["b1", "b2"]);
    }

    #[test]
    fn test_direction_ignored() {
        // b1 -> a2 points "backwards" but still crosses sides
        let g = directed(&[("a1", "b1", 1.0), ("b1", "a2", 1.0)]);
        let sets = bipartition(&g).unwrap();
        assert_eq!(sets.u, vec!["a1", "a2"]);
        assert_eq!(sets.v, vec!["b1"]);
    }

    #[test]
    fn test_triangle_not_bipartite() {
        let g = undirected(&[("a", "b", 1.0), ("b", "c", 1.0), ("c", "a", 1.0)]);
        assert_eq!(bipartition(&g), Err(SolverError::NotBipartite));
    }

    #[test]
    fn test_self_loop_not_bipartite() {
        let g = directed(&[("a", "a", 1.0)]);
        assert_eq!(bipartition(&g), Err(SolverError::NotBipartite));
    }

    #[test]
    fn test_isolated_nodes_go_to_u() {
        let mut g = undirected(&[("a", "b", 1.0)]);
        g.add_node("z", None);
        let sets = bipartition(&g).unwrap();
        assert_eq!(sets.u, vec!["a", "z"]);
        assert_eq!(sets.v, vec!["b"]);
    }

    #[test]
    fn test_partition_covers_every_node_once() {
        let g = undirected(&[
            ("a", "b", 1.0),
            ("b", "c", 1.0),
            ("c", "d", 1.0),
            ("x", "y", 1.0),
        ]);
        let sets = bipartition(&g).unwrap();
        assert_eq!(sets.u.len() + sets.v.len(), g.node_count());
        for id in &sets.u {
            assert!(!sets.v.contains(id));
        }
    }
}
