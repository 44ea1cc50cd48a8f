//! Graph algorithm implementations.
//!
//! Each solver reads a [`Graph`](crate::graph::Graph) and returns a freshly
//! built result; none of them keeps state between calls.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub mod assignment;
pub mod bipartite;
pub mod cost_matrix;
pub mod critical_path;
pub mod dijkstra;
pub mod kruskal;
pub mod longest_path;
pub mod munkres;
pub mod shortest_path;
pub mod topo;
pub mod union_find;

/// Tolerance used when comparing accumulated path weights.
pub const EPSILON: f64 = 1e-9;

/// Optimization direction for assignment and spanning forests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Minimize,
    Maximize,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "min" | "minimize" => Ok(Mode::Minimize),
            "max" | "maximize" => Ok(Mode::Maximize),
            other => Err(format!("unknown mode {other:?}, expected \"min\" or \"max\"")),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Minimize => write!(f, "minimize"),
            Mode::Maximize => write!(f, "maximize"),
        }
    }
}

/// Distance of one node from the search origin; `None` when unreachable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDistance {
    pub id: String,
    pub distance: Option<f64>,
}

impl NodeDistance {
    /// Pair node ids with a distance table, mapping infinite entries to `None`.
    pub(crate) fn table(graph: &crate::graph::Graph, dist: &[f64]) -> Vec<NodeDistance> {
        graph
            .nodes()
            .iter()
            .zip(dist)
            .map(|(node, &d)| NodeDistance {
                id: node.id.clone(),
                distance: d.is_finite().then_some(d),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse() {
        assert_eq!("min".parse::<Mode>(), Ok(Mode::Minimize));
        assert_eq!("Maximize".parse::<Mode>(), Ok(Mode::Maximize));
        assert!("sideways".parse::<Mode>().is_err());
    }
}
