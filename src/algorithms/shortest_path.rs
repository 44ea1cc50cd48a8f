//! All minimum-weight source-to-sink paths of a DAG.
//!
//! Dynamic programming in topological order from every source at once. Every
//! predecessor edge that ties the minimum is kept, so backtracking from the
//! best sinks enumerates all optimal paths, not just one.

use serde::{Deserialize, Serialize};

use super::topo::ActivityNetwork;
use super::{NodeDistance, EPSILON};
use crate::error::{SolverError, SolverResult};
use crate::graph::Graph;
use crate::report::Summary;

/// Configuration for the DAG shortest path enumeration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShortestPathConfig {
    /// Stop enumerating after this many optimal paths
    pub max_paths: usize,
    /// Distances closer than this are treated as ties
    pub epsilon: f64,
}

impl Default for ShortestPathConfig {
    fn default() -> Self {
        Self {
            max_paths: 500,
            epsilon: EPSILON,
        }
    }
}

/// Result of the DAG shortest path computation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortestPaths {
    /// Minimum source-to-sink distance
    pub distance: f64,
    /// Each optimal path as node ids, source first
    pub paths: Vec<Vec<String>>,
    /// Each optimal path as edge ids, parallel to `paths`
    pub edge_paths: Vec<Vec<String>>,
    /// Union of `edge_paths`, first-seen order
    pub edges: Vec<String>,
    pub node_distances: Vec<NodeDistance>,
    pub topological_order: Vec<String>,
    /// True when enumeration stopped at `max_paths`
    pub truncated: bool,
    pub warnings: Vec<String>,
}

impl Summary for ShortestPaths {
    fn summary(&self) -> String {
        format!(
            "Shortest distance: {} ({} optimal path{}{})",
            self.distance,
            self.paths.len(),
            if self.paths.len() == 1 { "" } else { "s" },
            if self.truncated { ", truncated" } else { "" }
        )
    }
}

/// Enumerate every minimum-weight path from a source to a sink.
///
/// Sources and sinks are taken among nodes touched by a qualifying edge, so
/// isolated nodes never count as trivial zero-length paths.
///
/// # Returns
/// * `Err(SolverError::CyclicGraph)` if the qualifying edges contain a cycle
/// * `Err(SolverError::NoSourceOrSink)` if there is no source or no sink
pub fn shortest_paths_dag(graph: &Graph, config: &ShortestPathConfig) -> SolverResult<ShortestPaths> {
    let net = ActivityNetwork::build(graph);
    let order = net.topological_order()?;
    let n = net.node_count();

    let sources: Vec<usize> = (0..n)
        .filter(|&v| net.involved[v] && net.in_degree[v] == 0)
        .collect();
    let sinks: Vec<usize> = (0..n)
        .filter(|&v| net.involved[v] && net.out_degree(v) == 0)
        .collect();
    if sources.is_empty() || sinks.is_empty() {
        return Err(SolverError::NoSourceOrSink);
    }

    let eps = config.epsilon;
    let mut dist = vec![f64::INFINITY; n];
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
    for &s in &sources {
        dist[s] = 0.0;
    }

    for &u in &order {
        if !dist[u].is_finite() {
            continue;
        }
        for link in &net.out[u] {
            let candidate = dist[u] + link.weight;
            if candidate < dist[link.to] - eps {
                dist[link.to] = candidate;
                preds[link.to].clear();
                preds[link.to].push(link.edge);
            } else if (candidate - dist[link.to]).abs() <= eps {
                preds[link.to].push(link.edge);
            }
        }
    }

    // In an acyclic network every involved node walks back to some source,
    // so every sink has a finite distance.
    let best = sinks
        .iter()
        .map(|&v| dist[v])
        .fold(f64::INFINITY, f64::min);
    debug_assert!(best.is_finite());

    let mut walker = Backtrack {
        graph,
        preds: &preds,
        max_paths: config.max_paths.max(1),
        found: Vec::new(),
        truncated: false,
    };
    for &sink in &sinks {
        if (dist[sink] - best).abs() <= eps {
            walker.walk(sink);
        }
    }
    let Backtrack {
        found, truncated, ..
    } = walker;

    let mut warnings: Vec<String> = net.skipped_warning().into_iter().collect();
    if truncated {
        log::warn!("shortest path enumeration stopped at {} paths", found.len());
        warnings.push(format!(
            "Path enumeration truncated at {} paths",
            found.len()
        ));
    }

    let mut paths = Vec::with_capacity(found.len());
    let mut edge_paths = Vec::with_capacity(found.len());
    let mut edges: Vec<String> = Vec::new();
    for edge_path in &found {
        let ids: Vec<String> = edge_path
            .iter()
            .map(|&e| graph.edges()[e].id.clone())
            .collect();
        for id in &ids {
            if !edges.contains(id) {
                edges.push(id.clone());
            }
        }
        paths.push(node_path(graph, edge_path));
        edge_paths.push(ids);
    }

    log::debug!(
        "shortest DAG paths: distance {best}, {} path(s) from {} source(s)",
        paths.len(),
        sources.len()
    );

    Ok(ShortestPaths {
        distance: best,
        paths,
        edge_paths,
        edges,
        node_distances: NodeDistance::table(graph, &dist),
        topological_order: net.ids(&order),
        truncated,
        warnings,
    })
}

/// Shortest DAG paths with the default configuration.
pub fn shortest_paths_dag_default(graph: &Graph) -> SolverResult<ShortestPaths> {
    shortest_paths_dag(graph, &ShortestPathConfig::default())
}

/// Depth-first enumeration over the retained predecessor edges.
struct Backtrack<'a> {
    graph: &'a Graph,
    preds: &'a [Vec<usize>],
    max_paths: usize,
    found: Vec<Vec<usize>>,
    truncated: bool,
}

impl Backtrack<'_> {
    /// Every predecessor chain from `sink` back to a source, with an explicit
    /// stack of (node, next predecessor to try).
    fn walk(&mut self, sink: usize) {
        // edges from the current node to the sink, sink-most first
        let mut suffix: Vec<usize> = Vec::new();
        let mut frames: Vec<(usize, usize)> = vec![(sink, 0)];

        while let Some(frame) = frames.last_mut() {
            let (node, next) = *frame;
            if next == 0 {
                if self.found.len() >= self.max_paths {
                    self.truncated = true;
                    return;
                }
                if self.preds[node].is_empty() {
                    self.found.push(suffix.iter().rev().copied().collect());
                    frames.pop();
                    suffix.pop();
                    continue;
                }
            }
            match self.preds[node].get(next) {
                Some(&e) => {
                    frame.1 += 1;
                    let (from, _) = self.graph.endpoints(e);
                    suffix.push(e);
                    frames.push((from, 0));
                }
                None => {
                    frames.pop();
                    suffix.pop();
                }
            }
        }
    }
}

fn node_path(graph: &Graph, edge_path: &[usize]) -> Vec<String> {
    let mut nodes = Vec::with_capacity(edge_path.len() + 1);
    if let Some(&first) = edge_path.first() {
        nodes.push(graph.edges()[first].source.clone());
    }
    nodes.extend(edge_path.iter().map(|&e| graph.edges()[e].target.clone()));
    nodes
}
