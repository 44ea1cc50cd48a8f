//! Longest paths over the qualifying (directed, nonnegative) edges.
//!
//! Two strategies:
//! - [`longest_path_dag`]: exact topological DP, only applicable to DAGs.
//! - [`longest_path_dfs`]: branch-and-bound search for the heaviest simple
//!   path between two nodes of any digraph, bounded by path length and a
//!   wall-clock budget. Best effort: an expired budget returns the best path
//!   seen so far.

use serde::{Deserialize, Serialize};

use super::topo::ActivityNetwork;
use super::NodeDistance;
use crate::clock::Deadline;
use crate::error::{SolverError, SolverResult};
use crate::graph::Graph;
use crate::report::Summary;

/// Limits for the bounded depth-first search.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LongestPathConfig {
    /// Maximum number of edges in a candidate path (`None` = no limit)
    pub max_length: Option<usize>,
    /// Wall-clock budget in milliseconds (`None` = run to completion)
    pub time_budget_ms: Option<f64>,
}

impl Default for LongestPathConfig {
    fn default() -> Self {
        Self {
            max_length: None,
            time_budget_ms: Some(2000.0),
        }
    }
}

/// Result of the DAG longest path computation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LongestPathDag {
    /// False when the qualifying subgraph has a cycle; everything else is empty then
    pub applicable: bool,
    pub source: String,
    pub length: Option<f64>,
    pub path: Vec<String>,
    pub edges: Vec<String>,
    /// Per node; `None` for nodes not reachable from the source
    pub distances: Vec<NodeDistance>,
    pub topological_order: Vec<String>,
    pub warnings: Vec<String>,
}

impl Summary for LongestPathDag {
    fn summary(&self) -> String {
        match (self.applicable, self.length, self.path.last()) {
            (true, Some(length), Some(end)) => {
                format!("Longest path from {} to {}: {}", self.source, end, length)
            }
            _ => "Not applicable: the graph contains a cycle".to_string(),
        }
    }
}

/// Longest distances from `source` by DP in topological order.
///
/// Without a `target`, the returned path ends at the farthest reachable node
/// (first in node order on ties).
///
/// # Returns
/// * `Ok` with `applicable: false` if the qualifying edges contain a cycle
/// * `Err(SolverError::SourceNotInGraph)` if `source` or `target` is unknown
/// * `Err(SolverError::NoPath)` if `target` is not reachable from `source`
pub fn longest_path_dag(
    graph: &Graph,
    source: &str,
    target: Option<&str>,
) -> SolverResult<LongestPathDag> {
    let src = graph
        .node_idx(source)
        .ok_or_else(|| SolverError::source_not_in_graph(source))?;
    let dst = match target {
        Some(id) => Some(
            graph
                .node_idx(id)
                .ok_or_else(|| SolverError::source_not_in_graph(id))?,
        ),
        None => None,
    };

    let net = ActivityNetwork::build(graph);
    let warnings: Vec<String> = net.skipped_warning().into_iter().collect();
    let Ok(order) = net.topological_order() else {
        log::info!("longest path DAG strategy skipped: cycle in qualifying edges");
        return Ok(LongestPathDag {
            applicable: false,
            source: source.to_string(),
            length: None,
            path: Vec::new(),
            edges: Vec::new(),
            distances: Vec::new(),
            topological_order: Vec::new(),
            warnings,
        });
    };

    let n = net.node_count();
    let mut dist = vec![f64::NEG_INFINITY; n];
    let mut pred: Vec<Option<usize>> = vec![None; n];
    dist[src] = 0.0;

    for &u in &order {
        if !dist[u].is_finite() {
            continue;
        }
        for link in &net.out[u] {
            let candidate = dist[u] + link.weight;
            if candidate > dist[link.to] {
                dist[link.to] = candidate;
                pred[link.to] = Some(link.edge);
            }
        }
    }

    let end = match dst {
        Some(t) if dist[t].is_finite() => t,
        Some(t) => return Err(SolverError::no_path(Some(source), Some(graph.id_of(t)))),
        None => farthest(&dist).unwrap_or(src),
    };

    let mut edge_path = Vec::new();
    let mut at = end;
    while let Some(e) = pred[at] {
        edge_path.push(e);
        at = graph.endpoints(e).0;
    }
    edge_path.reverse();

    Ok(LongestPathDag {
        applicable: true,
        source: source.to_string(),
        length: Some(dist[end]),
        path: node_path(graph, src, &edge_path),
        edges: edge_ids(graph, &edge_path),
        distances: NodeDistance::table(graph, &dist),
        topological_order: net.ids(&order),
        warnings,
    })
}

fn farthest(dist: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (v, &d) in dist.iter().enumerate() {
        if d.is_finite() && best.map_or(true, |b| d > dist[b]) {
            best = Some(v);
        }
    }
    best
}

/// Result of the bounded longest simple path search.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LongestPathSearch {
    pub source: String,
    pub target: String,
    /// `None` only when the budget ran out before any path was found
    pub length: Option<f64>,
    pub path: Vec<String>,
    pub edges: Vec<String>,
    /// The time budget expired; the path may not be optimal
    pub timed_out: bool,
    /// Number of search nodes visited
    pub explored: u64,
    pub warnings: Vec<String>,
}

impl Summary for LongestPathSearch {
    fn summary(&self) -> String {
        match (self.length, self.timed_out) {
            (Some(length), false) => format!(
                "Longest simple path {} -> {}: {}",
                self.source, self.target, length
            ),
            (Some(length), true) => format!(
                "Best path found {} -> {}: {} (time budget exhausted)",
                self.source, self.target, length
            ),
            (None, _) => "No path found before the time budget expired".to_string(),
        }
    }
}

/// Heaviest simple path from `source` to `target`, possibly through cycles.
///
/// Exponential in the worst case; `config` bounds it. The deadline is polled
/// on every visited search node, so a run that times out can return different
/// paths depending on machine speed.
///
/// # Returns
/// * `Err(SolverError::SourceNotInGraph)` if either endpoint is unknown
/// * `Err(SolverError::NoPath)` if the search completed without reaching `target`
pub fn longest_path_dfs(
    graph: &Graph,
    source: &str,
    target: &str,
    config: &LongestPathConfig,
) -> SolverResult<LongestPathSearch> {
    let src = graph
        .node_idx(source)
        .ok_or_else(|| SolverError::source_not_in_graph(source))?;
    let dst = graph
        .node_idx(target)
        .ok_or_else(|| SolverError::source_not_in_graph(target))?;

    search_until(
        graph,
        (src, dst),
        config.max_length,
        Deadline::from_budget(config.time_budget_ms),
    )
}

/// Bounded DFS with the default limits.
pub fn longest_path_dfs_default(
    graph: &Graph,
    source: &str,
    target: &str,
) -> SolverResult<LongestPathSearch> {
    longest_path_dfs(graph, source, target, &LongestPathConfig::default())
}

fn search_until(
    graph: &Graph,
    (src, dst): (usize, usize),
    max_length: Option<usize>,
    deadline: Deadline,
) -> SolverResult<LongestPathSearch> {
    let (source, target) = (graph.id_of(src), graph.id_of(dst));
    let net = ActivityNetwork::build(graph);
    let max_weight = net
        .edges
        .iter()
        .map(|&e| graph.edges()[e].weight)
        .fold(0.0f64, f64::max);

    let mut search = Search {
        net: &net,
        target: dst,
        max_edges: max_length.unwrap_or(usize::MAX),
        max_weight,
        deadline,
        on_path: vec![false; net.node_count()],
        path: Vec::new(),
        best: None,
        timed_out: false,
        explored: 0,
    };
    search.run(src);

    let Search {
        best,
        timed_out,
        explored,
        ..
    } = search;

    let mut warnings: Vec<String> = net.skipped_warning().into_iter().collect();
    if timed_out {
        log::warn!("longest path search timed out after {explored} visits");
        warnings.push("Time budget exhausted; the result may not be optimal".to_string());
    }

    let (length, edge_path) = match best {
        Some((length, edge_path)) => (Some(length), edge_path),
        None if timed_out => (None, Vec::new()),
        None => return Err(SolverError::no_path(Some(source), Some(target))),
    };

    log::debug!("longest path search: {explored} visits, best {length:?}");

    Ok(LongestPathSearch {
        source: source.to_string(),
        target: target.to_string(),
        length,
        path: if length.is_some() {
            node_path(graph, src, &edge_path)
        } else {
            Vec::new()
        },
        edges: edge_ids(graph, &edge_path),
        timed_out,
        explored,
        warnings,
    })
}

struct Search<'a> {
    net: &'a ActivityNetwork<'a>,
    target: usize,
    max_edges: usize,
    max_weight: f64,
    deadline: Deadline,
    on_path: Vec<bool>,
    /// Edges of the current partial path
    path: Vec<usize>,
    best: Option<(f64, Vec<usize>)>,
    timed_out: bool,
    explored: u64,
}

impl Search<'_> {
    /// Depth-first over simple paths from `src`, one frame per path node.
    fn run(&mut self, src: usize) {
        self.on_path[src] = true;
        if !self.enter(src, 0.0) {
            return;
        }

        let net = self.net;
        // (node, distance so far, next outgoing link to try)
        let mut frames: Vec<(usize, f64, usize)> = vec![(src, 0.0, 0)];
        while let Some(frame) = frames.last_mut() {
            if self.timed_out {
                break;
            }
            let (node, acc, next) = *frame;
            let Some(link) = net.out[node].get(next) else {
                frames.pop();
                if !frames.is_empty() {
                    self.path.pop();
                    self.on_path[node] = false;
                }
                continue;
            };
            frame.2 += 1;
            if self.on_path[link.to] {
                continue;
            }

            self.on_path[link.to] = true;
            self.path.push(link.edge);
            if self.enter(link.to, acc + link.weight) {
                frames.push((link.to, acc + link.weight, 0));
            } else {
                self.path.pop();
                self.on_path[link.to] = false;
            }
        }
    }

    /// Poll the deadline, record `node` if it is the target, and decide
    /// whether its outgoing links are worth expanding.
    fn enter(&mut self, node: usize, acc: f64) -> bool {
        if self.deadline.expired() {
            self.timed_out = true;
            return false;
        }
        self.explored += 1;

        if node == self.target {
            if self.best.as_ref().map_or(true, |(best, _)| acc > *best) {
                self.best = Some((acc, self.path.clone()));
            }
            return false;
        }
        if self.path.len() >= self.max_edges {
            return false;
        }
        if let Some((best, _)) = &self.best {
            // every remaining node could add at most one heaviest edge
            let remaining = (self.net.node_count() - self.path.len() - 1) as f64;
            if acc + remaining * self.max_weight <= *best {
                return false;
            }
        }
        true
    }
}

fn node_path(graph: &Graph, start: usize, edge_path: &[usize]) -> Vec<String> {
    let mut nodes = vec![graph.id_of(start).to_string()];
    nodes.extend(edge_path.iter().map(|&e| graph.edges()[e].target.clone()));
    nodes
}

fn edge_ids(graph: &Graph, edge_path: &[usize]) -> Vec<String> {
    edge_path
        .iter()
        .map(|&e| graph.edges()[e].id.clone())
        .collect()
}
