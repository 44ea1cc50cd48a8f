//! Weighted graph supplied by the canvas, plus its JavaScript surface.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use wasm_bindgen::prelude::*;

use crate::algorithms::Mode;
use crate::error::SolverResult;
use crate::report::Report;

/// A vertex as drawn on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A weighted edge between two existing nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub weight: f64,
    #[serde(default = "directed_by_default")]
    pub directed: bool,
}

fn directed_by_default() -> bool {
    true
}

/// Serializable graph snapshot for import/export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// Immutable-per-solve graph: ordered nodes and ordered edges.
///
/// Solvers only ever borrow it; nothing in the crate mutates a graph while an
/// algorithm is running.
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,

    /// Reverse lookup: node ID -> index
    node_index: HashMap<String, usize>,

    edges: Vec<Edge>,

    edge_ids: HashSet<String>,

    /// Resolved (source, target) node indices, parallel to `edges`
    endpoints: Vec<(usize, usize)>,
}

#[wasm_bindgen]
impl Graph {
    /// Create an empty graph.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Graph {
        Graph {
            nodes: Vec::new(),
            node_index: HashMap::new(),
            edges: Vec::new(),
            edge_ids: HashSet::new(),
            endpoints: Vec::new(),
        }
    }

    /// Create a graph with pre-allocated capacity.
    #[wasm_bindgen(js_name = withCapacity)]
    pub fn with_capacity(node_capacity: usize, edge_capacity: usize) -> Graph {
        Graph {
            nodes: Vec::with_capacity(node_capacity),
            node_index: HashMap::with_capacity(node_capacity),
            edges: Vec::with_capacity(edge_capacity),
            edge_ids: HashSet::with_capacity(edge_capacity),
            endpoints: Vec::with_capacity(edge_capacity),
        }
    }

    /// Add a node, returns its index. Idempotent - returns existing index if already present.
    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(&mut self, id: &str, label: Option<String>) -> usize {
        if let Some(&idx) = self.node_index.get(id) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(Node {
            id: id.to_string(),
            label,
        });
        self.node_index.insert(id.to_string(), idx);
        idx
    }

    /// Add an edge between two existing nodes. `directed` defaults to true.
    ///
    /// Returns false (and changes nothing) when the id is taken or an
    /// endpoint is unknown.
    #[wasm_bindgen(js_name = addEdge)]
    pub fn add_edge(
        &mut self,
        id: &str,
        source: &str,
        target: &str,
        weight: f64,
        directed: Option<bool>,
    ) -> bool {
        self.insert_edge(Edge {
            id: id.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            weight,
            directed: directed.unwrap_or(true),
        })
    }

    /// Number of nodes.
    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Get node ID by index.
    #[wasm_bindgen(js_name = nodeId)]
    pub fn node_id(&self, idx: usize) -> Option<String> {
        self.nodes.get(idx).map(|n| n.id.clone())
    }

    /// Get node index by ID.
    #[wasm_bindgen(js_name = nodeIdx)]
    pub fn node_idx(&self, id: &str) -> Option<usize> {
        self.node_index.get(id).copied()
    }

    /// Export graph as JSON snapshot.
    #[wasm_bindgen(js_name = toJson)]
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_default()
    }

    /// Import graph from JSON snapshot.
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: &str) -> Result<Graph, JsError> {
        let snapshot: GraphSnapshot =
            serde_json::from_str(json).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(Graph::from_snapshot(snapshot))
    }

    /// Import graph from a plain `{ nodes, edges }` JavaScript object.
    #[wasm_bindgen(js_name = fromValue)]
    pub fn from_value(value: JsValue) -> Result<Graph, JsError> {
        let snapshot: GraphSnapshot =
            serde_wasm_bindgen::from_value(value).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(Graph::from_snapshot(snapshot))
    }

    /// Solve the bipartite assignment problem.
    /// `mode` is "min" or "max". Returns a report with the Munkres step trace.
    #[wasm_bindgen(js_name = assignment)]
    pub fn assignment_js(&self, mode: &str) -> Result<JsValue, JsError> {
        use crate::algorithms::assignment::solve_assignment;
        let mode: Mode = mode.parse().map_err(|e: String| JsError::new(&e))?;
        to_js(&solve_assignment(self, mode))
    }

    /// Critical path analysis (earliest/latest times, slack, critical edges).
    /// `config` is an optional `{ epsilon }` object.
    #[wasm_bindgen(js_name = criticalPath)]
    pub fn critical_path_js(&self, config: JsValue) -> Result<JsValue, JsError> {
        use crate::algorithms::critical_path::{critical_path, CpmConfig};
        let config: CpmConfig = config_from_js(config)?;
        to_js(&Report::from(critical_path(self, &config)))
    }

    /// All minimum-weight source-to-sink paths of a DAG.
    /// `config` is an optional `{ maxPaths, epsilon }` object.
    #[wasm_bindgen(js_name = shortestPathDag)]
    pub fn shortest_path_dag_js(&self, config: JsValue) -> Result<JsValue, JsError> {
        use crate::algorithms::shortest_path::{shortest_paths_dag, ShortestPathConfig};
        let config: ShortestPathConfig = config_from_js(config)?;
        to_js(&Report::from(shortest_paths_dag(self, &config)))
    }

    /// Longest path from `source` in a DAG. Reports `applicable: false` on cyclic graphs.
    #[wasm_bindgen(js_name = longestPathDag)]
    pub fn longest_path_dag_js(
        &self,
        source: &str,
        target: Option<String>,
    ) -> Result<JsValue, JsError> {
        use crate::algorithms::longest_path::longest_path_dag;
        to_js(&Report::from(longest_path_dag(
            self,
            source,
            target.as_deref(),
        )))
    }

    /// Best-effort longest simple path between two nodes of any digraph.
    /// `config` is an optional `{ maxLength, timeBudgetMs }` object.
    #[wasm_bindgen(js_name = longestPathDfs)]
    pub fn longest_path_dfs_js(
        &self,
        source: &str,
        target: &str,
        config: JsValue,
    ) -> Result<JsValue, JsError> {
        use crate::algorithms::longest_path::{longest_path_dfs, LongestPathConfig};
        let config: LongestPathConfig = config_from_js(config)?;
        to_js(&Report::from(longest_path_dfs(
            self, source, target, &config,
        )))
    }

    /// Dijkstra shortest paths from `source`; the path to `target` when given.
    #[wasm_bindgen(js_name = dijkstra)]
    pub fn dijkstra_js(&self, source: &str, target: Option<String>) -> Result<JsValue, JsError> {
        use crate::algorithms::dijkstra::{dijkstra, shortest_path};
        match target {
            Some(target) => to_js(&Report::from(shortest_path(self, source, &target))),
            None => to_js(&Report::from(dijkstra(self, source))),
        }
    }

    /// Minimum (`"min"`) or maximum (`"max"`) spanning forest.
    #[wasm_bindgen(js_name = kruskal)]
    pub fn kruskal_js(&self, mode: &str) -> Result<JsValue, JsError> {
        use crate::algorithms::kruskal::spanning_forest;
        let mode: Mode = mode.parse().map_err(|e: String| JsError::new(&e))?;
        let forest: SolverResult<_> = Ok(spanning_forest(self, mode));
        to_js(&Report::from(forest))
    }
}

// Internal methods (not exposed to WASM)
impl Graph {
    /// Build a graph from owned parts, applying the same rules as `addNode`/`addEdge`.
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Graph {
        let mut graph = Graph::with_capacity(nodes.len(), edges.len());
        for node in nodes {
            graph.add_node(&node.id, node.label);
        }
        for edge in edges {
            let id = edge.id.clone();
            if !graph.insert_edge(edge) {
                log::warn!("dropping edge {id}: duplicate id or unknown endpoint");
            }
        }
        graph
    }

    pub fn from_snapshot(snapshot: GraphSnapshot) -> Graph {
        Graph::from_parts(snapshot.nodes, snapshot.edges)
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }

    fn insert_edge(&mut self, edge: Edge) -> bool {
        if self.edge_ids.contains(&edge.id) {
            return false;
        }
        let (Some(from), Some(to)) = (self.node_idx(&edge.source), self.node_idx(&edge.target))
        else {
            return false;
        };
        self.edge_ids.insert(edge.id.clone());
        self.endpoints.push((from, to));
        self.edges.push(edge);
        true
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Node indices of edge `e` as (source, target).
    pub(crate) fn endpoints(&self, e: usize) -> (usize, usize) {
        self.endpoints[e]
    }

    /// Iterate edges with their resolved endpoint indices (internal use).
    pub(crate) fn indexed_edges(&self) -> impl Iterator<Item = (usize, &Edge, usize, usize)> + '_ {
        self.edges
            .iter()
            .zip(&self.endpoints)
            .enumerate()
            .map(|(e, (edge, &(from, to)))| (e, edge, from, to))
    }

    /// Get node count (internal, non-WASM).
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn id_of(&self, idx: usize) -> &str {
        &self.nodes[idx].id
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize into a plain JavaScript object (objects, not `Map`s; `null` for `None`).
pub(crate) fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value
        .serialize(&serializer)
        .map_err(|e| JsError::new(&e.to_string()))
}

/// Deserialize an optional config object; `undefined`/`null` yield the defaults.
pub(crate) fn config_from_js<T: DeserializeOwned + Default>(value: JsValue) -> Result<T, JsError> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|e| JsError::new(&e.to_string()))
}
