//! Square cost matrix for the assignment problem.
//!
//! Built from a bipartition: rows are the `U` side, columns the `V` side, and
//! the shorter side is padded with dummy ids so the matrix is `n x n` with
//! `n = max(|U|, |V|)`.

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use super::bipartite::Bipartition;
use super::munkres::AssignmentStep;
use super::Mode;
use crate::graph::Graph;
use crate::report::Trace;

/// Values within this distance of zero count as zero.
pub const ZERO_TOLERANCE: f64 = 1e-9;

/// One cell of a cost matrix.
///
/// `Forbidden` marks a pairing that may never be chosen. It orders above
/// every finite value and is left untouched by all matrix arithmetic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    Finite(f64),
    Forbidden,
}

impl Cell {
    pub fn value(self) -> Option<f64> {
        match self {
            Cell::Finite(x) => Some(x),
            Cell::Forbidden => None,
        }
    }

    pub fn is_zero(self) -> bool {
        matches!(self, Cell::Finite(x) if x.abs() <= ZERO_TOLERANCE)
    }

    pub(crate) fn subtract(&mut self, delta: f64) {
        if let Cell::Finite(x) = self {
            *x -= delta;
        }
    }

    pub(crate) fn add(&mut self, delta: f64) {
        if let Cell::Finite(x) = self {
            *x += delta;
        }
    }
}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Cell::Finite(a), Cell::Finite(b)) => a.partial_cmp(b),
            (Cell::Finite(_), Cell::Forbidden) => Some(Ordering::Less),
            (Cell::Forbidden, Cell::Finite(_)) => Some(Ordering::Greater),
            (Cell::Forbidden, Cell::Forbidden) => Some(Ordering::Equal),
        }
    }
}

/// Finite cells serialize as numbers; forbidden cells as the display string "∞".
impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Finite(x) => serializer.serialize_f64(*x),
            Cell::Forbidden => serializer.serialize_str("∞"),
        }
    }
}

/// Row-major square matrix of cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CostMatrix {
    rows: Vec<Vec<Cell>>,
}

impl CostMatrix {
    /// `n x n` matrix filled with `cell`.
    pub fn filled(n: usize, cell: Cell) -> Self {
        Self {
            rows: vec![vec![cell; n]; n],
        }
    }

    /// Matrix from finite values; rows must all have the same length as the row count.
    pub fn from_values(values: &[Vec<f64>]) -> Self {
        Self {
            rows: values
                .iter()
                .map(|row| row.iter().map(|&x| Cell::Finite(x)).collect())
                .collect(),
        }
    }

    pub fn from_cells(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Side length.
    pub fn n(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.rows[row][col]
    }

    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        self.rows[row][col] = cell;
    }

    pub(crate) fn cell_mut(&mut self, row: usize, col: usize) -> &mut Cell {
        &mut self.rows[row][col]
    }

    /// Smallest finite value in a row, if any.
    pub fn row_min(&self, row: usize) -> Option<f64> {
        min_finite(self.rows[row].iter().copied())
    }

    /// Smallest finite value in a column, if any.
    pub fn col_min(&self, col: usize) -> Option<f64> {
        min_finite(self.rows.iter().map(|r| r[col]))
    }

    /// Apply `f` to every finite cell, leaving forbidden cells alone.
    pub fn map_finite(&mut self, f: impl Fn(f64) -> f64) {
        for cell in self.rows.iter_mut().flatten() {
            if let Cell::Finite(x) = cell {
                *x = f(*x);
            }
        }
    }
}

/// Infinite and NaN values never count as a minimum.
fn min_finite(cells: impl Iterator<Item = Cell>) -> Option<f64> {
    cells
        .filter_map(Cell::value)
        .filter(|x| x.is_finite())
        .fold(None, |acc: Option<f64>, x| Some(acc.map_or(x, |m| m.min(x))))
}

/// Everything the solver and the result mapping need about one assignment problem.
#[derive(Debug, Clone)]
pub struct AssignmentProblem {
    pub mode: Mode,
    /// Row ids: `U` followed by `dummy_u_*` padding
    pub rows: Vec<String>,
    /// Column ids: `V` followed by `dummy_v_*` padding
    pub cols: Vec<String>,
    pub real_rows: usize,
    pub real_cols: usize,
    /// Largest edge weight, never below 0
    pub max_weight: f64,
    /// Cost matrix before the maximization transform
    pub original: CostMatrix,
    /// Matrix handed to the minimizing solver
    pub matrix: CostMatrix,
    /// Index into `Graph::edges()` backing each real (row, col) pair
    edge_at: Vec<Vec<Option<usize>>>,
}

impl AssignmentProblem {
    pub fn n(&self) -> usize {
        self.rows.len()
    }

    /// Edge backing a pairing, `None` for dummies and missing edges.
    pub fn edge_at(&self, row: usize, col: usize) -> Option<usize> {
        self.edge_at.get(row)?.get(col).copied().flatten()
    }

    pub fn is_dummy(&self, row: usize, col: usize) -> bool {
        row >= self.real_rows || col >= self.real_cols
    }
}

/// Assemble the padded, mode-adjusted cost matrix.
///
/// Only edges with a finite weight count. Nodes without such an edge get no
/// row or column; they stay in the bipartition but are never assigned, which
/// keeps them from turning a solvable minimization infeasible.
///
/// Real pair with an edge (either direction, first in edge order): the edge
/// weight. Real pair without an edge: `Forbidden` when minimizing, `0` when
/// maximizing. Dummy pair: `0` when minimizing, `maxWeight + 1` when
/// maximizing. For maximization every finite `c` then becomes
/// `maxWeight - c`, so the solver always minimizes.
///
/// Records the untransformed matrix as the first trace step, and the
/// transformed one as a second step when maximizing.
pub fn build_cost_matrix(
    graph: &Graph,
    sets: &Bipartition,
    mode: Mode,
    trace: &mut Trace<AssignmentStep>,
) -> AssignmentProblem {
    let usable = || {
        graph
            .edges()
            .iter()
            .enumerate()
            .filter(|(_, e)| e.weight.is_finite())
    };
    let touched: HashSet<&str> = usable()
        .flat_map(|(_, e)| [e.source.as_str(), e.target.as_str()])
        .collect();
    let keep = |ids: &[String]| -> Vec<String> {
        ids.iter()
            .filter(|id| touched.contains(id.as_str()))
            .cloned()
            .collect()
    };
    let mut rows = keep(&sets.u);
    let mut cols = keep(&sets.v);

    let skipped = graph.len() - rows.len() - cols.len();
    if skipped > 0 {
        log::debug!("{skipped} nodes have no finite-weight edge and stay unassigned");
    }

    let real_rows = rows.len();
    let real_cols = cols.len();
    let n = real_rows.max(real_cols);

    let edge_at = {
        let row_of: HashMap<&str, usize> = rows
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        let col_of: HashMap<&str, usize> = cols
            .iter()
            .enumerate()
            .map(|(j, id)| (id.as_str(), j))
            .collect();

        let mut edge_at: Vec<Vec<Option<usize>>> = vec![vec![None; real_cols]; real_rows];
        for (e, edge) in usable() {
            let (a, b) = (edge.source.as_str(), edge.target.as_str());
            let pair = match (row_of.get(a), col_of.get(b)) {
                (Some(&i), Some(&j)) => Some((i, j)),
                _ => match (row_of.get(b), col_of.get(a)) {
                    (Some(&i), Some(&j)) => Some((i, j)),
                    _ => None,
                },
            };
            if let Some((i, j)) = pair {
                edge_at[i][j].get_or_insert(e);
            }
        }
        edge_at
    };

    while rows.len() < n {
        rows.push(format!("dummy_u_{}", rows.len()));
    }
    while cols.len() < n {
        cols.push(format!("dummy_v_{}", cols.len()));
    }

    let max_weight = graph
        .edges()
        .iter()
        .map(|e| e.weight)
        .filter(|w| w.is_finite())
        .fold(0.0_f64, f64::max);

    let (missing, dummy) = match mode {
        Mode::Minimize => (Cell::Forbidden, Cell::Finite(0.0)),
        Mode::Maximize => (Cell::Finite(0.0), Cell::Finite(max_weight + 1.0)),
    };

    let mut original = CostMatrix::filled(n, dummy);
    for (i, row) in edge_at.iter().enumerate() {
        for (j, slot) in row.iter().enumerate() {
            let cell = match slot {
                Some(e) => Cell::Finite(graph.edges()[*e].weight),
                None => missing,
            };
            original.set(i, j, cell);
        }
    }

    trace.push(AssignmentStep::snapshot(
        "1. Initial cost matrix",
        match mode {
            Mode::Minimize => "Edge weights between the two node sets; ∞ marks pairs with no edge.",
            Mode::Maximize => "Edge weights between the two node sets; missing pairs count as 0.",
        },
        &original,
    ));

    let mut matrix = original.clone();
    if mode == Mode::Maximize {
        matrix.map_finite(|c| max_weight - c);
        trace.push(AssignmentStep::snapshot(
            "1b. Maximization transform",
            &format!("Every cost c becomes {max_weight} - c (C' = max(C) - C) so the problem can be minimized."),
            &matrix,
        ));
    }

    if n > real_rows || n > real_cols {
        log::debug!(
            "padded assignment matrix to {n}x{n} ({real_rows} rows, {real_cols} columns)"
        );
    }

    AssignmentProblem {
        mode,
        rows,
        cols,
        real_rows,
        real_cols,
        max_weight,
        original,
        matrix,
        edge_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::bipartite::bipartition;
    use crate::graph::testing::undirected;

    fn build(graph: &Graph, mode: Mode) -> (AssignmentProblem, Trace<AssignmentStep>) {
        let sets = bipartition(graph).unwrap();
        let mut trace = Trace::new();
        let problem = build_cost_matrix(graph, &sets, mode, &mut trace);
        (problem, trace)
    }

    #[test]
    fn test_cell_ordering() {
        assert!(Cell::Finite(1e300) < Cell::Forbidden);
        assert!(Cell::Finite(-1.0) < Cell::Finite(0.0));
        assert!(Cell::Forbidden > Cell::Finite(0.0));
        assert!(Cell::Finite(0.0).is_zero());
        assert!(!Cell::Forbidden.is_zero());
    }

    #[test]
    fn test_forbidden_ignores_arithmetic() {
        let mut cell = Cell::Forbidden;
        cell.subtract(5.0);
        cell.add(2.0);
        assert_eq!(cell, Cell::Forbidden);
    }

    #[test]
    fn test_cell_serialization() {
        let m = CostMatrix::from_cells(vec![vec![Cell::Finite(2.0), Cell::Forbidden]]);
        assert_eq!(serde_json::to_string(&m).unwrap(), r#"[[2.0,"∞"]]"#);
    }

    #[test]
    fn test_min_matrix_with_missing_edge() {
        let g = undirected(&[("a1", "b1", 4.0), ("a1", "b2", 1.0), ("a2", "b1", 2.0)]);
        let (p, trace) = build(&g, Mode::Minimize);
        assert_eq!(p.n(), 2);
        assert_eq!(p.matrix.get(0, 0), Cell::Finite(4.0));
        assert_eq!(p.matrix.get(0, 1), Cell::Finite(1.0));
        assert_eq!(p.matrix.get(1, 0), Cell::Finite(2.0));
        assert_eq!(p.matrix.get(1, 1), Cell::Forbidden);
        assert_eq!(trace.len(), 1);
        assert_eq!(p.edge_at(1, 1), None);
        assert_eq!(p.edge_at(0, 1), Some(1));
    }

    #[test]
    fn test_padding_with_dummies() {
        // three workers, two jobs
        let g = undirected(&[
            ("w1", "j1", 3.0),
            ("w2", "j1", 1.0),
            ("w3", "j2", 2.0),
            ("w1", "j2", 5.0),
        ]);
        let (p, _) = build(&g, Mode::Minimize);
        assert_eq!(p.real_rows, 3);
        assert_eq!(p.real_cols, 2);
        assert_eq!(p.n(), 3);
        assert_eq!(p.cols[2], "dummy_v_2");
        for i in 0..3 {
            assert_eq!(p.matrix.get(i, 2), Cell::Finite(0.0));
            assert!(p.is_dummy(i, 2));
        }
    }

    #[test]
    fn test_max_transform() {
        let g = undirected(&[("a1", "b1", 4.0), ("a1", "b2", 1.0), ("a2", "b1", 2.0)]);
        let (p, trace) = build(&g, Mode::Maximize);
        assert_eq!(p.max_weight, 4.0);
        // untransformed: missing pair is 0
        assert_eq!(p.original.get(1, 1), Cell::Finite(0.0));
        // transformed: c -> 4 - c
        assert_eq!(p.matrix.get(0, 0), Cell::Finite(0.0));
        assert_eq!(p.matrix.get(0, 1), Cell::Finite(3.0));
        assert_eq!(p.matrix.get(1, 1), Cell::Finite(4.0));
        assert_eq!(trace.len(), 2);
        assert_eq!(trace.steps()[0].matrix, p.original);
    }

    #[test]
    fn test_max_dummy_cells() {
        let g = undirected(&[("a1", "b1", 4.0), ("a2", "b1", 2.0)]);
        let (p, _) = build(&g, Mode::Maximize);
        // dummy column: 4 + 1 before transform, -1 after
        assert_eq!(p.original.get(0, 1), Cell::Finite(5.0));
        assert_eq!(p.matrix.get(0, 1), Cell::Finite(-1.0));
    }

    #[test]
    fn test_isolated_node_gets_no_row() {
        let mut g = undirected(&[("a1", "b1", 3.0), ("a1", "b2", 1.0)]);
        g.add_node("z", None);
        let sets = bipartition(&g).unwrap();
        assert!(sets.u.contains(&"z".to_string()));

        let (p, _) = build(&g, Mode::Minimize);
        assert_eq!(p.real_rows, 1);
        assert_eq!(p.real_cols, 2);
        assert_eq!(p.rows, vec!["a1", "dummy_u_1"]);
    }

    #[test]
    fn test_non_finite_edges_are_absent() {
        let g = undirected(&[
            ("a1", "b1", f64::INFINITY),
            ("a1", "b2", f64::NAN),
            ("a2", "b1", 1.0),
            ("a2", "b2", 2.0),
        ]);
        let (p, _) = build(&g, Mode::Minimize);
        // a1 has no usable edge left
        assert_eq!(p.real_rows, 1);
        assert_eq!(p.matrix.get(0, 0), Cell::Finite(1.0));
        assert_eq!(p.matrix.get(1, 0), Cell::Finite(0.0));
        assert_eq!(p.edge_at(0, 1), Some(3));

        let m = CostMatrix::from_values(&[vec![f64::INFINITY, f64::NAN]]);
        assert_eq!(m.row_min(0), None);
    }

    #[test]
    fn test_row_and_col_min() {
        let m = CostMatrix::from_cells(vec![
            vec![Cell::Forbidden, Cell::Finite(3.0)],
            vec![Cell::Forbidden, Cell::Forbidden],
        ]);
        assert_eq!(m.row_min(0), Some(3.0));
        assert_eq!(m.row_min(1), None);
        assert_eq!(m.col_min(0), None);
        assert_eq!(m.col_min(1), Some(3.0));
    }
}
