//! Hungarian (Munkres) algorithm for square minimization problems.
//!
//! Runs as a small state machine and appends a self-contained trace entry at
//! every phase transition, so the UI can replay the reduction step by step.
//!
//! # Phases
//! 1. Row reduction, then column reduction (finite cells only)
//! 2. Star an independent set of zeros
//! 3. Cover starred columns; `n` covered columns means the stars are optimal
//! 4. Prime uncovered zeros; a star in the primed row moves the cover from its
//!    column to the row, otherwise an augmenting path starts at the prime
//! 5. Flip stars and primes along the alternating path, clear marks, back to 3
//! 6. No uncovered zero: shift the smallest uncovered finite value, back to 4

use serde::Serialize;

use super::cost_matrix::{Cell, CostMatrix};
use crate::error::{SolverError, SolverResult};
use crate::report::Trace;

/// A (row, column) cell reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

/// One entry of the assignment trace.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentStep {
    pub title: String,
    pub description: String,
    pub matrix: CostMatrix,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stars: Vec<Position>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub primes: Vec<Position>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub covered_rows: Vec<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub covered_cols: Vec<usize>,
    pub is_final: bool,
}

impl AssignmentStep {
    /// Step holding only a matrix snapshot.
    pub fn snapshot(title: &str, description: &str, matrix: &CostMatrix) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            matrix: matrix.clone(),
            stars: Vec::new(),
            primes: Vec::new(),
            covered_rows: Vec::new(),
            covered_cols: Vec::new(),
            is_final: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    CoverCheck,
    Prime,
    Augment(Position),
    Adjust,
    Done,
}

/// Working state of one run.
struct Solver {
    c: CostMatrix,
    n: usize,
    /// star_in_row[r] = column of the star in row r
    star_in_row: Vec<Option<usize>>,
    star_in_col: Vec<Option<usize>>,
    prime_in_row: Vec<Option<usize>>,
    row_cover: Vec<bool>,
    col_cover: Vec<bool>,
}

impl Solver {
    fn new(costs: &CostMatrix) -> Self {
        let n = costs.n();
        Self {
            c: costs.clone(),
            n,
            star_in_row: vec![None; n],
            star_in_col: vec![None; n],
            prime_in_row: vec![None; n],
            row_cover: vec![false; n],
            col_cover: vec![false; n],
        }
    }

    fn reduce_rows(&mut self) -> SolverResult<()> {
        for r in 0..self.n {
            let min = self.c.row_min(r).ok_or_else(|| {
                log::debug!("row {r} has no finite cell");
                SolverError::InfeasibleAssignment
            })?;
            for col in 0..self.n {
                self.c.cell_mut(r, col).subtract(min);
            }
        }
        Ok(())
    }

    fn reduce_cols(&mut self) -> SolverResult<()> {
        for col in 0..self.n {
            let min = self.c.col_min(col).ok_or_else(|| {
                log::debug!("column {col} has no finite cell");
                SolverError::InfeasibleAssignment
            })?;
            for r in 0..self.n {
                self.c.cell_mut(r, col).subtract(min);
            }
        }
        Ok(())
    }

    /// Greedy row-major starring of independent zeros.
    fn star_zeros(&mut self) {
        for r in 0..self.n {
            for col in 0..self.n {
                if self.c.get(r, col).is_zero()
                    && self.star_in_row[r].is_none()
                    && self.star_in_col[col].is_none()
                {
                    self.star(r, col);
                }
            }
        }
    }

    fn star(&mut self, row: usize, col: usize) {
        self.star_in_row[row] = Some(col);
        self.star_in_col[col] = Some(row);
    }

    fn cover_starred_columns(&mut self) -> usize {
        let mut count = 0;
        for col in 0..self.n {
            self.col_cover[col] = self.star_in_col[col].is_some();
            if self.col_cover[col] {
                count += 1;
            }
        }
        count
    }

    fn find_uncovered_zero(&self) -> Option<Position> {
        (0..self.n)
            .filter(|&r| !self.row_cover[r])
            .flat_map(|r| (0..self.n).map(move |col| Position { row: r, col }))
            .find(|p| !self.col_cover[p.col] && self.c.get(p.row, p.col).is_zero())
    }

    /// Prime uncovered zeros until one has no star in its row (returned) or
    /// none are left (`None`).
    fn prime_zeros(&mut self) -> Option<Position> {
        while let Some(p) = self.find_uncovered_zero() {
            self.prime_in_row[p.row] = Some(p.col);
            match self.star_in_row[p.row] {
                Some(star_col) => {
                    self.row_cover[p.row] = true;
                    self.col_cover[star_col] = false;
                }
                None => return Some(p),
            }
        }
        None
    }

    /// Alternating path prime, star, prime, ... starting at `start`.
    fn alternating_path(&self, start: Position) -> Vec<Position> {
        let mut path = vec![start];
        let mut col = start.col;
        while let Some(row) = self.star_in_col[col] {
            path.push(Position { row, col });
            let Some(prime_col) = self.prime_in_row[row] else {
                break;
            };
            path.push(Position { row, col: prime_col });
            col = prime_col;
        }
        path
    }

    /// Unstar the stars on the path, star its primes, then clear primes and covers.
    fn flip(&mut self, path: &[Position]) {
        for p in path.iter().skip(1).step_by(2) {
            self.star_in_row[p.row] = None;
            self.star_in_col[p.col] = None;
        }
        for p in path.iter().step_by(2) {
            self.star(p.row, p.col);
        }
        self.prime_in_row.iter_mut().for_each(|x| *x = None);
        self.row_cover.iter_mut().for_each(|x| *x = false);
        self.col_cover.iter_mut().for_each(|x| *x = false);
    }

    /// Smallest finite value among uncovered cells. Infinite and NaN cells are skipped.
    fn min_uncovered(&self) -> Option<f64> {
        let mut min: Option<f64> = None;
        for r in (0..self.n).filter(|&r| !self.row_cover[r]) {
            for col in (0..self.n).filter(|&c| !self.col_cover[c]) {
                if let Cell::Finite(x) = self.c.get(r, col) {
                    if x.is_finite() {
                        min = Some(min.map_or(x, |m| m.min(x)));
                    }
                }
            }
        }
        min
    }

    fn adjust(&mut self, delta: f64) {
        for r in 0..self.n {
            for col in 0..self.n {
                match (self.row_cover[r], self.col_cover[col]) {
                    (false, false) => self.c.cell_mut(r, col).subtract(delta),
                    (true, true) => self.c.cell_mut(r, col).add(delta),
                    _ => {}
                }
            }
        }
    }

    fn stars(&self) -> Vec<Position> {
        self.star_in_row
            .iter()
            .enumerate()
            .filter_map(|(row, col)| col.map(|col| Position { row, col }))
            .collect()
    }

    fn primes(&self) -> Vec<Position> {
        self.prime_in_row
            .iter()
            .enumerate()
            .filter_map(|(row, col)| col.map(|col| Position { row, col }))
            .collect()
    }

    fn step(&self, title: &str, description: String) -> AssignmentStep {
        AssignmentStep {
            title: title.to_string(),
            description,
            matrix: self.c.clone(),
            stars: self.stars(),
            primes: self.primes(),
            covered_rows: covered(&self.row_cover),
            covered_cols: covered(&self.col_cover),
            is_final: false,
        }
    }
}

fn covered(flags: &[bool]) -> Vec<usize> {
    flags
        .iter()
        .enumerate()
        .filter_map(|(i, &c)| c.then_some(i))
        .collect()
}

/// Solve the square minimization problem in `costs`.
///
/// # Returns
/// * `Ok(positions)` - one `(row, col)` per row, sorted by row, minimizing the
///   sum of the chosen (finite) cells
/// * `Err(SolverError::InfeasibleAssignment)` - no perfect matching avoids
///   forbidden cells
///
/// Steps recorded before a failure stay in `trace`.
pub fn munkres(
    costs: &CostMatrix,
    trace: &mut Trace<AssignmentStep>,
) -> SolverResult<Vec<Position>> {
    let mut s = Solver::new(costs);
    let n = s.n;

    s.reduce_rows()?;
    trace.push(s.step(
        "2. Row reduction",
        "Subtract each row's minimum from every element of that row.".to_string(),
    ));

    s.reduce_cols()?;
    trace.push(s.step(
        "3. Column reduction",
        "Subtract each column's minimum from every element of that column.".to_string(),
    ));

    s.star_zeros();
    let initial = s.stars().len();
    trace.push(s.step(
        &format!("4. Initial assignment ({initial}/{n})"),
        format!("Star independent zeros, at most one per row and column. {initial} found."),
    ));

    let mut phase = Phase::CoverCheck;
    let mut rounds = 0usize;
    while phase != Phase::Done {
        phase = match phase {
            Phase::CoverCheck => {
                let covered = s.cover_starred_columns();
                trace.push(s.step(
                    &format!("Cover starred columns ({covered}/{n})"),
                    if covered == n {
                        "Every column holds a starred zero: the assignment is optimal.".to_string()
                    } else {
                        format!("{covered} columns covered; look for uncovered zeros.")
                    },
                ));
                if covered == n {
                    Phase::Done
                } else {
                    Phase::Prime
                }
            }
            Phase::Prime => {
                let found = s.prime_zeros();
                let lines = s.row_cover.iter().chain(&s.col_cover).filter(|&&c| c).count();
                trace.push(s.step(
                    "Prime uncovered zeros",
                    match found {
                        Some(p) => format!(
                            "Zero at ({}, {}) is primed and its row has no star: build an augmenting path.",
                            p.row, p.col
                        ),
                        None => format!("All zeros are covered with {lines} lines."),
                    },
                ));
                match found {
                    Some(p) => Phase::Augment(p),
                    None => Phase::Adjust,
                }
            }
            Phase::Augment(start) => {
                let path = s.alternating_path(start);
                s.flip(&path);
                trace.push(s.step(
                    "Augmenting path",
                    format!(
                        "Flip {} cells along the alternating path: primes become stars, stars are removed.",
                        path.len()
                    ),
                ));
                Phase::CoverCheck
            }
            Phase::Adjust => {
                let Some(min) = s.min_uncovered() else {
                    log::debug!("no uncovered finite cell after {rounds} adjustments");
                    return Err(SolverError::InfeasibleAssignment);
                };
                s.adjust(min);
                rounds += 1;
                trace.push(s.step(
                    "Matrix adjustment",
                    format!(
                        "Subtract the smallest uncovered value ({min}) from uncovered cells and add it to doubly covered cells."
                    ),
                ));
                Phase::Prime
            }
            Phase::Done => Phase::Done,
        };
    }

    let assignment = s.stars();
    let mut last = s.step(
        "Final result",
        format!("Optimal assignment with {} pairings.", assignment.len()),
    );
    last.primes.clear();
    last.covered_rows.clear();
    last.covered_cols.clear();
    last.is_final = true;
    trace.push(last);

    log::debug!("munkres solved {n}x{n} with {rounds} adjustments");
    Ok(assignment)
}

/// Solve without keeping a trace.
pub fn munkres_untraced(costs: &CostMatrix) -> SolverResult<Vec<Position>> {
    munkres(costs, &mut Trace::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(costs: &CostMatrix, assignment: &[Position]) -> f64 {
        assignment
            .iter()
            .map(|p| costs.get(p.row, p.col).value().unwrap())
            .sum()
    }

    fn brute_force(costs: &CostMatrix) -> Option<f64> {
        fn go(costs: &CostMatrix, row: usize, used: &mut Vec<bool>, acc: f64, best: &mut Option<f64>) {
            let n = costs.n();
            if row == n {
                *best = Some(best.map_or(acc, |b| b.min(acc)));
                return;
            }
            for col in 0..n {
                if used[col] {
                    continue;
                }
                if let Cell::Finite(x) = costs.get(row, col) {
                    used[col] = true;
                    go(costs, row + 1, used, acc + x, best);
                    used[col] = false;
                }
            }
        }
        let mut best = None;
        go(costs, 0, &mut vec![false; costs.n()], 0.0, &mut best);
        best
    }

    #[test]
    fn test_empty_matrix() {
        let m = CostMatrix::from_values(&[]);
        let mut trace = Trace::new();
        assert_eq!(munkres(&m, &mut trace).unwrap(), vec![]);
        assert!(trace.last().unwrap().is_final);
    }

    #[test]
    fn test_single_cell() {
        let m = CostMatrix::from_values(&[vec![7.0]]);
        assert_eq!(
            munkres_untraced(&m).unwrap(),
            vec![Position { row: 0, col: 0 }]
        );
    }

    #[test]
    fn test_three_by_three() {
        let m = CostMatrix::from_values(&[
            vec![4.0, 1.0, 3.0],
            vec![2.0, 0.0, 5.0],
            vec![3.0, 2.0, 2.0],
        ]);
        let a = munkres_untraced(&m).unwrap();
        assert_eq!(a.len(), 3);
        assert_eq!(total(&m, &a), 5.0);
    }

    #[test]
    fn test_needs_adjustment() {
        // Classic example whose reduced matrix has too few independent zeros.
        let m = CostMatrix::from_values(&[
            vec![1.0, 2.0, 3.0],
            vec![2.0, 4.0, 6.0],
            vec![3.0, 6.0, 9.0],
        ]);
        let mut trace = Trace::new();
        let a = munkres(&m, &mut trace).unwrap();
        assert_eq!(total(&m, &a), 10.0);
        assert!(trace.steps().iter().any(|s| s.title == "Matrix adjustment"));
    }

    #[test]
    fn test_assignment_is_a_permutation() {
        let m = CostMatrix::from_values(&[
            vec![9.0, 2.0, 7.0, 8.0],
            vec![6.0, 4.0, 3.0, 7.0],
            vec![5.0, 8.0, 1.0, 8.0],
            vec![7.0, 6.0, 9.0, 4.0],
        ]);
        let a = munkres_untraced(&m).unwrap();
        let mut cols: Vec<usize> = a.iter().map(|p| p.col).collect();
        cols.sort_unstable();
        assert_eq!(cols, vec![0, 1, 2, 3]);
        assert_eq!(total(&m, &a), 13.0);
        assert_eq!(Some(13.0), brute_force(&m));
    }

    #[test]
    fn test_forbidden_cells_avoided() {
        let m = CostMatrix::from_cells(vec![
            vec![Cell::Finite(1.0), Cell::Forbidden],
            vec![Cell::Finite(1.0), Cell::Finite(50.0)],
        ]);
        let a = munkres_untraced(&m).unwrap();
        assert_eq!(
            a,
            vec![Position { row: 0, col: 0 }, Position { row: 1, col: 1 }]
        );
    }

    #[test]
    fn test_forbidden_row_is_infeasible() {
        let m = CostMatrix::from_cells(vec![
            vec![Cell::Forbidden, Cell::Forbidden],
            vec![Cell::Finite(1.0), Cell::Finite(2.0)],
        ]);
        let mut trace = Trace::new();
        assert_eq!(
            munkres(&m, &mut trace),
            Err(SolverError::InfeasibleAssignment)
        );
    }

    #[test]
    fn test_non_finite_values_never_chosen() {
        let inf = f64::INFINITY;
        let crossed = vec![Position { row: 0, col: 1 }, Position { row: 1, col: 0 }];

        let m = CostMatrix::from_values(&[vec![inf, 1.0], vec![2.0, inf]]);
        assert_eq!(munkres_untraced(&m).unwrap(), crossed);

        let m = CostMatrix::from_values(&[vec![f64::NAN, 1.0], vec![1.0, 5.0]]);
        assert_eq!(munkres_untraced(&m).unwrap(), crossed);

        let m = CostMatrix::from_values(&[vec![inf, inf], vec![1.0, 2.0]]);
        assert_eq!(
            munkres_untraced(&m),
            Err(SolverError::InfeasibleAssignment)
        );
    }

    #[test]
    fn test_hall_violation_is_infeasible() {
        // Rows 0 and 1 can only use column 0.
        let m = CostMatrix::from_cells(vec![
            vec![Cell::Finite(1.0), Cell::Forbidden, Cell::Forbidden],
            vec![Cell::Finite(2.0), Cell::Forbidden, Cell::Forbidden],
            vec![Cell::Finite(3.0), Cell::Finite(1.0), Cell::Finite(1.0)],
        ]);
        let mut trace = Trace::new();
        assert_eq!(
            munkres(&m, &mut trace),
            Err(SolverError::InfeasibleAssignment)
        );
        // partial progress is kept
        assert!(trace.len() >= 3);
    }

    #[test]
    fn test_trace_is_self_contained() {
        let m = CostMatrix::from_values(&[vec![1.0, 2.0], vec![3.0, 1.0]]);
        let mut trace = Trace::new();
        munkres(&m, &mut trace).unwrap();
        assert_eq!(trace.steps()[0].title, "2. Row reduction");
        assert_eq!(trace.steps()[1].title, "3. Column reduction");
        for step in trace.steps() {
            assert_eq!(step.matrix.n(), 2);
        }
        let last = trace.last().unwrap();
        assert!(last.is_final);
        assert_eq!(last.stars.len(), 2);
    }

    #[test]
    fn test_negative_and_fractional_costs() {
        let m = CostMatrix::from_values(&[
            vec![-1.5, 0.25, 3.0],
            vec![0.5, -2.0, 1.0],
            vec![2.0, 1.0, -0.75],
        ]);
        let a = munkres_untraced(&m).unwrap();
        assert!((total(&m, &a) - brute_force(&m).unwrap()).abs() < 1e-9);
    }
}
