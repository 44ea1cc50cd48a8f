//! Result envelope handed to the presentation layer, plus the step trace builder.
//!
//! Solvers return `SolverResult<T>` internally. At the boundary the outcome is
//! folded into a [`Report`], which serializes as
//! `{ ok, message, kind?, steps?, ...fields }`.

use serde::Serialize;

use crate::error::{ErrorKind, SolverResult};

/// One-line, human readable description of a successful result.
pub trait Summary {
    fn summary(&self) -> String;
}

/// Outcome of a solver call as seen by the UI.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report<T, S = ()> {
    pub ok: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    /// Trace recorded up to the point the solver stopped, failures included.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<S>,
    #[serde(flatten)]
    pub data: Option<T>,
}

impl<T: Summary, S> Report<T, S> {
    /// Build a report from a solver outcome and the steps it recorded.
    pub fn new(result: SolverResult<T>, steps: Vec<S>) -> Self {
        match result {
            Ok(data) => Self {
                ok: true,
                message: data.summary(),
                kind: None,
                steps,
                data: Some(data),
            },
            Err(err) => {
                log::debug!("solver failed: {err}");
                Self {
                    ok: false,
                    message: err.to_string(),
                    kind: Some(err.kind()),
                    steps,
                    data: None,
                }
            }
        }
    }
}

impl<T: Summary> From<SolverResult<T>> for Report<T> {
    fn from(result: SolverResult<T>) -> Self {
        Report::new(result, Vec::new())
    }
}

/// Append-only log of intermediate states.
///
/// Passed by `&mut` through solver calls so the trace dependency is visible in
/// every signature that records steps.
#[derive(Debug, Clone)]
pub struct Trace<S> {
    steps: Vec<S>,
}

impl<S> Trace<S> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn push(&mut self, step: S) {
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[S] {
        &self.steps
    }

    pub fn last(&self) -> Option<&S> {
        self.steps.last()
    }

    pub fn into_steps(self) -> Vec<S> {
        self.steps
    }
}

impl<S> Default for Trace<S> {
    fn default() -> Self {
        Self::new()
    }
}
