//! Graph and tree algorithms with step-by-step traces, compiled to WebAssembly
//! for a teaching visualizer.
//!
//! Every solver is a plain Rust function over a borrowed [`Graph`] (or slices
//! for the tree builders) returning a [`SolverResult`]. The `#[wasm_bindgen]`
//! glue wraps outcomes into [`Report`]s, so algorithmic failures reach
//! JavaScript as `{ ok: false, message, kind }` rather than exceptions.

use log::Level;
use wasm_bindgen::prelude::*;

pub mod algorithms;
pub mod clock;
pub mod error;
pub mod graph;
pub mod logging;
pub mod report;

#[cfg(feature = "trees")]
pub mod trees;

pub use algorithms::Mode;
pub use error::{ErrorKind, SolverError, SolverResult};
pub use graph::{Edge, Graph, GraphSnapshot, Node};
pub use report::{Report, Summary, Trace};

/// Module initialization: panic hook and console logging at `warn`.
#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    logging::init_logging(Level::Warn);
}

/// Change the console log level ("off", "error", "warn", "info", "debug", "trace").
#[wasm_bindgen(js_name = setLogLevel)]
pub fn set_log_level(level: &str) -> Result<(), JsError> {
    let filter = logging::parse_level(level)
        .ok_or_else(|| JsError::new(&format!("unknown log level {level:?}")))?;
    log::set_max_level(filter);
    Ok(())
}

/// Crate version, for the UI's about box.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
