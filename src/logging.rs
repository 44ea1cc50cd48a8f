//! Logging setup for the browser build.
//!
//! Solvers log through the `log` facade. In the browser the records go to the
//! developer console via `console_log`; native hosts install their own logger.

use log::{Level, LevelFilter};

/// Parse a level name ("error", "warn", "info", "debug", "trace", "off").
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    match name.trim().to_ascii_lowercase().as_str() {
        "off" | "silent" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

/// Install the console logger. Safe to call more than once; later calls only
/// change the maximum level.
pub fn init_logging(level: Level) {
    #[cfg(target_arch = "wasm32")]
    {
        // Fails only if a logger is already installed.
        let _ = console_log::init_with_level(level);
    }
    log::set_max_level(level.to_level_filter());
}
