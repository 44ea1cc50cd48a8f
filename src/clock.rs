//! Wall-clock deadlines usable both in the browser and natively.
//!
//! `std::time::Instant` is unavailable on `wasm32-unknown-unknown`, so the
//! browser build reads `Date.now()` through js-sys instead.

/// Milliseconds since an arbitrary fixed origin.
#[cfg(target_arch = "wasm32")]
fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
fn now_ms() -> f64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static ORIGIN: OnceLock<Instant> = OnceLock::new();
    ORIGIN.get_or_init(Instant::now).elapsed().as_secs_f64() * 1000.0
}

/// A point in time after which cooperative work should stop.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    /// `None` means no limit.
    at_ms: Option<f64>,
    /// Polls answered before expiring regardless of the clock
    polls_left: Option<u64>,
}

impl Deadline {
    /// Deadline `budget_ms` milliseconds from now.
    pub fn after_ms(budget_ms: f64) -> Self {
        Self {
            at_ms: Some(now_ms() + budget_ms.max(0.0)),
            polls_left: None,
        }
    }

    pub fn never() -> Self {
        Self {
            at_ms: None,
            polls_left: None,
        }
    }

    pub fn from_budget(budget_ms: Option<f64>) -> Self {
        budget_ms.map_or_else(Self::never, Self::after_ms)
    }

    /// Expires on the poll after the first `polls`, independent of timing.
    #[cfg(test)]
    pub(crate) fn after_polls(polls: u64) -> Self {
        Self {
            at_ms: None,
            polls_left: Some(polls),
        }
    }

    /// Poll the deadline. Every call counts against a poll budget.
    pub fn expired(&mut self) -> bool {
        if let Some(left) = &mut self.polls_left {
            if *left == 0 {
                return true;
            }
            *left -= 1;
        }
        self.at_ms.is_some_and(|at| now_ms() >= at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_expires() {
        assert!(!Deadline::never().expired());
        assert!(!Deadline::from_budget(None).expired());
    }

    #[test]
    fn test_zero_budget_expires() {
        assert!(Deadline::after_ms(0.0).expired());
    }

    #[test]
    fn test_generous_budget() {
        assert!(!Deadline::after_ms(60_000.0).expired());
    }

    #[test]
    fn test_poll_budget() {
        let mut deadline = Deadline::after_polls(2);
        assert!(!deadline.expired());
        assert!(!deadline.expired());
        assert!(deadline.expired());
        assert!(deadline.expired());
    }
}
