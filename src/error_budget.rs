use std::sync::atomic::{AtomicU32, Ordering};

/// How many failure diagnostics a sender emits over its lifetime.
pub const DEFAULT_ERROR_BUDGET: u32 = 5;

/// Gate for failure diagnostics.
///
/// Each call to [`report`](Self::report) spends one unit of budget and runs
/// the supplied callback. Once the budget is spent, further reports are
/// silently discarded. The budget is never replenished, so a persistently
/// broken transport produces a bounded number of diagnostics.
#[derive(Debug)]
pub struct ErrorBudget {
    remaining: AtomicU32,
}

impl Default for ErrorBudget {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_BUDGET)
    }
}

impl ErrorBudget {
    pub fn new(budget: u32) -> Self {
        Self {
            remaining: AtomicU32::new(budget),
        }
    }

    /// Spend one unit and run `report` if budget remains.
    ///
    /// Returns `true` when the callback ran.
    pub fn report(&self, report: impl FnOnce()) -> bool {
        let spent = self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |left| {
                left.checked_sub(1)
            })
            .is_ok();
        if spent {
            report();
        }
        spent
    }

    pub fn remaining(&self) -> u32 {
        self.remaining.load(Ordering::Acquire)
    }
}
