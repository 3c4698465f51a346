//! Attempt accounting for retryable tasks.

use std::sync::atomic::{AtomicU32, Ordering};

/// Counts execution attempts against a fixed cap.
///
/// A task records one attempt per [`execute`](crate::Task::execute) call and
/// reports [`exhausted`](RetryBudget::exhausted) from its retry predicate.
/// The counter only ever grows; a budget is per task value, so fan-out must
/// hand each instance its own task.
///
/// # Example
/// ```
/// use fleetvisor::RetryBudget;
///
/// let budget = RetryBudget::new(2);
/// assert!(!budget.exhausted());
///
/// budget.record_attempt();
/// budget.record_attempt();
/// assert!(budget.exhausted());
/// ```
#[derive(Debug)]
pub struct RetryBudget {
    max: u32,
    used: AtomicU32,
}

impl RetryBudget {
    /// Creates a budget allowing `max` attempts in total.
    pub fn new(max: u32) -> Self {
        Self {
            max,
            used: AtomicU32::new(0),
        }
    }

    /// Records one attempt and returns its 1-based number.
    pub fn record_attempt(&self) -> u32 {
        self.used.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// True once `max` attempts have been recorded.
    pub fn exhausted(&self) -> bool {
        self.used.load(Ordering::SeqCst) >= self.max
    }

    /// Number of attempts recorded so far.
    pub fn used(&self) -> u32 {
        self.used.load(Ordering::SeqCst)
    }

    /// The attempt cap.
    pub fn max(&self) -> u32 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausts_after_max_attempts() {
        let budget = RetryBudget::new(3);
        assert_eq!(budget.record_attempt(), 1);
        assert_eq!(budget.record_attempt(), 2);
        assert!(!budget.exhausted(), "two of three attempts used");
        assert_eq!(budget.record_attempt(), 3);
        assert!(budget.exhausted());
        assert_eq!(budget.used(), 3);
    }

    #[test]
    fn zero_budget_is_exhausted_immediately() {
        let budget = RetryBudget::new(0);
        assert!(budget.exhausted());
    }
}
