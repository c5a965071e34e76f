//! Monthly spend cap for the expensive parse path
//!
//! Cost units are abstract (roughly tokens). A charge that would push the
//! running total past the cap is rejected whole; nothing is partially
//! charged.

use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::BudgetConfig;

/// Snapshot of the guard's counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BudgetState {
    pub monthly_budget: Decimal,
    pub spent: Decimal,
}

impl BudgetState {
    pub fn remaining(&self) -> Decimal {
        (self.monthly_budget - self.spent).max(Decimal::ZERO)
    }
}

/// Spend tracker shared by every request in the process.
pub struct BudgetGuard {
    state: Mutex<BudgetState>,
}

impl BudgetGuard {
    pub fn new(monthly_budget: Decimal) -> Self {
        Self {
            state: Mutex::new(BudgetState {
                monthly_budget,
                spent: Decimal::ZERO,
            }),
        }
    }

    pub fn from_config(config: &BudgetConfig) -> Self {
        Self::new(config.monthly_budget)
    }

    /// Charge `cost` if it fits under the cap.
    ///
    /// Returns `false` and leaves `spent` untouched when it does not fit.
    /// Negative costs are treated as rejected so `spent` never decreases,
    /// and a charge that overflows the running total is rejected too.
    pub fn try_spend(&self, cost: Decimal) -> bool {
        let mut state = self.state.lock();
        let total = state.spent.checked_add(cost);
        match total {
            Some(total) if cost >= Decimal::ZERO && total <= state.monthly_budget => {
                state.spent = total;
                true
            }
            _ => {
                warn!(
                    cost = %cost,
                    spent = %state.spent,
                    monthly_budget = %state.monthly_budget,
                    "Budget exceeded; using fallback parser"
                );
                false
            }
        }
    }

    pub fn spent(&self) -> Decimal {
        self.state.lock().spent
    }

    pub fn monthly_budget(&self) -> Decimal {
        self.state.lock().monthly_budget
    }

    pub fn remaining(&self) -> Decimal {
        self.state.lock().remaining()
    }

    pub fn snapshot(&self) -> BudgetState {
        *self.state.lock()
    }

    /// Start a new billing period
    pub fn reset_period(&self) {
        let mut state = self.state.lock();
        info!(spent = %state.spent, "Budget period reset");
        state.spent = Decimal::ZERO;
    }
}

impl std::fmt::Debug for BudgetGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BudgetGuard")
            .field("state", &self.snapshot())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    #[test]
    fn test_spend_up_to_cap() {
        let guard = BudgetGuard::new(dec!(10));
        assert!(guard.try_spend(dec!(4)));
        assert!(guard.try_spend(dec!(6)));
        assert_eq!(guard.spent(), dec!(10));
        assert_eq!(guard.remaining(), dec!(0));
    }

    #[test]
    fn test_rejection_leaves_spent_unchanged() {
        let guard = BudgetGuard::new(dec!(10));
        assert!(guard.try_spend(dec!(7)));
        assert!(!guard.try_spend(dec!(4)));
        assert_eq!(guard.spent(), dec!(7));
        // Smaller charge still fits
        assert!(guard.try_spend(dec!(3)));
    }

    #[test]
    fn test_negative_cost_rejected() {
        let guard = BudgetGuard::new(dec!(10));
        assert!(!guard.try_spend(dec!(-1)));
        assert_eq!(guard.spent(), dec!(0));
    }

    #[test]
    fn test_overflowing_cost_rejected() {
        let guard = BudgetGuard::new(Decimal::MAX);
        assert!(guard.try_spend(dec!(1)));
        assert!(!guard.try_spend(Decimal::MAX));
        assert_eq!(guard.spent(), dec!(1));
        assert_eq!(guard.remaining(), Decimal::MAX - dec!(1));
    }

    #[test]
    fn test_reset_period() {
        let guard = BudgetGuard::new(dec!(5));
        assert!(guard.try_spend(dec!(5)));
        assert!(!guard.try_spend(dec!(1)));
        guard.reset_period();
        assert_eq!(guard.spent(), dec!(0));
        assert!(guard.try_spend(dec!(1)));
    }

    #[test]
    fn test_concurrent_spend_never_exceeds_cap() {
        let guard = Arc::new(BudgetGuard::new(dec!(100)));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let guard = guard.clone();
                std::thread::spawn(move || (0..50).filter(|_| guard.try_spend(dec!(1))).count())
            })
            .collect();

        let accepted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(accepted, 100);
        assert_eq!(guard.spent(), dec!(100));
    }
}
