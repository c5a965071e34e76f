//! Shared guards consulted by every request
//!
//! - Budget guard choosing between the expensive and the fallback parse path
//! - Circuit breaker pausing order submission after repeated API errors

pub mod budget_guard;
pub mod circuit_breaker;

pub use budget_guard::{BudgetGuard, BudgetState};
pub use circuit_breaker::{
    AlertCallback, BreakerStats, CircuitBreaker, CircuitState, Clock, ManualClock, SystemClock,
    TripReason,
};
