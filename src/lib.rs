pub mod cli;
pub mod config;
pub mod coordination;
pub mod domain;
pub mod error;
pub mod exchange;
pub mod nl;
pub mod services;

pub use config::AppConfig;
pub use coordination::{
    BudgetGuard, BudgetState, BreakerStats, CircuitBreaker, CircuitState, Clock, ManualClock,
    SystemClock,
};
pub use domain::{parse_trade_command, Order, OrderPayload, OrderRequest, Side};
pub use error::{CommandError, HlError, OrderError, ParseError, Result};
pub use exchange::{build_order_payload, FeePolicy};
pub use nl::{HeuristicParser, OrderParser};
pub use services::{OrderPipeline, ParsePath, Submission};
