//! Order pipeline: parse → preview → confirm
//!
//! Every phrase is first priced against the budget guard. When the charge is
//! accepted the primary parser runs; otherwise the cheap fallback does. The
//! result is fee-resolved, rendered as the exchange payload and shown to the
//! user for confirmation. Submission itself belongs to the caller, gated by
//! the circuit breaker.

use anyhow::Context;
use rust_decimal::Decimal;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::coordination::{BudgetGuard, CircuitBreaker};
use crate::domain::{Order, OrderPayload, OrderRequest};
use crate::error::{ParseError, Result};
use crate::exchange::FeePolicy;
use crate::nl::{HeuristicParser, OrderParser};

/// Reply shown while the breaker holds submission
pub const PAUSED_MESSAGE: &str = "Trading is paused after repeated API errors; try again later.";

/// Which parser handled a phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsePath {
    /// Budget accepted the charge
    Primary,
    /// Budget exhausted
    Fallback,
}

/// Outcome of the submission gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Accepted(OrderPayload),
    Paused { message: String },
}

/// Rough primary-path cost of a phrase: one unit per word.
pub fn estimate_cost(text: &str) -> Decimal {
    Decimal::from(text.split_whitespace().count())
}

/// Confirmation prompt for a payload
pub fn format_preview(payload: &OrderPayload) -> Result<String> {
    Ok(format!("Order preview:\n{}\n\nConfirm?", payload.to_json()?))
}

pub struct OrderPipeline {
    budget: Arc<BudgetGuard>,
    fees: FeePolicy,
    primary: Arc<dyn OrderParser>,
    fallback: Arc<dyn OrderParser>,
}

impl OrderPipeline {
    /// Pipeline with the heuristic parser on both paths
    pub fn new(budget: Arc<BudgetGuard>, fees: FeePolicy) -> Self {
        let heuristic: Arc<dyn OrderParser> = Arc::new(HeuristicParser::new());
        Self::with_parsers(budget, fees, heuristic.clone(), heuristic)
    }

    pub fn with_parsers(
        budget: Arc<BudgetGuard>,
        fees: FeePolicy,
        primary: Arc<dyn OrderParser>,
        fallback: Arc<dyn OrderParser>,
    ) -> Self {
        Self {
            budget,
            fees,
            primary,
            fallback,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(BudgetGuard::from_config(&config.budget)),
            FeePolicy::from(&config.fees),
        )
    }

    pub fn budget(&self) -> &Arc<BudgetGuard> {
        &self.budget
    }

    pub fn fees(&self) -> &FeePolicy {
        &self.fees
    }

    /// Charge the phrase against the budget and pick the parser.
    pub fn select_path(&self, text: &str) -> ParsePath {
        if self.budget.try_spend(estimate_cost(text)) {
            ParsePath::Primary
        } else {
            ParsePath::Fallback
        }
    }

    /// Parse free text into a request
    pub fn parse(&self, text: &str) -> std::result::Result<OrderRequest, ParseError> {
        let parser = match self.select_path(text) {
            ParsePath::Primary => &self.primary,
            ParsePath::Fallback => &self.fallback,
        };
        debug!(parser = parser.name(), "Parsing order text");
        parser.parse(text)
    }

    /// Resolve the builder fee for a request
    pub fn price(&self, request: OrderRequest, fee_override: Option<u32>) -> Order {
        self.fees.price_order(request, fee_override)
    }

    pub fn payload(&self, order: &Order) -> OrderPayload {
        order.to_payload(&self.fees.builder_address)
    }

    /// Parse `text` into an exchange payload
    pub fn parse_order(&self, text: &str) -> Result<OrderPayload> {
        let request = self.parse(text)?;
        Ok(self.payload(&self.price(request, None)))
    }

    /// Parse and build the confirmation prompt; nothing is submitted.
    pub fn preview(&self, text: &str) -> Result<(String, Order)> {
        let order = self.price(self.parse(text)?, None);
        let prompt = format_preview(&self.payload(&order))?;
        Ok((prompt, order))
    }

    /// Payload flavour of [`OrderPipeline::preview`]
    pub fn order_preview(&self, text: &str) -> Result<(String, OrderPayload)> {
        let (prompt, order) = self.preview(text)?;
        Ok((prompt, self.payload(&order)))
    }

    /// Confirmation step; the order passes through unchanged.
    pub fn confirm(&self, order: Order) -> Order {
        order
    }

    pub fn confirm_order(&self, payload: OrderPayload) -> OrderPayload {
        payload
    }

    /// Hand a confirmed order to submission unless the breaker is open.
    pub fn submit(&self, order: &Order, breaker: &CircuitBreaker) -> Submission {
        if breaker.is_paused() {
            info!(coin = order.symbol(), "Order held: circuit breaker open");
            return Submission::Paused {
                message: PAUSED_MESSAGE.to_string(),
            };
        }
        Submission::Accepted(self.payload(order))
    }

    /// Parse an upstream voice transcript stored at `path`
    pub fn transcript_to_order(&self, path: impl AsRef<Path>) -> Result<OrderPayload> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read transcript {}", path.display()))?;
        self.parse_order(text.trim())
    }
}

impl std::fmt::Debug for OrderPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderPipeline")
            .field("budget", &self.budget)
            .field("fees", &self.fees)
            .field("primary", &self.primary.name())
            .field("fallback", &self.fallback.name())
            .finish()
    }
}
