//! Natural-language order parsing
//!
//! A deterministic rule engine turning phrases like "Short ETH 2 at 3500" or
//! "Buy 0.5 BTC @30000 3x" into an [`OrderRequest`]. It is not a language
//! model; [`OrderParser`] is the seam where a model-backed parser would plug
//! in.

pub mod rules;
pub mod tokenizer;

pub use rules::{ExtractionRule, OrderDraft, STOPWORDS};
pub use tokenizer::{tokenize, Token, TokenKind};

use tracing::debug;

use crate::domain::OrderRequest;
use crate::error::ParseError;

/// Turns free text into an order request
#[cfg_attr(test, mockall::automock)]
pub trait OrderParser: Send + Sync {
    fn name(&self) -> &'static str;

    fn parse(&self, text: &str) -> Result<OrderRequest, ParseError>;
}

/// Keyword/pattern parser
#[derive(Debug, Clone)]
pub struct HeuristicParser {
    rules: Vec<ExtractionRule>,
}

impl Default for HeuristicParser {
    fn default() -> Self {
        Self {
            rules: ExtractionRule::PIPELINE.to_vec(),
        }
    }
}

impl HeuristicParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the rules and return the raw draft without validation
    pub fn draft(&self, text: &str) -> OrderDraft {
        let tokens = tokenize(text);
        let mut draft = OrderDraft::default();
        for rule in &self.rules {
            rule.apply(&tokens, &mut draft);
        }
        draft
    }
}

impl OrderParser for HeuristicParser {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn parse(&self, text: &str) -> Result<OrderRequest, ParseError> {
        let draft = self.draft(text);
        debug!(?draft, "heuristic parse");
        draft.finish(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Side;
    use rust_decimal_macros::dec;

    #[test]
    fn test_limit_order_with_leverage() {
        let req = HeuristicParser::new().parse("Buy 0.5 BTC @30000 3x").unwrap();
        assert_eq!(req.symbol(), "BTC");
        assert_eq!(req.side(), Side::Buy);
        assert_eq!(req.size(), dec!(0.5));
        assert_eq!(req.price(), Some(dec!(30000)));
        assert_eq!(req.leverage(), Some(3));
    }

    #[test]
    fn test_market_order() {
        let req = HeuristicParser::new().parse("Long BTC 0.1 at market").unwrap();
        assert_eq!(req.size(), dec!(0.1));
        assert!(req.is_market());
    }

    #[test]
    fn test_no_number_fails() {
        let err = HeuristicParser::new().parse("Buy some BTC").unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingSize {
                input: "Buy some BTC".to_string()
            }
        );
    }

    #[test]
    fn test_no_symbol_fails() {
        let err = HeuristicParser::new().parse("buy 5 @ 10").unwrap_err();
        assert!(matches!(err, ParseError::MissingSymbol { .. }));
    }

    #[test]
    fn test_zero_leverage_is_rejected() {
        let err = HeuristicParser::new().parse("long eth 1 0x").unwrap_err();
        assert!(matches!(err, ParseError::InvalidField { .. }));
        assert!(err.to_string().contains("leverage"));
    }
}
