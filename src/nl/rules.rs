//! Extraction rules
//!
//! Each rule reads the token stream and writes into an [`OrderDraft`]. Rules
//! run in the fixed order of [`ExtractionRule::PIPELINE`]; later rules may
//! overwrite fields set by earlier ones (an explicit `@ price` replaces a
//! positional price).

use rust_decimal::Decimal;

use super::tokenizer::{Token, TokenKind};
use crate::domain::{OrderRequest, Side};
use crate::error::ParseError;

/// Words that are never a ticker
pub const STOPWORDS: [&str; 8] = [
    "with", "at", "market", "leverage", "long", "short", "buy", "sell",
];

/// Keywords that flip the side to SELL
const SELL_WORDS: [&str; 2] = ["sell", "short"];

/// Fields collected so far
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderDraft {
    pub side: Side,
    pub symbol: Option<String>,
    pub size: Option<Decimal>,
    pub price: Option<Decimal>,
    pub leverage: Option<u32>,
    /// First literal that landed in a field but cannot be represented
    pub out_of_range: Option<String>,
}

impl OrderDraft {
    fn reject(&mut self, token: &Token) {
        self.out_of_range.get_or_insert_with(|| token.text.clone());
    }

    /// Validate the draft into a request; `input` is echoed in errors.
    pub fn finish(self, input: &str) -> Result<OrderRequest, ParseError> {
        let Some(symbol) = self.symbol else {
            return Err(ParseError::MissingSymbol {
                input: input.to_string(),
            });
        };
        if let Some(literal) = self.out_of_range {
            return Err(ParseError::InvalidField {
                input: input.to_string(),
                reason: format!("'{literal}' is out of range"),
            });
        }
        let Some(size) = self.size else {
            return Err(ParseError::MissingSize {
                input: input.to_string(),
            });
        };

        OrderRequest::new(symbol, self.side, size, self.price, self.leverage).map_err(|e| {
            ParseError::InvalidField {
                input: input.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionRule {
    /// BUY unless `sell`/`short` appears; sell wins over `buy`/`long`
    Side,
    /// First non-stopword alphabetic token
    Symbol,
    /// First bare number is the size, second the price
    Number,
    /// Number right after `@`/`at` is the price
    PriceOverride,
    /// `<n>x` sets leverage; last one wins
    Leverage,
}

impl ExtractionRule {
    pub const PIPELINE: [ExtractionRule; 5] = [
        ExtractionRule::Side,
        ExtractionRule::Symbol,
        ExtractionRule::Number,
        ExtractionRule::PriceOverride,
        ExtractionRule::Leverage,
    ];

    pub fn apply(&self, tokens: &[Token], draft: &mut OrderDraft) {
        match self {
            ExtractionRule::Side => {
                // No side keyword at all still means BUY.
                let sell = tokens
                    .iter()
                    .any(|t| SELL_WORDS.contains(&t.text.as_str()));
                draft.side = if sell { Side::Sell } else { Side::Buy };
            }
            ExtractionRule::Symbol => {
                draft.symbol = tokens
                    .iter()
                    .find(|t| t.kind == TokenKind::Word && !STOPWORDS.contains(&t.text.as_str()))
                    .map(|t| t.text.to_uppercase());
            }
            ExtractionRule::Number => {
                // An out-of-range literal still occupies its slot.
                let mut size_taken = draft.size.is_some();
                let mut price_taken = draft.price.is_some();
                for t in tokens {
                    let value = match t.kind {
                        TokenKind::Number(n) => Some(n),
                        TokenKind::NumberOutOfRange => None,
                        _ => continue,
                    };
                    if !size_taken {
                        size_taken = true;
                        draft.size = value;
                    } else if !price_taken {
                        price_taken = true;
                        draft.price = value;
                    } else {
                        continue;
                    }
                    if value.is_none() {
                        draft.reject(t);
                    }
                }
            }
            ExtractionRule::PriceOverride => {
                for pair in tokens.windows(2) {
                    if !pair[0].is_price_marker() {
                        continue;
                    }
                    match pair[1].kind {
                        TokenKind::Number(px) => draft.price = Some(px),
                        TokenKind::NumberOutOfRange => draft.reject(&pair[1]),
                        _ => {}
                    }
                }
            }
            ExtractionRule::Leverage => {
                let last = tokens.iter().rev().find(|t| {
                    matches!(
                        t.kind,
                        TokenKind::Leverage(_) | TokenKind::LeverageOutOfRange
                    )
                });
                if let Some(t) = last {
                    match t.kind {
                        TokenKind::Leverage(n) => draft.leverage = Some(n),
                        _ => draft.reject(t),
                    }
                }
            }
        }
    }
}
