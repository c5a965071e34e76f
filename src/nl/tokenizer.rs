//! Phrase normalization and token classification

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::OnceLock;

/// What a token can contribute to an order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Alphabetic, optionally `-perp` suffixed (`btc`, `dog-perp`)
    Word,
    /// Plain decimal number (`2`, `0.25`)
    Number(Decimal),
    /// `<digits>x` leverage marker (`5x`)
    Leverage(u32),
    /// Number-shaped but too large for `Decimal`
    NumberOutOfRange,
    /// Leverage-shaped but too large for `u32`
    LeverageOutOfRange,
    /// Anything else (`@`, `@30000x`, punctuation)
    Other,
}

/// A lower-cased token with its classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
}

impl Token {
    /// Standalone `@` or `at`, introducing an explicit price
    pub fn is_price_marker(&self) -> bool {
        self.text == "@" || self.text == "at"
    }
}

#[allow(clippy::expect_used)] // patterns are constants
fn patterns() -> &'static (Regex, Regex, Regex) {
    static PATTERNS: OnceLock<(Regex, Regex, Regex)> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        (
            Regex::new(r"^[a-z]+(?:-perp)?$").expect("word regex is valid"),
            Regex::new(r"^[0-9]+(?:\.[0-9]+)?$").expect("number regex is valid"),
            Regex::new(r"^([0-9]+)x$").expect("leverage regex is valid"),
        )
    })
}

fn classify(text: &str) -> TokenKind {
    let (word, number, leverage) = patterns();

    if word.is_match(text) {
        return TokenKind::Word;
    }
    if number.is_match(text) {
        return Decimal::from_str(text)
            .map(TokenKind::Number)
            .unwrap_or(TokenKind::NumberOutOfRange);
    }
    if let Some(caps) = leverage.captures(text) {
        return caps
            .get(1)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .map(TokenKind::Leverage)
            .unwrap_or(TokenKind::LeverageOutOfRange);
    }
    TokenKind::Other
}

/// Split a phrase into classified tokens.
///
/// `@` is padded with spaces first so `@30000` yields `@` and `30000`.
pub fn tokenize(text: &str) -> Vec<Token> {
    text.replace('@', " @ ")
        .to_lowercase()
        .split_whitespace()
        .map(|raw| Token {
            text: raw.to_string(),
            kind: classify(raw),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_at_sign_is_split_out() {
        let tokens = tokenize("Buy 1.2 LTC @100");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["buy", "1.2", "ltc", "@", "100"]);
        assert!(tokens[3].is_price_marker());
    }

    #[test]
    fn test_classification() {
        assert_eq!(
            kinds("DOG-PERP 3 5x @ 0.07 btc/usd"),
            vec![
                TokenKind::Word,
                TokenKind::Number(dec!(3)),
                TokenKind::Leverage(5),
                TokenKind::Other,
                TokenKind::Number(dec!(0.07)),
                TokenKind::Other,
            ]
        );
    }

    #[test]
    fn test_malformed_numbers_are_other() {
        assert_eq!(kinds("1. .5 1,000 -2"), vec![TokenKind::Other; 4]);
    }

    #[test]
    fn test_oversized_literals_keep_their_shape() {
        assert_eq!(
            kinds("99999999999999999999999999999999 99999999999x 7"),
            vec![
                TokenKind::NumberOutOfRange,
                TokenKind::LeverageOutOfRange,
                TokenKind::Number(dec!(7)),
            ]
        );
    }
}
