//! Positional `/buy` and `/sell` order entry
//!
//! `/buy ETH 1.5 3000 5` is a limit buy of 1.5 ETH at 3000 with 5x leverage.
//! Price and leverage are optional; without a price the order is a market
//! order.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::{OrderRequest, Side};
use crate::error::{CommandError, OrderError};

/// Parse a slash command's text (including the leading `/buy` or `/sell`).
pub fn parse_trade_command(side: Side, text: &str) -> Result<OrderRequest, CommandError> {
    let args: Vec<&str> = text.split_whitespace().collect();
    // args[0] is the command itself
    if args.len() < 3 {
        return Err(CommandError::Usage {
            side: side.as_str().to_string(),
        });
    }

    let symbol = args[1];
    let size = Decimal::from_str(args[2]).map_err(|_| CommandError::InvalidSize)?;
    let price = args
        .get(3)
        .map(|raw| Decimal::from_str(raw).map_err(|_| CommandError::InvalidPrice))
        .transpose()?;
    let leverage = args
        .get(4)
        .map(|raw| raw.parse::<u32>().map_err(|_| CommandError::InvalidLeverage))
        .transpose()?;

    OrderRequest::new(symbol, side, size, price, leverage).map_err(|e| match e {
        OrderError::EmptySymbol => CommandError::Usage {
            side: side.as_str().to_string(),
        },
        OrderError::NonPositiveSize(_) => CommandError::InvalidSize,
        OrderError::NonPositivePrice(_) => CommandError::InvalidPrice,
        OrderError::LeverageBelowOne(_) => CommandError::InvalidLeverage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_full_limit_command() {
        let req = parse_trade_command(Side::Buy, "/buy eth 1.5 3000 5").unwrap();
        assert_eq!(req.symbol(), "ETH");
        assert_eq!(req.side(), Side::Buy);
        assert_eq!(req.size(), dec!(1.5));
        assert_eq!(req.price(), Some(dec!(3000)));
        assert_eq!(req.leverage(), Some(5));
    }

    #[test]
    fn test_market_command() {
        let req = parse_trade_command(Side::Sell, "/sell BTC 0.25").unwrap();
        assert_eq!(req.side(), Side::Sell);
        assert!(req.is_market());
        assert_eq!(req.leverage(), None);
    }

    #[test]
    fn test_usage_when_args_missing() {
        assert_eq!(
            parse_trade_command(Side::Sell, "/sell BTC"),
            Err(CommandError::Usage {
                side: "sell".to_string()
            })
        );
    }

    #[test]
    fn test_invalid_fields() {
        assert_eq!(
            parse_trade_command(Side::Buy, "/buy BTC lots"),
            Err(CommandError::InvalidSize)
        );
        assert_eq!(
            parse_trade_command(Side::Buy, "/buy BTC 0"),
            Err(CommandError::InvalidSize)
        );
        assert_eq!(
            parse_trade_command(Side::Buy, "/buy BTC 1 cheap"),
            Err(CommandError::InvalidPrice)
        );
        assert_eq!(
            parse_trade_command(Side::Buy, "/buy BTC 1 30000 2.5"),
            Err(CommandError::InvalidLeverage)
        );
        assert_eq!(
            parse_trade_command(Side::Buy, "/buy BTC 1 30000 0"),
            Err(CommandError::InvalidLeverage)
        );
    }
}
