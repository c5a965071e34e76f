use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::OrderError;

/// Order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    #[default]
    Buy,
    Sell,
}

impl Side {
    pub fn is_buy(&self) -> bool {
        matches!(self, Side::Buy)
    }

    /// Lower-case command word (`buy` / `sell`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Order request (what the user asked for, before fees are resolved)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    symbol: String,
    side: Side,
    size: Decimal,
    price: Option<Decimal>,
    leverage: Option<u32>,
}

impl OrderRequest {
    /// Build a request, enforcing the order invariants.
    ///
    /// The symbol is uppercased; `price == None` means a market order.
    pub fn new(
        symbol: impl AsRef<str>,
        side: Side,
        size: Decimal,
        price: Option<Decimal>,
        leverage: Option<u32>,
    ) -> Result<Self, OrderError> {
        let symbol = symbol.as_ref().trim().to_uppercase();
        if symbol.is_empty() {
            return Err(OrderError::EmptySymbol);
        }
        if size <= Decimal::ZERO {
            return Err(OrderError::NonPositiveSize(size));
        }
        if let Some(px) = price {
            if px <= Decimal::ZERO {
                return Err(OrderError::NonPositivePrice(px));
            }
        }
        if let Some(lev) = leverage {
            if lev < 1 {
                return Err(OrderError::LeverageBelowOne(lev));
            }
        }

        Ok(Self {
            symbol,
            side,
            size,
            price,
            leverage,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn size(&self) -> Decimal {
        self.size
    }

    pub fn price(&self) -> Option<Decimal> {
        self.price
    }

    pub fn leverage(&self) -> Option<u32> {
        self.leverage
    }

    pub fn is_market(&self) -> bool {
        self.price.is_none()
    }

    /// Attach a resolved builder fee
    pub fn with_builder_fee(self, builder_fee: u32) -> Order {
        Order {
            request: self,
            builder_fee,
        }
    }
}

/// Order with its builder fee resolved; ready to serialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    request: OrderRequest,
    /// Builder fee in tenths of a basis point (10 = 1 bp)
    builder_fee: u32,
}

impl Order {
    pub fn request(&self) -> &OrderRequest {
        &self.request
    }

    pub fn symbol(&self) -> &str {
        self.request.symbol()
    }

    pub fn side(&self) -> Side {
        self.request.side()
    }

    pub fn size(&self) -> Decimal {
        self.request.size()
    }

    pub fn price(&self) -> Option<Decimal> {
        self.request.price()
    }

    pub fn leverage(&self) -> Option<u32> {
        self.request.leverage()
    }

    pub fn builder_fee(&self) -> u32 {
        self.builder_fee
    }

    /// Convert to the exchange wire payload.
    pub fn to_payload(&self, builder_address: &str) -> OrderPayload {
        OrderPayload {
            kind: "order".to_string(),
            coin: self.symbol().to_string(),
            is_buy: self.side().is_buy(),
            sz: wire_decimal(self.size()),
            b: builder_address.to_lowercase(),
            f: self.builder_fee,
            // Zero fee marks the promotional mode
            zero_fee: (self.builder_fee == 0).then_some(true),
            limit_px: self.price().map(wire_decimal),
            leverage: self.leverage(),
        }
    }
}

/// Exchange order payload.
///
/// Field names are fixed by the downstream exchange contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub coin: String,
    pub is_buy: bool,
    /// Size as a decimal string
    pub sz: String,
    /// Builder address (lower-case)
    pub b: String,
    /// Builder fee, tenths of a basis point
    pub f: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zero_fee: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_px: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leverage: Option<u32>,
}

impl OrderPayload {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Render a decimal for the wire: trailing zeros stripped, integral values
/// keep one fractional digit (`2` -> `2.0`, `0.10` -> `0.1`).
pub fn wire_decimal(value: Decimal) -> String {
    let value = value.normalize();
    if value.scale() == 0 {
        format!("{value}.0")
    } else {
        value.to_string()
    }
}
