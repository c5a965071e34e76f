//! Order payload construction and builder-fee policy
//!
//! Builder codes let the routing builder collect a fee on each order once the
//! user has approved it. Fees are expressed in tenths of a basis point
//! (`f = 10` is 1 bp); the exchange caps perp builder fees at 0.1 %.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::FeeConfig;
use crate::domain::{Order, OrderPayload, OrderRequest};

/// Highest builder fee the exchange accepts on perps, in tenths of a bp
pub const MAX_BUILDER_FEE: u32 = 100;

/// Builder-fee resolution rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePolicy {
    /// Fee used when no override is given
    pub default_fee: u32,
    /// Launch promotion switch; forces the fee to zero
    pub launch_zero_fee: bool,
    /// Promotion end; the fee is zero while `now < zero_fee_until`
    pub zero_fee_until: Option<DateTime<Utc>>,
    /// Address receiving builder fees
    pub builder_address: String,
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            default_fee: 5,
            launch_zero_fee: false,
            zero_fee_until: None,
            builder_address: "0xbuilder".to_string(),
        }
    }
}

impl From<&FeeConfig> for FeePolicy {
    fn from(cfg: &FeeConfig) -> Self {
        Self {
            default_fee: cfg.builder_fee_default,
            launch_zero_fee: cfg.launch_zero_fee,
            zero_fee_until: cfg.zero_fee_until,
            builder_address: cfg.builder_address.clone(),
        }
    }
}

impl FeePolicy {
    /// Whether the zero-fee launch window is in effect at `now`
    pub fn zero_fee_active_at(&self, now: DateTime<Utc>) -> bool {
        self.launch_zero_fee || self.zero_fee_until.is_some_and(|until| now < until)
    }

    /// Resolve the fee: zero-fee window, then explicit override, then default.
    pub fn resolve_fee_at(&self, fee_override: Option<u32>, now: DateTime<Utc>) -> u32 {
        if self.zero_fee_active_at(now) {
            return 0;
        }
        fee_override.unwrap_or(self.default_fee)
    }

    pub fn resolve_fee(&self, fee_override: Option<u32>) -> u32 {
        self.resolve_fee_at(fee_override, Utc::now())
    }

    /// Attach the resolved fee to a parsed request
    pub fn price_order(&self, request: OrderRequest, fee_override: Option<u32>) -> Order {
        let fee = self.resolve_fee(fee_override);
        request.with_builder_fee(fee)
    }
}

/// Build the exchange payload for a request under `policy`.
pub fn build_order_payload(
    request: &OrderRequest,
    fee_override: Option<u32>,
    policy: &FeePolicy,
) -> OrderPayload {
    policy
        .price_order(request.clone(), fee_override)
        .to_payload(&policy.builder_address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Side;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn eth_market() -> OrderRequest {
        OrderRequest::new("ETH", Side::Buy, dec!(1.5), None, None).unwrap()
    }

    #[test]
    fn test_default_fee() {
        let policy = FeePolicy::default();
        let payload = build_order_payload(&eth_market(), None, &policy);
        assert_eq!(payload.f, 5);
        assert_eq!(payload.zero_fee, None);
        assert_eq!(payload.b, "0xbuilder");
    }

    #[test]
    fn test_override_beats_default() {
        let policy = FeePolicy {
            default_fee: 5,
            ..Default::default()
        };
        let req = OrderRequest::new("BTC", Side::Sell, dec!(0.25), Some(dec!(30000)), Some(3)).unwrap();
        let payload = build_order_payload(&req, Some(8), &policy);
        assert_eq!(payload.f, 8);
        assert!(!payload.is_buy);
        assert_eq!(payload.limit_px.as_deref(), Some("30000.0"));
        assert_eq!(payload.leverage, Some(3));
    }

    #[test]
    fn test_zero_fee_flag_beats_override() {
        let policy = FeePolicy {
            launch_zero_fee: true,
            ..Default::default()
        };
        let payload = build_order_payload(&eth_market(), Some(7), &policy);
        assert_eq!(payload.f, 0);
        assert_eq!(payload.zero_fee, Some(true));
    }

    #[test]
    fn test_zero_fee_until_window() {
        let now = Utc::now();
        let policy = FeePolicy {
            zero_fee_until: Some(now + Duration::days(1)),
            ..Default::default()
        };
        assert!(policy.zero_fee_active_at(now));
        assert_eq!(policy.resolve_fee_at(Some(9), now), 0);

        let later = now + Duration::days(2);
        assert!(!policy.zero_fee_active_at(later));
        assert_eq!(policy.resolve_fee_at(Some(9), later), 9);
        assert_eq!(policy.resolve_fee_at(None, later), 5);
    }

    #[test]
    fn test_explicit_zero_override_is_promotional() {
        let policy = FeePolicy::default();
        let payload = build_order_payload(&eth_market(), Some(0), &policy);
        assert_eq!(payload.f, 0);
        assert_eq!(payload.zero_fee, Some(true));
    }

    #[test]
    fn test_builder_address_lowercased() {
        let policy = FeePolicy {
            builder_address: "0xABCdef".to_string(),
            ..Default::default()
        };
        let payload = build_order_payload(&eth_market(), None, &policy);
        assert_eq!(payload.b, "0xabcdef");
    }
}
