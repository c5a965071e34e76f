//! Budget guard accept/reject behaviour and its effect on parse path choice.

use hlbot::{BudgetGuard, FeePolicy, OrderPipeline, ParsePath};
use rust_decimal_macros::dec;
use std::sync::Arc;

/// Spending in fixed steps until the cap: the over-cap call is refused and
/// leaves `spent` where it was.
#[test]
fn over_cap_call_is_refused_without_charge() {
    let guard = BudgetGuard::new(dec!(10));
    let cost = dec!(3);

    let mut accepted = 0;
    loop {
        let before = guard.spent();
        if !guard.try_spend(cost) {
            assert_eq!(guard.spent(), before);
            assert!(before + cost > guard.monthly_budget());
            break;
        }
        accepted += 1;
    }

    assert_eq!(accepted, 3);
    assert_eq!(guard.spent(), dec!(9));
    assert!(guard.spent() <= guard.monthly_budget());
}

#[test]
fn exact_fit_is_accepted() {
    let guard = BudgetGuard::new(dec!(1.5));
    assert!(guard.try_spend(dec!(1.5)));
    assert!(!guard.try_spend(dec!(0.01)));
}

/// A long phrase over budget falls back but still parses.
#[test]
fn long_phrase_falls_back() {
    let guard = Arc::new(BudgetGuard::new(dec!(1)));
    let pipeline = OrderPipeline::new(guard.clone(), FeePolicy::default());

    let text = format!("Buy 1 BTC{}", " really".repeat(100));
    assert_eq!(pipeline.select_path(&text), ParsePath::Fallback);

    let payload = pipeline.parse_order(&text).unwrap();
    assert_eq!(payload.coin, "BTC");
    assert_eq!(guard.spent(), dec!(0));
}

/// The guard is shared: spend from one pipeline is visible to another.
#[test]
fn guard_shared_between_pipelines() {
    let guard = Arc::new(BudgetGuard::new(dec!(5)));
    let a = OrderPipeline::new(guard.clone(), FeePolicy::default());
    let b = OrderPipeline::new(guard.clone(), FeePolicy::default());

    assert_eq!(a.select_path("Long BNB 4"), ParsePath::Primary);
    assert_eq!(b.select_path("Long BNB 4"), ParsePath::Fallback);
    assert_eq!(guard.spent(), dec!(3));
}
