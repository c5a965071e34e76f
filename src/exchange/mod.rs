pub mod payload;

pub use payload::{build_order_payload, FeePolicy, MAX_BUILDER_FEE};
