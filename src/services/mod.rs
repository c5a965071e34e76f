pub mod pipeline;

pub use pipeline::{
    estimate_cost, format_preview, OrderPipeline, ParsePath, Submission, PAUSED_MESSAGE,
};
