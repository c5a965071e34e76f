pub mod command;
pub mod order;

pub use command::*;
pub use order::*;
