pub mod bracket;
pub mod engine;
pub mod payout;
pub mod rank;
pub mod resolver;
pub mod session;
pub mod types;
