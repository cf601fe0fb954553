pub mod calculator;
pub mod cycle;
pub mod payout;
pub mod settlement;
pub mod store;

pub use calculator::*;
pub use cycle::*;
pub use payout::*;
pub use settlement::*;
pub use store::*;
