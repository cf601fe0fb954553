pub mod add_fund_settings;
pub mod activate_for_fund;
pub mod settle;
pub mod update;
pub mod payout_allowed;
pub mod payout;

pub use add_fund_settings::*;
pub use activate_for_fund::*;
pub use settle::*;
pub use update::*;
pub use payout_allowed::*;
pub use payout::*;
