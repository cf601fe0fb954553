#![allow(deprecated)]
#![allow(unexpected_cfgs)]

use anchor_lang::prelude::*;

pub mod constants;
pub mod engine;
pub mod error;
pub mod events;
pub mod instructions;
pub mod state;
pub mod utils;

pub use constants::*;
pub use engine::{PayoutReport, SettlementReport, UpdateReport};
pub use error::*;
pub use events::*;
pub use instructions::*;
pub use state::*;
pub use utils::*;

declare_id!("8kCHVUUtqzLpRLMvdG6ECmBpLb2cBjJWZAYHVn3BcF1Q");

#[program]
pub mod performance_fee {
    use super::*;

    /// Configure rate and payout period for a fund; the fee stays inert until activated
    pub fn add_fund_settings(ctx: Context<AddFundSettings>, params: FeeParams) -> Result<()> {
        instructions::handle_add_fund_settings(ctx, params)
    }

    /// Start accruing, capturing the opening share price as the high-water mark
    pub fn activate_for_fund(ctx: Context<ActivateForFund>, gav: u64) -> Result<()> {
        instructions::handle_activate_for_fund(ctx, gav)
    }

    /// Phase one: compute claim shares to mint or burn for a lifecycle hook
    pub fn settle(ctx: Context<Settle>, hook: FeeHook, gav: u64) -> Result<SettlementReport> {
        instructions::handle_settle(ctx, hook, gav)
    }

    /// Phase two: persist the reference price once the ledger reflects the settlement
    pub fn update(
        ctx: Context<Update>,
        hook: FeeHook,
        gav: u64,
        settlement: SettlementReport,
    ) -> Result<UpdateReport> {
        instructions::handle_update(ctx, hook, gav, settlement)
    }

    pub fn payout_allowed(ctx: Context<PayoutAllowed>) -> Result<bool> {
        instructions::handle_payout_allowed(ctx)
    }

    /// Crystallize the accrued claim and reset the high-water mark
    pub fn payout(ctx: Context<Payout>) -> Result<PayoutReport> {
        instructions::handle_payout(ctx)
    }
}
