use anchor_lang::prelude::*;
use anchor_spl::token_interface::Mint;
use crate::{
    constants::*,
    engine::{AccountFeeRecordStore, FeeRecordStore},
    error::PerformanceFeeError,
    events::ActivatedForFund,
    state::FeeRecord,
    utils::math::calculate_initial_share_price,
};

#[derive(Accounts)]
pub struct ActivateForFund<'info> {
    pub manager: Signer<'info>,

    /// CHECK: Used as PDA seed
    pub fund: UncheckedAccount<'info>,

    #[account(
        mut,
        seeds = [FEE_RECORD_SEED, fund.key().as_ref()],
        bump = fee_record.bump,
        has_one = manager @ PerformanceFeeError::Unauthorized,
        has_one = shares_mint @ PerformanceFeeError::LedgerMismatch
    )]
    pub fee_record: Account<'info, FeeRecord>,

    pub shares_mint: InterfaceAccount<'info, Mint>,
}

pub fn handle_activate_for_fund(ctx: Context<ActivateForFund>, gav: u64) -> Result<()> {
    let fund = ctx.accounts.fund.key();
    let current_time = Clock::get()?.unix_timestamp;
    let initial_price = calculate_initial_share_price(gav as u128, ctx.accounts.shares_mint.supply as u128)?;

    let mut store = AccountFeeRecordStore::new(&mut ctx.accounts.fee_record);
    store.activate(&fund, initial_price, current_time)?;

    emit!(ActivatedForFund {
        fund,
        high_water_mark: initial_price,
        timestamp: current_time,
    });

    Ok(())
}
