use anchor_lang::prelude::*;
use crate::{
    constants::*,
    engine::{AccountFeeRecordStore, PayoutController},
    state::FeeRecord,
};

#[derive(Accounts)]
pub struct PayoutAllowed<'info> {
    /// CHECK: Used as PDA seed
    pub fund: UncheckedAccount<'info>,

    #[account(
        seeds = [FEE_RECORD_SEED, fund.key().as_ref()],
        bump = fee_record.bump
    )]
    pub fee_record: Account<'info, FeeRecord>,
}

pub fn handle_payout_allowed(ctx: Context<PayoutAllowed>) -> Result<bool> {
    let fund = ctx.accounts.fund.key();
    let mut record = ctx.accounts.fee_record.clone().into_inner();
    let mut store = AccountFeeRecordStore::new(&mut record);
    PayoutController::new(&mut store).payout_allowed(&fund, Clock::get()?.unix_timestamp)
}
