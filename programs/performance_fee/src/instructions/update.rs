use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use crate::{
    constants::*,
    engine::{AccountFeeRecordStore, LedgerTotals, SettlementController, SettlementReport, UpdateReport},
    error::PerformanceFeeError,
    events::LastSharePriceUpdated,
    state::{FeeHook, FeeRecord},
};

#[derive(Accounts)]
pub struct Update<'info> {
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

    /// Share ledger after the settle mint/burn has been applied
    pub shares_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        associated_token::mint = shares_mint,
        associated_token::authority = fee_record,
        associated_token::token_program = token_program
    )]
    pub claim_shares: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn handle_update(
    ctx: Context<Update>,
    hook: FeeHook,
    gav: u64,
    settlement: SettlementReport,
) -> Result<UpdateReport> {
    let fund = ctx.accounts.fund.key();
    let totals = LedgerTotals {
        total_share_supply: ctx.accounts.shares_mint.supply as u128,
        claim_shares_outstanding: ctx.accounts.claim_shares.amount as u128,
    };

    let mut store = AccountFeeRecordStore::new(&mut ctx.accounts.fee_record);
    let report = SettlementController::new(&mut store).update(
        &fund,
        hook,
        gav as u128,
        totals,
        &settlement,
    )?;

    if report.updated {
        emit!(LastSharePriceUpdated {
            fund,
            hook,
            prev_share_price: report.prev_share_price,
            next_share_price: report.next_share_price,
            aggregate_value_due: report.next_aggregate_value_due,
            timestamp: Clock::get()?.unix_timestamp,
        });
    }

    Ok(report)
}
