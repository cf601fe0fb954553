use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked,
    Mint,
    TokenAccount,
    TokenInterface,
    TransferChecked,
};
use crate::{
    constants::*,
    engine::{AccountFeeRecordStore, PayoutController, PayoutReport},
    error::PerformanceFeeError,
    events::PaidOut,
    state::FeeRecord,
};

#[derive(Accounts)]
pub struct Payout<'info> {
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

    pub shares_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Claim shares released to the manager by this call
    #[account(
        mut,
        associated_token::mint = shares_mint,
        associated_token::authority = fee_record,
        associated_token::token_program = token_program
    )]
    pub claim_shares: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Manager's share account receiving the crystallized claim
    #[account(
        mut,
        token::mint = shares_mint,
        token::authority = manager,
        token::token_program = token_program
    )]
    pub manager_shares: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn handle_payout(ctx: Context<Payout>) -> Result<PayoutReport> {
    let fund = ctx.accounts.fund.key();
    let current_time = Clock::get()?.unix_timestamp;
    let claim_shares = ctx.accounts.claim_shares.amount;

    let mut store = AccountFeeRecordStore::new(&mut ctx.accounts.fee_record);
    let report = PayoutController::new(&mut store).payout(&fund, current_time)?;

    if claim_shares > 0 {
        let seeds = ctx.accounts.fee_record.seeds();
        let signer_seeds = &[&seeds[..]];

        transfer_checked(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                TransferChecked {
                    from: ctx.accounts.claim_shares.to_account_info(),
                    mint: ctx.accounts.shares_mint.to_account_info(),
                    to: ctx.accounts.manager_shares.to_account_info(),
                    authority: ctx.accounts.fee_record.to_account_info(),
                },
                signer_seeds,
            ),
            claim_shares,
            ctx.accounts.shares_mint.decimals,
        )?;
    }

    emit!(PaidOut {
        fund,
        prev_high_water_mark: report.prev_high_water_mark,
        next_high_water_mark: report.next_high_water_mark,
        value_realized: report.value_realized,
        claim_shares,
        timestamp: current_time,
    });

    Ok(report)
}
