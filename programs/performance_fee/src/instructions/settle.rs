use anchor_lang::prelude::*;
use anchor_spl::token_interface::{burn, Burn, Mint, TokenAccount, TokenInterface};
use crate::{
    constants::*,
    engine::{AccountFeeRecordStore, LedgerTotals, SettlementController, SettlementReport},
    error::PerformanceFeeError,
    events::PerformanceSettled,
    state::{FeeHook, FeeRecord, SettlementType},
};

#[derive(Accounts)]
pub struct Settle<'info> {
    pub manager: Signer<'info>,

    /// CHECK: Used as PDA seed
    pub fund: UncheckedAccount<'info>,

    #[account(
        seeds = [FEE_RECORD_SEED, fund.key().as_ref()],
        bump = fee_record.bump,
        has_one = manager @ PerformanceFeeError::Unauthorized,
        has_one = shares_mint @ PerformanceFeeError::LedgerMismatch
    )]
    pub fee_record: Account<'info, FeeRecord>,

    /// Share ledger of the fund
    #[account(mut)]
    pub shares_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Claim shares held for this fee
    #[account(
        mut,
        associated_token::mint = shares_mint,
        associated_token::authority = fee_record,
        associated_token::token_program = token_program
    )]
    pub claim_shares: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

/// Report the claim shares to mint or burn; the fee record is left untouched.
///
/// Burns are applied here under the fee record's signature. Mints are left to
/// the fund program, which holds the mint authority.
pub fn handle_settle(ctx: Context<Settle>, hook: FeeHook, gav: u64) -> Result<SettlementReport> {
    let fund = ctx.accounts.fund.key();
    let totals = LedgerTotals {
        total_share_supply: ctx.accounts.shares_mint.supply as u128,
        claim_shares_outstanding: ctx.accounts.claim_shares.amount as u128,
    };

    let mut record = ctx.accounts.fee_record.clone().into_inner();
    let mut store = AccountFeeRecordStore::new(&mut record);
    let report = SettlementController::new(&mut store).settle(&fund, hook, gav as u128, totals)?;

    if report.settlement_type == SettlementType::BurnClaimShares && report.shares_due > 0 {
        let amount = u64::try_from(report.shares_due)
            .map_err(|_| PerformanceFeeError::ArithmeticOverflow)?;
        let seeds = ctx.accounts.fee_record.seeds();
        let signer_seeds = &[&seeds[..]];

        burn(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Burn {
                    mint: ctx.accounts.shares_mint.to_account_info(),
                    from: ctx.accounts.claim_shares.to_account_info(),
                    authority: ctx.accounts.fee_record.to_account_info(),
                },
                signer_seeds,
            ),
            amount,
        )?;
    }

    if report.settlement_type != SettlementType::None {
        emit!(PerformanceSettled {
            fund,
            hook,
            settlement_type: report.settlement_type,
            shares_due: report.shares_due,
            prev_aggregate_value_due: report.prev_aggregate_value_due,
            next_aggregate_value_due: report.next_aggregate_value_due,
            timestamp: Clock::get()?.unix_timestamp,
        });
    }

    Ok(report)
}
