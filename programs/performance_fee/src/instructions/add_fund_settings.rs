use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_interface::{Mint, TokenAccount, TokenInterface},
};
use crate::{
    constants::*,
    engine::{AccountFeeRecordStore, FeeRecordStore},
    events::FundSettingsAdded,
    state::{FeeParams, FeeRecord},
};

#[derive(Accounts)]
pub struct AddFundSettings<'info> {
    /// Fund manager, recorded as the fee authority
    pub manager: Signer<'info>,

    /// Payer for account creation
    #[account(mut)]
    pub payer: Signer<'info>,

    /// Fund identifier
    /// CHECK: Used as PDA seed
    pub fund: UncheckedAccount<'info>,

    /// Share ledger the claim shares will be issued on
    pub shares_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Fee record for this fund
    #[account(
        init,
        seeds = [FEE_RECORD_SEED, fund.key().as_ref()],
        bump,
        payer = payer,
        space = 8 + FeeRecord::INIT_SPACE
    )]
    pub fee_record: Account<'info, FeeRecord>,

    /// Canonical claim share account, owned by the fee record
    #[account(
        init,
        payer = payer,
        associated_token::mint = shares_mint,
        associated_token::authority = fee_record,
        associated_token::token_program = token_program
    )]
    pub claim_shares: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

pub fn handle_add_fund_settings(ctx: Context<AddFundSettings>, params: FeeParams) -> Result<()> {
    let fund = ctx.accounts.fund.key();
    let manager = ctx.accounts.manager.key();
    let shares_mint = ctx.accounts.shares_mint.key();
    let current_time = Clock::get()?.unix_timestamp;

    ctx.accounts.fee_record.bump = ctx.bumps.fee_record;

    let mut store = AccountFeeRecordStore::new(&mut ctx.accounts.fee_record);
    let record = store.create(fund, &params)?;
    record.manager = manager;
    record.shares_mint = shares_mint;
    record.created_at = current_time;

    emit!(FundSettingsAdded {
        fund,
        manager,
        shares_mint,
        claim_shares: ctx.accounts.claim_shares.key(),
        rate: params.rate,
        period: params.period,
        timestamp: current_time,
    });

    Ok(())
}
