//! Off-chain orchestration of a full settle, mint/burn, update cycle.
//!
//! On-chain the fund program performs these steps itself around the
//! `settle` and `update` instructions; this module plays that role for
//! simulations and tests.

use std::collections::BTreeMap;

use anchor_lang::prelude::*;
use crate::engine::calculator::{LedgerTotals, SupplyBasis};
use crate::engine::payout::{PayoutController, PayoutReport};
use crate::engine::settlement::{SettlementController, SettlementReport, UpdateReport};
use crate::engine::store::FeeRecordStore;
use crate::error::PerformanceFeeError;
use crate::state::{FeeHook, SettlementType};
use crate::utils::math::*;

/// Source of a fund's gross asset value
pub trait ValuationOracle {
    fn gav(&self, fund: &Pubkey) -> Result<u128>;
}

/// Share ledger holding investor shares and the engine's claim shares
pub trait ShareLedger {
    fn total_supply(&self, fund: &Pubkey) -> Result<u128>;

    fn claim_balance(&self, fund: &Pubkey) -> Result<u128>;

    fn mint_claim(&mut self, fund: &Pubkey, shares: u128) -> Result<()>;

    fn burn_claim(&mut self, fund: &Pubkey, shares: u128) -> Result<()>;

    /// Hand claim shares to the manager as ordinary shares after a payout
    fn release_claim(&mut self, fund: &Pubkey, shares: u128) -> Result<()>;

    fn totals(&self, fund: &Pubkey) -> Result<LedgerTotals> {
        Ok(LedgerTotals {
            total_share_supply: self.total_supply(fund)?,
            claim_shares_outstanding: self.claim_balance(fund)?,
        })
    }
}

/// Fixed GAV per fund, set by the caller
#[derive(Clone, Debug, Default)]
pub struct FixedValuation {
    gav: BTreeMap<Pubkey, u128>,
}

impl FixedValuation {
    pub fn set_gav(&mut self, fund: Pubkey, gav: u128) {
        self.gav.insert(fund, gav);
    }
}

impl ValuationOracle for FixedValuation {
    fn gav(&self, fund: &Pubkey) -> Result<u128> {
        Ok(self.gav.get(fund).copied().unwrap_or_default())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FundShares {
    pub holder_shares: u128,
    pub claim_shares: u128,
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryShareLedger {
    funds: BTreeMap<Pubkey, FundShares>,
}

impl InMemoryShareLedger {
    pub fn shares(&self, fund: &Pubkey) -> FundShares {
        self.funds.get(fund).copied().unwrap_or_default()
    }

    pub fn issue(&mut self, fund: &Pubkey, shares: u128) -> Result<()> {
        let entry = self.funds.entry(*fund).or_default();
        entry.holder_shares = entry
            .holder_shares
            .checked_add(shares)
            .ok_or(PerformanceFeeError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn redeem(&mut self, fund: &Pubkey, shares: u128) -> Result<()> {
        let entry = self.funds.entry(*fund).or_default();
        entry.holder_shares = entry
            .holder_shares
            .checked_sub(shares)
            .ok_or(PerformanceFeeError::ArithmeticOverflow)?;
        Ok(())
    }
}

impl ShareLedger for InMemoryShareLedger {
    fn total_supply(&self, fund: &Pubkey) -> Result<u128> {
        let shares = self.shares(fund);
        shares
            .holder_shares
            .checked_add(shares.claim_shares)
            .ok_or(PerformanceFeeError::ArithmeticOverflow.into())
    }

    fn claim_balance(&self, fund: &Pubkey) -> Result<u128> {
        Ok(self.shares(fund).claim_shares)
    }

    fn mint_claim(&mut self, fund: &Pubkey, shares: u128) -> Result<()> {
        let entry = self.funds.entry(*fund).or_default();
        entry.claim_shares = entry
            .claim_shares
            .checked_add(shares)
            .ok_or(PerformanceFeeError::ArithmeticOverflow)?;
        Ok(())
    }

    fn burn_claim(&mut self, fund: &Pubkey, shares: u128) -> Result<()> {
        let entry = self.funds.entry(*fund).or_default();
        entry.claim_shares = entry
            .claim_shares
            .checked_sub(shares)
            .ok_or(PerformanceFeeError::ArithmeticOverflow)?;
        Ok(())
    }

    fn release_claim(&mut self, fund: &Pubkey, shares: u128) -> Result<()> {
        self.burn_claim(fund, shares)?;
        self.issue(fund, shares)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleOutcome {
    pub settlement: SettlementReport,
    pub update: UpdateReport,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PayoutOutcome {
    pub report: PayoutReport,
    pub claim_shares_released: u128,
}

/// Store, ledger and valuation driven together through the hook protocol
#[derive(Clone, Debug, Default)]
pub struct SettlementCycle<S, L, O> {
    pub store: S,
    pub ledger: L,
    pub oracle: O,
    pub supply_basis: SupplyBasis,
}

impl<S: FeeRecordStore, L: ShareLedger, O: ValuationOracle> SettlementCycle<S, L, O> {
    pub fn new(store: S, ledger: L, oracle: O) -> Self {
        Self {
            store,
            ledger,
            oracle,
            supply_basis: SupplyBasis::default(),
        }
    }

    /// Current per-share value straight from the ledger and oracle
    pub fn share_price(&self, fund: &Pubkey) -> Result<u128> {
        calculate_share_price(self.oracle.gav(fund)?, self.ledger.total_supply(fund)?)
    }

    /// Activate the fee at the fund's current share price
    pub fn activate(&mut self, fund: &Pubkey, now: i64) -> Result<u128> {
        let initial_price = self.share_price(fund)?;
        self.store.activate(fund, initial_price, now)?;
        Ok(initial_price)
    }

    pub fn settle(&mut self, fund: &Pubkey, hook: FeeHook) -> Result<SettlementReport> {
        let gav = self.oracle.gav(fund)?;
        let totals = self.ledger.totals(fund)?;
        let report = SettlementController::with_supply_basis(&mut self.store, self.supply_basis)
            .settle(fund, hook, gav, totals)?;

        match report.settlement_type {
            SettlementType::MintClaimShares => self.ledger.mint_claim(fund, report.shares_due)?,
            SettlementType::BurnClaimShares => self.ledger.burn_claim(fund, report.shares_due)?,
            SettlementType::None => {}
        }
        Ok(report)
    }

    pub fn update(
        &mut self,
        fund: &Pubkey,
        hook: FeeHook,
        settled: &SettlementReport,
    ) -> Result<UpdateReport> {
        let gav = self.oracle.gav(fund)?;
        let totals = self.ledger.totals(fund)?;
        SettlementController::with_supply_basis(&mut self.store, self.supply_basis)
            .update(fund, hook, gav, totals, settled)
    }

    /// Settle and update on the same hook with no other ledger effects in between
    pub fn run(&mut self, fund: &Pubkey, hook: FeeHook) -> Result<CycleOutcome> {
        let settlement = self.settle(fund, hook)?;
        let update = self.update(fund, hook, &settlement)?;
        Ok(CycleOutcome { settlement, update })
    }

    pub fn continuous(&mut self, fund: &Pubkey) -> Result<CycleOutcome> {
        self.run(fund, FeeHook::Continuous)
    }

    pub fn payout(&mut self, fund: &Pubkey, now: i64) -> Result<PayoutOutcome> {
        let report = PayoutController::new(&mut self.store).payout(fund, now)?;
        let claim_shares_released = self.ledger.claim_balance(fund)?;
        if claim_shares_released > 0 {
            self.ledger.release_claim(fund, claim_shares_released)?;
        }
        Ok(PayoutOutcome { report, claim_shares_released })
    }
}

impl<S: FeeRecordStore> SettlementCycle<S, InMemoryShareLedger, FixedValuation> {
    /// Deposit `investment` of value: settle before the buy, issue shares at the post-settle price, update after
    pub fn buy_shares(&mut self, fund: &Pubkey, investment: u128) -> Result<CycleOutcome> {
        let settlement = self.settle(fund, FeeHook::BuySharesSetup)?;

        let price = self.share_price(fund)?;
        let shares = value_to_shares(investment, price)?;
        self.ledger.issue(fund, shares)?;
        let gav = self
            .oracle
            .gav(fund)?
            .checked_add(investment)
            .ok_or(PerformanceFeeError::ArithmeticOverflow)?;
        self.oracle.set_gav(*fund, gav);

        let update = self.update(fund, FeeHook::BuySharesCompleted, &settlement)?;
        Ok(CycleOutcome { settlement, update })
    }

    /// Redeem investor shares: settle and update before the shares leave, then pay them out at the post-settle price
    pub fn redeem_shares(&mut self, fund: &Pubkey, shares: u128) -> Result<CycleOutcome> {
        let outcome = self.run(fund, FeeHook::PreRedeemShares)?;

        let price = self.share_price(fund)?;
        let value = shares_to_value(shares, price)?;
        self.ledger.redeem(fund, shares)?;
        let gav = self
            .oracle
            .gav(fund)?
            .checked_sub(value)
            .ok_or(PerformanceFeeError::ArithmeticOverflow)?;
        self.oracle.set_gav(*fund, gav);

        Ok(outcome)
    }
}
