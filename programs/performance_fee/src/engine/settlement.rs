use anchor_lang::prelude::*;
use crate::engine::calculator::*;
use crate::engine::store::FeeRecordStore;
use crate::error::PerformanceFeeError;
use crate::state::{settles_on_hook, updates_on_hook, FeeHook, FeeRecord, SettlementType};
use crate::utils::math::calculate_share_price;

/// Mint/burn decision handed back to the ledger after a settle
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SettlementReport {
    pub settlement_type: SettlementType,
    pub shares_due: u128,
    pub next_share_price: u128,
    pub prev_aggregate_value_due: u128,
    pub next_aggregate_value_due: u128,
    pub value_delta: i128,
    /// Valuation and ledger totals the settlement was computed from
    pub gav: u128,
    pub total_share_supply: u128,
    pub claim_shares_outstanding: u128,
}

impl SettlementReport {
    /// Ledger totals once the reported mint or burn has been applied
    pub fn applied_totals(&self) -> Result<LedgerTotals> {
        let shares = self.shares_due;
        let applied = match self.settlement_type {
            SettlementType::None => Some((self.total_share_supply, self.claim_shares_outstanding)),
            SettlementType::MintClaimShares => self
                .total_share_supply
                .checked_add(shares)
                .zip(self.claim_shares_outstanding.checked_add(shares)),
            SettlementType::BurnClaimShares => self
                .total_share_supply
                .checked_sub(shares)
                .zip(self.claim_shares_outstanding.checked_sub(shares)),
        };
        let (total_share_supply, claim_shares_outstanding) =
            applied.ok_or(PerformanceFeeError::ArithmeticOverflow)?;

        Ok(LedgerTotals { total_share_supply, claim_shares_outstanding })
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// False when the hook is outside the update set and nothing was persisted
    pub updated: bool,
    pub prev_share_price: u128,
    pub next_share_price: u128,
    pub prev_aggregate_value_due: u128,
    pub next_aggregate_value_due: u128,
}

/// Two-phase settle/update protocol over a fee record store.
///
/// `settle` never writes: the caller mints or burns the reported claim shares
/// and then calls `update` with the post-mutation ledger totals and the
/// settle report in the same transaction. `update` re-derives the claim from
/// the inputs recorded in the report and only accepts a report the engine
/// itself would have produced. Skipping `update` leaves the stored price
/// stale until the next complete cycle.
pub struct SettlementController<'a, S: FeeRecordStore> {
    store: &'a mut S,
    supply_basis: SupplyBasis,
}

impl<'a, S: FeeRecordStore> SettlementController<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self::with_supply_basis(store, SupplyBasis::default())
    }

    pub fn with_supply_basis(store: &'a mut S, supply_basis: SupplyBasis) -> Self {
        Self { store, supply_basis }
    }

    pub fn settle(
        &self,
        fund: &Pubkey,
        hook: FeeHook,
        gav: u128,
        totals: LedgerTotals,
    ) -> Result<SettlementReport> {
        let record = self.store.get(fund)?;
        require!(record.is_active(), PerformanceFeeError::NotActive);

        let report = SettlementReport {
            next_share_price: record.last_share_price,
            prev_aggregate_value_due: record.aggregate_value_due,
            next_aggregate_value_due: record.aggregate_value_due,
            gav,
            total_share_supply: totals.total_share_supply,
            claim_shares_outstanding: totals.claim_shares_outstanding,
            ..Default::default()
        };

        let (settles, _uses_gav) = settles_on_hook(hook);
        if !settles {
            return Ok(report);
        }

        let accrual = calculate_accrual(
            &AccrualInput::from_record(&record, gav, totals),
            self.supply_basis,
        )?;

        if accrual.settlement_type != SettlementType::None {
            msg!(
                "Performance fee settle {:?}: {} claim shares at price {}",
                accrual.settlement_type,
                accrual.shares_due,
                accrual.next_share_price
            );
        }

        Ok(SettlementReport {
            settlement_type: accrual.settlement_type,
            shares_due: accrual.shares_due,
            next_share_price: accrual.next_share_price,
            next_aggregate_value_due: accrual.next_aggregate_value_due,
            value_delta: accrual.value_delta,
            ..report
        })
    }

    /// Persist the post-mutation share price together with the claim
    /// re-derived from the settle inputs; only the price comes from the new totals.
    pub fn update(
        &mut self,
        fund: &Pubkey,
        hook: FeeHook,
        gav: u128,
        totals: LedgerTotals,
        settled: &SettlementReport,
    ) -> Result<UpdateReport> {
        let mut record = self.store.get(fund)?;
        require!(record.is_active(), PerformanceFeeError::NotActive);

        let report = UpdateReport {
            updated: false,
            prev_share_price: record.last_share_price,
            next_share_price: record.last_share_price,
            prev_aggregate_value_due: record.aggregate_value_due,
            next_aggregate_value_due: record.aggregate_value_due,
        };

        let (updates, _uses_gav) = updates_on_hook(hook);
        if !updates {
            return Ok(report);
        }

        let accrual = self.recompute_settlement(&record, settled)?;

        let applied = settled.applied_totals()?;
        require!(
            totals.claim_shares_outstanding == applied.claim_shares_outstanding,
            PerformanceFeeError::SettlementNotApplied
        );
        // Settle and update on one hook bracket nothing but the claim mutation;
        // across distinct hooks the fund may only have issued shares in between
        let (same_hook, _uses_gav) = settles_on_hook(hook);
        let supply_consistent = if same_hook {
            totals.total_share_supply == applied.total_share_supply
        } else {
            totals.total_share_supply >= applied.total_share_supply
        };
        require!(supply_consistent, PerformanceFeeError::SettlementNotApplied);

        // Totals now include the claim shares minted or burned since settle
        let next_share_price = calculate_share_price(gav, totals.total_share_supply)?;

        record.last_share_price = next_share_price;
        record.aggregate_value_due = accrual.next_aggregate_value_due;
        self.store.put(fund, record)?;

        Ok(UpdateReport {
            updated: true,
            next_share_price,
            next_aggregate_value_due: accrual.next_aggregate_value_due,
            ..report
        })
    }

    /// Re-run the accrual on the report's own inputs and require the same outcome
    fn recompute_settlement(&self, record: &FeeRecord, settled: &SettlementReport) -> Result<Accrual> {
        require!(
            settled.prev_aggregate_value_due == record.aggregate_value_due,
            PerformanceFeeError::StaleSettlement
        );

        let totals = LedgerTotals {
            total_share_supply: settled.total_share_supply,
            claim_shares_outstanding: settled.claim_shares_outstanding,
        };
        let accrual = calculate_accrual(
            &AccrualInput::from_record(record, settled.gav, totals),
            self.supply_basis,
        )?;

        require!(
            accrual.settlement_type == settled.settlement_type
                && accrual.shares_due == settled.shares_due
                && accrual.next_aggregate_value_due == settled.next_aggregate_value_due,
            PerformanceFeeError::StaleSettlement
        );

        Ok(accrual)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::engine::store::InMemoryFeeRecordStore;
    use crate::state::FeeParams;

    fn active_store(fund: Pubkey) -> InMemoryFeeRecordStore {
        let mut store = InMemoryFeeRecordStore::new();
        store
            .create(fund, &FeeParams { rate: FEE_UNIT / 10, period: SECONDS_PER_YEAR })
            .unwrap();
        store.activate(&fund, FEE_UNIT, 0).unwrap();
        store
    }

    fn totals(total: u128, claim: u128) -> LedgerTotals {
        LedgerTotals { total_share_supply: total, claim_shares_outstanding: claim }
    }

    #[test]
    fn test_settle_does_not_persist() {
        let fund = Pubkey::new_unique();
        let mut store = active_store(fund);
        let before = store.get(&fund).unwrap();

        let controller = SettlementController::new(&mut store);
        let report = controller
            .settle(&fund, FeeHook::Continuous, 2 * FEE_UNIT, totals(FEE_UNIT, 0))
            .unwrap();
        assert_eq!(report.settlement_type, SettlementType::MintClaimShares);
        assert_eq!(report.shares_due, FEE_UNIT / 20);
        assert_eq!(report.next_aggregate_value_due, FEE_UNIT / 10);

        assert_eq!(store.get(&fund).unwrap(), before);
    }

    #[test]
    fn test_update_persists_post_mint_price() {
        let fund = Pubkey::new_unique();
        let mut store = active_store(fund);
        let mut controller = SettlementController::new(&mut store);

        let settled = controller
            .settle(&fund, FeeHook::Continuous, 2 * FEE_UNIT, totals(FEE_UNIT, 0))
            .unwrap();

        let claim = settled.shares_due;
        let report = controller
            .update(&fund, FeeHook::Continuous, 2 * FEE_UNIT, totals(FEE_UNIT + claim, claim), &settled)
            .unwrap();
        assert!(report.updated);
        assert_eq!(report.prev_share_price, FEE_UNIT);
        // 2.0 / 1.05
        assert_eq!(report.next_share_price, 1_904_761_904_761_904_761);
        assert_eq!(report.next_aggregate_value_due, FEE_UNIT / 10);

        let record = store.get(&fund).unwrap();
        assert_eq!(record.last_share_price, 1_904_761_904_761_904_761);
        assert_eq!(record.aggregate_value_due, FEE_UNIT / 10);
        assert_eq!(record.high_water_mark, FEE_UNIT);
    }

    #[test]
    fn test_update_rejects_stale_report() {
        let fund = Pubkey::new_unique();
        let mut store = active_store(fund);
        let mut controller = SettlementController::new(&mut store);

        let settled = controller
            .settle(&fund, FeeHook::Continuous, 2 * FEE_UNIT, totals(FEE_UNIT, 0))
            .unwrap();
        let claim = settled.shares_due;
        controller
            .update(&fund, FeeHook::Continuous, 2 * FEE_UNIT, totals(FEE_UNIT + claim, claim), &settled)
            .unwrap();

        let err = controller
            .update(&fund, FeeHook::Continuous, 2 * FEE_UNIT, totals(FEE_UNIT + claim, claim), &settled)
            .unwrap_err();
        assert_eq!(err, PerformanceFeeError::StaleSettlement.into());
    }

    #[test]
    fn test_undeclared_hooks_are_no_ops() {
        let fund = Pubkey::new_unique();
        let mut store = active_store(fund);
        let before = store.get(&fund).unwrap();
        let mut controller = SettlementController::new(&mut store);

        let report = controller
            .settle(&fund, FeeHook::BuySharesCompleted, 2 * FEE_UNIT, totals(FEE_UNIT, 0))
            .unwrap();
        assert_eq!(report.settlement_type, SettlementType::None);
        assert_eq!(report.shares_due, 0);

        let settled = controller
            .settle(&fund, FeeHook::BuySharesSetup, 2 * FEE_UNIT, totals(FEE_UNIT, 0))
            .unwrap();
        let report = controller
            .update(&fund, FeeHook::BuySharesSetup, 2 * FEE_UNIT, totals(FEE_UNIT, 0), &settled)
            .unwrap();
        assert!(!report.updated);

        for hook in [FeeHook::PreBuyShares, FeeHook::PostBuyShares] {
            let report = controller.settle(&fund, hook, 2 * FEE_UNIT, totals(FEE_UNIT, 0)).unwrap();
            assert_eq!(report.settlement_type, SettlementType::None);
            let update = controller
                .update(&fund, hook, 2 * FEE_UNIT, totals(FEE_UNIT, 0), &report)
                .unwrap();
            assert!(!update.updated);
        }

        assert_eq!(store.get(&fund).unwrap(), before);
    }

    #[test]
    fn test_update_rejects_skipped_settle() {
        let fund = Pubkey::new_unique();
        let mut store = active_store(fund);
        let mut controller = SettlementController::new(&mut store);

        // PostBuyShares settles nothing, so its report cannot stand in for a price above the mark
        let skipped = controller
            .settle(&fund, FeeHook::PostBuyShares, 3 * FEE_UNIT, totals(FEE_UNIT, 0))
            .unwrap();
        assert_eq!(skipped.settlement_type, SettlementType::None);
        let err = controller
            .update(&fund, FeeHook::Continuous, 3 * FEE_UNIT, totals(FEE_UNIT, 0), &skipped)
            .unwrap_err();
        assert_eq!(err, PerformanceFeeError::StaleSettlement.into());

        let settled = controller
            .settle(&fund, FeeHook::Continuous, 3 * FEE_UNIT, totals(FEE_UNIT, 0))
            .unwrap();
        let claim = settled.shares_due;
        let report = controller
            .update(&fund, FeeHook::Continuous, 3 * FEE_UNIT, totals(FEE_UNIT + claim, claim), &settled)
            .unwrap();
        // 0.1 * (3.0 - 1.0) * 1.0
        assert_eq!(report.next_aggregate_value_due, FEE_UNIT / 5);
    }

    #[test]
    fn test_update_rejects_forged_claim() {
        let fund = Pubkey::new_unique();
        let mut store = active_store(fund);
        let mut controller = SettlementController::new(&mut store);

        // Price 0.5 sits below the mark, the honest claim is zero
        let settled = controller
            .settle(&fund, FeeHook::Continuous, FEE_UNIT / 2, totals(FEE_UNIT, 0))
            .unwrap();
        assert_eq!(settled.next_aggregate_value_due, 0);

        let inflated = SettlementReport { next_aggregate_value_due: 1_000 * FEE_UNIT, ..settled };
        let minted = SettlementReport {
            settlement_type: SettlementType::MintClaimShares,
            shares_due: FEE_UNIT,
            ..settled
        };
        let repriced = SettlementReport { gav: 4 * FEE_UNIT, ..settled };
        for forged in [inflated, minted, repriced] {
            let err = controller
                .update(&fund, FeeHook::Continuous, FEE_UNIT / 2, totals(FEE_UNIT, 0), &forged)
                .unwrap_err();
            assert_eq!(err, PerformanceFeeError::StaleSettlement.into());
        }

        let report = controller
            .update(&fund, FeeHook::Continuous, FEE_UNIT / 2, totals(FEE_UNIT, 0), &settled)
            .unwrap();
        assert!(report.updated);
        assert_eq!(report.next_aggregate_value_due, 0);
        assert_eq!(store.get(&fund).unwrap().aggregate_value_due, 0);
    }

    #[test]
    fn test_update_requires_applied_settlement() {
        let fund = Pubkey::new_unique();
        let mut store = active_store(fund);
        let mut controller = SettlementController::new(&mut store);

        let settled = controller
            .settle(&fund, FeeHook::Continuous, 2 * FEE_UNIT, totals(FEE_UNIT, 0))
            .unwrap();
        let claim = settled.shares_due;
        assert_eq!(
            settled.applied_totals().unwrap(),
            totals(FEE_UNIT + claim, claim)
        );

        // Claim shares never minted
        let err = controller
            .update(&fund, FeeHook::Continuous, 2 * FEE_UNIT, totals(FEE_UNIT, 0), &settled)
            .unwrap_err();
        assert_eq!(err, PerformanceFeeError::SettlementNotApplied.into());

        // Investor shares moved inside a single-hook cycle
        let err = controller
            .update(&fund, FeeHook::Continuous, 2 * FEE_UNIT, totals(2 * FEE_UNIT + claim, claim), &settled)
            .unwrap_err();
        assert_eq!(err, PerformanceFeeError::SettlementNotApplied.into());
    }

    #[test]
    fn test_deposit_between_hooks_is_accepted() {
        let fund = Pubkey::new_unique();
        let mut store = active_store(fund);
        let mut controller = SettlementController::new(&mut store);

        let settled = controller
            .settle(&fund, FeeHook::BuySharesSetup, 2 * FEE_UNIT, totals(FEE_UNIT, 0))
            .unwrap();
        let claim = settled.shares_due;

        // One more share bought at 2.0 between the two hooks
        let report = controller
            .update(
                &fund,
                FeeHook::BuySharesCompleted,
                4 * FEE_UNIT,
                totals(2 * FEE_UNIT + claim, claim),
                &settled,
            )
            .unwrap();
        assert!(report.updated);
        assert_eq!(report.next_aggregate_value_due, FEE_UNIT / 10);
    }

    #[test]
    fn test_requires_active_fee() {
        let fund = Pubkey::new_unique();
        let mut store = InMemoryFeeRecordStore::new();

        {
            let controller = SettlementController::new(&mut store);
            let err = controller
                .settle(&fund, FeeHook::Continuous, FEE_UNIT, totals(FEE_UNIT, 0))
                .unwrap_err();
            assert_eq!(err, PerformanceFeeError::NotConfigured.into());
        }

        store.create(fund, &FeeParams { rate: 0, period: 0 }).unwrap();
        let mut controller = SettlementController::new(&mut store);
        let err = controller
            .settle(&fund, FeeHook::Continuous, FEE_UNIT, totals(FEE_UNIT, 0))
            .unwrap_err();
        assert_eq!(err, PerformanceFeeError::NotActive.into());

        let err = controller
            .update(&fund, FeeHook::Continuous, FEE_UNIT, totals(FEE_UNIT, 0), &SettlementReport::default())
            .unwrap_err();
        assert_eq!(err, PerformanceFeeError::NotActive.into());
    }

    #[test]
    fn test_zero_supply_is_reported() {
        let fund = Pubkey::new_unique();
        let mut store = active_store(fund);
        let controller = SettlementController::new(&mut store);
        let err = controller
            .settle(&fund, FeeHook::Continuous, FEE_UNIT, totals(0, 0))
            .unwrap_err();
        assert_eq!(err, PerformanceFeeError::DivisionByZero.into());
    }
}
