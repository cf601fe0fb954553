use anchor_lang::prelude::*;
use crate::engine::store::FeeRecordStore;
use crate::error::PerformanceFeeError;

/// Outcome of a crystallization, for off-engine transfer bookkeeping
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PayoutReport {
    pub prev_high_water_mark: u128,
    pub next_high_water_mark: u128,
    pub value_realized: u128,
    pub paid_at: i64,
}

pub struct PayoutController<'a, S: FeeRecordStore> {
    store: &'a mut S,
}

impl<'a, S: FeeRecordStore> PayoutController<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    /// False until a full period has passed since activation, then since each payout
    pub fn payout_allowed(&self, fund: &Pubkey, now: i64) -> Result<bool> {
        Ok(self.store.get(fund)?.can_pay_out(now))
    }

    pub fn payout(&mut self, fund: &Pubkey, now: i64) -> Result<PayoutReport> {
        let mut record = self.store.get(fund)?;
        require!(record.can_pay_out(now), PerformanceFeeError::PayoutNotAllowed);

        let prev_high_water_mark = record.high_water_mark;
        let value_realized = record.aggregate_value_due;
        record.complete_payout(now);

        let report = PayoutReport {
            prev_high_water_mark,
            next_high_water_mark: record.high_water_mark,
            value_realized,
            paid_at: now,
        };
        self.store.put(fund, record)?;

        msg!(
            "Performance fee paid out {} at high-water mark {}",
            report.value_realized,
            report.next_high_water_mark
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::engine::store::InMemoryFeeRecordStore;
    use crate::state::FeeParams;

    const ACTIVATED_AT: i64 = 1_700_000_000;

    fn active_store(fund: Pubkey) -> InMemoryFeeRecordStore {
        let mut store = InMemoryFeeRecordStore::new();
        store
            .create(fund, &FeeParams { rate: FEE_UNIT / 10, period: SECONDS_PER_YEAR })
            .unwrap();
        store.activate(&fund, FEE_UNIT, ACTIVATED_AT).unwrap();
        store
    }

    #[test]
    fn test_payout_gate() {
        let fund = Pubkey::new_unique();
        let mut store = active_store(fund);
        let mut controller = PayoutController::new(&mut store);

        assert!(!controller.payout_allowed(&fund, ACTIVATED_AT + SECONDS_PER_YEAR - 1).unwrap());
        let err = controller.payout(&fund, ACTIVATED_AT + SECONDS_PER_YEAR - 1).unwrap_err();
        assert_eq!(err, PerformanceFeeError::PayoutNotAllowed.into());

        assert!(controller.payout_allowed(&fund, ACTIVATED_AT + SECONDS_PER_YEAR).unwrap());
        controller.payout(&fund, ACTIVATED_AT + SECONDS_PER_YEAR).unwrap();

        let paid_at = ACTIVATED_AT + SECONDS_PER_YEAR;
        assert!(!controller.payout_allowed(&fund, paid_at + SECONDS_PER_YEAR - 1).unwrap());
        assert!(controller.payout_allowed(&fund, paid_at + SECONDS_PER_YEAR).unwrap());
    }

    #[test]
    fn test_payout_crystallizes_claim() {
        let fund = Pubkey::new_unique();
        let mut store = active_store(fund);
        let mut record = store.get(&fund).unwrap();
        record.last_share_price = 2 * FEE_UNIT;
        record.aggregate_value_due = FEE_UNIT / 10;
        store.put(&fund, record).unwrap();

        let now = ACTIVATED_AT + SECONDS_PER_YEAR;
        let report = PayoutController::new(&mut store).payout(&fund, now).unwrap();
        assert_eq!(
            report,
            PayoutReport {
                prev_high_water_mark: FEE_UNIT,
                next_high_water_mark: 2 * FEE_UNIT,
                value_realized: FEE_UNIT / 10,
                paid_at: now,
            }
        );

        let record = store.get(&fund).unwrap();
        assert_eq!(record.high_water_mark, 2 * FEE_UNIT);
        assert_eq!(record.aggregate_value_due, 0);
        assert_eq!(record.last_paid_at, Some(now));
    }

    #[test]
    fn test_payout_below_mark_only_resets_clock() {
        let fund = Pubkey::new_unique();
        let mut store = active_store(fund);
        let mut record = store.get(&fund).unwrap();
        record.last_share_price = FEE_UNIT / 2;
        store.put(&fund, record).unwrap();

        let now = ACTIVATED_AT + 2 * SECONDS_PER_YEAR;
        let report = PayoutController::new(&mut store).payout(&fund, now).unwrap();
        assert_eq!(report.next_high_water_mark, FEE_UNIT);
        assert_eq!(report.value_realized, 0);
        assert_eq!(store.get(&fund).unwrap().last_paid_at, Some(now));
    }

    #[test]
    fn test_inactive_fee_cannot_pay_out() {
        let fund = Pubkey::new_unique();
        let mut store = InMemoryFeeRecordStore::new();
        store.create(fund, &FeeParams { rate: 0, period: 0 }).unwrap();

        let mut controller = PayoutController::new(&mut store);
        assert!(!controller.payout_allowed(&fund, i64::MAX).unwrap());
        let err = controller.payout(&fund, i64::MAX).unwrap_err();
        assert_eq!(err, PerformanceFeeError::PayoutNotAllowed.into());

        let err = controller.payout_allowed(&Pubkey::new_unique(), 0).unwrap_err();
        assert_eq!(err, PerformanceFeeError::NotConfigured.into());
    }
}
