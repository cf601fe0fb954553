//! Mark-to-market accrual of the performance fee claim.
//!
//! The claim is recomputed from scratch on every evaluation instead of being
//! accumulated, so any retrace to or below the high-water mark zeroes it
//! exactly regardless of how many settlements happened on the way.

use anchor_lang::prelude::*;
use crate::state::{FeeRecord, SettlementType};
use crate::utils::math::*;

/// Which supply the performance value is measured against
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SupplyBasis {
    /// Total ledger supply, claim shares included
    #[default]
    IncludeClaimShares,
    /// Total ledger supply minus the fee's own outstanding claim shares
    ExcludeClaimShares,
}

/// Ledger figures supplied by the caller for one evaluation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LedgerTotals {
    pub total_share_supply: u128,
    pub claim_shares_outstanding: u128,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccrualInput {
    pub rate: u128,
    pub total_share_supply: u128,
    pub claim_shares_outstanding: u128,
    pub gav: u128,
    pub high_water_mark: u128,
    /// Not part of the value formula; carried for diagnostics
    pub prev_share_price: u128,
    pub prev_aggregate_value_due: u128,
}

impl AccrualInput {
    pub fn from_record(record: &FeeRecord, gav: u128, totals: LedgerTotals) -> Self {
        Self {
            rate: record.rate,
            total_share_supply: totals.total_share_supply,
            claim_shares_outstanding: totals.claim_shares_outstanding,
            gav,
            high_water_mark: record.high_water_mark,
            prev_share_price: record.last_share_price,
            prev_aggregate_value_due: record.aggregate_value_due,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Accrual {
    pub next_share_price: u128,
    pub next_aggregate_value_due: u128,
    pub value_delta: i128,
    pub shares_due: u128,
    pub settlement_type: SettlementType,
}

/// Supply the performance value is measured against
pub fn calculate_net_share_supply(
    total_share_supply: u128,
    claim_shares_outstanding: u128,
    basis: SupplyBasis,
) -> Result<u128> {
    match basis {
        SupplyBasis::IncludeClaimShares => Ok(total_share_supply),
        SupplyBasis::ExcludeClaimShares => total_share_supply
            .checked_sub(claim_shares_outstanding)
            .ok_or(crate::error::PerformanceFeeError::ArithmeticOverflow.into()),
    }
}

/// Fee value owed at `share_price`: rate * (price - hwm) * net supply, zero at or below the mark
pub fn calculate_aggregate_value_due(
    rate: u128,
    high_water_mark: u128,
    share_price: u128,
    net_share_supply: u128,
) -> Result<u128> {
    if share_price <= high_water_mark {
        return Ok(0);
    }

    let excess_per_share = share_price - high_water_mark;
    let performance_value = fixed_mul(excess_per_share, net_share_supply)?;
    fixed_mul(rate, performance_value)
}

/// Map the current state and a new valuation to the next state and claim delta
pub fn calculate_accrual(input: &AccrualInput, basis: SupplyBasis) -> Result<Accrual> {
    let net_share_supply = calculate_net_share_supply(
        input.total_share_supply,
        input.claim_shares_outstanding,
        basis,
    )?;
    let next_share_price = calculate_share_price(input.gav, input.total_share_supply)?;

    let next_aggregate_value_due = calculate_aggregate_value_due(
        input.rate,
        input.high_water_mark,
        next_share_price,
        net_share_supply,
    )?;

    let value_delta = signed_delta(next_aggregate_value_due, input.prev_aggregate_value_due)?;

    let (settlement_type, shares_due) = if value_delta > 0 {
        (
            SettlementType::MintClaimShares,
            value_to_shares(value_delta.unsigned_abs(), next_share_price)?,
        )
    } else if value_delta < 0 {
        // A zeroed claim releases everything still outstanding
        let shares = if next_aggregate_value_due == 0 {
            input.claim_shares_outstanding
        } else {
            std::cmp::min(
                value_to_shares(value_delta.unsigned_abs(), next_share_price)?,
                input.claim_shares_outstanding,
            )
        };
        (SettlementType::BurnClaimShares, shares)
    } else {
        (SettlementType::None, 0)
    };

    Ok(Accrual {
        next_share_price,
        next_aggregate_value_due,
        value_delta,
        shares_due,
        settlement_type,
    })
}
