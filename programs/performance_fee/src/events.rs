use anchor_lang::prelude::*;
use crate::state::{FeeHook, SettlementType};

#[event]
pub struct FundSettingsAdded {
    pub fund: Pubkey,
    pub manager: Pubkey,
    pub shares_mint: Pubkey,
    pub claim_shares: Pubkey,
    pub rate: u128,
    pub period: i64,
    pub timestamp: i64,
}

#[event]
pub struct ActivatedForFund {
    pub fund: Pubkey,
    pub high_water_mark: u128,
    pub timestamp: i64,
}

#[event]
pub struct PerformanceSettled {
    pub fund: Pubkey,
    pub hook: FeeHook,
    pub settlement_type: SettlementType,
    pub shares_due: u128,
    pub prev_aggregate_value_due: u128,
    pub next_aggregate_value_due: u128,
    pub timestamp: i64,
}

#[event]
pub struct LastSharePriceUpdated {
    pub fund: Pubkey,
    pub hook: FeeHook,
    pub prev_share_price: u128,
    pub next_share_price: u128,
    pub aggregate_value_due: u128,
    pub timestamp: i64,
}

#[event]
pub struct PaidOut {
    pub fund: Pubkey,
    pub prev_high_water_mark: u128,
    pub next_high_water_mark: u128,
    pub value_realized: u128,
    pub claim_shares: u64,
    pub timestamp: i64,
}
