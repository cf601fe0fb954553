use anchor_lang::prelude::*;
use crate::error::PerformanceFeeError;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeParams {
    pub rate: u128, // Fixed-point fraction of FEE_UNIT, below 1.0
    pub period: i64, // Seconds between payouts
}

impl FeeParams {
    pub fn validate(&self) -> Result<()> {
        require!(self.rate <= crate::constants::MAX_FEE_RATE, PerformanceFeeError::InvalidRate);
        require!(self.period >= crate::constants::MIN_PAYOUT_PERIOD, PerformanceFeeError::InvalidPeriod);
        Ok(())
    }
}

#[account]
#[derive(InitSpace, Default, Debug, PartialEq, Eq)]
pub struct FeeRecord {
    /// The fund this fee is charged against
    pub fund: Pubkey,

    /// Manager allowed to drive hooks and collect payouts
    pub manager: Pubkey,

    /// Share ledger the claim shares are issued on
    pub shares_mint: Pubkey,

    /// Share of performance taken as fee (fixed-point)
    pub rate: u128,

    /// Minimum seconds between successful payouts
    pub period: i64,

    /// When the fund activated this fee
    pub activated_at: Option<i64>,

    /// Last successful payout
    pub last_paid_at: Option<i64>,

    /// Per-share value at the last crystallization, or activation price
    pub high_water_mark: u128,

    /// Per-share value at the most recent update
    pub last_share_price: u128,

    /// Accrued unpaid fee value, marked to market
    pub aggregate_value_due: u128,

    /// Creation timestamp
    pub created_at: i64,

    /// PDA bump seed
    pub bump: u8,
}

impl FeeRecord {
    pub const SEEDS_PREFIX: &'static [u8] = crate::constants::FEE_RECORD_SEED;

    /// Signer seeds for the claim share account this record owns
    pub fn seeds<'a>(&'a self) -> [&'a [u8]; 3] {
        [
            Self::SEEDS_PREFIX,
            self.fund.as_ref(),
            std::slice::from_ref(&self.bump),
        ]
    }

    /// Inert record holding only the fee configuration
    pub fn new(fund: Pubkey, params: &FeeParams) -> Self {
        Self {
            fund,
            rate: params.rate,
            period: params.period,
            ..Default::default()
        }
    }

    pub fn is_configured(&self) -> bool {
        self.fund != Pubkey::default()
    }

    pub fn is_active(&self) -> bool {
        self.activated_at.is_some()
    }

    /// Capture the opening price as both reference points
    pub fn activate(&mut self, initial_price: u128, now: i64) -> Result<()> {
        require!(!self.is_active(), PerformanceFeeError::AlreadyActivated);
        self.activated_at = Some(now);
        self.high_water_mark = initial_price;
        self.last_share_price = initial_price;
        self.aggregate_value_due = 0;
        Ok(())
    }

    /// Check if a full period has passed since activation or the last payout
    pub fn can_pay_out(&self, current_timestamp: i64) -> bool {
        let since = match (self.last_paid_at, self.activated_at) {
            (Some(last_paid), _) => last_paid,
            (None, Some(activated)) => activated,
            (None, None) => return false,
        };
        current_timestamp.saturating_sub(since) >= self.period
    }

    /// Crystallize the current price as the new floor
    pub fn complete_payout(&mut self, current_timestamp: i64) {
        self.high_water_mark = std::cmp::max(self.high_water_mark, self.last_share_price);
        self.aggregate_value_due = 0;
        self.last_paid_at = Some(current_timestamp);
    }
}
