// PDA Seeds
pub const FEE_RECORD_SEED: &[u8] = b"fee_record";

// Time constants
pub const SECONDS_PER_DAY: i64 = 86400;
pub const SECONDS_PER_YEAR: i64 = 365 * SECONDS_PER_DAY;

// Math constants
pub const FEE_UNIT: u128 = 1_000_000_000_000_000_000; // 1e18, shared by rates, prices and values
pub const BASIS_POINTS_DIVISOR: u128 = 10_000;

// Limits
pub const MAX_FEE_RATE: u128 = FEE_UNIT - 1; // rate must stay strictly below 100%
pub const MIN_PAYOUT_PERIOD: i64 = 0;
