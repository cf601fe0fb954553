use anchor_lang::prelude::*;
use ruint::aliases::U256;
use crate::constants::*;
use crate::error::PerformanceFeeError;

/// Calculate (a * b) / denominator through a 256-bit intermediate, rounded down
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128> {
    if denominator == 0 {
        return Err(PerformanceFeeError::DivisionByZero.into());
    }

    let quotient = U256::from(a) * U256::from(b) / U256::from(denominator);
    u128::try_from(quotient).map_err(|_| PerformanceFeeError::ArithmeticOverflow.into())
}

/// Multiply two fixed-point values: (a * b) / FEE_UNIT, rounded down
pub fn fixed_mul(a: u128, b: u128) -> Result<u128> {
    mul_div(a, b, FEE_UNIT)
}

/// Divide two fixed-point values: (a * FEE_UNIT) / b, rounded down
pub fn fixed_div(a: u128, b: u128) -> Result<u128> {
    mul_div(a, FEE_UNIT, b)
}

/// Per-share value of the fund: gav / total supply in fixed-point
pub fn calculate_share_price(gav: u128, total_share_supply: u128) -> Result<u128> {
    fixed_div(gav, total_share_supply)
}

/// Opening share price; a fund with no shares yet starts at 1.0
pub fn calculate_initial_share_price(gav: u128, total_share_supply: u128) -> Result<u128> {
    if total_share_supply == 0 {
        return Ok(FEE_UNIT);
    }
    calculate_share_price(gav, total_share_supply)
}

/// Value of a share quantity at a fixed-point price
pub fn shares_to_value(shares: u128, share_price: u128) -> Result<u128> {
    fixed_mul(shares, share_price)
}

/// Share quantity worth `value` at a fixed-point price, rounded down
pub fn value_to_shares(value: u128, share_price: u128) -> Result<u128> {
    fixed_div(value, share_price)
}

/// Signed difference next - prev
pub fn signed_delta(next: u128, prev: u128) -> Result<i128> {
    let next = i128::try_from(next).map_err(|_| PerformanceFeeError::ArithmeticOverflow)?;
    let prev = i128::try_from(prev).map_err(|_| PerformanceFeeError::ArithmeticOverflow)?;
    next.checked_sub(prev)
        .ok_or(PerformanceFeeError::ArithmeticOverflow.into())
}

/// Convert a basis-point rate into a fixed-point fraction
pub fn bps_to_rate(bps: u16) -> Result<u128> {
    mul_div(bps as u128, FEE_UNIT, BASIS_POINTS_DIVISOR)
}
