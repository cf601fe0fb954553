use anchor_lang::prelude::*;

#[error_code]
pub enum PerformanceFeeError {
    #[msg("Fee settings already configured for this fund")]
    AlreadyConfigured = 6000,

    #[msg("Fee settings not configured for this fund")]
    NotConfigured = 6001,

    #[msg("Fee already activated for this fund")]
    AlreadyActivated = 6002,

    #[msg("Fee not active for this fund")]
    NotActive = 6003,

    #[msg("Payout period has not elapsed")]
    PayoutNotAllowed = 6004,

    #[msg("Arithmetic overflow in fee calculation")]
    ArithmeticOverflow = 6005,

    #[msg("Division by zero in fee calculation")]
    DivisionByZero = 6006,

    #[msg("Fee rate must be below 100%")]
    InvalidRate = 6007,

    #[msg("Payout period must not be negative")]
    InvalidPeriod = 6008,

    #[msg("Signer is not the fund manager")]
    Unauthorized = 6009,

    #[msg("Ledger accounts do not match the fee record")]
    LedgerMismatch = 6010,

    #[msg("Settlement report does not match the stored claim")]
    StaleSettlement = 6011,

    #[msg("Claim share balance does not reflect the settlement")]
    SettlementNotApplied = 6012,
}
