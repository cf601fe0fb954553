use anchor_lang::prelude::*;

/// Fund lifecycle events a fee can attach to
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeeHook {
    Continuous,
    BuySharesSetup,
    BuySharesCompleted,
    PreBuyShares,
    PostBuyShares,
    PreRedeemShares,
}

/// What the ledger must do with claim shares after a settle
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SettlementType {
    #[default]
    None,
    MintClaimShares,
    BurnClaimShares,
}

/// Hooks that trigger a settle for the performance fee
pub const SETTLE_HOOKS: [FeeHook; 3] = [
    FeeHook::Continuous,
    FeeHook::BuySharesSetup,
    FeeHook::PreRedeemShares,
];

/// Hooks that trigger an update for the performance fee
pub const UPDATE_HOOKS: [FeeHook; 3] = [
    FeeHook::Continuous,
    FeeHook::BuySharesCompleted,
    FeeHook::PreRedeemShares,
];

pub const USES_GAV_ON_SETTLE: bool = true;
pub const USES_GAV_ON_UPDATE: bool = true;

/// (implements, uses_gav) for the settle phase
pub fn settles_on_hook(hook: FeeHook) -> (bool, bool) {
    if SETTLE_HOOKS.contains(&hook) {
        (true, USES_GAV_ON_SETTLE)
    } else {
        (false, false)
    }
}

/// (implements, uses_gav) for the update phase
pub fn updates_on_hook(hook: FeeHook) -> (bool, bool) {
    if UPDATE_HOOKS.contains(&hook) {
        (true, USES_GAV_ON_UPDATE)
    } else {
        (false, false)
    }
}
