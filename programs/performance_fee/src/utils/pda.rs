use anchor_lang::prelude::*;
use crate::constants::*;

/// Derive the fee record PDA for a fund
pub fn derive_fee_record_pda(fund: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[FEE_RECORD_SEED, fund.as_ref()], program_id)
}
