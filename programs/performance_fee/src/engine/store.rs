use std::collections::BTreeMap;

use anchor_lang::prelude::*;
use crate::error::PerformanceFeeError;
use crate::state::{FeeParams, FeeRecord};

/// Keyed access to one fee record per fund
pub trait FeeRecordStore {
    fn record(&self, fund: &Pubkey) -> Option<&FeeRecord>;

    fn record_mut(&mut self, fund: &Pubkey) -> Option<&mut FeeRecord>;

    fn insert(&mut self, record: FeeRecord);

    /// Configure the fee for a fund; the record stays inert until activated
    fn create(&mut self, fund: Pubkey, params: &FeeParams) -> Result<&mut FeeRecord> {
        require!(self.record(&fund).is_none(), PerformanceFeeError::AlreadyConfigured);
        params.validate()?;

        self.insert(FeeRecord::new(fund, params));
        self.record_mut(&fund)
            .ok_or(PerformanceFeeError::NotConfigured.into())
    }

    fn activate(&mut self, fund: &Pubkey, initial_price: u128, now: i64) -> Result<()> {
        self.record_mut(fund)
            .ok_or(PerformanceFeeError::NotConfigured)?
            .activate(initial_price, now)
    }

    fn get(&self, fund: &Pubkey) -> Result<FeeRecord> {
        self.record(fund)
            .cloned()
            .ok_or(PerformanceFeeError::NotConfigured.into())
    }

    fn put(&mut self, fund: &Pubkey, record: FeeRecord) -> Result<()> {
        require!(self.record(fund).is_some(), PerformanceFeeError::NotConfigured);
        require_keys_eq!(record.fund, *fund, PerformanceFeeError::NotConfigured);
        self.insert(record);
        Ok(())
    }
}

/// Map-backed store used off-chain
#[derive(Clone, Debug, Default)]
pub struct InMemoryFeeRecordStore {
    records: BTreeMap<Pubkey, FeeRecord>,
}

impl InMemoryFeeRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FeeRecordStore for InMemoryFeeRecordStore {
    fn record(&self, fund: &Pubkey) -> Option<&FeeRecord> {
        self.records.get(fund)
    }

    fn record_mut(&mut self, fund: &Pubkey) -> Option<&mut FeeRecord> {
        self.records.get_mut(fund)
    }

    fn insert(&mut self, record: FeeRecord) {
        self.records.insert(record.fund, record);
    }
}

/// Store over the single fee record account owned by a fund's PDA
pub struct AccountFeeRecordStore<'a> {
    account: &'a mut FeeRecord,
}

impl<'a> AccountFeeRecordStore<'a> {
    pub fn new(account: &'a mut FeeRecord) -> Self {
        Self { account }
    }
}

impl FeeRecordStore for AccountFeeRecordStore<'_> {
    fn record(&self, fund: &Pubkey) -> Option<&FeeRecord> {
        (self.account.is_configured() && self.account.fund == *fund).then_some(&*self.account)
    }

    fn record_mut(&mut self, fund: &Pubkey) -> Option<&mut FeeRecord> {
        if self.account.is_configured() && self.account.fund == *fund {
            Some(&mut *self.account)
        } else {
            None
        }
    }

    fn insert(&mut self, record: FeeRecord) {
        // Bump belongs to the account, not the record contents
        let bump = self.account.bump;
        *self.account = FeeRecord { bump, ..record };
    }
}
