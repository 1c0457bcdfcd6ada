use near_sdk::borsh::{self, BorshDeserialize, BorshSerialize};
use near_sdk::collections::LookupMap;
use near_sdk::{AccountId, Balance, IntoStorageKey};

use plcr::{BalanceProvider, PollError};

use crate::{BalanceView, Error};

#[derive(BorshSerialize, BorshDeserialize, Default, Clone, Copy)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq))]
pub struct VoterBalance {
    pub available: Balance,
    pub locked: Balance,
}

impl From<VoterBalance> for BalanceView {
    fn from(b: VoterBalance) -> Self {
        BalanceView {
            available: b.available.into(),
            locked: b.locked.into(),
        }
    }
}

/// Balances of one voting currency. Stake is only locked by commits and only unlocked by
/// settlement; `credit` is the single way new supply enters the ledger.
#[derive(BorshSerialize, BorshDeserialize)]
pub struct Ledger {
    balances: LookupMap<AccountId, VoterBalance>,
    total_supply: Balance,
}

impl Ledger {
    pub fn new<S: IntoStorageKey>(prefix: S) -> Self {
        Self {
            balances: LookupMap::new(prefix),
            total_supply: 0,
        }
    }

    pub fn balance(&self, account: &AccountId) -> VoterBalance {
        self.balances.get(account).unwrap_or_default()
    }

    pub fn total_supply(&self) -> Balance {
        self.total_supply
    }

    /// Issues new balance to the account. Fails with `Overflow` if the total supply would
    /// not fit u128.
    pub fn credit(&mut self, account: &AccountId, amount: Balance) -> Result<(), Error> {
        let total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(Error::Overflow)?;
        let mut b = self.balance(account);
        // every balance is part of the supply
        b.available += amount;
        self.total_supply = total_supply;
        self.balances.insert(account, &b);
        Ok(())
    }
}

impl BalanceProvider for Ledger {
    fn available(&self, account: &AccountId) -> Balance {
        self.balance(account).available
    }

    fn lock(&mut self, account: &AccountId, amount: Balance) -> Result<(), PollError> {
        let mut b = self.balance(account);
        if amount > b.available {
            return Err(PollError::InsufficientBalance);
        }
        b.available -= amount;
        b.locked += amount;
        self.balances.insert(account, &b);
        Ok(())
    }

    fn unlock(&mut self, account: &AccountId, amount: Balance) -> Result<(), PollError> {
        let mut b = self.balance(account);
        if amount > b.locked {
            return Err(PollError::InsufficientBalance);
        }
        b.locked -= amount;
        b.available += amount;
        self.balances.insert(account, &b);
        Ok(())
    }

    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Balance,
    ) -> Result<(), PollError> {
        let mut f = self.balance(from);
        if amount > f.available {
            return Err(PollError::InsufficientBalance);
        }
        f.available -= amount;
        self.balances.insert(from, &f);
        let mut t = self.balance(to);
        t.available += amount;
        self.balances.insert(to, &t);
        Ok(())
    }
}
