use near_sdk::{AccountId, Balance};

use crate::PollError;

/// Source of voting weight for one track (capital tokens or reputation).
/// The poll ledger locks stake on commit and moves it back, or to the pool, on settlement.
/// Implementations must keep `available + locked` of an account constant through `lock`
/// and `unlock`.
pub trait BalanceProvider {
    /// Balance which can still be staked by the `account`.
    fn available(&self, account: &AccountId) -> Balance;

    /// Moves `amount` from available to locked.
    /// Fails with `InsufficientBalance` if `amount > available`.
    fn lock(&mut self, account: &AccountId, amount: Balance) -> Result<(), PollError>;

    /// Moves `amount` from locked back to available.
    fn unlock(&mut self, account: &AccountId, amount: Balance) -> Result<(), PollError>;

    /// Moves `amount` of available balance between accounts.
    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Balance,
    ) -> Result<(), PollError>;
}
