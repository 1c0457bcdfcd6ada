//! Redistribution of the stake locked in a closed poll.
//!
//! Revealers on the winning side get their stake back plus a pro-rata share (by stake) of
//! everything forfeited: the losing side's stake and the stake which was never revealed.
//! Integer division dust, and forfeits with nobody to claim them, go to the pool account.
//! Once a settlement completes: `credited + to_pool == total_committed`.
//!
//! Settlement is paged. The ledger visits every voter twice: the first pass moves
//! forfeited stake to the pool, the second pays winners from it, so the pool can always
//! cover the shares.

use near_sdk::json_types::U128;
use near_sdk::serde::{Deserialize, Serialize};
use near_sdk::{AccountId, Balance};

use crate::poll::U256;
use crate::{PollId, PollOutcome, Vote};

#[derive(Serialize, Deserialize)]
#[serde(crate = "near_sdk::serde")]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq))]
pub struct Payout {
    pub account: AccountId,
    /// stake locked at commit
    pub stake: U128,
    /// amount moved back to the account's available balance
    pub credited: U128,
}

#[derive(Serialize, Deserialize)]
#[serde(crate = "near_sdk::serde")]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq))]
pub struct SettlementReport {
    pub poll_id: PollId,
    pub outcome: PollOutcome,
    pub total_committed: U128,
    /// revealed stake of the winning side
    pub winning_stake: U128,
    /// payouts made by this call
    pub payouts: Vec<Payout>,
    /// voter visits left before the poll is settled
    pub remaining: u64,
    /// credited back to winners since the settlement started
    pub credited: U128,
    /// kept by the pool, zero until the settlement completes
    pub to_pool: U128,
}

/// Result of a settle call. Settling an already settled poll is a no-op.
#[derive(Serialize, Deserialize)]
#[serde(crate = "near_sdk::serde", tag = "result", rename_all = "snake_case")]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq))]
pub enum Settlement {
    /// more voters have to be processed, call settle again
    InProgress(SettlementReport),
    Settled(SettlementReport),
    NoOp,
}

/// Payout rule of a closed poll, derived from its final tallies.
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq))]
pub struct PayoutRule {
    winner: Vote,
    winning_stake: Balance,
    forfeited: Balance,
}

impl PayoutRule {
    pub fn new(
        outcome: PollOutcome,
        committed: Balance,
        revealed_yes: Balance,
        revealed_no: Balance,
    ) -> Self {
        let winner = outcome.winning_vote();
        let winning_stake = match winner {
            Vote::Yes => revealed_yes,
            Vote::No => revealed_no,
        };
        Self {
            winner,
            winning_stake,
            forfeited: committed - winning_stake,
        }
    }

    pub fn winning_stake(&self) -> Balance {
        self.winning_stake
    }

    /// Whether a commitment with the `revealed` vote is on the winning side.
    pub fn wins(&self, revealed: Option<Vote>) -> bool {
        revealed == Some(self.winner)
    }

    /// Amount credited back for a commitment: `stake + floor(forfeited * stake /
    /// winning_stake)` for winners, nothing otherwise.
    pub fn credited(&self, stake: Balance, revealed: Option<Vote>) -> Balance {
        if !self.wins(revealed) {
            return 0;
        }
        stake + pro_rata(self.forfeited, stake, self.winning_stake)
    }
}

/// `floor(amount * part / whole)`. `part <= whole` and `whole > 0`.
fn pro_rata(amount: Balance, part: Balance, whole: Balance) -> Balance {
    (U256::from(amount) * U256::from(part) / U256::from(whole)).as_u128()
}
