use near_sdk::borsh::{self, BorshDeserialize, BorshSerialize};
use near_sdk::json_types::{Base64VecU8, U128};
use near_sdk::serde::{Deserialize, Serialize};
use near_sdk::{Balance, CryptoHash};
use uint::construct_uint;

use crate::PollId;

construct_uint! {
    /// 256-bit unsigned integer, used to multiply stakes without overflow.
    pub(crate) struct U256(4);
}

#[derive(BorshSerialize, BorshDeserialize, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(crate = "near_sdk::serde", rename_all = "snake_case")]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug))]
pub enum Vote {
    Yes,
    No,
}

impl Vote {
    /// Integer value of the vote in the commit hash preimage.
    pub fn as_word(&self) -> u8 {
        match self {
            Vote::Yes => 1,
            Vote::No => 0,
        }
    }
}

/// Poll phase, derived from the deadlines at call time.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(crate = "near_sdk::serde", rename_all = "snake_case")]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug))]
pub enum Phase {
    /// accepts commits, rejects reveals
    Open,
    /// rejects commits, accepts matching reveals
    Revealing,
    /// tallies are final
    Closed,
}

#[derive(BorshSerialize, BorshDeserialize, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(crate = "near_sdk::serde", rename_all = "snake_case")]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug))]
pub enum PollOutcome {
    Yes,
    No,
    /// revealed stake didn't reach the quorum, counts as `No`.
    NoQuorum,
}

impl PollOutcome {
    /// Side whose revealers are rewarded in settlement.
    pub fn winning_vote(&self) -> Vote {
        match self {
            PollOutcome::Yes => Vote::Yes,
            PollOutcome::No | PollOutcome::NoQuorum => Vote::No,
        }
    }

    pub fn passed(&self) -> bool {
        *self == PollOutcome::Yes
    }
}

#[derive(BorshSerialize, BorshDeserialize)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq, Clone))]
pub struct Poll {
    /// Commits are accepted while `now < commit_deadline`. Unix time in milliseconds.
    pub commit_deadline: u64,
    /// Reveals are accepted while `commit_deadline <= now < reveal_deadline`.
    pub reveal_deadline: u64,
    /// Percent (0..=100) of the committed stake which must be revealed.
    pub quorum: u8,
    pub committed: Balance,
    pub revealed_yes: Balance,
    pub revealed_no: Balance,
    pub revealed_count: u32,
    /// Number of voters who committed. Voters are stored by commit index in the ledger.
    pub voters: u32,
    /// Voter visits done by settlement so far, out of `2 * voters`.
    pub settle_cursor: u64,
    /// Amount credited back to winners so far.
    pub credited: Balance,
    /// Set once every voter was processed by settlement.
    pub settled: bool,
}

impl Poll {
    pub fn phase(&self, now: u64) -> Phase {
        if now < self.commit_deadline {
            Phase::Open
        } else if now < self.reveal_deadline {
            Phase::Revealing
        } else {
            Phase::Closed
        }
    }

    /// A poll nobody committed to never reaches quorum.
    pub fn quorum_reached(&self) -> bool {
        if self.committed == 0 {
            return false;
        }
        let revealed = U256::from(self.revealed_yes) + U256::from(self.revealed_no);
        revealed * U256::from(100u8) >= U256::from(self.committed) * U256::from(self.quorum)
    }

    /// Outcome of the current tallies. It's only binding once the poll is closed.
    pub fn outcome(&self) -> PollOutcome {
        if !self.quorum_reached() {
            PollOutcome::NoQuorum
        } else if self.revealed_yes > self.revealed_no {
            PollOutcome::Yes
        } else {
            PollOutcome::No
        }
    }

    pub fn tally(&self) -> Tally {
        Tally {
            yes: self.revealed_yes.into(),
            no: self.revealed_no.into(),
            revealed_count: self.revealed_count,
        }
    }

    pub fn to_view(&self, id: PollId, now: u64) -> PollView {
        let phase = self.phase(now);
        PollView {
            id,
            phase,
            commit_deadline: self.commit_deadline,
            reveal_deadline: self.reveal_deadline,
            quorum: self.quorum,
            committed: self.committed.into(),
            tally: self.tally(),
            voters: self.voters,
            outcome: (phase == Phase::Closed).then(|| self.outcome()),
            settled: self.settled,
        }
    }
}

#[derive(BorshSerialize, BorshDeserialize)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq, Clone))]
pub struct Commitment {
    /// `commit_hash(vote, salt)` submitted by the voter.
    pub hash: CryptoHash,
    pub stake: Balance,
    /// Set once the matching vote was revealed.
    pub revealed: Option<Vote>,
}

impl Commitment {
    pub fn is_revealed(&self) -> bool {
        self.revealed.is_some()
    }
}

impl From<Commitment> for CommitmentView {
    fn from(c: Commitment) -> Self {
        CommitmentView {
            hash: Base64VecU8(c.hash.to_vec()),
            stake: c.stake.into(),
            revealed: c.is_revealed(),
            revealed_vote: c.revealed,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(crate = "near_sdk::serde")]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq))]
pub struct Tally {
    pub yes: U128,
    pub no: U128,
    pub revealed_count: u32,
}

#[derive(Serialize, Deserialize)]
#[serde(crate = "near_sdk::serde")]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq))]
pub struct PollView {
    pub id: PollId,
    pub phase: Phase,
    pub commit_deadline: u64,
    pub reveal_deadline: u64,
    pub quorum: u8,
    pub committed: U128,
    pub tally: Tally,
    /// number of voters who committed
    pub voters: u32,
    /// None until the poll is closed.
    pub outcome: Option<PollOutcome>,
    pub settled: bool,
}

#[derive(Serialize, Deserialize)]
#[serde(crate = "near_sdk::serde")]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq))]
pub struct CommitmentView {
    pub hash: Base64VecU8,
    pub stake: U128,
    pub revealed: bool,
    pub revealed_vote: Option<Vote>,
}
