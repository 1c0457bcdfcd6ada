use near_sdk::borsh::{self, BorshDeserialize, BorshSerialize};
use near_sdk::collections::LookupMap;
use near_sdk::json_types::U128;
use near_sdk::{env, AccountId, Balance, CryptoHash, IntoStorageKey};

use crate::settlement::{Payout, PayoutRule, Settlement, SettlementReport};
use crate::*;

/// Validates poll parameters and returns `(commit_deadline, reveal_deadline)`.
pub fn poll_deadlines(
    now: u64,
    commit_window: u64,
    reveal_window: u64,
    quorum: u8,
) -> Result<(u64, u64), PollError> {
    if quorum > 100 {
        return Err(PollError::InvalidQuorum);
    }
    if commit_window == 0 || reveal_window == 0 {
        return Err(PollError::InvalidWindow);
    }
    let commit_deadline = now
        .checked_add(commit_window)
        .ok_or(PollError::InvalidWindow)?;
    let reveal_deadline = commit_deadline
        .checked_add(reveal_window)
        .ok_or(PollError::InvalidWindow)?;
    Ok((commit_deadline, reveal_deadline))
}

/// Persistent store of commit-reveal polls and their commitments.
/// `S` is the poll subject: an identity which can have at most one poll.
/// The ledger doesn't know what a subject means, callers decide.
/// All operations check every precondition before the first write, so an error leaves the
/// ledger and the balance provider untouched.
#[derive(BorshSerialize, BorshDeserialize)]
pub struct PollLedger<S> {
    polls: LookupMap<PollId, Poll>,
    commitments: LookupMap<(PollId, AccountId), Commitment>,
    /// voters of a poll by commit index
    voters: LookupMap<(PollId, u32), AccountId>,
    by_subject: LookupMap<S, PollId>,
    subjects: LookupMap<PollId, S>,
    last_poll_id: PollId,
}

impl<S> PollLedger<S>
where
    S: BorshSerialize + BorshDeserialize,
{
    pub fn new<P: IntoStorageKey>(prefix: P) -> Self {
        let prefix = prefix.into_storage_key();
        let sub = |k: u8| [prefix.as_slice(), &[k]].concat();
        Self {
            polls: LookupMap::new(sub(b'p')),
            commitments: LookupMap::new(sub(b'c')),
            voters: LookupMap::new(sub(b'v')),
            by_subject: LookupMap::new(sub(b's')),
            subjects: LookupMap::new(sub(b'i')),
            last_poll_id: 0,
        }
    }

    /// Opens a new poll for `subject`. The commit phase starts at `now`.
    pub fn open_poll(
        &mut self,
        subject: &S,
        now: u64,
        commit_window: u64,
        reveal_window: u64,
        quorum: u8,
    ) -> Result<PollId, PollError> {
        let (commit_deadline, reveal_deadline) =
            poll_deadlines(now, commit_window, reveal_window, quorum)?;
        if self.by_subject.contains_key(subject) {
            return Err(PollError::DuplicatePoll);
        }

        self.last_poll_id += 1;
        let poll_id = self.last_poll_id;
        self.polls.insert(
            &poll_id,
            &Poll {
                commit_deadline,
                reveal_deadline,
                quorum,
                committed: 0,
                revealed_yes: 0,
                revealed_no: 0,
                revealed_count: 0,
                voters: 0,
                settle_cursor: 0,
                credited: 0,
                settled: false,
            },
        );
        self.by_subject.insert(subject, &poll_id);
        self.subjects.insert(&poll_id, subject);
        Ok(poll_id)
    }

    pub fn poll(&self, poll_id: PollId) -> Result<Poll, PollError> {
        self.polls.get(&poll_id).ok_or(PollError::PollNotFound)
    }

    pub fn poll_id(&self, subject: &S) -> Option<PollId> {
        self.by_subject.get(subject)
    }

    pub fn subject(&self, poll_id: PollId) -> Option<S> {
        self.subjects.get(&poll_id)
    }

    pub fn commitment(&self, poll_id: PollId, voter: &AccountId) -> Option<Commitment> {
        self.commitments.get(&(poll_id, voter.clone()))
    }

    pub fn last_poll_id(&self) -> PollId {
        self.last_poll_id
    }

    /// Records a commitment and locks `stake` in the voter's balance.
    pub fn commit<B: BalanceProvider>(
        &mut self,
        poll_id: PollId,
        voter: &AccountId,
        hash: CryptoHash,
        stake: Balance,
        now: u64,
        balances: &mut B,
    ) -> Result<(), PollError> {
        let mut poll = self.poll(poll_id)?;
        if poll.phase(now) != Phase::Open {
            return Err(PollError::PollNotOpen);
        }
        if stake == 0 {
            return Err(PollError::InvalidStakeAmount);
        }
        let key = (poll_id, voter.clone());
        if self.commitments.contains_key(&key) {
            return Err(PollError::AlreadyCommitted);
        }
        if stake > balances.available(voter) {
            return Err(PollError::InsufficientBalance);
        }

        balances.lock(voter, stake)?;
        poll.committed += stake;
        self.voters.insert(&(poll_id, poll.voters), voter);
        poll.voters += 1;
        self.commitments.insert(
            &key,
            &Commitment {
                hash,
                stake,
                revealed: None,
            },
        );
        self.polls.insert(&poll_id, &poll);
        Ok(())
    }

    /// Reveals a previously committed vote. Returns the revealed stake.
    pub fn reveal(
        &mut self,
        poll_id: PollId,
        voter: &AccountId,
        vote: Vote,
        salt: u128,
        now: u64,
    ) -> Result<Balance, PollError> {
        let mut poll = self.poll(poll_id)?;
        if poll.phase(now) != Phase::Revealing {
            return Err(PollError::PollNotRevealing);
        }
        let key = (poll_id, voter.clone());
        let mut c = self
            .commitments
            .get(&key)
            .ok_or(PollError::NoCommitment)?;
        if c.is_revealed() {
            return Err(PollError::AlreadyRevealed);
        }
        if commit_hash(vote, salt) != c.hash {
            return Err(PollError::RevealMismatch);
        }

        c.revealed = Some(vote);
        match vote {
            Vote::Yes => poll.revealed_yes += c.stake,
            Vote::No => poll.revealed_no += c.stake,
        }
        poll.revealed_count += 1;
        self.commitments.insert(&key, &c);
        self.polls.insert(&poll_id, &poll);
        Ok(c.stake)
    }

    pub fn tally(&self, poll_id: PollId) -> Result<Tally, PollError> {
        Ok(self.poll(poll_id)?.tally())
    }

    /// Final outcome of a poll. Fails with `PollNotClosed` before the reveal deadline.
    pub fn closed_outcome(&self, poll_id: PollId, now: u64) -> Result<PollOutcome, PollError> {
        let poll = self.poll(poll_id)?;
        if poll.phase(now) != Phase::Closed {
            return Err(PollError::PollNotClosed);
        }
        Ok(poll.outcome())
    }

    /// Settles a closed poll, visiting at most `limit` voters (at least one). Every voter
    /// is visited twice: losers and non-revealers forfeit their stake to the `pool` on the
    /// first pass, winners get their stake back plus their share from the pool on the
    /// second. Returns `Settlement::InProgress` until all visits are done, and
    /// `Settlement::NoOp` once the poll is settled.
    pub fn settle<B: BalanceProvider>(
        &mut self,
        poll_id: PollId,
        now: u64,
        pool: &AccountId,
        limit: u32,
        balances: &mut B,
    ) -> Result<Settlement, PollError> {
        let mut poll = self.poll(poll_id)?;
        if poll.phase(now) != Phase::Closed {
            return Err(PollError::PollNotClosed);
        }
        if poll.settled {
            return Ok(Settlement::NoOp);
        }

        let outcome = poll.outcome();
        let rule = PayoutRule::new(outcome, poll.committed, poll.revealed_yes, poll.revealed_no);
        let voters = u64::from(poll.voters);
        let visits = 2 * voters;
        let end = poll
            .settle_cursor
            .saturating_add(u64::from(limit.max(1)))
            .min(visits);

        let mut payouts = Vec::new();
        for visit in poll.settle_cursor..end {
            let forfeit_pass = visit < voters;
            let voter = self
                .voters
                .get(&(poll_id, (visit % voters) as u32))
                .unwrap_or_else(|| env::panic_str("poll voter is missing"));
            let c = self
                .commitment(poll_id, &voter)
                .unwrap_or_else(|| env::panic_str("commitment of a poll voter is missing"));
            let wins = rule.wins(c.revealed);
            if wins == forfeit_pass {
                continue;
            }

            balances.unlock(&voter, c.stake)?;
            let credited = rule.credited(c.stake, c.revealed);
            if wins {
                if credited > c.stake {
                    balances.transfer(pool, &voter, credited - c.stake)?;
                }
                poll.credited += credited;
            } else {
                balances.transfer(&voter, pool, c.stake)?;
            }
            payouts.push(Payout {
                account: voter,
                stake: c.stake.into(),
                credited: credited.into(),
            });
        }

        poll.settle_cursor = end;
        poll.settled = end == visits;
        if poll.credited > poll.committed {
            env::panic_str("credited stake exceeds the committed stake");
        }
        self.polls.insert(&poll_id, &poll);

        let report = SettlementReport {
            poll_id,
            outcome,
            total_committed: poll.committed.into(),
            winning_stake: rule.winning_stake().into(),
            payouts,
            remaining: visits - end,
            credited: poll.credited.into(),
            to_pool: if poll.settled {
                (poll.committed - poll.credited).into()
            } else {
                U128(0)
            },
        };
        if poll.settled {
            Ok(Settlement::Settled(report))
        } else {
            Ok(Settlement::InProgress(report))
        }
    }
}
