use near_sdk::json_types::{Base64VecU8, U128};
use near_sdk::{env, near_bindgen, AccountId, CryptoHash};

use plcr::{
    CommitmentView, PollError, PollId, PollLedger, PollView, Settlement, Tally, Vote,
};

use crate::*;

#[near_bindgen]
impl Contract {
    /**********
     * QUERIES
     **********/

    #[handle_result]
    pub fn get_tally(&self, poll_id: PollId) -> Result<Tally, Error> {
        Ok(self.polls.tally(poll_id)?)
    }

    /// Poll with the phase derived at the current block time.
    pub fn poll(&self, poll_id: PollId) -> Option<PollView> {
        self.polls
            .poll(poll_id)
            .ok()
            .map(|p| p.to_view(poll_id, env::block_timestamp_ms()))
    }

    pub fn commitment(&self, poll_id: PollId, voter: AccountId) -> Option<CommitmentView> {
        self.polls.commitment(poll_id, &voter).map(Into::into)
    }

    /// Helper to compute the commitment for `commit_vote`. Don't send your salt to an RPC
    /// node you don't trust, compute the hash locally when possible.
    pub fn commit_hash(&self, vote: Vote, salt: U128) -> Base64VecU8 {
        Base64VecU8(plcr::commit_hash(vote, salt.0).to_vec())
    }

    /**********
     * TRANSACTIONS
     **********/

    /// Commits a hidden vote with `stake` of the poll track currency. The stake is locked
    /// until the poll is settled and forfeited if the vote is never revealed.
    /// `commit_hash` must be `keccak256(int256(vote) ++ int256(salt))`, see `commit_hash`.
    /// Requires `COMMIT_DEPOSIT` to cover the storage.
    #[payable]
    #[handle_result]
    pub fn commit_vote(
        &mut self,
        poll_id: PollId,
        commit_hash: Base64VecU8,
        stake: U128,
    ) -> Result<(), Error> {
        require_deposit(COMMIT_DEPOSIT)?;
        let voter = env::predecessor_account_id();
        let key = self
            .polls
            .subject(poll_id)
            .ok_or(PollError::PollNotFound)?;
        let hash: CryptoHash = commit_hash
            .0
            .try_into()
            .map_err(|_| Error::InvalidCommitHash)?;

        let (polls, ledger) = self.polls_and_ledger(key.track);
        polls.commit(
            poll_id,
            &voter,
            hash,
            stake.0,
            env::block_timestamp_ms(),
            ledger,
        )?;
        emit_event(&EventKind::VoteCommitted(VoteCommitted {
            poll_id,
            voter,
            stake,
        }));
        Ok(())
    }

    /// Reveals a committed vote during the reveal phase.
    #[handle_result]
    pub fn reveal_vote(&mut self, poll_id: PollId, vote: Vote, salt: U128) -> Result<(), Error> {
        let voter = env::predecessor_account_id();
        let stake = self
            .polls
            .reveal(poll_id, &voter, vote, salt.0, env::block_timestamp_ms())?;
        emit_event(&EventKind::VoteRevealed(VoteRevealed {
            poll_id,
            voter,
            vote,
            stake: stake.into(),
        }));
        Ok(())
    }

    /// Same as `commit_vote`, with the poll resolved from the task validation axis.
    /// Fails with `NoSuchPoll` when the task was not routed to a vote on that axis.
    #[payable]
    #[handle_result]
    pub fn commit_task_vote(
        &mut self,
        task_id: TaskId,
        axis: Axis,
        track: Track,
        commit_hash: Base64VecU8,
        stake: U128,
    ) -> Result<(), Error> {
        let poll_id = self.task_poll(task_id, axis, track)?;
        self.commit_vote(poll_id, commit_hash, stake)
    }

    /// Same as `reveal_vote`, with the poll resolved from the task validation axis.
    #[handle_result]
    pub fn reveal_task_vote(
        &mut self,
        task_id: TaskId,
        axis: Axis,
        track: Track,
        vote: Vote,
        salt: U128,
    ) -> Result<(), Error> {
        let poll_id = self.task_poll(task_id, axis, track)?;
        self.reveal_vote(poll_id, vote, salt)
    }

    /// Redistributes the stake of a closed poll, processing at most `limit` voter visits
    /// (default `SETTLE_LIMIT`). Large polls are settled over several calls: the result is
    /// `in_progress` until every voter was processed. Requires both polls of the task axis
    /// to be closed, and finalizes the task if it isn't final yet. Settling a settled poll
    /// is a no-op.
    #[handle_result]
    pub fn settle(&mut self, poll_id: PollId, limit: Option<u32>) -> Result<Settlement, Error> {
        let key = self
            .polls
            .subject(poll_id)
            .ok_or(PollError::PollNotFound)?;
        let now = env::block_timestamp_ms();
        self.finalize(key.task_id, now)?;

        let pool = env::current_account_id();
        let limit = limit.unwrap_or(SETTLE_LIMIT);
        let (polls, ledger) = self.polls_and_ledger(key.track);
        let settlement = polls.settle(poll_id, now, &pool, limit, ledger)?;
        if let Settlement::Settled(r) = &settlement {
            self.record(EventKind::PollSettled(PollSettled {
                poll_id,
                track: key.track,
                outcome: r.outcome,
                total_committed: r.total_committed,
                credited: r.credited,
                to_pool: r.to_pool,
            }));
        }
        Ok(settlement)
    }

    /**********
     * INTERNAL
     **********/

    fn polls_and_ledger(&mut self, track: Track) -> (&mut PollLedger<PollKey>, &mut Ledger) {
        let ledger = match track {
            Track::Token => &mut self.tokens,
            Track::Reputation => &mut self.reputation,
        };
        (&mut self.polls, ledger)
    }
}
