mod balance;
mod errors;
mod ledger;
mod poll;
pub mod settlement;

use near_sdk::{env, CryptoHash};

pub use crate::balance::*;
pub use crate::errors::*;
pub use crate::ledger::*;
pub use crate::poll::*;
pub use crate::settlement::{Payout, PayoutRule, Settlement, SettlementReport};

/// 1ms in nano seconds.
pub const MSECOND: u64 = 1_000_000;

/// Polls are numbered from 1. There is no poll with id 0, so clients can use it as a
/// "missing poll" marker.
pub type PollId = u64;

/// Computes the commitment a voter submits during the commit phase:
/// `keccak256(int256(vote) ++ int256(salt))`, both words big-endian, `yes = 1`, `no = 0`.
/// This is what `solidityKeccak256(['int', 'int'], [vote, salt])` returns for the same
/// input, so hashes computed by existing clients are accepted as is.
pub fn commit_hash(vote: Vote, salt: u128) -> CryptoHash {
    let mut msg = [0u8; 64];
    msg[31] = vote.as_word();
    msg[48..].copy_from_slice(&salt.to_be_bytes());
    env::keccak256_array(&msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_hash_layout() {
        let no = commit_hash(Vote::No, 10000);
        let yes = commit_hash(Vote::Yes, 10000);
        assert_ne!(yes, no);
        assert_eq!(yes, commit_hash(Vote::Yes, 10000));
        assert_ne!(yes, commit_hash(Vote::Yes, 10001));

        // vote word, then salt word: 10000 == 0x2710
        let mut msg = [0u8; 64];
        msg[31] = 1;
        msg[62] = 0x27;
        msg[63] = 0x10;
        assert_eq!(yes.to_vec(), env::keccak256(&msg));
    }
}
