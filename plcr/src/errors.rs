use near_sdk::env::panic_str;
use near_sdk::FunctionError;

/// Poll ledger errors
#[cfg_attr(not(target_arch = "wasm32"), derive(PartialEq))]
#[derive(Debug)]
pub enum PollError {
    PollNotFound,
    DuplicatePoll,
    PollNotOpen,
    PollNotRevealing,
    PollNotClosed,
    AlreadyCommitted,
    AlreadyRevealed,
    NoCommitment,
    RevealMismatch,
    InsufficientBalance,
    InvalidStakeAmount,
    InvalidWindow,
    InvalidQuorum,
}

impl FunctionError for PollError {
    fn panic(&self) -> ! {
        match self {
            PollError::PollNotFound => panic_str("poll not found"),
            PollError::DuplicatePoll => panic_str("poll for the subject already exists"),
            PollError::PollNotOpen => panic_str("poll is not accepting commits"),
            PollError::PollNotRevealing => panic_str("poll is not accepting reveals"),
            PollError::PollNotClosed => panic_str("poll is not closed yet"),
            PollError::AlreadyCommitted => panic_str("voter already committed to this poll"),
            PollError::AlreadyRevealed => panic_str("vote already revealed"),
            PollError::NoCommitment => panic_str("voter has no commitment in this poll"),
            PollError::RevealMismatch => {
                panic_str("revealed vote and salt don't match the commitment")
            }
            PollError::InsufficientBalance => panic_str("not enough available balance"),
            PollError::InvalidStakeAmount => panic_str("stake must be a positive amount"),
            PollError::InvalidWindow => {
                panic_str("commit and reveal windows must be positive and fit u64")
            }
            PollError::InvalidQuorum => panic_str("quorum must be a percent between 0 and 100"),
        }
    }
}
