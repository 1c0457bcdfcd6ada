use near_sdk::env::panic_str;
use near_sdk::{Balance, FunctionError};

use plcr::PollError;

/// Contract errors
#[cfg_attr(not(target_arch = "wasm32"), derive(PartialEq))]
#[derive(Debug)]
pub enum Error {
    Poll(PollError),
    /// no poll was opened for the task, axis and track
    NoSuchPoll,
    TaskNotFound,
    ProjectNotFound,
    AlreadyRouted,
    NotAuthority,
    AlreadyRegistered,
    InvalidCommitHash,
    /// attached deposit is below the required amount
    RequiredDeposit(Balance),
    /// balance or attestation amount overflows u128
    Overflow,
}

impl FunctionError for Error {
    fn panic(&self) -> ! {
        match self {
            Error::Poll(e) => e.panic(),
            Error::NoSuchPoll => panic_str("no poll is open for the task validation axis"),
            Error::TaskNotFound => panic_str("task not found"),
            Error::ProjectNotFound => panic_str("project not found"),
            Error::AlreadyRouted => panic_str("task validation was already routed"),
            Error::NotAuthority => panic_str("not authorized: required authority"),
            Error::AlreadyRegistered => panic_str("account already registered"),
            Error::InvalidCommitHash => panic_str("commit hash must be 32 bytes"),
            Error::RequiredDeposit(min_deposit) => {
                panic_str(&format!("deposit must be at least {}yN", min_deposit))
            }
            Error::Overflow => panic_str("amount overflows the total balance"),
        }
    }
}

impl From<PollError> for Error {
    fn from(e: PollError) -> Self {
        Error::Poll(e)
    }
}
