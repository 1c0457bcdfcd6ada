use std::fmt;

use near_sdk::borsh::{self, BorshDeserialize, BorshSerialize};
use near_sdk::env;
use near_sdk::json_types::U128;
use near_sdk::serde::{Deserialize, Serialize};
use near_sdk::AccountId;

use plcr::{PollId, PollOutcome, Vote};

use crate::{Axis, Category, Outcome, PollPair, TaskId, Track};

pub const EVENT_STANDARD: &str = "distribute";
pub const EVENT_VERSION: &str = "1.0.0";

pub(crate) fn emit_event(event: &EventKind) {
    env::log_str(&Event::from(event).to_string());
}

/// Enum that represents the data type of the EventLog. Outcome and settlement events are
/// also kept in the contract record log.
#[derive(BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq, Clone))]
#[serde(tag = "event", content = "data")]
#[serde(rename_all = "snake_case")]
#[serde(crate = "near_sdk::serde")]
pub enum EventKind {
    TaskRouted(TaskRouted),
    PollOpened(PollOpened),
    VoteCommitted(VoteCommitted),
    VoteRevealed(VoteRevealed),
    TaskFinalized(TaskFinalized),
    PollSettled(PollSettled),
    ReputationRegistered(Credited),
    TokensMinted(Credited),
}

/// NEP-297 event envelope.
#[derive(Serialize)]
#[serde(crate = "near_sdk::serde")]
pub struct Event<'a> {
    pub standard: &'static str,
    pub version: &'static str,

    // `flatten` to not have "event": {<EventKind>} in the JSON, just have the contents of {<EventKind>}.
    #[serde(flatten)]
    pub event: &'a EventKind,
}

impl<'a> From<&'a EventKind> for Event<'a> {
    fn from(event: &'a EventKind) -> Self {
        Self {
            standard: EVENT_STANDARD,
            version: EVENT_VERSION,
            event,
        }
    }
}

impl fmt::Display for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!(
            "EVENT_JSON:{}",
            &serde_json::to_string(self).map_err(|_| fmt::Error)?
        ))
    }
}

#[derive(BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq, Clone))]
#[serde(crate = "near_sdk::serde")]
pub struct TaskRouted {
    pub task_id: TaskId,
    pub category: Category,
    /// axis the task outcome is recorded on, None for `neither`
    pub axis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polls: Option<PollPair>,
}

#[derive(BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq, Clone))]
#[serde(crate = "near_sdk::serde")]
pub struct PollOpened {
    pub poll_id: PollId,
    pub task_id: TaskId,
    pub axis: Axis,
    pub track: Track,
    pub commit_deadline: u64,
    pub reveal_deadline: u64,
}

#[derive(BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq, Clone))]
#[serde(crate = "near_sdk::serde")]
pub struct VoteCommitted {
    pub poll_id: PollId,
    pub voter: AccountId,
    pub stake: U128,
}

#[derive(BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq, Clone))]
#[serde(crate = "near_sdk::serde")]
pub struct VoteRevealed {
    pub poll_id: PollId,
    pub voter: AccountId,
    pub vote: Vote,
    pub stake: U128,
}

#[derive(BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq, Clone))]
#[serde(crate = "near_sdk::serde")]
pub struct TaskFinalized {
    pub task_id: TaskId,
    pub axis: Axis,
    pub outcome: Outcome,
}

#[derive(BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq, Clone))]
#[serde(crate = "near_sdk::serde")]
pub struct PollSettled {
    pub poll_id: PollId,
    pub track: Track,
    pub outcome: PollOutcome,
    pub total_committed: U128,
    pub credited: U128,
    pub to_pool: U128,
}

#[derive(BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq, Clone))]
#[serde(crate = "near_sdk::serde")]
pub struct Credited {
    pub account: AccountId,
    pub amount: U128,
}
