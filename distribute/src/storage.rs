use near_sdk::borsh::{self, BorshDeserialize, BorshSerialize};
use near_sdk::json_types::U128;
use near_sdk::serde::{Deserialize, Serialize};
use near_sdk::{Balance, BorshStorageKey};

use plcr::PollId;

pub type ProjectId = u64;
pub type TaskId = u64;

/// Helper structure for keys of the persistent collections.
#[derive(BorshSerialize, BorshStorageKey)]
pub enum StorageKey {
    Polls,
    TokenBalances,
    ReputationBalances,
    Registered,
    Projects,
    Tasks,
    Records,
}

/// Voting weight currency. Every contested task is voted on both tracks.
#[derive(BorshSerialize, BorshDeserialize, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(crate = "near_sdk::serde", rename_all = "snake_case")]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug))]
pub enum Track {
    Token,
    Reputation,
}

/// Question a task poll adjudicates. `ValidateYes` challenges a mostly positive
/// attestation, `ValidateNo` a mostly negative one. In both cases a `yes` vote means the
/// task was completed satisfactorily.
#[derive(BorshSerialize, BorshDeserialize, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(crate = "near_sdk::serde", rename_all = "snake_case")]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug))]
pub enum Axis {
    ValidateYes,
    ValidateNo,
}

/// Identity of a poll: at most one poll per task, axis and track.
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug))]
pub struct PollKey {
    pub task_id: TaskId,
    pub axis: Axis,
    pub track: Track,
}

/// Classification of a task from its attestations, assigned once when routed.
#[derive(BorshSerialize, BorshDeserialize, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(crate = "near_sdk::serde", rename_all = "camelCase")]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug))]
pub enum Category {
    TrueOnly,
    FalseOnly,
    TrueMore,
    FalseMore,
    Neither,
}

#[derive(BorshSerialize, BorshDeserialize, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(crate = "near_sdk::serde", rename_all = "snake_case")]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug))]
pub enum Outcome {
    Passed,
    Failed,
    Unresolved,
}

/// Stake weighted attestations collected before the task is routed.
#[derive(BorshSerialize, BorshDeserialize, Default, Clone, Copy)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq))]
pub struct Attestation {
    pub yes: Balance,
    pub no: Balance,
}

#[derive(BorshSerialize, BorshDeserialize, Serialize, Deserialize, Clone, Copy)]
#[serde(crate = "near_sdk::serde")]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq))]
pub struct PollPair {
    pub token: PollId,
    pub reputation: PollId,
}

#[derive(BorshSerialize, BorshDeserialize)]
pub struct Task {
    pub project: ProjectId,
    /// position of the task in the project
    pub index: u32,
    pub description: String,
    pub attestation: Attestation,
    /// None until the task is routed
    pub category: Option<Category>,
    /// validation axis the outcome is recorded on
    pub axis: Option<Axis>,
    /// set only for contested tasks
    pub polls: Option<PollPair>,
    pub outcome: Outcome,
}

impl Task {
    pub fn is_final(&self) -> bool {
        self.outcome != Outcome::Unresolved
    }

    pub fn to_view(&self, id: TaskId) -> TaskView {
        TaskView {
            id,
            project: self.project,
            index: self.index,
            description: self.description.clone(),
            attestation_yes: self.attestation.yes.into(),
            attestation_no: self.attestation.no.into(),
            category: self.category,
            axis: self.axis,
            polls: self.polls,
            outcome: self.outcome,
        }
    }
}

#[derive(BorshSerialize, BorshDeserialize)]
pub struct Project {
    pub tasks: Vec<TaskId>,
}

#[derive(Serialize, Deserialize)]
#[serde(crate = "near_sdk::serde")]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq))]
pub struct TaskView {
    pub id: TaskId,
    pub project: ProjectId,
    pub index: u32,
    pub description: String,
    pub attestation_yes: U128,
    pub attestation_no: U128,
    pub category: Option<Category>,
    pub axis: Option<Axis>,
    pub polls: Option<PollPair>,
    pub outcome: Outcome,
}

#[derive(Serialize, Deserialize)]
#[serde(crate = "near_sdk::serde")]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq))]
pub struct ProjectView {
    pub id: ProjectId,
    pub tasks: Vec<TaskId>,
}

#[derive(Serialize, Deserialize)]
#[serde(crate = "near_sdk::serde")]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq))]
pub struct BalanceView {
    pub available: U128,
    pub locked: U128,
}
