use near_sdk::json_types::{Base64VecU8, U128};
use near_sdk::{test_utils::VMContextBuilder, testing_env, AccountId, VMContext};

use plcr::{commit_hash, Vote, MSECOND};

use crate::{Contract, TaskId, COMMIT_DEPOSIT, REGISTER_DEPOSIT};

pub const START: u64 = 1_000_000;
pub const DAY: u64 = 86_400_000;
/// Default commit and reveal windows.
pub const WINDOW: u64 = 7 * DAY;
pub const SALT: u128 = 10000;

/// Attached to every call, covers both storage deposits.
pub const DEPOSIT: u128 = REGISTER_DEPOSIT + COMMIT_DEPOSIT;

pub const TOKENS: u128 = 1000;
pub const REPUTATION: u128 = 10_000;

pub fn authority() -> AccountId {
    AccountId::new_unchecked("authority.near".to_string())
}

pub fn contract_account() -> AccountId {
    AccountId::new_unchecked("distribute.near".to_string())
}

pub fn alice() -> AccountId {
    AccountId::new_unchecked("alice.near".to_string())
}

pub fn bob() -> AccountId {
    AccountId::new_unchecked("bob.near".to_string())
}

pub fn carol() -> AccountId {
    AccountId::new_unchecked("carol.near".to_string())
}

pub fn voters() -> [AccountId; 3] {
    [alice(), bob(), carol()]
}

pub fn hash(vote: Vote, salt: u128) -> Base64VecU8 {
    Base64VecU8(commit_hash(vote, salt).to_vec())
}

pub fn set_caller(ctx: &mut VMContext, caller: &AccountId) {
    ctx.predecessor_account_id = caller.clone();
    testing_env!(ctx.clone());
}

pub fn set_deposit(ctx: &mut VMContext, deposit: u128) {
    ctx.attached_deposit = deposit;
    testing_env!(ctx.clone());
}

/// Sets the block time, in milliseconds.
pub fn set_time(ctx: &mut VMContext, now: u64) {
    ctx.block_timestamp = now * MSECOND;
    testing_env!(ctx.clone());
}

/// Contract with every voter holding `TOKENS` capital tokens and `REPUTATION` reputation.
pub fn setup(predecessor: &AccountId) -> (VMContext, Contract) {
    let mut ctx = VMContextBuilder::new()
        .current_account_id(contract_account())
        .predecessor_account_id(authority())
        .block_timestamp(START * MSECOND)
        .attached_deposit(DEPOSIT)
        .is_view(false)
        .build();
    testing_env!(ctx.clone());
    let mut ctr = Contract::new(authority());
    for v in voters() {
        ctr.mint_tokens(v, U128(TOKENS)).unwrap();
    }
    for v in voters() {
        set_caller(&mut ctx, &v);
        ctr.register().unwrap();
    }
    set_caller(&mut ctx, predecessor);
    (ctx, ctr)
}

/// Tasks of the project created by `setup_project`, one per validation category.
pub struct ProjectTasks {
    pub true_only: TaskId,
    pub false_only: TaskId,
    pub true_more: TaskId,
    pub false_more: TaskId,
    pub neither: TaskId,
}

/// Registers a project with one task per category and routes all of them at `START`.
/// Routing order opens polls 1 (token) and 2 (reputation) for `true_more`, and polls 3 and
/// 4 for `false_more`.
pub fn setup_project(ctx: &mut VMContext, ctr: &mut Contract) -> ProjectTasks {
    let caller = ctx.predecessor_account_id.clone();
    set_caller(ctx, &authority());
    let project = ctr
        .add_project(vec![
            "valTrueOnly".to_string(),
            "valFalseOnly".to_string(),
            "valTrueMore".to_string(),
            "valFalseMore".to_string(),
            "valNeither".to_string(),
        ])
        .unwrap();
    let ids = ctr.project(project).unwrap().tasks;
    let attestations = [(100, 0), (0, 100), (100, 50), (50, 100), (0, 0)];
    for (task_id, (yes, no)) in ids.iter().zip(attestations) {
        ctr.record_attestation(*task_id, U128(yes), U128(no)).unwrap();
        ctr.route_task(*task_id).unwrap();
    }
    set_caller(ctx, &caller);
    ProjectTasks {
        true_only: ids[0],
        false_only: ids[1],
        true_more: ids[2],
        false_more: ids[3],
        neither: ids[4],
    }
}
