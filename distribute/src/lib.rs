use near_sdk::borsh::{self, BorshDeserialize, BorshSerialize};
use near_sdk::collections::{LookupMap, LookupSet, Vector};
use near_sdk::json_types::U128;
use near_sdk::{env, near_bindgen, AccountId, Balance, PanicOnDefault};

use plcr::PollLedger;

pub use crate::errors::*;
pub use crate::events::*;
pub use crate::ledger::*;
pub use crate::settings::{Settings, SettingsView, TrackParams, VSettings};
pub use crate::storage::*;

mod coordinator;
mod errors;
mod events;
mod ledger;
mod router;
mod settings;
mod storage;
mod voting;

#[cfg(test)]
mod tests;

/// Max number of records returned by a single `records` query.
pub const MAX_RECORDS_LIMIT: u64 = 100;
/// Voter visits done by a `settle` call when no limit is given.
pub const SETTLE_LIMIT: u32 = 100;

pub const MILI_NEAR: Balance = 1_000_000_000_000_000_000_000;
/// Storage deposit required by `register`: the registration entry and a balance row.
pub const REGISTER_DEPOSIT: Balance = 3 * MILI_NEAR;
/// Storage deposit required by a vote commit: the commitment and the voter index entry.
pub const COMMIT_DEPOSIT: Balance = 3 * MILI_NEAR;

#[near_bindgen]
#[derive(BorshDeserialize, BorshSerialize, PanicOnDefault)]
pub struct Contract {
    /// Account authorized to register projects, feed attestations, route tasks and issue
    /// capital tokens.
    pub authority: AccountId,
    pub(crate) settings: VSettings,
    /// Commit-reveal polls of both tracks, keyed by (task, axis, track).
    pub(crate) polls: PollLedger<PollKey>,
    /// Capital token balances.
    pub(crate) tokens: Ledger,
    pub(crate) reputation: Ledger,
    /// Accounts which received the initial reputation.
    pub(crate) registered: LookupSet<AccountId>,
    pub(crate) projects: LookupMap<ProjectId, Project>,
    pub(crate) tasks: LookupMap<TaskId, Task>,
    /// Append-only log of routing, finalization and settlement records.
    pub(crate) records: Vector<EventKind>,
    pub(crate) last_project_id: ProjectId,
    pub(crate) last_task_id: TaskId,
}

pub(crate) fn require_deposit(required: Balance) -> Result<(), Error> {
    if env::attached_deposit() < required {
        return Err(Error::RequiredDeposit(required));
    }
    Ok(())
}

// Implement the contract structure
#[near_bindgen]
impl Contract {
    /// @authority: account authorized to manage projects, attestations and token issuance.
    #[init]
    pub fn new(authority: AccountId) -> Self {
        Self {
            authority,
            settings: Settings::default().into(),
            polls: PollLedger::new(StorageKey::Polls),
            tokens: Ledger::new(StorageKey::TokenBalances),
            reputation: Ledger::new(StorageKey::ReputationBalances),
            registered: LookupSet::new(StorageKey::Registered),
            projects: LookupMap::new(StorageKey::Projects),
            tasks: LookupMap::new(StorageKey::Tasks),
            records: Vector::new(StorageKey::Records),
            last_project_id: 0,
            last_task_id: 0,
        }
    }

    /**********
     * QUERIES
     **********/

    /// Public view method to read current settings [`SettingsView`] of this contract
    pub fn view_settings(&self) -> SettingsView {
        Settings::from(&self.settings).into()
    }

    pub fn balance(&self, track: Track, account: AccountId) -> BalanceView {
        self.ledger(track).balance(&account).into()
    }

    /// Balance of the settlement pool: dust and forfeits nobody could claim.
    pub fn pool_balance(&self, track: Track) -> BalanceView {
        self.ledger(track).balance(&env::current_account_id()).into()
    }

    /// Total amount issued on the given track.
    pub fn total_supply(&self, track: Track) -> U128 {
        self.ledger(track).total_supply().into()
    }

    pub fn is_registered(&self, account: AccountId) -> bool {
        self.registered.contains(&account)
    }

    pub fn project(&self, project_id: ProjectId) -> Option<ProjectView> {
        self.projects.get(&project_id).map(|p| ProjectView {
            id: project_id,
            tasks: p.tasks,
        })
    }

    pub fn task(&self, task_id: TaskId) -> Option<TaskView> {
        self.tasks.get(&task_id).map(|t| t.to_view(task_id))
    }

    /// Returns records from the append-only log, starting at `from_index`.
    /// At most `MAX_RECORDS_LIMIT` records are returned.
    pub fn records(&self, from_index: u64, limit: u64) -> Vec<EventKind> {
        let end = from_index
            .saturating_add(limit.min(MAX_RECORDS_LIMIT))
            .min(self.records.len());
        (from_index..end)
            .filter_map(|i| self.records.get(i))
            .collect()
    }

    /**********
     * TRANSACTIONS
     **********/

    /// Updates specified settings [`SettingsView`] for this smart contract.
    /// Settings are used for polls opened after the update.
    #[handle_result]
    pub fn update_settings(&mut self, settings_json: SettingsView) -> Result<(), Error> {
        self.assert_authority()?;
        self.settings = self.settings.apply_changes(settings_json)?;
        Ok(())
    }

    /// Grants the initial reputation to the caller. Can be called once per account.
    /// Requires `REGISTER_DEPOSIT` to cover the storage.
    #[payable]
    #[handle_result]
    pub fn register(&mut self) -> Result<(), Error> {
        require_deposit(REGISTER_DEPOSIT)?;
        let account = env::predecessor_account_id();
        if self.registered.contains(&account) {
            return Err(Error::AlreadyRegistered);
        }
        let amount = Settings::from(&self.settings).initial_reputation;
        self.reputation.credit(&account, amount)?;
        self.registered.insert(&account);
        emit_event(&EventKind::ReputationRegistered(Credited {
            account,
            amount: amount.into(),
        }));
        Ok(())
    }

    /// Credits capital tokens bought on the bonding curve.
    #[handle_result]
    pub fn mint_tokens(&mut self, account: AccountId, amount: U128) -> Result<(), Error> {
        self.assert_authority()?;
        self.tokens.credit(&account, amount.0)?;
        emit_event(&EventKind::TokensMinted(Credited { account, amount }));
        Ok(())
    }

    /// Registers a project with an ordered list of task descriptions.
    #[handle_result]
    pub fn add_project(&mut self, tasks: Vec<String>) -> Result<ProjectId, Error> {
        self.assert_authority()?;
        self.last_project_id += 1;
        let project_id = self.last_project_id;
        let mut task_ids = Vec::with_capacity(tasks.len());
        for (index, description) in tasks.into_iter().enumerate() {
            self.last_task_id += 1;
            let task_id = self.last_task_id;
            self.tasks.insert(
                &task_id,
                &Task {
                    project: project_id,
                    index: index as u32,
                    description,
                    attestation: Attestation::default(),
                    category: None,
                    axis: None,
                    polls: None,
                    outcome: Outcome::Unresolved,
                },
            );
            task_ids.push(task_id);
        }
        self.projects
            .insert(&project_id, &Project { tasks: task_ids });
        env::log_str(&format!("project {} registered", project_id));
        Ok(project_id)
    }

    /**********
     * INTERNAL
     **********/

    fn assert_authority(&self) -> Result<(), Error> {
        if self.authority != env::predecessor_account_id() {
            return Err(Error::NotAuthority);
        }
        Ok(())
    }

    pub(crate) fn ledger(&self, track: Track) -> &Ledger {
        match track {
            Track::Token => &self.tokens,
            Track::Reputation => &self.reputation,
        }
    }

    pub(crate) fn get_task(&self, task_id: TaskId) -> Result<Task, Error> {
        self.tasks.get(&task_id).ok_or(Error::TaskNotFound)
    }

    /// Emits the event and appends it to the record log.
    pub(crate) fn record(&mut self, event: EventKind) {
        emit_event(&event);
        self.records.push(&event);
    }
}
