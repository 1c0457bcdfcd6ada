use near_sdk::json_types::U128;
use near_sdk::{env, near_bindgen, Balance};

use plcr::{PollError, PollId};

use crate::*;

impl Category {
    /// Classifies attestations. A side counts only if its attested stake reaches
    /// `min_attestation` (at least 1). Ties between counted sides go to `FalseMore`.
    pub fn classify(attestation: &Attestation, min_attestation: Balance) -> Self {
        let min = min_attestation.max(1);
        match (attestation.yes >= min, attestation.no >= min) {
            (true, false) => Category::TrueOnly,
            (false, true) => Category::FalseOnly,
            (true, true) if attestation.yes > attestation.no => Category::TrueMore,
            (true, true) => Category::FalseMore,
            (false, false) => Category::Neither,
        }
    }

    /// Axis the task outcome is recorded on.
    pub fn axis(&self) -> Option<Axis> {
        match self {
            Category::TrueOnly | Category::TrueMore => Some(Axis::ValidateYes),
            Category::FalseOnly | Category::FalseMore => Some(Axis::ValidateNo),
            Category::Neither => None,
        }
    }

    /// Axis which has to be decided by a poll pair. None when no vote is needed.
    pub fn contested_axis(&self) -> Option<Axis> {
        match self {
            Category::TrueMore | Category::FalseMore => self.axis(),
            _ => None,
        }
    }

    /// Outcome set at routing time, without a vote.
    pub fn direct_outcome(&self) -> Outcome {
        match self {
            Category::TrueOnly => Outcome::Passed,
            Category::FalseOnly => Outcome::Failed,
            _ => Outcome::Unresolved,
        }
    }
}

#[near_bindgen]
impl Contract {
    /**********
     * QUERIES
     **********/

    /// Outcome of the task on the given validation axis. Axes the task was not routed to
    /// are `unresolved`. For contested tasks the combined result of both polls is returned
    /// as soon as both are closed, even before it's finalized.
    #[handle_result]
    pub fn get_task_outcome(&self, task_id: TaskId, axis: Axis) -> Result<Outcome, Error> {
        let task = self.get_task(task_id)?;
        if task.axis != Some(axis) {
            return Ok(Outcome::Unresolved);
        }
        if task.is_final() {
            return Ok(task.outcome);
        }
        match task.polls {
            Some(pair) => Ok(self
                .combined_result(&pair, env::block_timestamp_ms())?
                .unwrap_or(Outcome::Unresolved)),
            None => Ok(Outcome::Unresolved),
        }
    }

    /// Poll opened for the task axis on the given track.
    #[handle_result]
    pub fn task_poll(&self, task_id: TaskId, axis: Axis, track: Track) -> Result<PollId, Error> {
        self.get_task(task_id)?;
        self.polls
            .poll_id(&PollKey {
                task_id,
                axis,
                track,
            })
            .ok_or(Error::NoSuchPoll)
    }

    /// Aggregated project outcome: `passed` when every task passed, `failed` when any task
    /// failed, `unresolved` otherwise.
    #[handle_result]
    pub fn project_outcome(&self, project_id: ProjectId) -> Result<Outcome, Error> {
        let project = self.projects.get(&project_id).ok_or(Error::ProjectNotFound)?;
        let mut outcome = Outcome::Passed;
        for task_id in project.tasks {
            match self.get_task_outcome_any_axis(task_id)? {
                Outcome::Failed => return Ok(Outcome::Failed),
                Outcome::Unresolved => outcome = Outcome::Unresolved,
                Outcome::Passed => (),
            }
        }
        Ok(outcome)
    }

    /**********
     * TRANSACTIONS
     **********/

    /// Adds attested stake to the task. Attestations accumulate until the task is routed.
    #[handle_result]
    pub fn record_attestation(&mut self, task_id: TaskId, yes: U128, no: U128) -> Result<(), Error> {
        self.assert_authority()?;
        let mut task = self.get_task(task_id)?;
        if task.category.is_some() {
            return Err(Error::AlreadyRouted);
        }
        task.attestation.yes = task.attestation.yes.checked_add(yes.0).ok_or(Error::Overflow)?;
        task.attestation.no = task.attestation.no.checked_add(no.0).ok_or(Error::Overflow)?;
        self.tasks.insert(&task_id, &task);
        Ok(())
    }

    /// Classifies the task once from its attestations. Contested tasks get a token and a
    /// reputation poll on the contested axis, unanimous tasks are decided directly.
    #[handle_result]
    pub fn route_task(&mut self, task_id: TaskId) -> Result<Category, Error> {
        self.assert_authority()?;
        let mut task = self.get_task(task_id)?;
        if task.category.is_some() {
            return Err(Error::AlreadyRouted);
        }

        let settings = Settings::from(&self.settings);
        let category = Category::classify(&task.attestation, settings.min_attestation);
        let now = env::block_timestamp_ms();
        let polls = category
            .contested_axis()
            .map(|axis| self.open_poll_pair(task_id, axis, &settings, now))
            .transpose()?;

        task.category = Some(category);
        task.axis = category.axis();
        task.polls = polls;
        task.outcome = category.direct_outcome();
        self.tasks.insert(&task_id, &task);

        self.record(EventKind::TaskRouted(TaskRouted {
            task_id,
            category,
            axis: task.axis,
            polls,
        }));
        if let (true, Some(axis)) = (task.is_final(), task.axis) {
            self.record(EventKind::TaskFinalized(TaskFinalized {
                task_id,
                axis,
                outcome: task.outcome,
            }));
        }
        Ok(category)
    }

    /// Persists the combined result of a contested task. Anyone can call it once both
    /// polls are closed. Returns the current outcome for tasks which are already final or
    /// don't have polls.
    #[handle_result]
    pub fn finalize_task(&mut self, task_id: TaskId) -> Result<Outcome, Error> {
        self.finalize(task_id, env::block_timestamp_ms())
    }

    /**********
     * INTERNAL
     **********/

    pub(crate) fn finalize(&mut self, task_id: TaskId, now: u64) -> Result<Outcome, Error> {
        let mut task = self.get_task(task_id)?;
        if task.is_final() {
            return Ok(task.outcome);
        }
        let (Some(axis), Some(pair)) = (task.axis, task.polls) else {
            return Ok(task.outcome);
        };
        let outcome = self
            .combined_result(&pair, now)?
            .ok_or(PollError::PollNotClosed)?;

        task.outcome = outcome;
        self.tasks.insert(&task_id, &task);
        self.record(EventKind::TaskFinalized(TaskFinalized {
            task_id,
            axis,
            outcome,
        }));
        Ok(outcome)
    }

    fn get_task_outcome_any_axis(&self, task_id: TaskId) -> Result<Outcome, Error> {
        match self.get_task(task_id)?.axis {
            Some(axis) => self.get_task_outcome(task_id, axis),
            None => Ok(Outcome::Unresolved),
        }
    }
}
