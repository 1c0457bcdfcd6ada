use plcr::{poll_deadlines, Phase, PollId};

use crate::*;

const TRACKS: [Track; 2] = [Track::Token, Track::Reputation];

impl Contract {
    /// Opens the token and the reputation poll of a contested task axis, each with its
    /// own track parameters. Parameters of both tracks are checked before any poll is
    /// opened.
    pub(crate) fn open_poll_pair(
        &mut self,
        task_id: TaskId,
        axis: Axis,
        settings: &Settings,
        now: u64,
    ) -> Result<PollPair, Error> {
        for track in TRACKS {
            let p = settings.track(track);
            poll_deadlines(now, p.commit_window, p.reveal_window, p.quorum)?;
        }
        Ok(PollPair {
            token: self.open_track_poll(task_id, axis, Track::Token, settings, now)?,
            reputation: self.open_track_poll(task_id, axis, Track::Reputation, settings, now)?,
        })
    }

    fn open_track_poll(
        &mut self,
        task_id: TaskId,
        axis: Axis,
        track: Track,
        settings: &Settings,
        now: u64,
    ) -> Result<PollId, Error> {
        let p = settings.track(track);
        let key = PollKey {
            task_id,
            axis,
            track,
        };
        let poll_id = self
            .polls
            .open_poll(&key, now, p.commit_window, p.reveal_window, p.quorum)?;
        let poll = self.polls.poll(poll_id)?;
        emit_event(&EventKind::PollOpened(PollOpened {
            poll_id,
            task_id,
            axis,
            track,
            commit_deadline: poll.commit_deadline,
            reveal_deadline: poll.reveal_deadline,
        }));
        Ok(poll_id)
    }

    /// Combined result of a poll pair: `passed` only if both tracks reached a `yes`
    /// majority with quorum. None until both polls are closed.
    pub(crate) fn combined_result(
        &self,
        pair: &PollPair,
        now: u64,
    ) -> Result<Option<Outcome>, Error> {
        let token = self.polls.poll(pair.token)?;
        let reputation = self.polls.poll(pair.reputation)?;
        if token.phase(now) != Phase::Closed || reputation.phase(now) != Phase::Closed {
            return Ok(None);
        }
        if token.outcome().passed() && reputation.outcome().passed() {
            Ok(Some(Outcome::Passed))
        } else {
            Ok(Some(Outcome::Failed))
        }
    }
}
