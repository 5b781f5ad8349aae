use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

use crate::geo::{Coordinate, distance};
use crate::model::{
    AnswerLabel, Question, QuestionBank, ROUNDS_PER_WALK, WalkId, WalkResult, WalkSettings,
    WalkSummary, WalkSummaryError, WaypointId,
};
use crate::waypoint::WaypointSource;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Rejected transitions. The session is left untouched when one is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WalkError {
    #[error("round {round} is still locked")]
    Locked { round: usize },

    #[error("walk has already ended")]
    Ended,

    #[error("walk is not finished yet")]
    NotFinished,

    #[error(transparent)]
    Summary(#[from] WalkSummaryError),
}

//
// ─── ROUND STATE ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundState {
    /// Waiting for the player to move far enough from the checkpoint.
    Locked,
    /// Question is open for an answer.
    Unlocked,
    /// Only reached by the final round; earlier rounds move straight on to the next `Locked`.
    Answered,
}

//
// ─── WAYPOINT ──────────────────────────────────────────────────────────────────
//

/// Visual target of a round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    id: WaypointId,
    coordinate: Coordinate,
    answered: bool,
    correct: Option<bool>,
}

impl Waypoint {
    fn new(id: WaypointId, coordinate: Coordinate) -> Self {
        Self {
            id,
            coordinate,
            answered: false,
            correct: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> WaypointId {
        self.id
    }

    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    #[must_use]
    pub fn answered(&self) -> bool {
        self.answered
    }

    #[must_use]
    pub fn correct(&self) -> Option<bool> {
        self.correct
    }
}

/// What happened when an answer was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub waypoint_id: WaypointId,
    pub choice: AnswerLabel,
    pub correct: bool,
    pub score: u32,
    pub session_ended: bool,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// State of one ten-round walk.
///
/// Each round starts `Locked` with a checkpoint and a freshly generated waypoint at the
/// unlock distance. A position at least that far from the checkpoint unlocks the round;
/// the unlock is a latch and survives walking back. Answering moves the checkpoint to the
/// player's position and opens the next round, or ends the walk after round ten.
pub struct WalkSession {
    id: WalkId,
    settings: WalkSettings,
    bank: QuestionBank,
    current_index: usize,
    checkpoint: Coordinate,
    state: RoundState,
    score: u32,
    waypoints: Vec<Waypoint>,
    last_position: Option<Coordinate>,
    unlock_cues: u32,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl WalkSession {
    /// Start round 0 with `start` as the checkpoint.
    pub fn start(
        id: WalkId,
        bank: QuestionBank,
        start: Coordinate,
        settings: WalkSettings,
        source: &mut dyn WaypointSource,
        started_at: DateTime<Utc>,
    ) -> Self {
        let first = source.next_waypoint(start, settings.unlock_distance_m());
        Self {
            id,
            settings,
            bank,
            current_index: 0,
            checkpoint: start,
            state: RoundState::Locked,
            score: 0,
            waypoints: vec![Waypoint::new(WaypointId::for_round(0), first)],
            last_position: None,
            unlock_cues: 0,
            started_at,
            completed_at: None,
        }
    }

    /// Feed a live position. Returns `true` only on the Locked→Unlocked transition.
    ///
    /// The position is remembered as the last known fix while the walk is running.
    pub fn observe_position(&mut self, position: Coordinate) -> bool {
        if self.is_complete() {
            return false;
        }
        self.last_position = Some(position);

        if self.state != RoundState::Locked {
            return false;
        }
        if distance(position, self.checkpoint) >= self.settings.unlock_distance_m() {
            self.state = RoundState::Unlocked;
            self.unlock_cues = self.unlock_cues.saturating_add(1);
            return true;
        }
        false
    }

    /// Answer the active round.
    ///
    /// # Errors
    ///
    /// Returns `WalkError::Locked` if the round has not been unlocked and
    /// `WalkError::Ended` once the tenth round has been answered.
    pub fn submit_answer(
        &mut self,
        choice: AnswerLabel,
        source: &mut dyn WaypointSource,
        answered_at: DateTime<Utc>,
    ) -> Result<AnswerOutcome, WalkError> {
        match self.state {
            RoundState::Locked => {
                return Err(WalkError::Locked {
                    round: self.current_index,
                });
            }
            RoundState::Answered => return Err(WalkError::Ended),
            RoundState::Unlocked => {}
        }

        let index = self.current_index;
        let correct = self
            .bank
            .get(index)
            .ok_or(WalkError::Ended)?
            .is_correct(choice);
        let waypoint = self.waypoints.get_mut(index).ok_or(WalkError::Ended)?;

        waypoint.answered = true;
        waypoint.correct = Some(correct);
        let waypoint_id = waypoint.id;
        let answered_coordinate = waypoint.coordinate;

        if correct {
            self.score = self.score.saturating_add(1);
        }

        let session_ended = index + 1 >= ROUNDS_PER_WALK;
        if session_ended {
            self.state = RoundState::Answered;
            self.completed_at = Some(answered_at);
        } else {
            self.checkpoint = self.last_position.unwrap_or(answered_coordinate);
            self.current_index = index + 1;
            let next = source.next_waypoint(self.checkpoint, self.settings.unlock_distance_m());
            self.waypoints
                .push(Waypoint::new(WaypointId::for_round(self.current_index), next));
            self.state = RoundState::Locked;
        }

        Ok(AnswerOutcome {
            waypoint_id,
            choice,
            correct,
            score: self.score,
            session_ended,
        })
    }

    /// Final score once all ten rounds are answered.
    ///
    /// # Errors
    ///
    /// Returns `WalkError::NotFinished` while rounds remain.
    pub fn finalize(&self) -> Result<WalkResult, WalkError> {
        if !self.is_complete() {
            return Err(WalkError::NotFinished);
        }
        Ok(WalkResult::from_score(self.score)?)
    }

    /// Persistable summary of a finished walk.
    ///
    /// # Errors
    ///
    /// Returns `WalkError::NotFinished` while rounds remain.
    pub fn summary(&self) -> Result<WalkSummary, WalkError> {
        let result = self.finalize()?;
        let completed_at = self.completed_at.ok_or(WalkError::NotFinished)?;
        Ok(WalkSummary::from_result(
            self.id,
            self.started_at,
            completed_at,
            result,
        )?)
    }

    #[must_use]
    pub fn id(&self) -> WalkId {
        self.id
    }

    #[must_use]
    pub fn settings(&self) -> &WalkSettings {
        &self.settings
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn checkpoint(&self) -> Coordinate {
        self.checkpoint
    }

    #[must_use]
    pub fn state(&self) -> RoundState {
        self.state
    }

    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        self.state == RoundState::Unlocked
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    #[must_use]
    pub fn current_waypoint(&self) -> Option<&Waypoint> {
        self.waypoints.get(self.current_index)
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.bank.get(self.current_index)
    }

    #[must_use]
    pub fn last_position(&self) -> Option<Coordinate> {
        self.last_position
    }

    /// Number of Locked→Unlocked transitions so far; drives haptic feedback.
    #[must_use]
    pub fn unlock_cues(&self) -> u32 {
        self.unlock_cues
    }

    /// Straight-line displacement of the last fix from the checkpoint, or 0 without a fix.
    #[must_use]
    pub fn distance_moved_m(&self) -> f64 {
        self.last_position
            .map_or(0.0, |position| distance(position, self.checkpoint))
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.waypoints.iter().filter(|w| w.answered).count()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }
}

impl fmt::Debug for WalkSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalkSession")
            .field("id", &self.id)
            .field("current_index", &self.current_index)
            .field("state", &self.state)
            .field("score", &self.score)
            .field("checkpoint", &self.checkpoint)
            .field("waypoints_len", &self.waypoints.len())
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::MEAN_EARTH_RADIUS_M;
    use crate::time::fixed_now;
    use crate::waypoint::{FixedBearing, RandomWaypoints};

    fn stockholm() -> Coordinate {
        Coordinate::new(59.3293, 18.0686).unwrap()
    }

    /// Point exactly `meters` north of `origin` as measured by `distance`.
    fn north_of(origin: Coordinate, meters: f64) -> Coordinate {
        let delta = (meters / MEAN_EARTH_RADIUS_M).to_degrees();
        Coordinate::new_unchecked(origin.latitude() + delta, origin.longitude())
    }

    fn start_walk() -> WalkSession {
        WalkSession::start(
            WalkId::generate(),
            QuestionBank::fallback(),
            stockholm(),
            WalkSettings::default(),
            &mut FixedBearing(0.0),
            fixed_now(),
        )
    }

    fn unlock(session: &mut WalkSession) {
        let target = north_of(session.checkpoint(), 250.0);
        assert!(session.observe_position(target));
    }

    #[test]
    fn start_opens_locked_round_zero() {
        let session = start_walk();
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.state(), RoundState::Locked);
        assert_eq!(session.checkpoint(), stockholm());
        assert_eq!(session.waypoints().len(), 1);
        assert_eq!(session.waypoints()[0].id().value(), 1);
        let d = distance(stockholm(), session.waypoints()[0].coordinate());
        assert!((d - 200.0).abs() < 0.5);
    }

    #[test]
    fn unlocks_only_at_unlock_distance() {
        let mut session = start_walk();
        let checkpoint = session.checkpoint();

        assert!(!session.observe_position(north_of(checkpoint, 199.0)));
        assert_eq!(session.state(), RoundState::Locked);

        assert!(session.observe_position(north_of(checkpoint, 200.01)));
        assert_eq!(session.state(), RoundState::Unlocked);
    }

    #[test]
    fn unlock_latch_survives_walking_back() {
        let mut session = start_walk();
        let checkpoint = session.checkpoint();
        unlock(&mut session);

        assert!(!session.observe_position(checkpoint));
        assert!(!session.observe_position(north_of(checkpoint, 10.0)));
        assert!(session.is_unlocked());
        assert_eq!(session.unlock_cues(), 1);

        // Re-arriving far away does not fire a second cue.
        assert!(!session.observe_position(north_of(checkpoint, 500.0)));
        assert_eq!(session.unlock_cues(), 1);
    }

    #[test]
    fn answering_while_locked_is_rejected_without_changes() {
        let mut session = start_walk();
        session.observe_position(north_of(stockholm(), 50.0));
        let before = format!("{session:?}");

        let err = session
            .submit_answer(AnswerLabel::One, &mut FixedBearing(0.0), fixed_now())
            .unwrap_err();

        assert_eq!(err, WalkError::Locked { round: 0 });
        assert_eq!(format!("{session:?}"), before);
        assert_eq!(session.score(), 0);
        assert!(!session.waypoints()[0].answered());
    }

    #[test]
    fn answer_moves_checkpoint_to_live_position() {
        let mut session = start_walk();
        let here = north_of(stockholm(), 230.0);
        assert!(session.observe_position(here));

        let outcome = session
            .submit_answer(AnswerLabel::X, &mut FixedBearing(90.0), fixed_now())
            .unwrap();

        assert!(!outcome.correct);
        assert!(!outcome.session_ended);
        assert_eq!(outcome.waypoint_id.value(), 1);
        assert_eq!(session.score(), 0);
        assert_eq!(session.checkpoint(), here);
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.state(), RoundState::Locked);
        assert_eq!(session.waypoints()[0].correct(), Some(false));
        assert_eq!(session.waypoints().len(), 2);
        let d = distance(here, session.waypoints()[1].coordinate());
        assert!((d - 200.0).abs() < 0.5);
    }

    #[test]
    fn score_is_bounded_by_answered_rounds() {
        let mut session = start_walk();
        let mut source = RandomWaypoints::seeded(1);
        let mut last_score = 0;
        for round in 0..ROUNDS_PER_WALK {
            assert!(session.current_index() <= 9);
            unlock(&mut session);
            let choice = if round % 2 == 0 {
                AnswerLabel::One
            } else {
                AnswerLabel::Two
            };
            let outcome = session
                .submit_answer(choice, &mut source, fixed_now())
                .unwrap();
            assert!(outcome.score >= last_score);
            assert!(outcome.score as usize <= session.answered_count());
            last_score = outcome.score;
        }
        assert_eq!(session.score(), 5);
        assert_eq!(session.finalize().unwrap().final_score(), 5);
    }

    #[test]
    fn ten_correct_answers_are_perfect() {
        let mut session = start_walk();
        for _ in 0..ROUNDS_PER_WALK {
            unlock(&mut session);
            session
                .submit_answer(AnswerLabel::One, &mut FixedBearing(0.0), fixed_now())
                .unwrap();
        }
        let result = session.finalize().unwrap();
        assert_eq!(result.final_score(), 10);
        assert!(result.perfect());
    }

    #[test]
    fn final_round_ends_walk_without_new_waypoint() {
        let mut session = start_walk();
        for round in 0..ROUNDS_PER_WALK {
            unlock(&mut session);
            let outcome = session
                .submit_answer(AnswerLabel::Two, &mut FixedBearing(0.0), fixed_now())
                .unwrap();
            assert_eq!(outcome.session_ended, round == 9);
        }

        assert!(session.is_complete());
        assert_eq!(session.current_index(), 9);
        assert_eq!(session.state(), RoundState::Answered);
        assert_eq!(session.waypoints().len(), ROUNDS_PER_WALK);
        assert!(session.waypoints().iter().all(Waypoint::answered));

        let err = session
            .submit_answer(AnswerLabel::One, &mut FixedBearing(0.0), fixed_now())
            .unwrap_err();
        assert_eq!(err, WalkError::Ended);
        assert!(!session.observe_position(stockholm()));
        assert!(!session.finalize().unwrap().perfect());
    }

    #[test]
    fn finalize_requires_finished_walk() {
        let session = start_walk();
        assert_eq!(session.finalize().unwrap_err(), WalkError::NotFinished);
        assert_eq!(session.summary().unwrap_err(), WalkError::NotFinished);
    }

    #[test]
    fn checkpoint_falls_back_to_waypoint_without_fix() {
        let mut session = start_walk();
        // Force the unlock latch without leaving a last known position behind.
        session.state = RoundState::Unlocked;
        let target = session.waypoints()[0].coordinate();

        session
            .submit_answer(AnswerLabel::One, &mut FixedBearing(0.0), fixed_now())
            .unwrap();

        assert_eq!(session.checkpoint(), target);
    }

    #[test]
    fn summary_captures_times_and_score() {
        let mut session = start_walk();
        let finished_at = fixed_now() + chrono::Duration::minutes(45);
        for _ in 0..ROUNDS_PER_WALK {
            unlock(&mut session);
            session
                .submit_answer(AnswerLabel::One, &mut FixedBearing(0.0), finished_at)
                .unwrap();
        }
        let summary = session.summary().unwrap();
        assert_eq!(summary.walk_id(), session.id());
        assert_eq!(summary.started_at(), fixed_now());
        assert_eq!(summary.completed_at(), finished_at);
        assert!(summary.perfect());
    }
}
