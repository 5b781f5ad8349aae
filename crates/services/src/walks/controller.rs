use tipswalk_core::Clock;
use tipswalk_core::Coordinate;
use tipswalk_core::model::{AnswerLabel, QuestionBank, WalkId, WalkResult, WalkSettings};
use tipswalk_core::walk::{self, AnswerOutcome, WalkEffect, WalkError, WalkEvent, WalkSession};
use tipswalk_core::waypoint::WaypointSource;

/// Drives a single walk: owns the waypoint source and stamps transitions with the clock.
pub struct WalkController {
    clock: Clock,
    settings: WalkSettings,
    waypoints: Box<dyn WaypointSource>,
}

impl WalkController {
    #[must_use]
    pub fn new(clock: Clock, settings: WalkSettings, waypoints: Box<dyn WaypointSource>) -> Self {
        Self {
            clock,
            settings,
            waypoints,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &WalkSettings {
        &self.settings
    }

    /// Open round 0 at `start` with a fresh walk id.
    pub fn start_session(&mut self, bank: QuestionBank, start: Coordinate) -> WalkSession {
        WalkSession::start(
            WalkId::generate(),
            bank,
            start,
            self.settings,
            self.waypoints.as_mut(),
            self.clock.now(),
        )
    }

    /// Apply one event through the reducer.
    ///
    /// # Errors
    ///
    /// Returns `WalkError` for rejected answers; the session is unchanged.
    pub fn apply(
        &mut self,
        session: &mut WalkSession,
        event: WalkEvent,
    ) -> Result<WalkEffect, WalkError> {
        walk::apply(session, event, self.waypoints.as_mut(), self.clock.now())
    }

    /// # Errors
    ///
    /// Returns `WalkError::Locked` before the round unlocks and `WalkError::Ended`
    /// after the tenth answer.
    pub fn submit_answer(
        &mut self,
        session: &mut WalkSession,
        choice: AnswerLabel,
    ) -> Result<AnswerOutcome, WalkError> {
        match self.apply(session, WalkEvent::Answer(choice))? {
            WalkEffect::Answered(outcome) => Ok(outcome),
            // Answer events only ever produce `Answered`.
            WalkEffect::None | WalkEffect::Unlocked => Err(WalkError::Ended),
        }
    }

    /// # Errors
    ///
    /// Returns `WalkError::NotFinished` until every round is answered.
    pub fn finalize_session(&self, session: &WalkSession) -> Result<WalkResult, WalkError> {
        session.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tipswalk_core::geo::destination;
    use tipswalk_core::model::DEFAULT_START;
    use tipswalk_core::time::{fixed_clock, fixed_now};
    use tipswalk_core::walk::RoundState;
    use tipswalk_core::waypoint::FixedBearing;

    fn controller() -> WalkController {
        WalkController::new(
            fixed_clock(),
            WalkSettings::default(),
            Box::new(FixedBearing(0.0)),
        )
    }

    #[test]
    fn start_uses_clock_and_start_position() {
        let mut controller = controller();
        let session = controller.start_session(QuestionBank::fallback(), DEFAULT_START);
        assert_eq!(session.started_at(), fixed_now());
        assert_eq!(session.checkpoint(), DEFAULT_START);
        assert_eq!(session.state(), RoundState::Locked);
    }

    #[test]
    fn answer_before_unlock_is_rejected() {
        let mut controller = controller();
        let mut session = controller.start_session(QuestionBank::fallback(), DEFAULT_START);
        assert_eq!(
            controller.submit_answer(&mut session, AnswerLabel::One),
            Err(WalkError::Locked { round: 0 })
        );
        assert_eq!(
            controller.finalize_session(&session),
            Err(WalkError::NotFinished)
        );
    }

    #[test]
    fn perfect_walk_finalizes() {
        let mut controller = controller();
        let mut session = controller.start_session(QuestionBank::fallback(), DEFAULT_START);
        let mut here = DEFAULT_START;
        for round in 0..10 {
            here = destination(here, 0.0, 250.0);
            let effect = controller
                .apply(&mut session, WalkEvent::PositionFix(here))
                .unwrap();
            assert_eq!(effect, WalkEffect::Unlocked, "round {round}");
            let outcome = controller.submit_answer(&mut session, AnswerLabel::One).unwrap();
            assert_eq!(outcome.session_ended, round == 9);
        }
        let result = controller.finalize_session(&session).unwrap();
        assert_eq!(result.final_score(), 10);
        assert!(result.perfect());
    }
}
