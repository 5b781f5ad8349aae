use chrono::{DateTime, Utc};

use crate::geo::Coordinate;
use crate::model::AnswerLabel;
use crate::waypoint::WaypointSource;

use super::session::{AnswerOutcome, WalkError, WalkSession};

/// Inputs to a running walk, in the order they arrived.
#[derive(Debug, Clone, PartialEq)]
pub enum WalkEvent {
    PositionFix(Coordinate),
    /// The position source reported an error; carries its description.
    PositionUnavailable(String),
    Answer(AnswerLabel),
}

/// Observable consequence of applying an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkEffect {
    None,
    /// The active round just unlocked; fire the one-shot cue.
    Unlocked,
    Answered(AnswerOutcome),
}

/// Apply one event to the session. This is the only way the event loop mutates a walk.
///
/// # Errors
///
/// Propagates `WalkError` from answer submission; the session is unchanged in that case.
pub fn apply(
    session: &mut WalkSession,
    event: WalkEvent,
    source: &mut dyn WaypointSource,
    now: DateTime<Utc>,
) -> Result<WalkEffect, WalkError> {
    match event {
        WalkEvent::PositionFix(position) => Ok(if session.observe_position(position) {
            WalkEffect::Unlocked
        } else {
            WalkEffect::None
        }),
        WalkEvent::PositionUnavailable(_) => Ok(WalkEffect::None),
        WalkEvent::Answer(choice) => session
            .submit_answer(choice, source, now)
            .map(WalkEffect::Answered),
    }
}
