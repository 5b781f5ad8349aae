use crate::geo::{Coordinate, initial_bearing};
use crate::model::{AnswerLabel, QuestionId, ROUNDS_PER_WALK, WalkId};

use super::session::{RoundState, WalkSession};

/// Question text and options, without the correct label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub id: QuestionId,
    pub prompt: String,
    pub options: Vec<(AnswerLabel, String)>,
}

/// Snapshot of a walk for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkView {
    pub walk_id: WalkId,
    /// 0-based index of the active round.
    pub round_index: usize,
    /// 1-based number for display ("question 3 / 10").
    pub round_number: usize,
    pub total_rounds: usize,
    pub state: RoundState,
    pub unlocked: bool,
    pub position: Option<Coordinate>,
    pub checkpoint: Coordinate,
    pub distance_moved_m: f64,
    pub remaining_m: f64,
    pub score: u32,
    pub target: Option<Coordinate>,
    pub bearing_to_target_deg: Option<f64>,
    /// Only present once the round is unlocked.
    pub question: Option<QuestionView>,
    pub unlock_cues: u32,
    pub is_complete: bool,
}

impl WalkView {
    #[must_use]
    pub fn of(session: &WalkSession) -> Self {
        let is_complete = session.is_complete();
        let unlocked = session.is_unlocked();
        let distance_moved_m = session.distance_moved_m();
        let remaining_m = if unlocked || is_complete {
            0.0
        } else {
            (session.settings().unlock_distance_m() - distance_moved_m).max(0.0)
        };

        let target = if is_complete {
            None
        } else {
            session.current_waypoint().map(|w| w.coordinate())
        };
        let bearing_to_target_deg = session
            .last_position()
            .zip(target)
            .map(|(from, to)| initial_bearing(from, to));

        let question = if unlocked {
            session.current_question().map(|q| QuestionView {
                id: q.id(),
                prompt: q.prompt().to_string(),
                options: AnswerLabel::ALL
                    .iter()
                    .map(|label| (*label, q.option(*label).to_string()))
                    .collect(),
            })
        } else {
            None
        };

        Self {
            walk_id: session.id(),
            round_index: session.current_index(),
            round_number: session.current_index() + 1,
            total_rounds: ROUNDS_PER_WALK,
            state: session.state(),
            unlocked,
            position: session.last_position(),
            checkpoint: session.checkpoint(),
            distance_moved_m,
            remaining_m,
            score: session.score(),
            target,
            bearing_to_target_deg,
            question,
            unlock_cues: session.unlock_cues(),
            is_complete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::destination;
    use crate::model::{QuestionBank, WalkSettings};
    use crate::time::fixed_now;
    use crate::waypoint::FixedBearing;

    fn session() -> WalkSession {
        WalkSession::start(
            WalkId::generate(),
            QuestionBank::fallback(),
            Coordinate::new(59.3293, 18.0686).unwrap(),
            WalkSettings::default(),
            &mut FixedBearing(90.0),
            fixed_now(),
        )
    }

    #[test]
    fn fresh_walk_has_no_bearing_or_question() {
        let view = WalkView::of(&session());
        assert_eq!(view.round_number, 1);
        assert_eq!(view.total_rounds, 10);
        assert_eq!(view.remaining_m, 200.0);
        assert!(view.bearing_to_target_deg.is_none());
        assert!(view.question.is_none());
        assert!(view.target.is_some());
    }

    #[test]
    fn remaining_distance_shrinks_as_player_moves() {
        let mut walk = session();
        let start = walk.checkpoint();
        walk.observe_position(destination(start, 90.0, 120.0));
        let view = WalkView::of(&walk);
        assert!((view.remaining_m - 80.0).abs() < 0.5);
        assert!(!view.unlocked);

        let bearing = view.bearing_to_target_deg.unwrap();
        assert!((bearing - 90.0).abs() < 0.1, "bearing {bearing}");
    }

    #[test]
    fn unlocked_view_exposes_question_options() {
        let mut walk = session();
        let start = walk.checkpoint();
        walk.observe_position(destination(start, 270.0, 300.0));
        let view = WalkView::of(&walk);
        assert!(view.unlocked);
        assert_eq!(view.remaining_m, 0.0);
        let question = view.question.unwrap();
        assert_eq!(question.options.len(), 3);
        assert_eq!(question.options[0], (AnswerLabel::One, "42 km".to_string()));
        assert_eq!(view.unlock_cues, 1);
    }
}
