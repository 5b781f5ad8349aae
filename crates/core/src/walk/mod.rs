//! Unlock state machine for a single walk, plus the pure reducer and view model
//! the live event loop is built on.

mod reducer;
mod session;
mod view;

pub use reducer::{WalkEffect, WalkEvent, apply};
pub use session::{AnswerOutcome, RoundState, WalkError, WalkSession, Waypoint};
pub use view::{QuestionView, WalkView};
