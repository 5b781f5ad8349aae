mod controller;
mod event_loop;
mod workflow;

pub use controller::WalkController;
pub use event_loop::{PositionSubscription, PositionUpdate, WalkHandle};
pub use workflow::{CompletedWalk, WalkLoopService, WaypointFactory};
