#![forbid(unsafe_code)]

pub mod geo;
pub mod model;
pub mod time;
pub mod walk;
pub mod waypoint;

pub use geo::Coordinate;
pub use time::{Clock, WeekKey};
