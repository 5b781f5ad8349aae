use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geo::{Coordinate, destination};

/// Pick a uniformly random bearing and project `radius_m` away from `origin`.
///
/// Walkability of the result is not checked; the target may land in water or on
/// private ground. Players are told to keep walking on a safe path instead.
#[must_use]
pub fn next_waypoint<R: Rng>(rng: &mut R, origin: Coordinate, radius_m: f64) -> Coordinate {
    let bearing = rng.random_range(0.0..360.0);
    destination(origin, bearing, radius_m)
}

/// Supplies the next target coordinate for a round.
pub trait WaypointSource: Send {
    fn next_waypoint(&mut self, origin: Coordinate, radius_m: f64) -> Coordinate;
}

/// Random bearings drawn from an owned RNG.
#[derive(Debug, Clone)]
pub struct RandomWaypoints<R = StdRng> {
    rng: R,
}

impl RandomWaypoints<StdRng> {
    /// Seeded from the operating system.
    #[must_use]
    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic sequence for tests and replays.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> RandomWaypoints<R> {
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + Send> WaypointSource for RandomWaypoints<R> {
    fn next_waypoint(&mut self, origin: Coordinate, radius_m: f64) -> Coordinate {
        next_waypoint(&mut self.rng, origin, radius_m)
    }
}

/// Always projects along the same bearing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedBearing(pub f64);

impl WaypointSource for FixedBearing {
    fn next_waypoint(&mut self, origin: Coordinate, radius_m: f64) -> Coordinate {
        destination(origin, self.0, radius_m)
    }
}
