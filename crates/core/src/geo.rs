//! Great-circle math on WGS84-style latitude/longitude pairs.
//!
//! `distance` uses the spherical mean Earth radius while `destination` uses the
//! equatorial radius. A target produced at `d` meters therefore measures about
//! 0.11% shorter through `distance` (roughly 0.22 m at 200 m).

use std::fmt;

use thiserror::Error;

/// Mean Earth radius used for haversine distances.
pub const MEAN_EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Equatorial Earth radius used when projecting a destination point.
pub const EQUATORIAL_EARTH_RADIUS_M: f64 = 6_378_137.0;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum CoordinateError {
    #[error("latitude must be within [-90, 90], got {0}")]
    LatitudeOutOfRange(f64),

    #[error("longitude must be within [-180, 180], got {0}")]
    LongitudeOutOfRange(f64),
}

/// A point on the Earth's surface in decimal degrees.
#[derive(Clone, Copy, PartialEq)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting values outside the valid ranges.
    ///
    /// # Errors
    ///
    /// Returns `CoordinateError` if either component is out of range or not finite.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Create a coordinate without range checks.
    ///
    /// Used for computed points; validation is the caller's responsibility.
    #[must_use]
    pub const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Debug for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coordinate({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}

/// Haversine great-circle distance in meters.
///
/// Symmetric in its arguments and zero for identical points. NaN inputs yield NaN.
#[must_use]
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let delta_phi = (b.latitude - a.latitude).to_radians();
    let delta_lambda = (b.longitude - a.longitude).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    MEAN_EARTH_RADIUS_M * c
}

/// Point reached by travelling `distance_m` from `origin` along `bearing_deg`.
///
/// Bearing is degrees clockwise from true north and is wrapped into `[0, 360)`.
/// The result is not range-corrected across the antimeridian.
#[must_use]
pub fn destination(origin: Coordinate, bearing_deg: f64, distance_m: f64) -> Coordinate {
    let theta = bearing_deg.rem_euclid(360.0).to_radians();
    let delta = distance_m / EQUATORIAL_EARTH_RADIUS_M;

    let phi1 = origin.latitude.to_radians();
    let lambda1 = origin.longitude.to_radians();

    let phi2 = (phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos()).asin();
    let lambda2 = lambda1
        + (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * phi2.sin());

    Coordinate::new_unchecked(phi2.to_degrees(), lambda2.to_degrees())
}

/// Initial bearing from `from` towards `to`, in degrees within `[0, 360)`.
#[must_use]
pub fn initial_bearing(from: Coordinate, to: Coordinate) -> f64 {
    let phi1 = from.latitude.to_radians();
    let phi2 = to.latitude.to_radians();
    let delta_lambda = (to.longitude - from.longitude).to_radians();

    let y = delta_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    y.atan2(x).to_degrees().rem_euclid(360.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn stockholm() -> Coordinate {
        Coordinate::new(59.3293, 18.0686).unwrap()
    }

    fn random_coordinate(rng: &mut StdRng) -> Coordinate {
        Coordinate::new(rng.random_range(-80.0..80.0), rng.random_range(-179.0..179.0)).unwrap()
    }

    #[test]
    fn rejects_out_of_range_components() {
        assert_eq!(
            Coordinate::new(90.5, 0.0).unwrap_err(),
            CoordinateError::LatitudeOutOfRange(90.5)
        );
        assert_eq!(
            Coordinate::new(0.0, -180.5).unwrap_err(),
            CoordinateError::LongitudeOutOfRange(-180.5)
        );
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_self() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let a = random_coordinate(&mut rng);
            let b = random_coordinate(&mut rng);
            assert_eq!(distance(a, b), distance(b, a));
            assert_eq!(distance(a, a), 0.0);
        }
    }

    #[test]
    fn distance_matches_known_city_pair() {
        // Stockholm -> Gothenburg is roughly 397 km as the crow flies.
        let gothenburg = Coordinate::new(57.7089, 11.9746).unwrap();
        let d = distance(stockholm(), gothenburg);
        assert!((d - 397_000.0).abs() < 3_000.0, "got {d}");
    }

    #[test]
    fn distance_propagates_nan() {
        let bad = Coordinate::new_unchecked(f64::NAN, 0.0);
        assert!(distance(bad, stockholm()).is_nan());
    }

    #[test]
    fn destination_round_trips_through_distance() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let origin = random_coordinate(&mut rng);
            let bearing = rng.random_range(0.0..360.0);
            let target = destination(origin, bearing, 200.0);
            let measured = distance(origin, target);
            assert!((measured - 200.0).abs() < 0.5, "measured {measured}");
        }
    }

    #[test]
    fn destination_with_zero_distance_is_origin() {
        let origin = stockholm();
        let target = destination(origin, 123.0, 0.0);
        assert!((target.latitude() - origin.latitude()).abs() < 1e-12);
        assert!((target.longitude() - origin.longitude()).abs() < 1e-12);
    }

    #[test]
    fn destination_wraps_bearing() {
        let origin = stockholm();
        let a = destination(origin, 450.0, 500.0);
        let b = destination(origin, 90.0, 500.0);
        assert!((a.latitude() - b.latitude()).abs() < 1e-12);
        assert!((a.longitude() - b.longitude()).abs() < 1e-12);

        let c = destination(origin, -90.0, 500.0);
        let d = destination(origin, 270.0, 500.0);
        assert!((c.longitude() - d.longitude()).abs() < 1e-12);
    }

    #[test]
    fn north_bearing_increases_latitude_only() {
        let origin = stockholm();
        let target = destination(origin, 0.0, 1_000.0);
        assert!(target.latitude() > origin.latitude());
        assert!((target.longitude() - origin.longitude()).abs() < 1e-9);
    }

    #[test]
    fn initial_bearing_points_towards_destination() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let origin = random_coordinate(&mut rng);
            let bearing = rng.random_range(0.0..360.0);
            let target = destination(origin, bearing, 200.0);
            let back = initial_bearing(origin, target);
            let diff = (back - bearing).abs();
            let diff = diff.min(360.0 - diff);
            assert!(diff < 1e-6, "expected {bearing}, got {back}");
        }
    }
}
