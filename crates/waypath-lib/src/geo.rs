//! Great-circle distance helpers.
//!
//! Every cost model measures remaining distance with [`distance_meters`], so
//! it is the leaf dependency of the whole routing stack.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS-84 latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine distance to `other` in metres.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        distance_meters(self.lat, self.lon, other.lat, other.lon)
    }

    /// Whether both components are finite and inside the WGS-84 ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Haversine great-circle distance between two points, in metres.
///
/// NaN inputs propagate to a NaN result; callers validate coordinates first.
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi * 0.5).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda * 0.5).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_identical_points() {
        assert_eq!(distance_meters(12.5, 77.6, 12.5, 77.6), 0.0);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = distance_meters(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111_194.9).abs() < 1.0, "got {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = distance_meters(51.5007, -0.1246, 40.6892, -74.0445);
        let b = distance_meters(40.6892, -74.0445, 51.5007, -0.1246);
        assert!((a - b).abs() < 1e-6);
        // London to New York, roughly 5,570 km.
        assert!((a / 1000.0 - 5574.8).abs() < 10.0, "got {a}");
    }

    #[test]
    fn nan_propagates() {
        assert!(distance_meters(f64::NAN, 0.0, 0.0, 0.0).is_nan());
    }

    #[test]
    fn coordinate_validation() {
        assert!(Coordinate::new(45.0, 120.0).is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, f64::INFINITY).is_valid());
    }
}
