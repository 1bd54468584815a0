//! Great-circle distance on a spherical Earth.
//!
//! Accurate to well under 0.5% at city scale, which is all the matching
//! query needs.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Mean Earth radius (IUGG), kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Kilometres spanned by one degree of latitude on the sphere.
pub const KM_PER_DEGREE_LATITUDE: f64 = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;

/// A WGS84 latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Build a coordinate pair, rejecting non-finite or out-of-range values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoreError> {
        let coords = Self {
            latitude,
            longitude,
        };
        coords.validate()?;
        Ok(coords)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(CoreError::Validation(format!(
                "Latitude {} must be between -90 and 90",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(CoreError::Validation(format!(
                "Longitude {} must be between -180 and 180",
                self.longitude
            )));
        }
        Ok(())
    }
}

/// Haversine distance between two points, in kilometres.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push h a hair above 1 for antipodal points.
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(lat: f64, lon: f64) -> Coordinates {
        Coordinates::new(lat, lon).unwrap()
    }

    #[test]
    fn zero_distance_to_self() {
        let p = at(19.43, -99.13);
        assert!(haversine_km(p, p).abs() < 1e-9);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = at(19.43, -99.13);
        let b = at(20.67, -103.35);
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = haversine_km(at(0.0, 0.0), at(1.0, 0.0));
        assert!((d - KM_PER_DEGREE_LATITUDE).abs() < 1e-6);
        assert!((d - 111.195).abs() < 0.01);
    }

    #[test]
    fn mexico_city_to_guadalajara() {
        // Zócalo to Guadalajara centre, roughly 460 km great-circle.
        let d = haversine_km(at(19.4326, -99.1332), at(20.6767, -103.3475));
        assert!((455.0..465.0).contains(&d), "got {d}");
    }

    #[test]
    fn antipodes_are_half_circumference() {
        let d = haversine_km(at(0.0, 0.0), at(0.0, 180.0));
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn out_of_range_coordinates_rejected() {
        assert!(Coordinates::new(90.1, 0.0).is_err());
        assert!(Coordinates::new(-90.1, 0.0).is_err());
        assert!(Coordinates::new(0.0, 180.5).is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
        assert!(Coordinates::new(-90.0, 180.0).is_ok());
    }
}
